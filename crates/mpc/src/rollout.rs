use crate::error::{Collaborator, MpcError};
use ml::{DataStatistics, DynamicsModel, RewardOracle, Tensor};
use rayon::prelude::*;

/// Read-only view over a `[num_sequences, horizon, ac_dim]` candidate batch.
#[derive(Clone, Copy)]
pub struct ActionSequences<'a> {
    tensor: &'a Tensor,
}

impl<'a> ActionSequences<'a> {
    /// # Panics
    ///
    /// Panics if `tensor` is not three-dimensional.
    #[must_use]
    pub fn new(tensor: &'a Tensor) -> Self {
        assert_eq!(tensor.shape.len(), 3, "action sequences are [N, horizon, ac_dim]");
        Self { tensor }
    }

    #[must_use]
    pub fn num_sequences(&self) -> usize {
        self.tensor.shape[0]
    }

    #[must_use]
    pub fn horizon(&self) -> usize {
        self.tensor.shape[1]
    }

    #[must_use]
    pub fn ac_dim(&self) -> usize {
        self.tensor.shape[2]
    }

    /// Actions of every candidate at timestep `t`, as an `[N, ac_dim]` batch.
    #[must_use]
    pub fn actions_at(&self, t: usize) -> Tensor {
        let (n, h, d) = (self.num_sequences(), self.horizon(), self.ac_dim());
        let mut data = Vec::with_capacity(n * d);
        for i in 0..n {
            let start = (i * h + t) * d;
            data.extend_from_slice(&self.tensor.data[start..start + d]);
        }
        Tensor::from_vec(vec![n, d], data)
    }

    #[must_use]
    pub fn first_action(&self, i: usize) -> &'a [f32] {
        let tensor = self.tensor;
        let start = i * self.horizon() * self.ac_dim();
        &tensor.data[start..start + self.ac_dim()]
    }
}

/// Inputs shared by every member's rollout.
pub struct RolloutInputs<'a> {
    pub obs: &'a [f32],
    pub seqs: ActionSequences<'a>,
    pub stats: &'a DataStatistics,
    pub stop_on_done: bool,
}

/// Simulates all candidates through one ensemble member and returns the
/// cumulative reward of each candidate.
///
/// # Errors
///
/// Returns [`MpcError::ContractViolation`] at the first step where the
/// oracle or the model produces a wrongly sized or non-finite output.
pub fn rollout(
    model_index: usize,
    model: &dyn DynamicsModel,
    oracle: &dyn RewardOracle,
    inputs: &RolloutInputs<'_>,
) -> Result<Vec<f32>, MpcError> {
    let n = inputs.seqs.num_sequences();
    let ob_dim = inputs.obs.len();
    let mut observations = Tensor::tile(inputs.obs, n);
    let mut returns = vec![0.0f32; n];
    let mut alive = vec![true; n];

    for t in 0..inputs.seqs.horizon() {
        let actions = inputs.seqs.actions_at(t);

        let (rewards, dones) = oracle.get_reward(&observations, &actions);
        check_rewards(&rewards, &dones, n, t)?;
        for ((ret, r), live) in returns.iter_mut().zip(&rewards).zip(&alive) {
            if *live {
                *ret += r;
            }
        }
        if let Some(i) = returns.iter().position(|r| !r.is_finite()) {
            return Err(MpcError::ContractViolation {
                collaborator: Collaborator::RewardOracle,
                step: t,
                detail: format!("cumulative reward of candidate {i} overflowed to {}", returns[i]),
            });
        }
        if inputs.stop_on_done {
            for (live, done) in alive.iter_mut().zip(&dones) {
                *live &= !done;
            }
        }

        let next = model.predict(&observations, &actions, inputs.stats);
        check_prediction(&next, n, ob_dim, model_index, t)?;
        observations = next;
    }

    tracing::trace!(model = model_index, "rollout finished");
    Ok(returns)
}

/// Runs [`rollout`] for every ensemble member, in ensemble order.
///
/// With `parallel` set the members are evaluated on the rayon pool; the
/// result is identical to the sequential evaluation.
///
/// # Errors
///
/// Propagates the first [`MpcError`] produced by any member.
pub fn evaluate_ensemble(
    ensemble: &[Box<dyn DynamicsModel>],
    oracle: &dyn RewardOracle,
    inputs: &RolloutInputs<'_>,
    parallel: bool,
) -> Result<Vec<Vec<f32>>, MpcError> {
    if parallel {
        ensemble
            .par_iter()
            .enumerate()
            .map(|(i, model)| rollout(i, model.as_ref(), oracle, inputs))
            .collect()
    } else {
        ensemble
            .iter()
            .enumerate()
            .map(|(i, model)| rollout(i, model.as_ref(), oracle, inputs))
            .collect()
    }
}

fn check_rewards(rewards: &[f32], dones: &[bool], n: usize, step: usize) -> Result<(), MpcError> {
    if rewards.len() != n || dones.len() != n {
        return Err(MpcError::ContractViolation {
            collaborator: Collaborator::RewardOracle,
            step,
            detail: format!(
                "expected {n} rewards and done flags, got {} and {}",
                rewards.len(),
                dones.len()
            ),
        });
    }
    if let Some(i) = rewards.iter().position(|r| !r.is_finite()) {
        return Err(MpcError::ContractViolation {
            collaborator: Collaborator::RewardOracle,
            step,
            detail: format!("non-finite reward {} for candidate {i}", rewards[i]),
        });
    }
    Ok(())
}

fn check_prediction(
    next: &Tensor,
    n: usize,
    ob_dim: usize,
    model_index: usize,
    step: usize,
) -> Result<(), MpcError> {
    let collaborator = Collaborator::DynamicsModel(model_index);
    if next.shape.len() != 2 || next.rows() != n || next.cols() != ob_dim {
        return Err(MpcError::ContractViolation {
            collaborator,
            step,
            detail: format!("expected next observations [{n}, {ob_dim}], got {:?}", next.shape),
        });
    }
    if !next.all_finite() {
        return Err(MpcError::ContractViolation {
            collaborator,
            step,
            detail: "predicted observations contain non-finite values".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Drift;

    impl DynamicsModel for Drift {
        fn predict(&self, obs: &Tensor, acs: &Tensor, _stats: &DataStatistics) -> Tensor {
            let mut next = obs.clone();
            for i in 0..obs.rows() {
                next.row_mut(i)[0] += acs.row(i)[0];
            }
            next
        }
    }

    /// Reward is the first observation coordinate; done once it reaches 2.
    struct Position;

    impl RewardOracle for Position {
        fn get_reward(&self, obs: &Tensor, _acs: &Tensor) -> (Vec<f32>, Vec<bool>) {
            (0..obs.rows()).map(|i| (obs.row(i)[0], obs.row(i)[0] >= 2.0)).unzip()
        }
    }

    fn stats() -> DataStatistics {
        DataStatistics::new(vec![0.0], vec![1.0], vec![0.0], vec![1.0], vec![0.0], vec![1.0]).unwrap()
    }

    #[test]
    fn actions_at_gathers_one_timestep() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let t = Tensor::from_vec(vec![2, 3, 2], data);
        let seqs = ActionSequences::new(&t);
        let a1 = seqs.actions_at(1);
        assert_eq!(a1.shape, vec![2, 2]);
        assert_eq!(a1.data, vec![2.0, 3.0, 8.0, 9.0]);
        assert_eq!(seqs.first_action(1), &[6.0, 7.0]);
    }

    #[test]
    fn rewards_are_scored_before_each_transition() {
        // candidate 0 always +1, candidate 1 always 0; horizon 3
        let t = Tensor::from_vec(vec![2, 3, 1], vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
        let stats = stats();
        let inputs = RolloutInputs { obs: &[0.0], seqs: ActionSequences::new(&t), stats: &stats, stop_on_done: false };
        let returns = rollout(0, &Drift, &Position, &inputs).unwrap();
        // positions seen: 0, 1, 2 for candidate 0
        assert_eq!(returns, vec![3.0, 0.0]);
    }

    #[test]
    fn full_horizon_ignores_done_by_default() {
        let t = Tensor::from_vec(vec![1, 4, 1], vec![2.0, 0.0, 0.0, 0.0]);
        let stats = stats();
        let mut inputs = RolloutInputs { obs: &[0.0], seqs: ActionSequences::new(&t), stats: &stats, stop_on_done: false };
        assert_eq!(rollout(0, &Drift, &Position, &inputs).unwrap(), vec![6.0]);
        // done fires at step 1 (position 2); its reward counts, later ones do not
        inputs.stop_on_done = true;
        assert_eq!(rollout(0, &Drift, &Position, &inputs).unwrap(), vec![2.0]);
    }

    /// Each reward is finite but their sum is not.
    struct Huge;

    impl RewardOracle for Huge {
        fn get_reward(&self, obs: &Tensor, _acs: &Tensor) -> (Vec<f32>, Vec<bool>) {
            (vec![3.0e38; obs.rows()], vec![false; obs.rows()])
        }
    }

    #[test]
    fn overflowing_return_is_reported() {
        let t = Tensor::zeros(vec![2, 3, 1]);
        let stats = stats();
        let inputs = RolloutInputs { obs: &[0.0], seqs: ActionSequences::new(&t), stats: &stats, stop_on_done: false };
        let err = rollout(0, &Drift, &Huge, &inputs).unwrap_err();
        assert!(matches!(
            err,
            MpcError::ContractViolation { collaborator: Collaborator::RewardOracle, step: 1, .. }
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let ensemble: Vec<Box<dyn DynamicsModel>> = vec![Box::new(Drift), Box::new(Drift), Box::new(Drift)];
        let t = Tensor::from_vec(vec![3, 2, 1], vec![0.5, 0.5, -1.0, 2.0, 0.0, 1.0]);
        let stats = stats();
        let inputs = RolloutInputs { obs: &[0.0], seqs: ActionSequences::new(&t), stats: &stats, stop_on_done: false };
        let seq = evaluate_ensemble(&ensemble, &Position, &inputs, false).unwrap();
        let par = evaluate_ensemble(&ensemble, &Position, &inputs, true).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 3);
    }
}
