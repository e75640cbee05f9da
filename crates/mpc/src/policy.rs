use crate::{
    aggregate::Aggregator,
    config::MpcConfig,
    error::{Collaborator, MpcError},
    rollout::{evaluate_ensemble, ActionSequences, RolloutInputs},
    sampler::{SequenceSampler, UniformSampler},
    select::select_first_action,
};
use ml::{ActionSpace, DataStatistics, DynamicsModel, RewardOracle, StatisticsHandle, Tensor};
use std::sync::Arc;

/// Random-shooting MPC policy over a fixed dynamics-model ensemble.
///
/// The ensemble and the reward oracle are shared with the rest of the agent;
/// normalization statistics are read from a [`StatisticsHandle`] on every
/// call, so a trainer publishing new statistics is picked up by the next
/// [`get_action`](Self::get_action).
pub struct MpcPolicy {
    config: MpcConfig,
    action_space: ActionSpace,
    ob_dim: usize,
    ensemble: Arc<[Box<dyn DynamicsModel>]>,
    oracle: Arc<dyn RewardOracle>,
    statistics: StatisticsHandle,
    sampler: Box<dyn SequenceSampler>,
    aggregator: Box<dyn Aggregator>,
}

impl MpcPolicy {
    /// # Errors
    ///
    /// Returns [`MpcError::Configuration`] if the config is invalid, the
    /// ensemble is empty, `ob_dim` is zero, or the action space dimension
    /// differs from `config.ac_dim`.
    pub fn new(
        config: MpcConfig,
        action_space: ActionSpace,
        ob_dim: usize,
        ensemble: Arc<[Box<dyn DynamicsModel>]>,
        oracle: Arc<dyn RewardOracle>,
        statistics: StatisticsHandle,
    ) -> Result<Self, MpcError> {
        config.validate()?;
        if ensemble.is_empty() {
            return Err(MpcError::Configuration("ensemble has no members".into()));
        }
        if ob_dim == 0 {
            return Err(MpcError::Configuration("ob_dim must be at least 1".into()));
        }
        if action_space.dim() != config.ac_dim {
            return Err(MpcError::Configuration(format!(
                "action space has {} dimensions, config.ac_dim is {}",
                action_space.dim(),
                config.ac_dim
            )));
        }
        let sampler: Box<dyn SequenceSampler> = match config.seed {
            Some(seed) => Box::new(UniformSampler::seeded(&action_space, seed)),
            None => Box::new(UniformSampler::from_entropy(&action_space)),
        };
        let aggregator = config.aggregation.build();
        tracing::debug!(
            horizon = config.horizon,
            num_sequences = config.num_sequences,
            ensemble = ensemble.len(),
            "mpc policy constructed"
        );
        Ok(Self { config, action_space, ob_dim, ensemble, oracle, statistics, sampler, aggregator })
    }

    /// Replaces the candidate sampler.
    #[must_use]
    pub fn with_sampler(mut self, sampler: Box<dyn SequenceSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// Replaces the ensemble aggregation policy.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: Box<dyn Aggregator>) -> Self {
        self.aggregator = aggregator;
        self
    }

    #[must_use]
    pub fn ensemble_size(&self) -> usize {
        self.ensemble.len()
    }

    /// Draws `[num_sequences, horizon, ac_dim]` candidates from the sampler.
    ///
    /// # Errors
    ///
    /// Returns [`MpcError::ContractViolation`] if the sampler returns a
    /// tensor of any other shape or an action outside the action space.
    pub fn sample_action_sequences(&mut self, num_sequences: usize, horizon: usize) -> Result<Tensor, MpcError> {
        let sample = self.sampler.sample(num_sequences, horizon);
        let expected = [num_sequences, horizon, self.config.ac_dim];
        if sample.shape != expected || sample.len() != expected.iter().product::<usize>() {
            return Err(MpcError::ContractViolation {
                collaborator: Collaborator::Sampler,
                step: 0,
                detail: format!("expected candidates {expected:?}, got {:?}", sample.shape),
            });
        }
        let ac_dim = self.config.ac_dim;
        if let Some(i) = sample.data.chunks(ac_dim).position(|a| !self.action_space.contains(a)) {
            return Err(MpcError::ContractViolation {
                collaborator: Collaborator::Sampler,
                step: i % horizon,
                detail: format!("candidate {} leaves the action space", i / horizon),
            });
        }
        Ok(sample)
    }

    /// Chooses the next action for `obs` using the currently published
    /// statistics. Returns a `[1, ac_dim]` batch.
    ///
    /// # Errors
    ///
    /// See [`get_action_with`](Self::get_action_with).
    pub fn get_action(&mut self, obs: &[f32]) -> Result<Tensor, MpcError> {
        let stats = self.statistics.snapshot();
        self.get_action_with(obs, stats.as_deref())
    }

    /// Chooses the next action with explicitly supplied statistics.
    ///
    /// Without statistics the ensemble is bypassed and a uniformly random
    /// action is returned.
    ///
    /// # Errors
    ///
    /// Returns [`MpcError::ContractViolation`] if `obs` does not have
    /// `ob_dim` entries or a collaborator returns a malformed result.
    pub fn get_action_with(&mut self, obs: &[f32], stats: Option<&DataStatistics>) -> Result<Tensor, MpcError> {
        if obs.len() != self.ob_dim {
            return Err(MpcError::ContractViolation {
                collaborator: Collaborator::Caller,
                step: 0,
                detail: format!("observation has {} entries, expected {}", obs.len(), self.ob_dim),
            });
        }

        let Some(stats) = stats else {
            tracing::debug!("no data statistics yet, performing random action");
            let sample = self.sample_action_sequences(1, 1)?;
            return Ok(Tensor::from_vec(vec![1, self.config.ac_dim], sample.data));
        };

        let candidates = self.sample_action_sequences(self.config.num_sequences, self.config.horizon)?;
        let seqs = ActionSequences::new(&candidates);
        let inputs = RolloutInputs { obs, seqs, stats, stop_on_done: self.config.stop_on_done };

        let per_model = evaluate_ensemble(&self.ensemble, self.oracle.as_ref(), &inputs, self.config.parallel)?;
        let scores = self.aggregator.aggregate(&per_model);
        if scores.len() != self.config.num_sequences || scores.iter().any(|s| !s.is_finite()) {
            return Err(MpcError::ContractViolation {
                collaborator: Collaborator::Aggregator,
                step: self.config.horizon,
                detail: format!(
                    "expected {} finite scores, got {:?}",
                    self.config.num_sequences, scores
                ),
            });
        }
        let (best, action) = select_first_action(&scores, &seqs);
        tracing::debug!(best, score = scores[best], "selected candidate sequence");
        Ok(action)
    }
}
