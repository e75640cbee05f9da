/// Combines per-model cumulative rewards (`[ensemble][candidate]`) into a
/// single score per candidate.
///
/// Callers guarantee at least one model and equal-length rows.
pub trait Aggregator: Send + Sync {
    fn aggregate(&self, per_model: &[Vec<f32>]) -> Vec<f32>;
}

/// Elementwise arithmetic mean across the ensemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanAggregator;

impl Aggregator for MeanAggregator {
    fn aggregate(&self, per_model: &[Vec<f32>]) -> Vec<f32> {
        let n = per_model.len() as f32;
        column_sums(per_model).into_iter().map(|s| s / n).collect()
    }
}

/// Worst case across the ensemble.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinAggregator;

impl Aggregator for MinAggregator {
    fn aggregate(&self, per_model: &[Vec<f32>]) -> Vec<f32> {
        let mut out = per_model[0].clone();
        for rewards in &per_model[1..] {
            for (o, r) in out.iter_mut().zip(rewards) {
                *o = o.min(*r);
            }
        }
        out
    }
}

/// `mean + beta * std` with the population standard deviation.
#[derive(Debug, Clone, Copy)]
pub struct UcbAggregator {
    pub beta: f32,
}

impl Aggregator for UcbAggregator {
    fn aggregate(&self, per_model: &[Vec<f32>]) -> Vec<f32> {
        let mean = MeanAggregator.aggregate(per_model);
        let n = per_model.len() as f32;
        let mut var = vec![0.0f32; mean.len()];
        for rewards in per_model {
            for ((v, r), m) in var.iter_mut().zip(rewards).zip(&mean) {
                *v += (r - m).powi(2);
            }
        }
        mean.iter()
            .zip(var)
            .map(|(m, v)| m + self.beta * (v / n).sqrt())
            .collect()
    }
}

fn column_sums(per_model: &[Vec<f32>]) -> Vec<f32> {
    let mut sums = vec![0.0f32; per_model[0].len()];
    for rewards in per_model {
        for (s, r) in sums.iter_mut().zip(rewards) {
            *s += r;
        }
    }
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_two_models() {
        let per_model = vec![vec![1.0, 2.0, 3.0], vec![3.0, 0.0, -3.0]];
        assert_eq!(MeanAggregator.aggregate(&per_model), vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn mean_of_single_model_is_identity() {
        let rewards = vec![0.1, -7.25, 1e-3, 42.0];
        assert_eq!(MeanAggregator.aggregate(&[rewards.clone()]), rewards);
    }

    #[test]
    fn min_is_pessimistic() {
        let per_model = vec![vec![1.0, 5.0], vec![2.0, -1.0], vec![0.5, 3.0]];
        assert_eq!(MinAggregator.aggregate(&per_model), vec![0.5, -1.0]);
    }

    #[test]
    fn ucb_adds_spread() {
        let per_model = vec![vec![0.0, 1.0], vec![2.0, 1.0]];
        let ucb = UcbAggregator { beta: 2.0 }.aggregate(&per_model);
        assert_eq!(ucb, vec![3.0, 1.0]);
        let zero_beta = UcbAggregator { beta: 0.0 }.aggregate(&per_model);
        assert_eq!(zero_beta, MeanAggregator.aggregate(&per_model));
    }
}
