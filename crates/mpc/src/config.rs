use crate::{
    aggregate::{Aggregator, MeanAggregator, MinAggregator, UcbAggregator},
    error::MpcError,
};
use serde::{Deserialize, Serialize};

/// How per-model returns are combined into one score per candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationKind {
    #[default]
    Mean,
    Min,
    Ucb { beta: f32 },
}

impl AggregationKind {
    #[must_use]
    pub fn build(self) -> Box<dyn Aggregator> {
        match self {
            AggregationKind::Mean => Box::new(MeanAggregator),
            AggregationKind::Min => Box::new(MinAggregator),
            AggregationKind::Ucb { beta } => Box::new(UcbAggregator { beta }),
        }
    }
}

/// Fixed planner configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MpcConfig {
    /// Simulated steps per candidate sequence.
    pub horizon: usize,
    /// Candidate population size.
    #[serde(alias = "N")]
    pub num_sequences: usize,
    pub ac_dim: usize,
    #[serde(default)]
    pub aggregation: AggregationKind,
    /// Roll out ensemble members on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Stop accumulating reward for a candidate once the oracle reports done.
    #[serde(default)]
    pub stop_on_done: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl MpcConfig {
    #[must_use]
    pub fn new(horizon: usize, num_sequences: usize, ac_dim: usize) -> Self {
        Self {
            horizon,
            num_sequences,
            ac_dim,
            aggregation: AggregationKind::Mean,
            parallel: false,
            stop_on_done: false,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`MpcError::Configuration`] for a zero horizon, population or
    /// action dimension, or a non-finite UCB coefficient.
    pub fn validate(&self) -> Result<(), MpcError> {
        if self.horizon == 0 {
            return Err(MpcError::Configuration("horizon must be at least 1".into()));
        }
        if self.num_sequences == 0 {
            return Err(MpcError::Configuration("num_sequences must be at least 1".into()));
        }
        if self.ac_dim == 0 {
            return Err(MpcError::Configuration("ac_dim must be at least 1".into()));
        }
        if let AggregationKind::Ucb { beta } = self.aggregation {
            if !beta.is_finite() {
                return Err(MpcError::Configuration(format!("ucb beta {beta} is not finite")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(MpcConfig::new(0, 10, 1).validate().is_err());
        assert!(MpcConfig::new(5, 0, 1).validate().is_err());
        assert!(MpcConfig::new(5, 10, 0).validate().is_err());
        assert!(MpcConfig::new(1, 1, 1).validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults_and_alias() {
        let cfg: MpcConfig = serde_json::from_str(r#"{"horizon": 10, "N": 500, "ac_dim": 2}"#).unwrap();
        assert_eq!(cfg, MpcConfig::new(10, 500, 2));
    }

    #[test]
    fn deserializes_aggregation_kind() {
        let cfg: MpcConfig = serde_json::from_str(
            r#"{"horizon": 3, "num_sequences": 4, "ac_dim": 1,
                "aggregation": {"kind": "ucb", "beta": 0.5}, "parallel": true, "seed": 9}"#,
        )
        .unwrap();
        assert_eq!(cfg.aggregation, AggregationKind::Ucb { beta: 0.5 });
        assert!(cfg.parallel);
        assert_eq!(cfg.seed, Some(9));
    }
}
