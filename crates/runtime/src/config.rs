use anyhow::{Context, Result};
use ml::PointMassConfig;
use mpc::MpcConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the demo ensemble of analytic models is perturbed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    pub size: usize,
    /// Relative spread of the believed mass around the true mass.
    pub mass_jitter: f32,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self { size: 5, mass_jitter: 0.2 }
    }
}

impl EnsembleConfig {
    /// Masses spread evenly over `mass * [1 - jitter, 1 + jitter]`.
    #[must_use]
    pub fn masses(&self, mass: f32) -> Vec<f32> {
        if self.size <= 1 {
            return vec![mass; self.size];
        }
        let last = (self.size - 1) as f32;
        (0..self.size)
            .map(|i| mass * (1.0 + self.mass_jitter * (2.0 * i as f32 / last - 1.0)))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub mpc: MpcConfig,
    #[serde(default)]
    pub env: PointMassConfig,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default = "default_warmup_steps")]
    pub warmup_steps: usize,
    #[serde(default = "default_episode_steps")]
    pub episode_steps: usize,
}

fn default_warmup_steps() -> usize {
    20
}

fn default_episode_steps() -> usize {
    200
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mpc: MpcConfig::new(15, 200, 1),
            env: PointMassConfig::default(),
            ensemble: EnsembleConfig::default(),
            warmup_steps: default_warmup_steps(),
            episode_steps: default_episode_steps(),
        }
    }
}

impl RuntimeConfig {
    /// # Errors
    ///
    /// Returns an error if `json` is not a valid runtime configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masses_are_symmetric_around_truth() {
        let cfg = EnsembleConfig { size: 3, mass_jitter: 0.5 };
        assert_eq!(cfg.masses(2.0), vec![1.0, 2.0, 3.0]);
        let single = EnsembleConfig { size: 1, mass_jitter: 0.5 };
        assert_eq!(single.masses(2.0), vec![2.0]);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let cfg = RuntimeConfig::from_json(r#"{"mpc": {"horizon": 5, "N": 10, "ac_dim": 1}}"#).unwrap();
        assert_eq!(cfg.mpc, MpcConfig::new(5, 10, 1));
        assert_eq!(cfg.env, PointMassConfig::default());
        assert_eq!(cfg.ensemble, EnsembleConfig::default());
        assert_eq!(cfg.warmup_steps, 20);
        assert_eq!(cfg.episode_steps, 200);
    }

    #[test]
    fn missing_mpc_section_is_an_error() {
        assert!(RuntimeConfig::from_json("{}").is_err());
    }
}
