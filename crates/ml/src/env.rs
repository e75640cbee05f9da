use crate::{error::MlError, tensor::Tensor};
use serde::{Deserialize, Serialize};

/// Closed box `[low, high]` of admissible actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl ActionSpace {
    /// # Errors
    ///
    /// Returns [`MlError::InvalidBounds`] if the bounds are empty, differ in
    /// length, are not finite, or `low > high` in any dimension.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, MlError> {
        if low.is_empty() {
            return Err(MlError::InvalidBounds("action space has no dimensions".into()));
        }
        if low.len() != high.len() {
            return Err(MlError::InvalidBounds(format!(
                "low has {} entries, high has {}",
                low.len(),
                high.len()
            )));
        }
        for (d, (l, h)) in low.iter().zip(&high).enumerate() {
            if !l.is_finite() || !h.is_finite() {
                return Err(MlError::InvalidBounds(format!("dimension {d} is not finite")));
            }
            if l > h {
                return Err(MlError::InvalidBounds(format!("dimension {d}: low {l} > high {h}")));
            }
            if !(h - l).is_finite() {
                return Err(MlError::InvalidBounds(format!("dimension {d}: width of [{l}, {h}] overflows")));
            }
        }
        Ok(Self { low, high })
    }

    /// Symmetric box `[-limit, limit]^dim`.
    ///
    /// # Errors
    ///
    /// See [`ActionSpace::new`].
    pub fn symmetric(limit: f32, dim: usize) -> Result<Self, MlError> {
        Self::new(vec![-limit; dim], vec![limit; dim])
    }

    #[must_use]
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    #[must_use]
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    #[must_use]
    pub fn contains(&self, action: &[f32]) -> bool {
        action.len() == self.dim()
            && action
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(a, (l, h))| l <= a && a <= h)
    }

}

/// Batched reward function of an environment.
///
/// Given `[n, ob_dim]` observations and `[n, ac_dim]` actions, returns `n`
/// rewards and `n` termination flags. Must not depend on hidden state.
pub trait RewardOracle: Send + Sync {
    fn get_reward(&self, obs: &Tensor, acs: &Tensor) -> (Vec<f32>, Vec<bool>);
}

/// Reinforcement learning environment trait.
///
/// Each call to [`step`] advances the simulation by one action and returns
/// the new observation vector, a reward signal, and whether the episode has
/// terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Returns `(obs, reward, done)`.
    fn step(&mut self, action: &[f32]) -> (Vec<f32>, f32, bool);

    /// Reset the environment to its starting state and return the initial
    /// observation vector.
    fn reset(&mut self) -> Vec<f32>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    fn action_space(&self) -> ActionSpace;
}
