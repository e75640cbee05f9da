use crate::{error::MlError, tensor::Tensor};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const NORM_EPS: f32 = 1e-8;

/// Normalization statistics shared between a trainer and the dynamics models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataStatistics {
    pub obs_mean: Vec<f32>,
    pub obs_std: Vec<f32>,
    pub acs_mean: Vec<f32>,
    pub acs_std: Vec<f32>,
    pub delta_mean: Vec<f32>,
    pub delta_std: Vec<f32>,
}

impl DataStatistics {
    /// # Errors
    ///
    /// Returns [`MlError::ShapeMismatch`] if a mean and its std differ in
    /// length, or if the observation and delta statistics differ in length.
    pub fn new(
        obs_mean: Vec<f32>,
        obs_std: Vec<f32>,
        acs_mean: Vec<f32>,
        acs_std: Vec<f32>,
        delta_mean: Vec<f32>,
        delta_std: Vec<f32>,
    ) -> Result<Self, MlError> {
        if obs_mean.len() != obs_std.len()
            || acs_mean.len() != acs_std.len()
            || delta_mean.len() != delta_std.len()
        {
            return Err(MlError::ShapeMismatch("mean and std lengths differ".into()));
        }
        if obs_mean.len() != delta_mean.len() {
            return Err(MlError::ShapeMismatch(format!(
                "observation statistics have {} entries, delta statistics {}",
                obs_mean.len(),
                delta_mean.len()
            )));
        }
        Ok(Self { obs_mean, obs_std, acs_mean, acs_std, delta_mean, delta_std })
    }

    /// Column means and population standard deviations of observations,
    /// actions and one-step deltas `next_obs - obs`.
    ///
    /// # Errors
    ///
    /// Returns [`MlError::EmptyBatch`] for zero rows and
    /// [`MlError::ShapeMismatch`] when the batches disagree.
    pub fn from_transitions(obs: &Tensor, acs: &Tensor, next_obs: &Tensor) -> Result<Self, MlError> {
        if obs.rows() == 0 {
            return Err(MlError::EmptyBatch);
        }
        if obs.shape != next_obs.shape || acs.rows() != obs.rows() {
            return Err(MlError::ShapeMismatch(format!(
                "obs {:?}, acs {:?}, next_obs {:?}",
                obs.shape, acs.shape, next_obs.shape
            )));
        }
        let deltas: Vec<f32> = next_obs.data.iter().zip(&obs.data).map(|(n, o)| n - o).collect();
        let deltas = Tensor::from_vec(obs.shape.clone(), deltas);

        let (obs_mean, obs_std) = column_moments(obs);
        let (acs_mean, acs_std) = column_moments(acs);
        let (delta_mean, delta_std) = column_moments(&deltas);
        Self::new(obs_mean, obs_std, acs_mean, acs_std, delta_mean, delta_std)
    }

    #[must_use]
    pub fn obs_dim(&self) -> usize {
        self.obs_mean.len()
    }

    #[must_use]
    pub fn ac_dim(&self) -> usize {
        self.acs_mean.len()
    }
}

fn column_moments(t: &Tensor) -> (Vec<f32>, Vec<f32>) {
    let rows = t.rows();
    let cols = t.cols();
    let mut mean = vec![0.0f32; cols];
    for i in 0..rows {
        for (m, v) in mean.iter_mut().zip(t.row(i)) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= rows as f32;
    }
    let mut var = vec![0.0f32; cols];
    for i in 0..rows {
        for ((s, v), m) in var.iter_mut().zip(t.row(i)).zip(&mean) {
            *s += (v - m).powi(2);
        }
    }
    let std = var.into_iter().map(|s| (s / rows as f32).sqrt()).collect();
    (mean, std)
}

/// `(x - mean) / (std + eps)` applied row by row.
#[must_use]
pub fn normalize(x: &Tensor, mean: &[f32], std: &[f32]) -> Tensor {
    let mut out = x.clone();
    for i in 0..out.rows() {
        for ((v, m), s) in out.row_mut(i).iter_mut().zip(mean).zip(std) {
            *v = (*v - m) / (s + NORM_EPS);
        }
    }
    out
}

/// Inverse of [`normalize`] without the epsilon: `x * std + mean`.
#[must_use]
pub fn unnormalize(x: &Tensor, mean: &[f32], std: &[f32]) -> Tensor {
    let mut out = x.clone();
    for i in 0..out.rows() {
        for ((v, m), s) in out.row_mut(i).iter_mut().zip(mean).zip(std) {
            *v = *v * s + m;
        }
    }
    out
}

/// Shared slot through which a trainer publishes normalization statistics.
///
/// Clones share the same slot. Readers take a [`snapshot`](Self::snapshot)
/// and keep it for the duration of one planning call.
#[derive(Clone, Default, Debug)]
pub struct StatisticsHandle {
    inner: Arc<RwLock<Option<Arc<DataStatistics>>>>,
}

impl StatisticsHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_statistics(stats: DataStatistics) -> Self {
        let handle = Self::new();
        handle.publish(stats);
        handle
    }

    pub fn publish(&self, stats: DataStatistics) {
        *self.inner.write() = Some(Arc::new(stats));
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<DataStatistics>> {
        self.inner.read().clone()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }
}
