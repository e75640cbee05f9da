use crate::{
    nn::{self, Dense},
    stats::{normalize, unnormalize, DataStatistics},
    tensor::Tensor,
};

/// Forward dynamics model: predicts the next observation batch.
///
/// Implementations must preserve the batch size and the observation width,
/// and must not mutate hidden state visible to callers.
pub trait DynamicsModel: Send + Sync {
    fn predict(&self, obs: &Tensor, acs: &Tensor, stats: &DataStatistics) -> Tensor;
}

/// Feed-forward network that predicts normalized one-step state deltas.
///
/// Inputs are the normalized observation and action concatenated per row;
/// the output is unnormalized with the delta statistics and added to the
/// observation.
#[derive(Clone, Debug)]
pub struct DeltaNetwork {
    layers: Vec<Dense>,
}

impl DeltaNetwork {
    /// # Panics
    ///
    /// Panics if `layers` is empty or consecutive widths do not chain.
    #[must_use]
    pub fn new(layers: Vec<Dense>) -> Self {
        assert!(!layers.is_empty(), "delta network needs at least one layer");
        for pair in layers.windows(2) {
            assert_eq!(pair[0].out_dim, pair[1].in_dim, "layer widths must chain");
        }
        Self { layers }
    }

    /// Randomly initialised network with `n_layers` hidden layers of width `size`.
    #[must_use]
    pub fn random(ob_dim: usize, ac_dim: usize, n_layers: usize, size: usize, seed: u64) -> Self {
        let mut layers = Vec::with_capacity(n_layers + 1);
        let mut width = ob_dim + ac_dim;
        for i in 0..n_layers {
            layers.push(Dense::random(width, size, seed.wrapping_add(i as u64)));
            width = size;
        }
        layers.push(Dense::random(width, ob_dim, seed.wrapping_add(n_layers as u64)));
        Self::new(layers)
    }

    #[must_use]
    pub fn ob_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim
    }

    fn forward(&self, x: &Tensor) -> Tensor {
        let last = self.layers.len() - 1;
        let mut out = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            out = layer.forward(&out);
            if i < last {
                out = nn::tanh(&out);
            }
        }
        out
    }
}

impl DynamicsModel for DeltaNetwork {
    fn predict(&self, obs: &Tensor, acs: &Tensor, stats: &DataStatistics) -> Tensor {
        let obs_norm = normalize(obs, &stats.obs_mean, &stats.obs_std);
        let acs_norm = normalize(acs, &stats.acs_mean, &stats.acs_std);

        let n = obs.rows();
        let width = obs.cols() + acs.cols();
        let mut input = Vec::with_capacity(n * width);
        for i in 0..n {
            input.extend_from_slice(obs_norm.row(i));
            input.extend_from_slice(acs_norm.row(i));
        }
        let input = Tensor::from_vec(vec![n, width], input);

        let delta_norm = self.forward(&input);
        let delta = unnormalize(&delta_norm, &stats.delta_mean, &stats.delta_std);
        let next: Vec<f32> = obs.data.iter().zip(&delta.data).map(|(o, d)| o + d).collect();
        Tensor::from_vec(obs.shape.clone(), next)
    }
}
