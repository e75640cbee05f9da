use ml::{ActionSpace, Tensor};
use rand::{distributions::Uniform, rngs::StdRng, Rng, SeedableRng};

/// Source of candidate action sequences.
pub trait SequenceSampler: Send {
    /// Returns a `[num_sequences, horizon, ac_dim]` tensor.
    fn sample(&mut self, num_sequences: usize, horizon: usize) -> Tensor;
}

/// Draws every action element independently from `U[low_d, high_d]`.
pub struct UniformSampler {
    dists: Vec<Uniform<f32>>,
    rng: StdRng,
}

impl UniformSampler {
    #[must_use]
    pub fn new(space: &ActionSpace, rng: StdRng) -> Self {
        let dists = space
            .low()
            .iter()
            .zip(space.high())
            .map(|(&l, &h)| Uniform::new_inclusive(l, h))
            .collect();
        Self { dists, rng }
    }

    #[must_use]
    pub fn seeded(space: &ActionSpace, seed: u64) -> Self {
        Self::new(space, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_entropy(space: &ActionSpace) -> Self {
        Self::new(space, StdRng::from_entropy())
    }
}

impl SequenceSampler for UniformSampler {
    fn sample(&mut self, num_sequences: usize, horizon: usize) -> Tensor {
        let ac_dim = self.dists.len();
        let mut data = Vec::with_capacity(num_sequences * horizon * ac_dim);
        for _ in 0..num_sequences * horizon {
            for dist in &self.dists {
                data.push(self.rng.sample(dist));
            }
        }
        Tensor::from_vec(vec![num_sequences, horizon, ac_dim], data)
    }
}
