use crate::tensor::Tensor;

/// A fully connected layer.
#[derive(Clone, Debug)]
pub struct Dense {
    /// Weight matrix, `[out_dim, in_dim]`.
    pub w: Tensor,
    /// Bias vector, `[out_dim]`.
    pub b: Tensor,
    pub in_dim: usize,
    pub out_dim: usize,
}

impl Dense {
    /// Creates a new `Dense` layer with the given weights and biases.
    ///
    /// # Panics
    ///
    /// Panics if `weights.len() != in_d * out_d` or `bias.len() != out_d`.
    #[must_use]
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_d: usize, out_d: usize) -> Self {
        assert_eq!(weights.len(), in_d * out_d);
        assert_eq!(bias.len(), out_d);
        Self {
            w: Tensor::from_vec(vec![out_d, in_d], weights),
            b: Tensor::from_vec(vec![out_d], bias),
            in_dim: in_d,
            out_dim: out_d,
        }
    }

    /// Glorot-uniform weights, zero bias.
    #[must_use]
    pub fn random(in_d: usize, out_d: usize, seed: u64) -> Self {
        let rng = fastrand::Rng::with_seed(seed);
        let limit = (6.0 / (in_d + out_d) as f32).sqrt();
        let weights = (0..in_d * out_d)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        let bias = vec![0.0; out_d];
        Self::new(weights, bias, in_d, out_d)
    }

    /// Applies the layer to every row of an `[n, in_dim]` batch.
    ///
    /// # Panics
    ///
    /// Panics if the batch width is not `in_dim`.
    #[must_use]
    pub fn forward(&self, x: &Tensor) -> Tensor {
        assert_eq!(x.cols(), self.in_dim, "dense input width");
        let n = x.rows();
        let mut y = vec![0f32; n * self.out_dim];
        for r in 0..n {
            let input = x.row(r);
            for o in 0..self.out_dim {
                let weights = &self.w.data[o * self.in_dim..(o + 1) * self.in_dim];
                let sum: f32 = weights.iter().zip(input).map(|(w, v)| w * v).sum();
                y[r * self.out_dim + o] = sum + self.b.data[o];
            }
        }
        Tensor::from_vec(vec![n, self.out_dim], y)
    }
}

#[must_use]
pub fn tanh(x: &Tensor) -> Tensor {
    Tensor::from_vec(x.shape.clone(), x.data.iter().map(|v| v.tanh()).collect())
}
