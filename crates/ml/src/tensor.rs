/// Dense row-major `f32` tensor.
///
/// Batches are two-dimensional (`[rows, cols]`); candidate action sequences
/// are three-dimensional (`[num_sequences, horizon, ac_dim]`).
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// # Panics
    ///
    /// Panics if the element count implied by `shape` differs from `data.len()`.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    /// Replicates `row` into an `[n, row.len()]` batch.
    #[must_use]
    pub fn tile(row: &[f32], n: usize) -> Self {
        let mut data = Vec::with_capacity(row.len() * n);
        for _ in 0..n {
            data.extend_from_slice(row);
        }
        Self { data, shape: vec![n, row.len()] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the leading dimension.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Number of elements in one row (product of the trailing dimensions).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let cols = self.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        let cols = self.cols();
        &mut self.data[i * cols..(i + 1) * cols]
    }

    #[must_use]
    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_replicates_rows() {
        let t = Tensor::tile(&[1.0, 2.0], 3);
        assert_eq!(t.shape, vec![3, 2]);
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        for i in 0..3 {
            assert_eq!(t.row(i), &[1.0, 2.0]);
        }
    }

    #[test]
    fn cols_spans_trailing_dimensions() {
        let t = Tensor::zeros(vec![4, 3, 2]);
        assert_eq!(t.rows(), 4);
        assert_eq!(t.cols(), 6);
        assert_eq!(t.row(3).len(), 6);
    }

    #[test]
    #[should_panic]
    fn from_vec_rejects_wrong_length() {
        let _ = Tensor::from_vec(vec![2, 2], vec![0.0; 3]);
    }

    #[test]
    fn all_finite_detects_nan() {
        let mut t = Tensor::zeros(vec![2]);
        assert!(t.all_finite());
        t.data[1] = f32::NAN;
        assert!(!t.all_finite());
    }
}
