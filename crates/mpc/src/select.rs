use crate::rollout::ActionSequences;
use ml::Tensor;

/// Index of the largest score; the lowest index wins ties.
///
/// Returns `0` for an empty slice.
#[must_use]
pub fn argmax_first(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

/// First action of the best-scoring candidate, as a `[1, ac_dim]` batch.
#[must_use]
pub fn select_first_action(scores: &[f32], seqs: &ActionSequences<'_>) -> (usize, Tensor) {
    let best = argmax_first(scores);
    let action = seqs.first_action(best).to_vec();
    (best, Tensor::from_vec(vec![1, action.len()], action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_maximum() {
        assert_eq!(argmax_first(&[0.0, 3.0, -1.0, 2.0]), 1);
        assert_eq!(argmax_first(&[5.0]), 0);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        assert_eq!(argmax_first(&[1.0, 4.0, 4.0, 4.0]), 1);
        assert_eq!(argmax_first(&[2.0, 2.0]), 0);
    }

    #[test]
    fn returns_first_timestep_of_winner() {
        // 3 sequences, horizon 2, ac_dim 2
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let tensor = Tensor::from_vec(vec![3, 2, 2], data);
        let seqs = ActionSequences::new(&tensor);
        let (idx, action) = select_first_action(&[0.0, 1.0, 0.5], &seqs);
        assert_eq!(idx, 1);
        assert_eq!(action.shape, vec![1, 2]);
        assert_eq!(action.data, vec![4.0, 5.0]);
    }
}
