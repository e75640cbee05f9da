#![allow(dead_code)]

use ml::{DataStatistics, DynamicsModel, RewardOracle, Tensor};
use mpc::{Aggregator, SequenceSampler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn unit_stats(ob_dim: usize, ac_dim: usize) -> DataStatistics {
    DataStatistics::new(
        vec![0.0; ob_dim],
        vec![1.0; ob_dim],
        vec![0.0; ac_dim],
        vec![1.0; ac_dim],
        vec![0.0; ob_dim],
        vec![1.0; ob_dim],
    )
    .unwrap()
}

/// Returns the observation batch unchanged and counts its calls.
#[derive(Default)]
pub struct Identity {
    pub calls: Arc<AtomicUsize>,
}

impl DynamicsModel for Identity {
    fn predict(&self, obs: &Tensor, _acs: &Tensor, _stats: &DataStatistics) -> Tensor {
        self.calls.fetch_add(1, Ordering::SeqCst);
        obs.clone()
    }
}

/// Same reward for every candidate.
#[derive(Default)]
pub struct Constant {
    pub value: f32,
    pub calls: Arc<AtomicUsize>,
}

impl RewardOracle for Constant {
    fn get_reward(&self, obs: &Tensor, _acs: &Tensor) -> (Vec<f32>, Vec<bool>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (vec![self.value; obs.rows()], vec![false; obs.rows()])
    }
}

/// Negative L2 norm of each action.
pub struct NegActionNorm;

impl RewardOracle for NegActionNorm {
    fn get_reward(&self, _obs: &Tensor, acs: &Tensor) -> (Vec<f32>, Vec<bool>) {
        (0..acs.rows())
            .map(|i| (-action_norm(acs.row(i)), false))
            .unzip()
    }
}

pub fn action_norm(a: &[f32]) -> f32 {
    a.iter().map(|v| v * v).sum::<f32>().sqrt()
}

/// Drops the last row of its prediction.
pub struct Truncating;

impl DynamicsModel for Truncating {
    fn predict(&self, obs: &Tensor, _acs: &Tensor, _stats: &DataStatistics) -> Tensor {
        let rows = obs.rows() - 1;
        Tensor::from_vec(vec![rows, obs.cols()], obs.data[..rows * obs.cols()].to_vec())
    }
}

/// Predicts NaN after the first step.
pub struct Diverging;

impl DynamicsModel for Diverging {
    fn predict(&self, obs: &Tensor, _acs: &Tensor, _stats: &DataStatistics) -> Tensor {
        Tensor::from_vec(obs.shape.clone(), vec![f32::NAN; obs.len()])
    }
}

/// Candidate `i` repeats the action `offset + step * i` in every dimension
/// and at every timestep.
pub struct Ladder {
    pub ac_dim: usize,
    pub offset: f32,
    pub step: f32,
}

impl SequenceSampler for Ladder {
    fn sample(&mut self, num_sequences: usize, horizon: usize) -> Tensor {
        let mut data = Vec::with_capacity(num_sequences * horizon * self.ac_dim);
        for i in 0..num_sequences {
            let value = self.offset + self.step * i as f32;
            data.extend(std::iter::repeat(value).take(horizon * self.ac_dim));
        }
        Tensor::from_vec(vec![num_sequences, horizon, self.ac_dim], data)
    }
}

/// Scores candidates by their index, so the last one always wins.
pub struct LastWins;

impl Aggregator for LastWins {
    fn aggregate(&self, per_model: &[Vec<f32>]) -> Vec<f32> {
        (0..per_model[0].len()).map(|i| i as f32).collect()
    }
}

/// Returns one score regardless of the population size.
pub struct SingleScore;

impl Aggregator for SingleScore {
    fn aggregate(&self, _per_model: &[Vec<f32>]) -> Vec<f32> {
        vec![0.0]
    }
}
