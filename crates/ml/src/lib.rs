#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

//! Collaborators of the planner: batched tensors, normalization statistics,
//! dynamics models, reward oracles and a small point-mass environment.

pub mod dynamics;
pub mod env;
pub mod error;
pub mod nn;
pub mod point_mass;
pub mod stats;
pub mod tensor;

pub use dynamics::{DeltaNetwork, DynamicsModel};
pub use env::{ActionSpace, Env, RewardOracle};
pub use error::MlError;
pub use nn::Dense;
pub use point_mass::{PointMassConfig, PointMassEnv, PointMassModel};
pub use stats::{DataStatistics, StatisticsHandle};
pub use tensor::Tensor;
