#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

//! Random-shooting model-predictive control.
//!
//! [`MpcPolicy::get_action`] samples candidate action sequences uniformly
//! inside the action box, rolls every candidate through each member of a
//! dynamics-model ensemble, scores the rollouts with the environment's
//! reward oracle, aggregates the per-model returns and executes the first
//! action of the best candidate.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod policy;
pub mod rollout;
pub mod sampler;
pub mod select;

pub use aggregate::{Aggregator, MeanAggregator, MinAggregator, UcbAggregator};
pub use config::{AggregationKind, MpcConfig};
pub use error::{Collaborator, MpcError};
pub use policy::MpcPolicy;
pub use rollout::ActionSequences;
pub use sampler::{SequenceSampler, UniformSampler};
