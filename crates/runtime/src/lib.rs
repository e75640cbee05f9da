#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]

//! # MPC Runtime
//!
//! Drives the point-mass environment with the random-shooting planner.
//! The loop starts without normalization statistics, so the planner acts
//! randomly while transitions are recorded. Once the warm-up phase ends the
//! statistics are computed from those transitions and published, and every
//! later action is planned through the dynamics-model ensemble.

pub mod app;
pub mod config;

pub use app::{build_ensemble, run, RunSummary};
pub use config::{EnsembleConfig, RuntimeConfig};
