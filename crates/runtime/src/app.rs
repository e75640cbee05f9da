//! # Control Loop
//!
//! [`run`] owns one point-mass episode: it builds the ensemble and the
//! planner, steps the environment with the planner's actions and reports a
//! [`RunSummary`].

use crate::config::RuntimeConfig;
use anyhow::{bail, Context, Result};
use ml::{DataStatistics, DynamicsModel, Env, PointMassEnv, PointMassModel, StatisticsHandle, Tensor};
use mpc::MpcPolicy;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub episodes: usize,
    pub warmup_reward: f32,
    pub planned_reward: f32,
    pub initial_distance: f32,
    pub final_distance: f32,
}

/// Analytic models whose believed masses are spread around the true mass.
///
/// # Errors
///
/// Returns an error for an empty ensemble or a non-positive mass.
pub fn build_ensemble(cfg: &RuntimeConfig) -> Result<Arc<[Box<dyn DynamicsModel>]>> {
    if cfg.ensemble.size == 0 {
        bail!("ensemble size must be at least 1");
    }
    let mut models: Vec<Box<dyn DynamicsModel>> = Vec::with_capacity(cfg.ensemble.size);
    for mass in cfg.ensemble.masses(cfg.env.mass) {
        models.push(Box::new(PointMassModel::new(cfg.env.clone(), mass)?));
    }
    Ok(models.into())
}

/// Recorded warm-up transitions, flattened row-major.
#[derive(Default)]
struct Transitions {
    obs: Vec<f32>,
    acs: Vec<f32>,
    next_obs: Vec<f32>,
    rows: usize,
}

impl Transitions {
    fn push(&mut self, obs: &[f32], action: &[f32], next_obs: &[f32]) {
        self.obs.extend_from_slice(obs);
        self.acs.extend_from_slice(action);
        self.next_obs.extend_from_slice(next_obs);
        self.rows += 1;
    }

    fn statistics(&self, ob_dim: usize, ac_dim: usize) -> Result<DataStatistics> {
        let obs = Tensor::from_vec(vec![self.rows, ob_dim], self.obs.clone());
        let acs = Tensor::from_vec(vec![self.rows, ac_dim], self.acs.clone());
        let next = Tensor::from_vec(vec![self.rows, ob_dim], self.next_obs.clone());
        Ok(DataStatistics::from_transitions(&obs, &acs, &next)?)
    }
}

/// Runs one control loop described by `cfg`.
///
/// # Errors
///
/// Returns an error for invalid configuration or if the planner reports a
/// contract violation.
pub fn run(cfg: &RuntimeConfig) -> Result<RunSummary> {
    if cfg.warmup_steps == 0 {
        bail!("warmup_steps must be at least 1 to compute normalization statistics");
    }

    let mut env = PointMassEnv::new(cfg.env.clone()).context("building environment")?;
    let oracle = Arc::new(PointMassEnv::new(cfg.env.clone())?);
    let ensemble = build_ensemble(cfg)?;
    let statistics = StatisticsHandle::new();
    let ob_dim = env.obs_size();
    let ac_dim = cfg.mpc.ac_dim;

    let mut policy = MpcPolicy::new(
        cfg.mpc.clone(),
        env.action_space(),
        ob_dim,
        ensemble,
        oracle,
        statistics.clone(),
    )
    .context("building planner")?;

    tracing::info!(
        horizon = cfg.mpc.horizon,
        num_sequences = cfg.mpc.num_sequences,
        ensemble = policy.ensemble_size(),
        "Starting control loop for {} steps ({} warm-up)...",
        cfg.episode_steps,
        cfg.warmup_steps
    );

    let mut obs = env.reset();
    let initial_distance = env.distance_to_target();
    let mut transitions = Transitions::default();
    let mut warmup_reward = 0.0;
    let mut planned_reward = 0.0;
    let mut episodes = 1;

    for step in 0..cfg.episode_steps {
        if step == cfg.warmup_steps {
            let stats = transitions.statistics(ob_dim, ac_dim)?;
            tracing::info!(rows = transitions.rows, "Publishing normalization statistics.");
            statistics.publish(stats);
        }

        let action = policy
            .get_action(&obs)
            .with_context(|| format!("planning step {step}"))?;
        let (next, reward, done) = env.step(&action.data);

        if step < cfg.warmup_steps {
            transitions.push(&obs, &action.data, &next);
            warmup_reward += reward;
        } else {
            planned_reward += reward;
        }

        if (step + 1) % 50 == 0 {
            tracing::info!(
                "Control step {} complete. Position: {:.3}, distance to target: {:.3}",
                step + 1,
                next[0],
                env.distance_to_target()
            );
        }

        if done {
            tracing::warn!("Episode terminated at step {}, resetting.", step + 1);
            obs = env.reset();
            episodes += 1;
        } else {
            obs = next;
        }
    }

    let summary = RunSummary {
        steps: cfg.episode_steps,
        episodes,
        warmup_reward,
        planned_reward,
        initial_distance,
        final_distance: env.distance_to_target(),
    };
    tracing::info!("Control loop finished: {:?}", summary);
    Ok(summary)
}
