use crate::{
    dynamics::DynamicsModel,
    env::{ActionSpace, Env, RewardOracle},
    error::MlError,
    stats::DataStatistics,
    tensor::Tensor,
};
use serde::{Deserialize, Serialize};

/// Parameters of the one-dimensional point mass task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointMassConfig {
    pub target: f32,
    pub mass: f32,
    pub dt: f32,
    pub damping: f32,
    pub max_force: f32,
    /// Episode terminates once `|x - target|` exceeds this distance.
    pub bound: f32,
}

impl Default for PointMassConfig {
    fn default() -> Self {
        Self { target: 1.0, mass: 1.0, dt: 0.1, damping: 0.1, max_force: 1.0, bound: 10.0 }
    }
}

/// Semi-implicit Euler step shared by the environment and the analytic model.
fn integrate(pos: f32, vel: f32, force: f32, mass: f32, cfg: &PointMassConfig) -> (f32, f32) {
    let accel = force / mass - cfg.damping * vel;
    let vel = vel + accel * cfg.dt;
    (pos + vel * cfg.dt, vel)
}

fn reward(cfg: &PointMassConfig, pos: f32, vel: f32, force: f32) -> (f32, bool) {
    let err = pos - cfg.target;
    let r = -err * err - 0.1 * vel * vel - 0.001 * force * force;
    (r, err.abs() > cfg.bound)
}

/// Agent pushes a unit point mass along a line towards `target`.
///
/// Observation is `[position, velocity]`, action is `[force]`.
pub struct PointMassEnv {
    cfg: PointMassConfig,
    space: ActionSpace,
    pos: f32,
    vel: f32,
}

impl PointMassEnv {
    /// # Errors
    ///
    /// Returns [`MlError::InvalidBounds`] if `mass`, `dt` or `max_force` is
    /// not positive.
    pub fn new(cfg: PointMassConfig) -> Result<Self, MlError> {
        if !(cfg.mass > 0.0 && cfg.dt > 0.0) {
            return Err(MlError::InvalidBounds(format!(
                "mass {} and dt {} must be positive",
                cfg.mass, cfg.dt
            )));
        }
        if !(cfg.max_force > 0.0) {
            return Err(MlError::InvalidBounds(format!("max_force {} must be positive", cfg.max_force)));
        }
        let space = ActionSpace::symmetric(cfg.max_force, 1)?;
        Ok(Self { cfg, space, pos: 0.0, vel: 0.0 })
    }

    #[must_use]
    pub fn distance_to_target(&self) -> f32 {
        (self.pos - self.cfg.target).abs()
    }
}

impl Env for PointMassEnv {
    fn step(&mut self, action: &[f32]) -> (Vec<f32>, f32, bool) {
        let force = action[0].clamp(-self.cfg.max_force, self.cfg.max_force);
        let (r, _) = reward(&self.cfg, self.pos, self.vel, force);
        let (pos, vel) = integrate(self.pos, self.vel, force, self.cfg.mass, &self.cfg);
        self.pos = pos;
        self.vel = vel;
        let done = (self.pos - self.cfg.target).abs() > self.cfg.bound;
        (vec![self.pos, self.vel], r, done)
    }

    fn reset(&mut self) -> Vec<f32> {
        self.pos = 0.0;
        self.vel = 0.0;
        vec![self.pos, self.vel]
    }

    fn obs_size(&self) -> usize {
        2
    }

    fn action_space(&self) -> ActionSpace {
        self.space.clone()
    }
}

impl RewardOracle for PointMassEnv {
    fn get_reward(&self, obs: &Tensor, acs: &Tensor) -> (Vec<f32>, Vec<bool>) {
        (0..obs.rows())
            .map(|i| {
                let o = obs.row(i);
                reward(&self.cfg, o[0], o[1], acs.row(i)[0])
            })
            .unzip()
    }
}

/// Analytic point mass dynamics with its own belief about the mass.
///
/// A set of these with perturbed masses stands in for a trained ensemble.
/// Ignores normalization statistics.
#[derive(Clone, Debug)]
pub struct PointMassModel {
    cfg: PointMassConfig,
    mass: f32,
}

impl PointMassModel {
    /// # Errors
    ///
    /// Returns [`MlError::InvalidBounds`] if `mass` is not a positive finite number.
    pub fn new(cfg: PointMassConfig, mass: f32) -> Result<Self, MlError> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(MlError::InvalidBounds(format!("model mass {mass} must be positive")));
        }
        Ok(Self { cfg, mass })
    }
}

impl DynamicsModel for PointMassModel {
    fn predict(&self, obs: &Tensor, acs: &Tensor, _stats: &DataStatistics) -> Tensor {
        let mut next = obs.clone();
        for i in 0..obs.rows() {
            let force = acs.row(i)[0];
            let row = next.row_mut(i);
            let (pos, vel) = integrate(row[0], row[1], force, self.mass, &self.cfg);
            row[0] = pos;
            row[1] = vel;
        }
        next
    }
}
