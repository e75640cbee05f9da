use std::fmt;
use thiserror::Error;

/// Party whose output broke the planner's shape or finiteness contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Caller,
    Sampler,
    RewardOracle,
    DynamicsModel(usize),
    Aggregator,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Caller => write!(f, "caller"),
            Collaborator::Sampler => write!(f, "sequence sampler"),
            Collaborator::RewardOracle => write!(f, "reward oracle"),
            Collaborator::DynamicsModel(i) => write!(f, "dynamics model {i}"),
            Collaborator::Aggregator => write!(f, "reward aggregator"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MpcError {
    #[error("invalid planner configuration: {0}")]
    Configuration(String),
    #[error("{collaborator} violated its contract at step {step}: {detail}")]
    ContractViolation {
        collaborator: Collaborator,
        step: usize,
        detail: String,
    },
}

