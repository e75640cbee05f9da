use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MlError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("invalid action bounds: {0}")]
    InvalidBounds(String),
    #[error("cannot compute statistics from an empty batch")]
    EmptyBatch,
}
