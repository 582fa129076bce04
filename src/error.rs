use thiserror::Error;

/// Errors raised while configuring or evaluating a loss.
///
/// Every variant describes a usage error; none of them is recoverable by
/// retrying the same call.
#[derive(Debug, Error)]
pub enum LossError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: String,
        got: String,
    },

    #[error("Target {value} at row {row} is out of range for {num_classes} classes")]
    TargetOutOfRange {
        row: usize,
        value: usize,
        num_classes: usize,
    },

    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for loss operations
pub type Result<T> = std::result::Result<T, LossError>;
