use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Missing required feature '{feature}'")]
    MissingFeature { feature: String },

    #[error("Unknown {field} value '{value}'")]
    UnknownCategory { field: String, value: String },

    #[error("Record invariant violated: {reason}")]
    InvariantViolation { reason: String },

    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation { reason: reason.into() }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;
