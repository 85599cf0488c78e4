//! Error types for Gala

use thiserror::Error;

/// Errors raised while converting between registration shapes
#[derive(Error, Debug)]
pub enum CommonError {
    /// A field the record cannot exist without is empty
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value has the wrong shape for its field
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Serde conversion failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Gala common operations
pub type CommonResult<T> = Result<T, CommonError>;
