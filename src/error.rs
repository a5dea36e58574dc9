//! Error types for conversion operations

use thiserror::Error;

/// Errors that can occur during HTML to plaintext conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Character encoding error
    #[error("Encoding error: {0}")]
    EncodingError(String),
    /// Conversion timeout exceeded
    #[error("Conversion timeout exceeded")]
    Timeout,
    /// Input larger than the configured limit
    #[error("Input too large: {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },
    /// Invalid input data or options
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Quoted-block recursion went deeper than allowed
    #[error("Quote nesting depth {depth} exceeds maximum allowed depth {limit}")]
    NestingTooDeep { depth: usize, limit: usize },
    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ConversionError {
    /// Get numeric error code for embedding hosts
    pub fn code(&self) -> u32 {
        match self {
            ConversionError::EncodingError(_) => 2,
            ConversionError::Timeout => 3,
            ConversionError::InputTooLarge { .. } => 4,
            ConversionError::InvalidInput(_) => 5,
            ConversionError::NestingTooDeep { .. } => 6,
            ConversionError::InternalError(_) => 99,
        }
    }
}
