//! Errors in the library.
use thiserror::Error;

/// Errors raised by estimators, buffers, records and agents.
#[derive(Debug, Error)]
pub enum CritiqueError {
    /// Two arrays that must be aligned have different lengths.
    #[error("shape mismatch in {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// What was being compared.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// The requested algorithmic branch is not available.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A buffer was asked for more samples than it holds.
    #[error("requested {requested} samples, but only {available} are available")]
    InsufficientSamples {
        /// Number of requested samples.
        requested: usize,
        /// Number of samples that can be drawn.
        available: usize,
    },

    /// A stored frame has no action, reward and done flag yet.
    #[error("the effect of the frame at index {0} has not been stored")]
    MissingEffect(usize),

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

/// Returns [`CritiqueError::ShapeMismatch`] unless `actual == expected`.
pub fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), CritiqueError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CritiqueError::ShapeMismatch {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}
