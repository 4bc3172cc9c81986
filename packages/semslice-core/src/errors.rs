//! Error types for semslice-core
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

/// Main error type for slicing operations
#[derive(Debug, Error)]
pub enum SemsliceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (translation unit could not be parsed)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Reconstruction error
    #[error("Reconstruction error: {0}")]
    Reconstruct(String),
}

impl SemsliceError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        SemsliceError::Parse(msg.into())
    }

    /// Create an analysis error
    pub fn analysis(msg: impl Into<String>) -> Self {
        SemsliceError::Analysis(msg.into())
    }

    /// Create a reconstruction error
    pub fn reconstruct(msg: impl Into<String>) -> Self {
        SemsliceError::Reconstruct(msg.into())
    }
}

/// Result type alias for semslice operations
pub type Result<T> = std::result::Result<T, SemsliceError>;
