//! Error types for Larder.

use thiserror::Error;

/// Top-level error type for Larder operations outside the cooking engine.
///
/// The engine itself reports absence through sentinel values; this type
/// covers loading data and configuration at the edges.
#[derive(Debug, Error)]
pub enum LarderError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data file parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Container mutation errors
    #[error("Container error: {0}")]
    Container(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Larder operations.
pub type LarderResult<T> = Result<T, LarderError>;
