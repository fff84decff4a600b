// Error types for the benchmark harness
//
// Only fatal conditions live here. Per-request transport and protocol failures
// are recorded inside RequestResult, and a failed metrics fetch becomes a
// placeholder in the report.

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Fatal errors that abort a benchmark run before a report is written
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid request count, unusable base URL, missing key file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The external signing tool is missing or not functional
    #[error("Signing tool unavailable: {0}")]
    SigningUnavailable(String),

    /// The external signing tool ran and reported an error
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Report could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report or packet could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTML report template failed to render
    #[error("Report rendering error: {0}")]
    Render(#[from] minijinja::Error),
}

impl BenchError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        BenchError::Configuration(msg.into())
    }

    /// Create a signing-unavailable error
    pub fn signing_unavailable(msg: impl Into<String>) -> Self {
        BenchError::SigningUnavailable(msg.into())
    }

    /// Create a signing-failed error
    pub fn signing_failed(msg: impl Into<String>) -> Self {
        BenchError::SigningFailed(msg.into())
    }

    /// Whether the error was raised before any network activity could start
    pub fn is_configuration(&self) -> bool {
        matches!(self, BenchError::Configuration(_))
    }
}
