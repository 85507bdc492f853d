//! Error types for each tleap boundary.
//!
//! `ProviderError` lives here rather than in `tleap-providers` so the
//! generator and the CLI can classify model-service failures without string
//! matching.

use std::path::PathBuf;

use thiserror::Error;

/// A failed call to the model service.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP 429; `retry_after_ms` comes from the `retry-after` header.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The hosted service rejected the API key.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The model is not pulled (Ollama) or not offered (hosted).
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Any other HTTP error, or a body that could not be parsed (status 0).
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Connection refused, DNS failure and similar transport errors.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Failures loading or saving the question history file.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read question history {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a JSON array of strings.
    #[error("question history {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write question history {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures appending to or reading the analysis CSV.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("analysis file {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("score {score} exceeds total {total}")]
    InvalidScore { score: u32, total: u32 },
}

/// Failures from a single question generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model service call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    History(#[from] HistoryError),
}
