//! Error types for dream-runner.
//!
//! Every failure surfaces as a typed variant with a stable code, so callers
//! can decide whether to propagate or remediate instead of discovering a
//! missing result three statements later.

use thiserror::Error;

/// Result type alias for dream-runner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// dream-runner error types.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Portal error: {0}")]
    Portal(String),

    #[error("Runner error: {0}")]
    Runner(String),

    #[error("CWL error: {0}")]
    Cwl(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the stable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Auth(_) => "AUTH_ERROR",
            Error::Portal(_) => "PORTAL_ERROR",
            Error::Runner(_) => "RUNNER_ERROR",
            Error::Cwl(_) => "CWL_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
