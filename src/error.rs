//! Error taxonomy shared by the whole suite.

use thiserror::Error;

use crate::context::ResourceKind;

/// Errors surfaced by the suite's fixtures, clients and helpers.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Config file not found for environment: {0}")]
    ConfigNotFound(String),

    #[error("Config not loaded")]
    ConfigNotLoaded,

    #[error("Invalid config file for environment {environment}: {source}")]
    ConfigParse {
        environment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation}: expected {expected}, got status {status} with body {body}")]
    AssertionMismatch {
        operation: String,
        expected: String,
        status: u16,
        body: String,
    },

    #[error("Cleanup failed for {kind} {id}: {reason}")]
    CleanupFailure {
        id: String,
        kind: ResourceKind,
        reason: String,
    },

    #[error("{method} {path} exceeded the {timeout_ms}ms timeout")]
    TimeoutExceeded {
        method: String,
        path: String,
        timeout_ms: u64,
    },

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SuiteError {
    /// Builds an [`SuiteError::AssertionMismatch`] from its parts.
    pub fn mismatch(
        operation: impl Into<String>,
        expected: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::AssertionMismatch {
            operation: operation.into(),
            expected: expected.into(),
            status,
            body: body.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SuiteError>;
