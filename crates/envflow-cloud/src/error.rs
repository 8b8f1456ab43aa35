//! Reconciliation error types

use crate::client::{ApiError, RemoteOperation};
use thiserror::Error;

/// Reconciliation errors
///
/// Every error is scoped to the single environment being reconciled.
/// Nothing here is retried.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{operation} failed for {target}: {source}")]
    RemoteCallFailed {
        operation: RemoteOperation,
        target: String,
        #[source]
        source: ApiError,
    },

    #[error("Environment not found: {0}")]
    NotFound(String),

    #[error("Tag conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Provider returned {count} environments for ID {id}")]
    AmbiguousRecord { id: String, count: usize },

    #[error("Environment {name} has no {field}; read it before updating")]
    MissingIdentity { field: &'static str, name: String },

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub(crate) fn remote(
        operation: RemoteOperation,
        target: impl Into<String>,
        source: ApiError,
    ) -> Self {
        CloudError::RemoteCallFailed {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Whether the provider could not locate the environment
    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
