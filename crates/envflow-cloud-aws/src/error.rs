//! Cloud9 client error types

use envflow_cloud::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Cloud9Error {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cloud9 API error ({code}): {message}")]
    Api { code: String, message: String },

    #[error("Unexpected response (HTTP {status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<Cloud9Error> for ApiError {
    fn from(err: Cloud9Error) -> Self {
        match err {
            Cloud9Error::Api { code, message } => ApiError::with_code(code, message),
            other => ApiError::new(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Cloud9Error>;
