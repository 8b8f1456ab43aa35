//! Remote API client boundary
//!
//! Provider clients (Cloud9, test doubles) implement [`EnvironmentApi`].
//! The wire types below mirror the field layout the provider expects and
//! returns; the state mapper converts between them and
//! [`crate::EnvironmentRecord`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Remote environment API
///
/// Every method performs exactly one remote call. Implementations wrap
/// their own transport errors into [`ApiError`].
#[async_trait]
pub trait EnvironmentApi: Send + Sync {
    /// Create an SSH environment and return its provider-assigned ID
    async fn create_environment(&self, request: &CreateEnvironmentRequest) -> ApiResult<String>;

    /// List environments matching an ID (zero or one expected)
    async fn list_environments_by_id(&self, id: &str) -> ApiResult<Vec<RemoteEnvironment>>;

    /// Update scalar fields. `None` fields are left unchanged by the provider.
    async fn update_environment(&self, request: &UpdateEnvironmentRequest) -> ApiResult<()>;

    /// Attach or overwrite tags on a resource
    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> ApiResult<()>;

    /// Remove tags by key from a resource
    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()>;

    /// Delete an environment
    async fn delete_environment(&self, id: &str) -> ApiResult<()>;
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Error returned by a remote API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Provider error code (e.g. "NotFoundException")
    pub code: Option<String>,

    /// Human readable message
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Remote operations, used to label failures and step logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOperation {
    CreateEnvironment,
    ListEnvironments,
    UpdateEnvironment,
    TagResource,
    UntagResource,
    DeleteEnvironment,
}

impl std::fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteOperation::CreateEnvironment => write!(f, "CreateEnvironment"),
            RemoteOperation::ListEnvironments => write!(f, "ListEnvironments"),
            RemoteOperation::UpdateEnvironment => write!(f, "UpdateEnvironment"),
            RemoteOperation::TagResource => write!(f, "TagResource"),
            RemoteOperation::UntagResource => write!(f, "UntagResource"),
            RemoteOperation::DeleteEnvironment => write!(f, "DeleteEnvironment"),
        }
    }
}

/// Provider tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Create request for an SSH environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnvironmentRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub login_name: String,
    pub hostname: String,
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion_host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_path: Option<String>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Scalar update request. `None` means "no change", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnvironmentRequest {
    pub environment_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion_host: Option<String>,
}

/// Environment as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEnvironment {
    pub environment_id: String,

    #[serde(default)]
    pub arn: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub login_name: String,
    pub hostname: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub environment_path: Option<String>,

    #[serde(default)]
    pub node_path: Option<String>,

    #[serde(default)]
    pub bastion_host: Option<String>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::with_code("NotFoundException", "no such environment");
        assert_eq!(err.to_string(), "NotFoundException: no such environment");

        let err = ApiError::new("connection reset");
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let request = UpdateEnvironmentRequest {
            environment_id: "env-1".to_string(),
            name: Some("dev1".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"environmentId": "env-1", "name": "dev1"})
        );
    }

    #[test]
    fn test_tag_wire_shape() {
        let json = serde_json::to_value(Tag::new("env", "prod")).unwrap();
        assert_eq!(json, serde_json::json!({"Key": "env", "Value": "prod"}));
    }
}
