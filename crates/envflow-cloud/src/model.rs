//! Canonical environment record
//!
//! The provider-agnostic representation of an SSH environment, used both
//! for the desired configuration and for the observed state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Port used when the desired record leaves `port` unset.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Tag mapping. Keys are unique; iteration order is by key.
pub type Tags = BTreeMap<String, String>;

/// Desired or observed configuration of one SSH environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentRecord {
    /// Provider-assigned environment ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Provider-assigned ARN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    /// Environment name
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Login user on the remote host
    pub login_name: String,

    /// Remote host name or address
    pub hostname: String,

    /// SSH port (22 when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Working directory of the environment on the remote host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_path: Option<String>,

    /// Path to node.js on the remote host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,

    /// SSH URL of a bastion host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bastion_url: Option<String>,

    /// User-defined tags
    #[serde(default)]
    pub tags: Tags,
}

impl EnvironmentRecord {
    /// Create a desired record with the required fields set
    pub fn new(
        name: impl Into<String>,
        login_name: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            login_name: login_name.into(),
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Port to send to the provider. A zero port counts as unset.
    pub fn effective_port(&self) -> u16 {
        match self.port {
            Some(port) if port != 0 => port,
            _ => DEFAULT_SSH_PORT,
        }
    }

    /// Whether the provider has assigned an identity to this record
    pub fn is_created(&self) -> bool {
        self.id.is_some()
    }
}
