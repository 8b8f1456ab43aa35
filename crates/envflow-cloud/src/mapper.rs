//! State mapper
//!
//! Translates between [`EnvironmentRecord`] and the provider's wire types.

use crate::client::{CreateEnvironmentRequest, RemoteEnvironment, Tag, UpdateEnvironmentRequest};
use crate::error::{CloudError, Result};
use crate::model::{DEFAULT_SSH_PORT, EnvironmentRecord, Tags};

const MAX_TAG_KEY_LEN: usize = 128;
const MAX_TAG_VALUE_LEN: usize = 256;
const RESERVED_TAG_PREFIX: &str = "aws:";

/// Build the create request for a desired record
pub fn to_wire_create(desired: &EnvironmentRecord) -> Result<CreateEnvironmentRequest> {
    Ok(CreateEnvironmentRequest {
        name: desired.name.clone(),
        description: desired.description.clone(),
        login_name: desired.login_name.clone(),
        hostname: desired.hostname.clone(),
        port: desired.effective_port(),
        bastion_host: desired.bastion_url.clone(),
        node_path: desired.node_path.clone(),
        environment_path: desired.environment_path.clone(),
        tags: tags_to_wire(&desired.tags)?,
    })
}

/// Build the scalar update request for `environment_id`
///
/// Fields the desired record leaves unset stay `None` so the provider keeps
/// its current value.
pub fn to_wire_update(
    environment_id: &str,
    desired: &EnvironmentRecord,
) -> UpdateEnvironmentRequest {
    UpdateEnvironmentRequest {
        environment_id: environment_id.to_string(),
        name: Some(desired.name.clone()),
        description: desired.description.clone(),
        login_name: Some(desired.login_name.clone()),
        hostname: Some(desired.hostname.clone()),
        port: desired.port.filter(|port| *port != 0),
        environment_path: desired.environment_path.clone(),
        node_path: desired.node_path.clone(),
        bastion_host: desired.bastion_url.clone(),
    }
}

/// Map a provider record to the canonical representation
///
/// Empty optional strings become `None`. Duplicate tag keys are reported
/// as [`CloudError::ConversionFailed`] instead of being collapsed.
pub fn from_wire(remote: &RemoteEnvironment) -> Result<EnvironmentRecord> {
    Ok(EnvironmentRecord {
        id: Some(remote.environment_id.clone()),
        arn: non_empty(Some(&remote.arn)),
        name: remote.name.clone(),
        description: non_empty(remote.description.as_ref()),
        login_name: remote.login_name.clone(),
        hostname: remote.hostname.clone(),
        port: Some(remote.port.filter(|p| *p != 0).unwrap_or(DEFAULT_SSH_PORT)),
        environment_path: non_empty(remote.environment_path.as_ref()),
        node_path: non_empty(remote.node_path.as_ref()),
        bastion_url: non_empty(remote.bastion_host.as_ref()),
        tags: tags_from_wire(&remote.tags)?,
    })
}

/// Flatten a tag mapping into a key-sorted provider tag list
pub fn tags_to_wire(tags: &Tags) -> Result<Vec<Tag>> {
    tags.iter()
        .map(|(key, value)| {
            validate_tag(key, value)?;
            Ok(Tag::new(key.clone(), value.clone()))
        })
        .collect()
}

/// Convert a provider tag list into a mapping
pub fn tags_from_wire(tags: &[Tag]) -> Result<Tags> {
    let mut result = Tags::new();
    for tag in tags {
        if result
            .insert(tag.key.clone(), tag.value.clone())
            .is_some()
        {
            return Err(CloudError::ConversionFailed(format!(
                "provider returned duplicate tag key '{}'",
                tag.key
            )));
        }
    }
    Ok(result)
}

fn validate_tag(key: &str, value: &str) -> Result<()> {
    let key_len = key.chars().count();
    if key_len == 0 || key_len > MAX_TAG_KEY_LEN {
        return Err(CloudError::ConversionFailed(format!(
            "tag key '{}' must be 1 to {} characters",
            key, MAX_TAG_KEY_LEN
        )));
    }
    if key.starts_with(RESERVED_TAG_PREFIX) {
        return Err(CloudError::ConversionFailed(format!(
            "tag key '{}' uses the reserved '{}' prefix",
            key, RESERVED_TAG_PREFIX
        )));
    }
    if value.chars().count() > MAX_TAG_VALUE_LEN {
        return Err(CloudError::ConversionFailed(format!(
            "value of tag '{}' exceeds {} characters",
            key, MAX_TAG_VALUE_LEN
        )));
    }
    Ok(())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}
