//! environment ノードのパース

use crate::error::{FlowError, Result};
use envflow_cloud::{EnvironmentRecord, Tags};
use kdl::KdlNode;
use std::collections::HashSet;

/// environment ノードをパース
///
/// ```kdl
/// environment "dev1" {
///     login-name "ubuntu"
///     hostname "1.2.3.4"
///     port 22
///     tags {
///         env "prod"
///     }
/// }
/// ```
pub fn parse_environment(node: &KdlNode) -> Result<EnvironmentRecord> {
    let name = first_string(node)
        .ok_or_else(|| FlowError::InvalidConfig("environment requires a name".to_string()))?;

    let mut record = EnvironmentRecord {
        name: name.clone(),
        ..Default::default()
    };

    if let Some(children) = node.children() {
        let mut seen = HashSet::new();
        for child in children.nodes() {
            let key = canonical_key(child.name().value());
            if !seen.insert(key.clone()) {
                return Err(FlowError::InvalidConfig(format!(
                    "環境 '{}': '{}' が重複して指定されています",
                    name, key
                )));
            }
            match child.name().value() {
                "description" => record.description = first_string(child),
                "login_name" | "login-name" => {
                    record.login_name = first_string(child).unwrap_or_default();
                }
                "hostname" => record.hostname = first_string(child).unwrap_or_default(),
                "port" => record.port = Some(parse_port(&name, child)?),
                "environment_path" | "environment-path" => {
                    record.environment_path = first_string(child);
                }
                "node_path" | "node-path" => record.node_path = first_string(child),
                "bastion_url" | "bastion-url" => record.bastion_url = first_string(child),
                "tags" => record.tags = parse_tags(&name, child)?,
                other => {
                    tracing::warn!("環境 '{}': 不明な設定 '{}' を無視します", name, other);
                }
            }
        }
    }

    if record.login_name.is_empty() {
        return Err(FlowError::InvalidConfig(format!(
            "環境 '{}' に login-name が指定されていません",
            name
        )));
    }
    if record.hostname.is_empty() {
        return Err(FlowError::InvalidConfig(format!(
            "環境 '{}' に hostname が指定されていません",
            name
        )));
    }

    Ok(record)
}

// login_name と login-name は同じ設定
fn canonical_key(name: &str) -> String {
    name.replace('_', "-")
}

fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn parse_port(env: &str, node: &KdlNode) -> Result<u16> {
    let value = node
        .entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| {
            FlowError::InvalidConfig(format!("環境 '{}': port は整数で指定してください", env))
        })?;

    match u16::try_from(value) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(FlowError::InvalidConfig(format!(
            "環境 '{}': port {} は範囲外です (1-65535)",
            env, value
        ))),
    }
}

// tags { key "value" } 形式
fn parse_tags(env: &str, node: &KdlNode) -> Result<Tags> {
    let mut tags = Tags::new();
    let Some(children) = node.children() else {
        return Ok(tags);
    };

    for tag in children.nodes() {
        let key = tag.name().value().to_string();
        if tags.contains_key(&key) {
            return Err(FlowError::InvalidConfig(format!(
                "環境 '{}': タグ '{}' が重複しています",
                env, key
            )));
        }
        let value = tag
            .entries()
            .first()
            .and_then(|e| e.value().as_string())
            .ok_or_else(|| {
                FlowError::InvalidConfig(format!(
                    "環境 '{}': タグ '{}' の値は文字列で指定してください",
                    env, key
                ))
            })?;
        tags.insert(key, value.to_string());
    }

    Ok(tags)
}
