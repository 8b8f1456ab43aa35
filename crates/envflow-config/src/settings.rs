//! グローバル設定 (~/.config/envflow/config.yaml)

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SETTINGS_FILE: &str = "config.yaml";

/// envflowのグローバル設定
///
/// ```yaml
/// endpoint: http://127.0.0.1:8080
/// region: ap-northeast-1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Cloud9 APIのエンドポイント（署名プロキシなど）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// AWSリージョン
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Settings {
    /// 設定ディレクトリから読み込み、環境変数で上書きする
    ///
    /// ファイルが無い場合はデフォルト値を使う。
    pub fn load() -> Result<Self> {
        let path = crate::get_config_dir()?.join(SETTINGS_FILE);
        let settings = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!("設定ファイルなし: {}", path.display());
            Self::default()
        };
        Ok(settings.with_env_overrides())
    }

    /// 指定したYAMLファイルから読み込む
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError::InvalidSettings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 環境変数 ENVFLOW_CLOUD9_ENDPOINT / AWS_REGION / AWS_DEFAULT_REGION を優先
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(endpoint) = non_empty_var("ENVFLOW_CLOUD9_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(region) =
            non_empty_var("AWS_REGION").or_else(|| non_empty_var("AWS_DEFAULT_REGION"))
        {
            self.region = Some(region);
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
