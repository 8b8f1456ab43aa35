//! Flow定義

use crate::error::{FlowError, Result};
use envflow_cloud::EnvironmentRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flow - 開発環境の設計図
///
/// プロジェクト名と、名前をキーにした環境定義のマップ。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow名（プロジェクト名）
    pub name: String,
    /// このFlowで定義される環境
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentRecord>,
}

impl Flow {
    /// 名前で環境を取得
    pub fn environment(&self, name: &str) -> Result<&EnvironmentRecord> {
        self.environments
            .get(name)
            .ok_or_else(|| FlowError::EnvironmentNotFound(name.to_string()))
    }

    /// 対象の環境を選択（名前指定なしなら全て）
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&EnvironmentRecord>> {
        match name {
            Some(name) => Ok(vec![self.environment(name)?]),
            None => Ok(self.environments.values().collect()),
        }
    }
}
