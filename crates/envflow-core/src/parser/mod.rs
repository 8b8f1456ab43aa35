//! KDLパーサー
//!
//! envflowのKDL設定ファイルをパースします。
//! 環境ノードのパース処理は `environment` モジュールに分離されています。

mod environment;

pub use environment::parse_environment;

use crate::error::{FlowError, Result};
use crate::model::Flow;
use kdl::KdlDocument;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてFlowを生成
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn parse_kdl_file<P: AsRef<Path>>(path: P) -> Result<Flow> {
    let content = fs::read_to_string(path.as_ref())?;
    // プロジェクト名のデフォルトは設定ファイルのあるディレクトリ名
    let name = path
        .as_ref()
        .canonicalize()
        .ok()
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    parse_kdl_string(&content, name)
}

/// KDL文字列をパース
pub fn parse_kdl_string(content: &str, default_name: String) -> Result<Flow> {
    let doc: KdlDocument = content.parse()?;

    let mut name = default_name;
    let mut environments = BTreeMap::new();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                // projectノードから名前を取得
                if let Some(project_name) =
                    node.entries().first().and_then(|e| e.value().as_string())
                {
                    name = project_name.to_string();
                }
            }
            "environment" => {
                let record = parse_environment(node)?;
                if environments.contains_key(&record.name) {
                    return Err(FlowError::InvalidConfig(format!(
                        "環境 '{}' が重複して定義されています",
                        record.name
                    )));
                }
                environments.insert(record.name.clone(), record);
            }
            other => {
                // 不明なノードはスキップ
                tracing::debug!("不明なノードをスキップ: {}", other);
            }
        }
    }

    tracing::debug!("{} 個の環境を読み込みました", environments.len());

    Ok(Flow { name, environments })
}
