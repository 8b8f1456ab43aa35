use colored::Colorize;
use envflow_cloud::{EnvironmentReconciler, StateManager};
use envflow_cloud_aws::{Cloud9Client, Cloud9Config};
use envflow_config::Settings;
use envflow_core::Flow;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 読み込んだプロジェクト
pub struct Project {
    /// 設定ファイルのパス
    pub flow_path: PathBuf,
    /// stateを置くディレクトリ
    pub root: PathBuf,
    pub flow: Flow,
}

impl Project {
    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.root)
    }
}

/// 設定ファイルを探してパース
pub fn load_project() -> anyhow::Result<Project> {
    let flow_path = envflow_config::find_flow_file()?;
    let flow = envflow_core::parse_kdl_file(&flow_path)?;
    let root = project_root_for(&flow_path);
    tracing::debug!(
        "Loaded {} ({} environments), state root {}",
        flow_path.display(),
        flow.environments.len(),
        root.display()
    );
    Ok(Project {
        flow_path,
        root,
        flow,
    })
}

/// 設定ファイルからプロジェクトルートを決定
///
/// `.envflow/` 内の設定ファイルならその親ディレクトリ。
pub fn project_root_for(flow_path: &Path) -> PathBuf {
    let parent = flow_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    if parent.file_name().and_then(|n| n.to_str()) == Some(".envflow") {
        parent
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(parent)
    } else {
        parent
    }
}

/// グローバル設定からCloud9クライアントを組み立てる
pub fn build_reconciler() -> anyhow::Result<EnvironmentReconciler<Cloud9Client>> {
    let settings = Settings::load()?;
    let config = cloud9_config(&settings);
    tracing::debug!("Cloud9 endpoint: {}", config.endpoint);
    Ok(EnvironmentReconciler::new(std::sync::Arc::new(
        Cloud9Client::new(config),
    )))
}

fn cloud9_config(settings: &Settings) -> Cloud9Config {
    let region = settings.region.as_deref().unwrap_or("us-east-1");
    let mut config = Cloud9Config::for_region(region);
    if let Some(endpoint) = &settings.endpoint {
        config.endpoint = endpoint.clone();
    }
    config
}

/// 読み込んだ設定ファイル情報を表示
pub fn print_loaded_config_file(project: &Project) {
    println!(
        "📄 設定ファイル: {}",
        project.flow_path.display().to_string().cyan()
    );
}

/// [y/N] で確認を取る
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
