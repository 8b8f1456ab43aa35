use crate::utils::{self, Project};
use colored::Colorize;

pub async fn handle(project: &Project, name: &str, id: &str) -> anyhow::Result<()> {
    println!(
        "{}",
        format!("環境 {} を {} として取り込み中...", id, name).blue()
    );

    if !project.flow.environments.contains_key(name) {
        println!(
            "  {} 設定ファイルに環境 '{}' がありません（apply の対象外になります）",
            "⚠".yellow(),
            name
        );
    }

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    if let Some(existing) = state.get(name) {
        anyhow::bail!(
            "環境 '{}' は既に state に記録されています (ID: {})",
            name,
            existing.record.id.as_deref().unwrap_or("-")
        );
    }

    let reconciler = utils::build_reconciler()?;
    let record = reconciler.import(id).await?;

    println!(
        "  ✓ {} ({}@{}:{})",
        record.name.cyan(),
        record.login_name,
        record.hostname,
        record.effective_port()
    );
    state.set_active(name, record);
    manager.save(&state).await?;
    lock.release().await?;

    println!("{}", "✓ 取り込み完了".green().bold());
    Ok(())
}
