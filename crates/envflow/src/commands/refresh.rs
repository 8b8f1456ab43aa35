use crate::utils::{self, Project};
use colored::Colorize;

pub async fn handle(project: &Project, name: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "リモートの状態を読み込み中...".blue());

    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let names: Vec<String> = match name {
        Some(name) => {
            if state.get(name).is_none() {
                anyhow::bail!("環境 '{}' は state に記録されていません", name);
            }
            vec![name.to_string()]
        }
        None => state.environments.keys().cloned().collect(),
    };

    if names.is_empty() {
        println!("{}", "state に環境がありません".dimmed());
        lock.release().await?;
        return Ok(());
    }

    let reconciler = utils::build_reconciler()?;
    let mut failures = 0;

    for name in &names {
        let Some(held) = state.get(name) else {
            continue;
        };
        let mut record = held.record.clone();

        match reconciler.refresh(&mut record).await {
            Ok(()) => {
                println!("  {} {}", "✓".green(), name.cyan());
                state.set_active(name, record);
            }
            Err(e) if e.is_not_found() => {
                // リモートで削除済み
                println!("  {} {} (リモートに存在しません)", "-".red(), name.cyan());
                state.remove(name);
            }
            Err(e) => {
                failures += 1;
                println!("  {} {}: {}", "✗".red(), name.cyan(), e);
                state.mark_errored(name, e.to_string());
            }
        }
    }

    manager.save(&state).await?;
    lock.release().await?;

    if failures > 0 {
        anyhow::bail!("{}個の環境の読み込みに失敗しました", failures);
    }
    println!("{}", "✓ refresh 完了".green().bold());
    Ok(())
}
