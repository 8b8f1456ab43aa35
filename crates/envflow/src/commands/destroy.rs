use crate::utils::{self, Project};
use colored::Colorize;
use envflow_cloud::ApplyResult;

pub async fn handle(project: &Project, name: &str, yes: bool) -> anyhow::Result<()> {
    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let Some(held) = state.get(name) else {
        anyhow::bail!("環境 '{}' は state に記録されていません", name);
    };
    let Some(id) = held.record.id.clone() else {
        anyhow::bail!("環境 '{}' にIDがありません。refresh してください", name);
    };

    println!(
        "{}",
        format!("環境 {} (ID: {}) を削除します", name, id).red().bold()
    );
    if !yes && !utils::confirm("本当に削除しますか？")? {
        println!("中止しました");
        lock.release().await?;
        return Ok(());
    }

    let reconciler = utils::build_reconciler()?;
    let mut log = ApplyResult::new();
    match reconciler.delete_with_log(&id, &mut log).await {
        Ok(()) => {
            for step in &log.succeeded {
                println!("  {} {}: {}", "✓".green(), step.step, step.message);
            }
            state.remove(name);
            manager.save(&state).await?;
        }
        Err(e) => {
            state.mark_errored(name, e.to_string());
            manager.save(&state).await?;
            return Err(e.into());
        }
    }
    lock.release().await?;

    println!("{}", "✓ 削除完了".green().bold());
    Ok(())
}
