use crate::commands::plan::{self, Change};
use crate::utils::{self, Project};
use colored::Colorize;
use envflow_cloud::{
    ApplyResult, EnvironmentApi, EnvironmentReconciler, EnvironmentRecord, StateFile,
    StateManager,
};

pub async fn handle(project: &Project, name: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "設定を適用中...".blue());
    utils::print_loaded_config_file(project);

    let targets = project.flow.select(name)?;
    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;
    let reconciler = utils::build_reconciler()?;

    let mut result = Ok(());
    for desired in targets {
        println!();
        if let Err(e) = apply_one(&reconciler, &manager, &mut state, desired).await {
            result = Err(e);
            break;
        }
    }

    lock.release().await?;

    println!();
    match &result {
        Ok(()) => println!("{}", "✓ 適用完了".green().bold()),
        Err(_) => eprintln!("{}", "✗ 適用に失敗しました".red().bold()),
    }
    result
}

async fn apply_one<C: EnvironmentApi + ?Sized>(
    reconciler: &EnvironmentReconciler<C>,
    manager: &StateManager,
    state: &mut StateFile,
    desired: &EnvironmentRecord,
) -> anyhow::Result<()> {
    let mut change = plan::compute(reconciler, state, desired)?;

    if let Change::NeedsRefresh = change {
        println!(
            "{}",
            format!("↻ {} を読み直し中...", desired.name).yellow().bold()
        );
        refresh_errored(reconciler, manager, state, &desired.name).await?;
        change = plan::compute(reconciler, state, desired)?;
    }

    let mut log = ApplyResult::new();
    match change {
        Change::Create => {
            println!("{}", format!("+ {} を作成中...", desired.name).green().bold());
            match reconciler.create_with_log(desired, &mut log).await {
                Ok(record) => {
                    println!(
                        "  ✓ 作成完了 (ID: {})",
                        record.id.as_deref().unwrap_or("-").cyan()
                    );
                    state.set_active(&desired.name, record);
                }
                Err(e) => {
                    // 作成済みなら次回refreshできるようIDを残す
                    if let Some(id) = log.created_id.clone() {
                        let mut partial = desired.clone();
                        partial.id = Some(id);
                        state.set_active(&desired.name, partial);
                        state.mark_errored(&desired.name, e.to_string());
                        manager.save(state).await?;
                    }
                    print_log(&log);
                    return Err(e.into());
                }
            }
        }
        Change::Update(update) if !update.has_changes() => {
            println!("{} {} (変更なし)", "=".dimmed(), desired.name.cyan());
            return Ok(());
        }
        Change::Update(update) => {
            plan::print_update(&desired.name, &update);
            match reconciler.apply_update(&update, &mut log).await {
                Ok(record) => {
                    println!("  ✓ 更新完了 ({}ms)", log.duration_ms);
                    state.set_active(&desired.name, record);
                }
                Err(e) => {
                    state.mark_errored(&desired.name, e.to_string());
                    manager.save(state).await?;
                    print_log(&log);
                    return Err(e.into());
                }
            }
        }
        Change::NeedsRefresh => {
            anyhow::bail!("{} は refresh 後も errored のままです", desired.name);
        }
    }

    manager.save(state).await?;
    Ok(())
}

/// errored状態の環境をリモートから読み直す
async fn refresh_errored<C: EnvironmentApi + ?Sized>(
    reconciler: &EnvironmentReconciler<C>,
    manager: &StateManager,
    state: &mut StateFile,
    name: &str,
) -> anyhow::Result<()> {
    let Some(held) = state.get(name) else {
        return Ok(());
    };
    let mut record = held.record.clone();

    match reconciler.refresh(&mut record).await {
        Ok(()) => {
            state.set_active(name, record);
        }
        Err(e) if e.is_not_found() => {
            println!("  {} リモートに存在しないため再作成します", "!".yellow());
            state.remove(name);
        }
        Err(e) => {
            state.mark_errored(name, e.to_string());
            manager.save(state).await?;
            return Err(e.into());
        }
    }
    manager.save(state).await?;
    Ok(())
}

fn print_log(log: &ApplyResult) {
    for step in &log.succeeded {
        println!("  {} {}: {}", "✓".green(), step.step, step.message);
    }
    for step in &log.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            step.step,
            step.error.as_deref().unwrap_or("")
        );
    }
    if log.is_partial() {
        println!(
            "  {}",
            "一部の変更はリモートに反映済みです。envflow refresh で状態を確認してください".yellow()
        );
    }
}
