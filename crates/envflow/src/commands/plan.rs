use crate::utils::{self, Project};
use colored::Colorize;
use envflow_cloud::{
    EnvironmentApi, EnvironmentReconciler, EnvironmentRecord, StateFile, UpdatePlan,
};

/// 1環境あたりの変更内容
pub enum Change {
    /// stateに無いので作成する
    Create,
    /// 前回の操作が失敗しているので、先にrefreshが必要
    NeedsRefresh,
    /// 更新
    Update(UpdatePlan),
}

/// stateと設定から変更内容を計算（リモート呼び出しなし）
pub fn compute<C: EnvironmentApi + ?Sized>(
    reconciler: &EnvironmentReconciler<C>,
    state: &StateFile,
    desired: &EnvironmentRecord,
) -> anyhow::Result<Change> {
    match state.get(&desired.name) {
        None => Ok(Change::Create),
        Some(held) if held.needs_refresh() => Ok(Change::NeedsRefresh),
        Some(held) => Ok(Change::Update(
            reconciler.plan_update(&held.record, desired)?,
        )),
    }
}

pub async fn handle(project: &Project, name: Option<&str>) -> anyhow::Result<()> {
    println!("{}", "変更内容を計算中...".blue());
    utils::print_loaded_config_file(project);

    let targets = project.flow.select(name)?;
    let state = project.state_manager().load().await?;
    let reconciler = utils::build_reconciler()?;

    let mut pending = 0;
    for desired in targets {
        println!();
        match compute(&reconciler, &state, desired)? {
            Change::Create => {
                pending += 1;
                println!("{} {} (作成)", "+".green().bold(), desired.name.cyan());
                println!(
                    "    {}@{}:{}",
                    desired.login_name,
                    desired.hostname,
                    desired.effective_port()
                );
                for (key, value) in &desired.tags {
                    println!("    {} tag {} = {}", "+".green(), key, value);
                }
            }
            Change::NeedsRefresh => {
                pending += 1;
                println!(
                    "{} {} (前回の操作が失敗しました。refresh 後に再計算されます)",
                    "!".yellow().bold(),
                    desired.name.cyan()
                );
            }
            Change::Update(plan) if !plan.has_changes() => {
                println!("{} {} (変更なし)", "=".dimmed(), desired.name.cyan());
            }
            Change::Update(plan) => {
                pending += 1;
                print_update(&desired.name, &plan);
            }
        }
    }

    println!();
    if pending == 0 {
        println!("{}", "✓ 変更はありません".green().bold());
    } else {
        println!(
            "{}",
            format!("{}個の環境に変更があります。envflow apply で適用します", pending).bold()
        );
    }

    Ok(())
}

pub fn print_update(name: &str, plan: &UpdatePlan) {
    println!("{} {} (更新: {})", "~".yellow().bold(), name.cyan(), plan.summary());
    let steps: Vec<String> = plan.steps().iter().map(ToString::to_string).collect();
    println!("    {} {}", "手順:".dimmed(), steps.join(" → "));
    for field in &plan.changed_fields {
        println!("    {} {}", "~".yellow(), field);
    }
    for key in &plan.tags.to_remove {
        println!("    {} tag {}", "-".red(), key);
    }
    for (key, value) in &plan.tags.to_add {
        println!("    {} tag {} = {}", "+".green(), key, value);
    }
}
