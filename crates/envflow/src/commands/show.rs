use crate::utils::Project;
use colored::Colorize;
use envflow_cloud::ResourceStatus;

pub async fn handle(project: &Project, json: bool) -> anyhow::Result<()> {
    let manager = project.state_manager();
    let state = manager.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!(
        "state: {}",
        manager.state_path().display().to_string().cyan()
    );
    if state.environments.is_empty() {
        println!("{}", "state に環境がありません".dimmed());
        return Ok(());
    }

    for (name, env) in &state.environments {
        let status = match env.status {
            ResourceStatus::Active => env.status.to_string().green(),
            ResourceStatus::Errored => env.status.to_string().red(),
        };
        let declared = if project.flow.environments.contains_key(name) {
            String::new()
        } else {
            " (設定ファイルに未定義)".dimmed().to_string()
        };
        println!("{} [{}]{}", name.cyan().bold(), status, declared);

        let record = &env.record;
        println!("  ID:       {}", record.id.as_deref().unwrap_or("-"));
        println!("  ARN:      {}", record.arn.as_deref().unwrap_or("-"));
        println!(
            "  接続先:   {}@{}:{}",
            record.login_name,
            record.hostname,
            record.effective_port()
        );
        if let Some(path) = &record.environment_path {
            println!("  パス:     {}", path);
        }
        for (key, value) in &record.tags {
            println!("  tag:      {} = {}", key, value);
        }
        if let Some(error) = &env.last_error {
            println!("  {} {}", "エラー:".red(), error);
        }
        println!(
            "  更新日時: {}",
            env.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    Ok(())
}
