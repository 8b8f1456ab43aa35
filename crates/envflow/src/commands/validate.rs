use crate::utils;
use colored::Colorize;

pub fn handle() -> anyhow::Result<()> {
    println!("{}", "設定を検証中...".blue());

    match utils::load_project() {
        Ok(project) => {
            utils::print_loaded_config_file(&project);
            println!("{}", "✓ 設定ファイルは正常です！".green().bold());
            println!();
            println!("サマリー:");
            println!("  プロジェクト: {}", project.flow.name.cyan());
            println!("  環境: {}個", project.flow.environments.len());
            for (name, env) in &project.flow.environments {
                println!(
                    "    - {} ({}@{}:{}, タグ{}個)",
                    name.cyan(),
                    env.login_name,
                    env.hostname,
                    env.effective_port(),
                    env.tags.len()
                );
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ 設定エラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
