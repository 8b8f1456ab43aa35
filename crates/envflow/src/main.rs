mod commands;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "envflow")]
#[command(about = "SSH開発環境を宣言的に管理する", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 設定を検証
    Validate,
    /// 変更内容を表示（リモートには何も送信しない）
    Plan {
        /// 環境名（指定しない場合は全環境）
        name: Option<String>,
    },
    /// 設定を適用（未作成なら作成、作成済みなら更新）
    Apply {
        /// 環境名（指定しない場合は全環境）
        name: Option<String>,
    },
    /// リモートの状態を読み直してstateを更新
    Refresh {
        /// 環境名（指定しない場合はstate内の全環境）
        name: Option<String>,
    },
    /// 既存の環境をIDで取り込む
    Import {
        /// 設定ファイル上の環境名
        name: String,
        /// プロバイダーの環境ID
        id: String,
    },
    /// 環境を削除
    Destroy {
        /// 環境名
        name: String,
        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,
    },
    /// stateに記録された環境を表示
    Show {
        /// JSON形式で出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrに出力（RUST_LOGで制御）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("envflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Validateは自前でエラー表示を行う
    if matches!(cli.command, Commands::Validate) {
        return commands::validate::handle();
    }

    let project = match utils::load_project() {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{}", "✗ 設定の読み込みに失敗しました".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Plan { name } => {
            commands::plan::handle(&project, name.as_deref()).await?;
        }
        Commands::Apply { name } => {
            commands::apply::handle(&project, name.as_deref()).await?;
        }
        Commands::Refresh { name } => {
            commands::refresh::handle(&project, name.as_deref()).await?;
        }
        Commands::Import { name, id } => {
            commands::import::handle(&project, &name, &id).await?;
        }
        Commands::Destroy { name, yes } => {
            commands::destroy::handle(&project, &name, yes).await?;
        }
        Commands::Show { json } => {
            commands::show::handle(&project, json).await?;
        }
        Commands::Version | Commands::Validate => {
            unreachable!("handled before config loading");
        }
    }

    Ok(())
}
