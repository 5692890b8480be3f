mod commands;
mod utils;

use clap::{Parser, Subcommand};
use stackwright_cloud::ManifestFormat;
use std::path::PathBuf;
use utils::StackArgs;

#[derive(Parser)]
#[command(name = "wright")]
#[command(about = "一度宣言すれば、ロードバランサーの裏まで届く。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// スタックが宣言するリソースと予定される変更を表示
    Preview {
        #[command(flatten)]
        stack: StackArgs,
        /// 生成したマニフェストも表示する
        #[arg(long)]
        show_manifest: bool,
        /// マニフェスト形式 (json, yaml)
        #[arg(long, default_value = "json")]
        format: ManifestFormat,
    },
    /// デプロイメントマニフェストを生成
    Render {
        #[command(flatten)]
        stack: StackArgs,
        /// 標準出力の代わりにファイルへ書き出す
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// マニフェスト形式 (json, yaml)
        #[arg(long, default_value = "json")]
        format: ManifestFormat,
    },
    /// スタックをプロビジョニングエンジンへ引き渡す
    Up {
        #[command(flatten)]
        stack: StackArgs,
        /// 確認なしで実行する
        #[arg(short, long)]
        yes: bool,
    },
    /// プロビジョニングエンジンにスタックの削除を依頼
    Down {
        #[command(flatten)]
        stack: StackArgs,
        /// 確認なしで実行する
        #[arg(short, long)]
        yes: bool,
    },
    /// スタック設定を検証
    Validate {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// 各リソースの参照先と参照元を表示
    Graph {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // マニフェストをパイプできるようログは標準エラーへ
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let project_root = std::env::current_dir()?;

    match cli.command {
        Commands::Version => {
            println!("stackwright {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Preview {
            stack,
            show_manifest,
            format,
        } => {
            commands::preview::handle(&stack, &project_root, show_manifest, format).await?;
        }
        Commands::Render { stack, out, format } => {
            commands::render::handle(&stack, out, format)?;
        }
        Commands::Up { stack, yes } => {
            commands::up::handle(&stack, &project_root, yes).await?;
        }
        Commands::Down { stack, yes } => {
            commands::down::handle(&stack, &project_root, yes).await?;
        }
        Commands::Validate { stack } => {
            commands::validate::handle(&stack)?;
        }
        Commands::Graph { stack } => {
            commands::graph::handle(&stack)?;
        }
    }

    Ok(())
}
