use clap::Args;
use colored::Colorize;
use stackwright_config::{DEFAULT_STACK, StackConfig};
use stackwright_stack::{AppSettings, Deployment};

/// スタックを読み込む全コマンド共通の引数
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// スタック名 (dev, stg, prod, ...)
    #[arg(short = 's', long = "stack", env = "WRIGHT_STACK")]
    pub stack: Option<String>,
    /// アプリケーションイメージのローカルビルドコンテキスト
    #[arg(long)]
    pub context: Option<String>,
}

impl StackArgs {
    pub fn stack_name(&self) -> &str {
        self.stack.as_deref().unwrap_or(DEFAULT_STACK)
    }

    pub fn settings(&self) -> AppSettings {
        match &self.context {
            Some(context) => AppSettings::default().with_context(context),
            None => AppSettings::default(),
        }
    }
}

/// スタック設定を読み込みデプロイメントを組み立てる
pub fn load_deployment(args: &StackArgs) -> anyhow::Result<(StackConfig, Deployment)> {
    let config = StackConfig::load(args.stack_name())?;
    let deployment = Deployment::from_config(&config, &args.settings())?;
    tracing::debug!(
        stack = %deployment.stack(),
        resources = deployment.graph().len(),
        "Deployment loaded"
    );
    Ok((config, deployment))
}

/// 設定の読み込み元を表示
pub fn print_loaded_stack(config: &StackConfig) {
    println!("📄 スタック: {}", config.stack().cyan());
    if let Some(source) = config.source() {
        println!("  • {}", source.display().to_string().cyan());
    }
}

/// 宣言済みリソースを1行ずつ表示
pub fn print_resources(deployment: &Deployment) {
    println!(
        "{}",
        format!("リソース ({}個):", deployment.graph().len()).bold()
    );
    for resource in deployment.graph().iter() {
        println!(
            "  + {} {}",
            resource.name().cyan(),
            format!("({})", resource.kind().type_token()).dimmed()
        );
    }
}
