use crate::utils::{self, StackArgs};
use colored::Colorize;
use stackwright_config::StackConfig;
use stackwright_stack::Deployment;

pub fn handle(args: &StackArgs) -> anyhow::Result<()> {
    println!("{}", "スタックを検証中...".blue());

    let config = match StackConfig::load(args.stack_name()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ スタック設定を読み込めません".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };
    utils::print_loaded_stack(&config);

    match Deployment::from_config(&config, &args.settings()) {
        Ok(deployment) => {
            println!("{}", "✓ スタックは正常です".green().bold());
            println!();
            utils::print_resources(&deployment);
            if let Some(url) = deployment.url().value() {
                println!();
                println!("出力 url: {}", url.cyan());
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("{}", "✗ スタックエラー".red().bold());
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
