use crate::utils::{self, StackArgs};
use colored::Colorize;
use stackwright_cloud::{ManifestEngine, Plan, ProvisioningEngine};

/// プロビジョニングエンジンにスタックの削除を依頼する
pub async fn handle(
    args: &StackArgs,
    project_root: &std::path::Path,
    yes: bool,
) -> anyhow::Result<()> {
    let (config, deployment) = utils::load_deployment(args)?;
    utils::print_loaded_stack(&config);

    let manifest = deployment.render()?;
    let plan = Plan::delete_all(&manifest);

    println!();
    for action in &plan.actions {
        println!("  {} {}", "-".red(), action.resource_name.cyan());
    }
    println!();
    println!("{}", plan.summary().to_string().bold());

    if !yes {
        println!();
        println!(
            "{}",
            "警告: 上記のリソースはすべて削除されます".yellow()
        );
        println!("続行するには --yes を付けて再実行してください");
        return Ok(());
    }

    let engine = ManifestEngine::new(project_root);
    let result = engine.destroy(&manifest).await?;
    if !result.is_success() {
        for failure in &result.failed {
            eprintln!(
                "  {} {}: {}",
                "✗".red(),
                failure.action_id,
                failure.error.as_deref().unwrap_or("不明なエラー")
            );
        }
        anyhow::bail!("{}件のアクションが失敗しました", result.failed.len());
    }

    println!("{}", "✓ スタックを取り下げました".green().bold());
    Ok(())
}
