use crate::utils::{self, StackArgs};
use colored::Colorize;
use stackwright_cloud::{CloudError, ManifestEngine, ProvisioningEngine};

/// マニフェストをプロビジョニングエンジンへ引き渡す
///
/// エンジン用のマニフェストはシークレットの値を含むため、画面には表示しない。
pub async fn handle(
    args: &StackArgs,
    project_root: &std::path::Path,
    yes: bool,
) -> anyhow::Result<()> {
    let (config, deployment) = utils::load_deployment(args)?;
    utils::print_loaded_stack(&config);

    let manifest = deployment.render_for_engine()?;
    let engine = ManifestEngine::new(project_root);

    let auth = engine.check_auth().await?;
    if !auth.authenticated {
        return Err(CloudError::AuthenticationFailed(format!(
            "{}: {}",
            engine.display_name(),
            auth.error.unwrap_or_default()
        ))
        .into());
    }

    let plan = engine.preview(&manifest).await?;
    println!();
    utils::print_resources(&deployment);
    println!();
    println!("{}", plan.summary().to_string().bold());

    if !yes {
        println!();
        println!("エンジンへ引き渡すには --yes を付けて再実行してください");
        return Ok(());
    }

    println!();
    println!("{}", format!("{} で引き渡し中...", engine.display_name()).blue());
    let result = engine.apply(&manifest, &plan).await?;

    for failure in &result.failed {
        eprintln!(
            "  {} {}: {}",
            "✗".red(),
            failure.action_id,
            failure.error.as_deref().unwrap_or("不明なエラー")
        );
    }
    if !result.is_success() {
        anyhow::bail!("{}件のアクションが失敗しました", result.failed.len());
    }

    println!(
        "{} ({}リソース, {}ms)",
        "✓ スタックを引き渡しました".green().bold(),
        result.succeeded.len(),
        result.duration_ms
    );
    if let Some(url) = deployment.url().value() {
        println!("  url: {}", url.cyan());
    }

    Ok(())
}
