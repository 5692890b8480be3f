use crate::utils::{self, StackArgs};
use colored::Colorize;
use stackwright_cloud::{ActionType, ManifestEngine, ManifestFormat, ProvisioningEngine};

pub async fn handle(
    args: &StackArgs,
    project_root: &std::path::Path,
    show_manifest: bool,
    format: ManifestFormat,
) -> anyhow::Result<()> {
    let (config, deployment) = utils::load_deployment(args)?;
    utils::print_loaded_stack(&config);

    let manifest = deployment.render()?;
    let engine = ManifestEngine::new(project_root);
    let plan = engine.preview(&manifest).await?;

    println!();
    println!("{}", format!("スタック '{}' のプレビュー:", manifest.stack).bold());
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => " ".normal(),
        };
        println!(
            "  {} {} {}",
            marker,
            action.resource_name.cyan(),
            format!("({})", action.resource_type).dimmed()
        );
    }

    println!();
    println!("出力:");
    for output in &manifest.outputs {
        println!("  {}: {}", output.name, output.value);
    }

    println!();
    println!("{}", plan.summary().to_string().bold());

    if show_manifest {
        println!();
        println!("{}", manifest.encode(format)?);
    }

    Ok(())
}
