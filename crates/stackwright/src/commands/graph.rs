use crate::utils::{self, StackArgs};
use colored::Colorize;

/// リソースごとに参照先（←）と参照元（→）を表示する
pub fn handle(args: &StackArgs) -> anyhow::Result<()> {
    let (_, deployment) = utils::load_deployment(args)?;
    let graph = deployment.graph();

    for resource in graph.iter() {
        println!("{} ({})", resource.name().cyan().bold(), resource.kind());
        let deps = resource.dependencies();
        if deps.is_empty() {
            println!("  {}", "依存なし".dimmed());
        }
        for reference in resource.references() {
            println!("  ← {}", reference.to_string().yellow());
        }
        let dependents: Vec<&str> = graph
            .dependents(resource.id())
            .iter()
            .map(|id| id.name.as_str())
            .collect();
        if !dependents.is_empty() {
            println!("  → {}", dependents.join(", "));
        }
    }

    Ok(())
}
