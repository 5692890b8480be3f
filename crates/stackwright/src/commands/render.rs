use crate::utils::{self, StackArgs};
use colored::Colorize;
use stackwright_cloud::ManifestFormat;
use std::path::PathBuf;

/// マニフェストを標準出力または `out` へ書き出す（シークレットは伏せ字）
pub fn handle(
    args: &StackArgs,
    out: Option<PathBuf>,
    format: ManifestFormat,
) -> anyhow::Result<()> {
    let (_, deployment) = utils::load_deployment(args)?;
    let manifest = deployment.render()?;
    let encoded = manifest.encode(format)?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, encoded)?;
            eprintln!(
                "{} {}",
                "✓ マニフェストを書き出しました:".green(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", encoded),
    }

    Ok(())
}
