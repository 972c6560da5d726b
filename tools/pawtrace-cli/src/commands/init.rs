//! Write a default parameter file.

use std::path::PathBuf;

use pawtrace_model::params::AnalysisParams;

pub fn run(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    AnalysisParams::default()
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write parameters: {e}"))?;

    println!("Default parameters written to: {}", path.display());
    println!("  Edit regions and thresholds, then pass it with --params.");
    Ok(())
}
