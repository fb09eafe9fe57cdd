use super::Project;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;

#[derive(Args)]
pub struct StatusArgs {}

pub fn execute(_args: StatusArgs) -> Result<()> {
    let project = Project::open()?;
    let cache_path = project.cache_path()?;

    if !cache_path.exists() {
        println!("No cached snapshot at {}", cache_path.display());
        println!("  It will be fetched on the first query, or run 'search-vdjdb fetch'.");
        return Ok(());
    }

    let metadata = std::fs::metadata(&cache_path)
        .with_context(|| format!("Failed to read {}", cache_path.display()))?;
    let modified: DateTime<Local> = metadata.modified()?.into();

    println!("Cached snapshot: {}", cache_path.display());
    println!("  Size: {} bytes", metadata.len());
    println!("  Fetched: {}", modified.format("%Y-%m-%d %H:%M:%S"));

    Ok(())
}
