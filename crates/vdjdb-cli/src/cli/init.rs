use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use vdjdb::services::ConfigService;

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,

    /// Project root directory
    #[arg(default_value = ".")]
    path: PathBuf,
}

pub fn execute(args: InitArgs) -> Result<()> {
    let project_root = args.path;
    let config_service = ConfigService::new(&project_root);

    if config_service.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Configuration already exists at {}. Use --force to overwrite.",
            config_service.path().display()
        ));
    }

    let config = config_service.init()?;
    let cache_path = config_service.resolve_cache_path(&project_root)?;

    println!("Initialized VDJdb project at {}", project_root.display());
    println!("  Source: {} ({})", config.source.url, config.source.strategy);
    println!("  Cache: {}", cache_path.display());
    println!("  Output: {}", config.query.output_dir);

    Ok(())
}
