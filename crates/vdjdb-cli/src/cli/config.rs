use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use vdjdb::services::ConfigService;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (e.g. cache.path)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let project_root = PathBuf::from(".");
    let config_service = ConfigService::new(&project_root);

    match args.command {
        ConfigCommands::Show => {
            let config = config_service.load()?;
            println!("[source]");
            println!("  strategy: {}", config.source.strategy);
            println!("  url: {}", config.source.url);
            println!("  asset_suffix: {}", config.source.asset_suffix);
            println!("  member: {}", config.source.member);
            if let Some(timeout) = config.source.timeout_secs {
                println!("  timeout_secs: {}", timeout);
            }
            println!("[cache]");
            println!("  path: {}", config.cache.path);
            println!("[query]");
            println!("  normalize_segments: {}", config.query.normalize_segments);
            println!("  output_dir: {}", config.query.output_dir);
        },

        ConfigCommands::Get { key } => {
            let value = config_service.get(&key)?;
            println!("{}", value);
        },

        ConfigCommands::Set { key, value } => {
            if !config_service.exists() {
                return Err(anyhow::anyhow!(
                    "No configuration found. Run 'search-vdjdb init' first."
                ));
            }
            config_service.set(&key, value.clone())?;
            println!("Set {} = {}", key, value);
        },
    }

    Ok(())
}
