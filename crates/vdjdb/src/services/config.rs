use super::types::ProjectConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

/// Service for configuration management
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    /// Create a new config service
    pub fn new(project_root: &Path) -> Self {
        let config_path = project_root.join(".vdjdb").join("config.toml");
        Self { config_path }
    }

    /// Initialize configuration with defaults
    pub fn init(&self) -> Result<ProjectConfig> {
        let config = ProjectConfig::default();
        self.save(&config)?;
        Ok(config)
    }

    /// Load configuration from file, with env var overrides (VDJDB_ prefix, __ separator)
    pub fn load(&self) -> Result<ProjectConfig> {
        let figment = self
            .file_figment()
            .merge(Env::prefixed("VDJDB_").split("__"));

        let config: ProjectConfig = figment.extract().context("Failed to load configuration")?;
        Ok(config)
    }

    /// Load only what is written in the config file, ignoring env overrides
    pub fn load_file(&self) -> Result<ProjectConfig> {
        let config: ProjectConfig = self
            .file_figment()
            .extract()
            .context("Failed to read configuration file")?;
        Ok(config)
    }

    fn file_figment(&self) -> Figment {
        let figment = Figment::from(Serialized::defaults(ProjectConfig::default()));
        if self.config_path.exists() {
            figment.merge(Toml::file(&self.config_path))
        } else {
            figment
        }
    }

    /// Save configuration to file
    pub fn save(&self, config: &ProjectConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        std::fs::write(&self.config_path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Get a configuration value by dotted key
    pub fn get(&self, key: &str) -> Result<String> {
        let config = self.load()?;
        match key {
            "source.strategy" => Ok(config.source.strategy.to_string()),
            "source.url" => Ok(config.source.url),
            "source.asset_suffix" => Ok(config.source.asset_suffix),
            "source.member" => Ok(config.source.member),
            "source.timeout_secs" => Ok(config
                .source
                .timeout_secs
                .map(|t| t.to_string())
                .unwrap_or_default()),
            "cache.path" => Ok(config.cache.path),
            "query.normalize_segments" => Ok(config.query.normalize_segments.to_string()),
            "query.output_dir" => Ok(config.query.output_dir),
            _ => Err(anyhow::anyhow!("Unknown config key: {}", key)),
        }
    }

    /// Set a configuration value by dotted key.
    ///
    /// Only the file contents are rewritten; env overrides are not persisted.
    pub fn set(&self, key: &str, value: String) -> Result<()> {
        let mut config = self.load_file()?;
        match key {
            "source.strategy" => config.source.strategy = value.parse()?,
            "source.url" => {
                reqwest::Url::parse(&value)
                    .with_context(|| format!("Invalid source URL: {}", value))?;
                config.source.url = value
            },
            "source.asset_suffix" => config.source.asset_suffix = value,
            "source.member" => config.source.member = value,
            "source.timeout_secs" => {
                config.source.timeout_secs = if value.is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid timeout: {}", value))?,
                    )
                }
            },
            "cache.path" => config.cache.path = value,
            "query.normalize_segments" => {
                config.query.normalize_segments = value
                    .parse()
                    .with_context(|| format!("Expected true or false, got: {}", value))?
            },
            "query.output_dir" => config.query.output_dir = value,
            _ => return Err(anyhow::anyhow!("Unknown config key: {}", key)),
        }
        self.save(&config)?;
        Ok(())
    }

    /// Resolve the snapshot cache path, relative paths anchored at the project root
    pub fn resolve_cache_path(&self, project_root: &Path) -> Result<PathBuf> {
        let config = self.load()?;
        Ok(resolve_against(project_root, &config.cache.path))
    }

    /// Resolve the directory query results are written to
    pub fn resolve_output_dir(&self, project_root: &Path) -> Result<PathBuf> {
        let config = self.load()?;
        Ok(resolve_against(project_root, &config.query.output_dir))
    }

    /// Check if configuration exists
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

fn resolve_against(project_root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
