pub mod acquire;
pub mod config;
pub mod query;
pub mod query_book;
pub mod types;

pub use acquire::AcquireService;
pub use config::ConfigService;
pub use query::{LoadOptions, QueryService};
pub use query_book::QueryBook;
pub use types::{
    CacheConfig, CachedSnapshot, FilterSpecification, FilterValue, ProjectConfig, QueryConfig,
    RemoteArtifactReference, SourceConfig, SourceStrategy,
};

use std::path::PathBuf;

/// Failures of the fetch-cache-query pipeline.
///
/// None of these are retried; each carries the URL, path or column needed
/// to diagnose it.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to resolve latest artifact from {url}: {reason}")]
    Resolution { url: String, reason: String },

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to write snapshot to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {} is not valid tabular data: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("unknown column '{column}' (available: {})", available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
