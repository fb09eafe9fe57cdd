use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where the latest VDJdb release is announced.
pub const DEFAULT_LISTING_URL: &str =
    "https://api.github.com/repos/antigenomics/vdjdb-db/releases/latest";

/// Archive member holding the slim database table.
pub const DEFAULT_MEMBER: &str = "vdjdb.slim.txt";

/// Cache location relative to the project root.
pub const DEFAULT_CACHE_PATH: &str = ".vdjdb/vdjdb-latest.zip";

/// Strategy used to pick the artifact link out of the listing document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceStrategy {
    /// GitHub releases API JSON
    #[default]
    GithubApi,
    /// GitHub releases HTML page
    ReleasePage,
}

impl std::fmt::Display for SourceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceStrategy::GithubApi => "github-api",
            SourceStrategy::ReleasePage => "release-page",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for SourceStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github-api" | "api" => Ok(SourceStrategy::GithubApi),
            "release-page" | "html" => Ok(SourceStrategy::ReleasePage),
            _ => Err(anyhow::anyhow!("Invalid source strategy: {}", s)),
        }
    }
}

/// Remote source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub strategy: SourceStrategy,
    pub url: String,
    pub asset_suffix: String,
    pub member: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            strategy: SourceStrategy::GithubApi,
            url: DEFAULT_LISTING_URL.to_string(),
            asset_suffix: ".zip".to_string(),
            member: DEFAULT_MEMBER.to_string(),
            timeout_secs: None,
        }
    }
}

/// Local snapshot cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file path; relative paths resolve against the project root
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_CACHE_PATH.to_string(),
        }
    }
}

/// Query behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Rewrite V/J segment names to zero-padded TCR nomenclature at load time
    pub normalize_segments: bool,
    pub output_dir: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            normalize_segments: false,
            output_dir: "vdjdb_queries".to_string(),
        }
    }
}

/// Project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Location of the downloadable artifact at the moment of resolution.
///
/// Built fresh on every acquisition and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArtifactReference {
    pub download_url: Url,
    /// Release label for logging (tag name or dated path segment)
    pub release: Option<String>,
}

/// The on-disk snapshot at the well-known cache path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedSnapshot {
    pub path: PathBuf,
}

impl CachedSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A single accepted value within a predicate
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    /// Numeric reading of the value, if it has one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Exact textual reading of the value
    pub fn as_text(&self) -> String {
        match self {
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

/// Column-name to accepted-values constraints.
///
/// A record matches when, for every column, its value is one of the
/// accepted values (AND across columns, OR within a column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpecification {
    predicates: BTreeMap<String, Vec<FilterValue>>,
}

impl FilterSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSpecification::insert`] for several values
    pub fn with<V>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<FilterValue>,
    {
        for value in values {
            self.insert(column, value);
        }
        self
    }

    /// Accept one more value for a column; repeated columns union their values
    pub fn insert(&mut self, column: &str, value: impl Into<FilterValue>) {
        let value = value.into();
        let accepted = self.predicates.entry(column.to_string()).or_default();
        if !accepted.contains(&value) {
            accepted.push(value);
        }
    }

    pub fn predicates(&self) -> &BTreeMap<String, Vec<FilterValue>> {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl std::fmt::Display for FilterSpecification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .predicates
            .iter()
            .map(|(column, values)| {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("{} in [{}]", column, values.join(", "))
            })
            .collect();
        write!(f, "{}", parts.join(" and "))
    }
}
