use super::acquire::AcquireService;
use super::types::{CachedSnapshot, FilterSpecification, ProjectConfig};
use super::ServiceResult;
use crate::dataset::{filter, reader, segments, TabularDataset};
use std::path::Path;

/// How a snapshot is turned into a dataset
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Table name inside a ZIP release archive
    pub member: String,
    /// Rename V/J segments to zero-padded TCR nomenclature
    pub normalize_segments: bool,
}

impl LoadOptions {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            member: config.source.member.clone(),
            normalize_segments: config.query.normalize_segments,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from_config(&ProjectConfig::default())
    }
}

/// Service for filtering the cached VDJdb snapshot
pub struct QueryService {
    acquirer: AcquireService,
    options: LoadOptions,
}

impl QueryService {
    /// Create a new query service reading the snapshot the acquirer writes
    pub fn new(acquirer: AcquireService, options: LoadOptions) -> Self {
        Self { acquirer, options }
    }

    pub fn cache_path(&self) -> &Path {
        self.acquirer.cache_path()
    }

    /// Return the cached snapshot, acquiring one only when none exists.
    ///
    /// An existing snapshot is used regardless of age; refreshing goes
    /// through [`AcquireService::acquire`].
    pub fn ensure_snapshot(&self) -> ServiceResult<CachedSnapshot> {
        let cache_path = self.cache_path();
        if cache_path.exists() {
            tracing::debug!(path = %cache_path.display(), "Using cached VDJdb snapshot");
            return Ok(CachedSnapshot::new(cache_path));
        }

        tracing::info!(
            path = %cache_path.display(),
            "No cached VDJdb snapshot, fetching latest release"
        );
        self.acquirer.acquire()
    }

    /// Decompress and parse a snapshot
    pub fn load(&self, snapshot: &CachedSnapshot) -> ServiceResult<TabularDataset> {
        let mut dataset = reader::read_snapshot(&snapshot.path, &self.options.member)?;
        if self.options.normalize_segments {
            segments::normalize_dataset(&mut dataset);
        }
        tracing::debug!(
            rows = dataset.len(),
            columns = dataset.columns().len(),
            "Loaded VDJdb snapshot"
        );
        Ok(dataset)
    }

    /// Ensure a snapshot, load it and keep the records matching `filter`
    pub fn find(&self, filter: &FilterSpecification) -> ServiceResult<TabularDataset> {
        let snapshot = self.ensure_snapshot()?;
        let dataset = self.load(&snapshot)?;
        let total = dataset.len();

        if filter.is_empty() {
            tracing::warn!("No query predicates specified, returning the entire dataset");
        }

        let matched = filter::apply(filter, dataset)?;
        tracing::info!(matched = matched.len(), total, "Filtered VDJdb records");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ServiceError, SourceConfig};
    use crate::testing::{gzip_bytes, seed_snapshot, zip_bytes, SAMPLE_TSV};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Query service whose acquirer points at `server`
    fn service(server: &mockito::ServerGuard, cache_path: PathBuf) -> QueryService {
        let config = SourceConfig {
            url: format!("{}/releases/latest", server.url()),
            ..SourceConfig::default()
        };
        let acquirer = AcquireService::from_config(&config, cache_path).unwrap();
        QueryService::new(acquirer, LoadOptions::default())
    }

    #[test]
    fn ensure_snapshot_uses_existing_cache_without_network() {
        let mut server = mockito::Server::new();
        let listing = server.mock("GET", mockito::Matcher::Any).expect(0).create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.gz");
        seed_snapshot(&cache_path, &gzip_bytes(SAMPLE_TSV));

        let snapshot = service(&server, cache_path.clone()).ensure_snapshot().unwrap();

        listing.assert();
        assert_eq!(snapshot.path, cache_path);
    }

    #[test]
    fn ensure_snapshot_acquires_when_missing() {
        let mut server = mockito::Server::new();
        let body = format!(
            r#"{{"tag_name": "t", "assets": [{{"name": "db.zip", "browser_download_url": "{}/db.zip"}}]}}"#,
            server.url()
        );
        let listing = server
            .mock("GET", "/releases/latest")
            .with_body(body)
            .expect(1)
            .create();
        let artifact = server
            .mock("GET", "/db.zip")
            .with_body(zip_bytes("vdjdb.slim.txt", SAMPLE_TSV))
            .expect(1)
            .create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.zip");
        let query = service(&server, cache_path.clone());
        assert_eq!(query.cache_path(), cache_path);

        let matched = query
            .find(&FilterSpecification::new().with("epitope", ["B"]))
            .unwrap();
        // the snapshot just acquired is found on the next query
        query
            .find(&FilterSpecification::new().with("epitope", ["A"]))
            .unwrap();

        listing.assert();
        artifact.assert();
        assert!(cache_path.exists());
        assert_eq!(matched.rows(), &[vec!["B", "XYZ", "TRA"]]);
    }

    #[test]
    fn find_applies_and_or_semantics() {
        let server = mockito::Server::new();
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.gz");
        seed_snapshot(&cache_path, &gzip_bytes(SAMPLE_TSV));
        let query = service(&server, cache_path);

        let both = query
            .find(
                &FilterSpecification::new()
                    .with("epitope", ["A"])
                    .with("gene", ["TRB"]),
            )
            .unwrap();
        assert_eq!(
            both.rows(),
            &[vec!["A", "XYZ", "TRB"], vec!["A", "QRS", "TRB"]]
        );

        let either = query
            .find(&FilterSpecification::new().with("epitope", ["A", "B"]))
            .unwrap();
        assert_eq!(either.len(), 3);
    }

    #[test]
    fn find_with_empty_filter_returns_everything() {
        let server = mockito::Server::new();
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.gz");
        seed_snapshot(&cache_path, &gzip_bytes(SAMPLE_TSV));
        let query = service(&server, cache_path.clone());

        let all = query.find(&FilterSpecification::new()).unwrap();
        let loaded = query.load(&CachedSnapshot::new(&cache_path)).unwrap();
        assert_eq!(all, loaded);
    }

    #[test]
    fn unknown_column_leaves_cache_unmodified() {
        let server = mockito::Server::new();
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.gz");
        let bytes = gzip_bytes(SAMPLE_TSV);
        seed_snapshot(&cache_path, &bytes);
        let modified = std::fs::metadata(&cache_path).unwrap().modified().unwrap();

        let err = service(&server, cache_path.clone())
            .find(&FilterSpecification::new().with("antigen.species", ["CMV"]))
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::UnknownColumn { ref column, .. } if column == "antigen.species"
        ));
        assert_eq!(std::fs::read(&cache_path).unwrap(), bytes);
        assert_eq!(
            std::fs::metadata(&cache_path).unwrap().modified().unwrap(),
            modified
        );
    }

    #[test]
    fn corrupt_cache_is_parse_error() {
        let server = mockito::Server::new();
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.zip");
        seed_snapshot(&cache_path, b"PK\x03\x04 definitely not an archive");

        let err = service(&server, cache_path)
            .find(&FilterSpecification::new())
            .unwrap_err();
        assert!(matches!(err, ServiceError::Parse { .. }));
    }

    #[test]
    fn load_normalizes_segments_when_enabled() {
        let server = mockito::Server::new();
        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.gz");
        seed_snapshot(
            &cache_path,
            &gzip_bytes("gene\tv.segm\tj.segm\nTRA\tTRAV8-1\tTRAJ9\n"),
        );

        let config = SourceConfig {
            url: format!("{}/releases/latest", server.url()),
            ..SourceConfig::default()
        };
        let acquirer = AcquireService::from_config(&config, cache_path).unwrap();
        let options = LoadOptions {
            normalize_segments: true,
            ..LoadOptions::default()
        };
        let query = QueryService::new(acquirer, options);

        let matched = query
            .find(&FilterSpecification::new().with("v.segm", ["TCRAV08-01"]))
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.get(0, "j.segm"), Some("TCRAJ09"));
    }
}
