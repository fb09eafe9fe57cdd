use super::types::{CachedSnapshot, RemoteArtifactReference, SourceConfig};
use super::{ServiceError, ServiceResult};
use crate::source::{create_extractor, LinkExtractor};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("search-vdjdb/", env!("CARGO_PKG_VERSION"));

/// Build the blocking HTTP client used for listing and artifact requests
pub fn http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Produces the local snapshot: resolve the latest artifact, download it and
/// replace the cache file with it.
pub struct AcquireService {
    client: Client,
    listing_url: Url,
    extractor: Arc<dyn LinkExtractor>,
    cache_path: PathBuf,
}

impl AcquireService {
    /// Create a new acquire service
    pub fn new(
        client: Client,
        listing_url: Url,
        extractor: Arc<dyn LinkExtractor>,
        cache_path: PathBuf,
    ) -> Self {
        Self {
            client,
            listing_url,
            extractor,
            cache_path,
        }
    }

    /// Create an acquire service from the source configuration
    pub fn from_config(config: &SourceConfig, cache_path: PathBuf) -> Result<Self> {
        let listing_url = Url::parse(&config.url)
            .with_context(|| format!("Invalid source URL: {}", config.url))?;
        let client = http_client(config.timeout_secs.map(Duration::from_secs))?;
        Ok(Self::new(
            client,
            listing_url,
            create_extractor(config),
            cache_path,
        ))
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Fetch the listing document and let the extractor pick the current artifact
    pub fn resolve_latest_artifact(&self) -> ServiceResult<RemoteArtifactReference> {
        let fail = |reason: String| ServiceError::Resolution {
            url: self.listing_url.to_string(),
            reason,
        };

        tracing::debug!(
            url = %self.listing_url,
            strategy = self.extractor.name(),
            "Fetching release listing"
        );

        let response = self
            .client
            .get(self.listing_url.clone())
            .send()
            .map_err(|e| fail(format!("listing unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("listing returned {}", status)));
        }

        let document = response
            .text()
            .map_err(|e| fail(format!("cannot read listing body: {}", e)))?;

        self.extractor.extract(&document, &self.listing_url)
    }

    /// Download the artifact bytes
    pub fn download(&self, reference: &RemoteArtifactReference) -> ServiceResult<Vec<u8>> {
        let fail = |reason: String| ServiceError::Download {
            url: reference.download_url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(reference.download_url.clone())
            .send()
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("server returned {}", status)));
        }

        let bytes = response
            .bytes()
            .map_err(|e| fail(format!("cannot read body: {}", e)))?;

        if bytes.is_empty() {
            return Err(fail("empty response body".to_string()));
        }

        tracing::debug!(url = %reference.download_url, bytes = bytes.len(), "Downloaded artifact");
        Ok(bytes.to_vec())
    }

    /// Replace the cache file with `bytes`.
    ///
    /// Bytes go to a temporary sibling file that is renamed over the cache
    /// path, so a failed write leaves the previous snapshot untouched.
    pub fn persist(&self, bytes: &[u8]) -> ServiceResult<CachedSnapshot> {
        let fail = |source: std::io::Error| ServiceError::Persistence {
            path: self.cache_path.clone(),
            source,
        };

        let parent = match self.cache_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(fail)?;

        let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(fail)?;
        staged.write_all(bytes).map_err(fail)?;
        staged.as_file().sync_all().map_err(fail)?;
        staged.persist(&self.cache_path).map_err(|e| fail(e.error))?;

        Ok(CachedSnapshot::new(&self.cache_path))
    }

    /// Resolve, download and persist in sequence
    pub fn acquire(&self) -> ServiceResult<CachedSnapshot> {
        let reference = self.resolve_latest_artifact()?;
        tracing::info!(
            release = reference.release.as_deref().unwrap_or("unknown"),
            url = %reference.download_url,
            "Fetching VDJdb release"
        );

        let bytes = self.download(&reference)?;
        let snapshot = self.persist(&bytes)?;

        tracing::info!(
            path = %snapshot.path.display(),
            bytes = bytes.len(),
            "VDJdb snapshot cached"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SourceStrategy;
    use tempfile::TempDir;

    fn release_json(download_url: &str) -> String {
        format!(
            r#"{{"tag_name": "2024-06-13", "assets": [{{"name": "vdjdb-2024-06-13.zip", "browser_download_url": "{}"}}]}}"#,
            download_url
        )
    }

    fn service(server: &mockito::ServerGuard, cache_path: PathBuf) -> AcquireService {
        let config = SourceConfig {
            url: format!("{}/releases/latest", server.url()),
            timeout_secs: Some(5),
            ..SourceConfig::default()
        };
        AcquireService::from_config(&config, cache_path).unwrap()
    }

    #[test]
    fn acquire_writes_downloaded_bytes() {
        let mut server = mockito::Server::new();
        let listing = server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(release_json(&format!("{}/files/vdjdb.zip", server.url())))
            .expect(1)
            .create();
        let artifact = server
            .mock("GET", "/files/vdjdb.zip")
            .with_status(200)
            .with_body("first")
            .expect(1)
            .create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("cache").join("vdjdb.zip");
        let snapshot = service(&server, cache_path.clone()).acquire().unwrap();

        listing.assert();
        artifact.assert();
        assert_eq!(snapshot.path, cache_path);
        assert_eq!(std::fs::read(&cache_path).unwrap(), b"first");
    }

    #[test]
    fn acquire_twice_overwrites_single_file() {
        let mut server = mockito::Server::new();
        let _listing = server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_body(release_json(&format!("{}/files/vdjdb.zip", server.url())))
            .expect(2)
            .create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.zip");
        let acquirer = service(&server, cache_path.clone());

        let first = server
            .mock("GET", "/files/vdjdb.zip")
            .with_body("first download, longer than the second")
            .expect(1)
            .create();
        acquirer.acquire().unwrap();
        first.assert();
        first.remove();

        let second = server
            .mock("GET", "/files/vdjdb.zip")
            .with_body("second")
            .expect(1)
            .create();
        acquirer.acquire().unwrap();
        second.assert();

        assert_eq!(std::fs::read(&cache_path).unwrap(), b"second");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn listing_error_status_is_resolution_error() {
        let mut server = mockito::Server::new();
        let _listing = server
            .mock("GET", "/releases/latest")
            .with_status(503)
            .create();

        let dir = TempDir::new().unwrap();
        let err = service(&server, dir.path().join("vdjdb.zip"))
            .resolve_latest_artifact()
            .unwrap_err();

        match err {
            ServiceError::Resolution { url, reason } => {
                assert!(url.ends_with("/releases/latest"));
                assert!(reason.contains("503"));
            },
            other => panic!("expected resolution error, got {:?}", other),
        }
    }

    #[test]
    fn unreachable_listing_is_resolution_error() {
        let config = SourceConfig {
            // port 9 (discard) is not expected to accept HTTP connections
            url: "http://127.0.0.1:9/releases/latest".to_string(),
            timeout_secs: Some(2),
            ..SourceConfig::default()
        };
        let dir = TempDir::new().unwrap();
        let acquirer = AcquireService::from_config(&config, dir.path().join("vdjdb.zip")).unwrap();

        assert!(matches!(
            acquirer.acquire(),
            Err(ServiceError::Resolution { .. })
        ));
        assert!(!dir.path().join("vdjdb.zip").exists());
    }

    #[test]
    fn changed_markup_fails_without_touching_cache() {
        let mut server = mockito::Server::new();
        let _listing = server
            .mock("GET", "/releases")
            .with_status(200)
            .with_body("<html><body><p>Releases moved</p></body></html>")
            .create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.zip");
        std::fs::write(&cache_path, b"previous").unwrap();

        let config = SourceConfig {
            strategy: SourceStrategy::ReleasePage,
            url: format!("{}/releases", server.url()),
            ..SourceConfig::default()
        };
        let acquirer = AcquireService::from_config(&config, cache_path.clone()).unwrap();

        assert!(matches!(
            acquirer.acquire(),
            Err(ServiceError::Resolution { .. })
        ));
        assert_eq!(std::fs::read(&cache_path).unwrap(), b"previous");
    }

    #[test]
    fn download_failure_keeps_previous_snapshot() {
        let mut server = mockito::Server::new();
        let _listing = server
            .mock("GET", "/releases/latest")
            .with_status(200)
            .with_body(release_json(&format!("{}/files/vdjdb.zip", server.url())))
            .create();
        let _artifact = server
            .mock("GET", "/files/vdjdb.zip")
            .with_status(404)
            .create();

        let dir = TempDir::new().unwrap();
        let cache_path = dir.path().join("vdjdb.zip");
        std::fs::write(&cache_path, b"previous").unwrap();

        let err = service(&server, cache_path.clone()).acquire().unwrap_err();
        match err {
            ServiceError::Download { url, reason } => {
                assert!(url.ends_with("/files/vdjdb.zip"));
                assert!(reason.contains("404"));
            },
            other => panic!("expected download error, got {:?}", other),
        }
        assert_eq!(std::fs::read(&cache_path).unwrap(), b"previous");
    }

    #[test]
    fn empty_download_is_rejected() {
        let mut server = mockito::Server::new();
        let _artifact = server
            .mock("GET", "/files/empty.zip")
            .with_status(200)
            .with_body("")
            .create();

        let dir = TempDir::new().unwrap();
        let acquirer = service(&server, dir.path().join("vdjdb.zip"));
        let reference = RemoteArtifactReference {
            download_url: Url::parse(&format!("{}/files/empty.zip", server.url())).unwrap(),
            release: None,
        };

        assert!(matches!(
            acquirer.download(&reference),
            Err(ServiceError::Download { .. })
        ));
    }

    #[test]
    fn persist_into_unwritable_location_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let acquirer = AcquireService::new(
            Client::new(),
            Url::parse("http://localhost/releases/latest").unwrap(),
            create_extractor(&SourceConfig::default()),
            blocker.join("vdjdb.zip"),
        );

        match acquirer.persist(b"bytes").unwrap_err() {
            ServiceError::Persistence { path, .. } => assert_eq!(path, blocker.join("vdjdb.zip")),
            other => panic!("expected persistence error, got {:?}", other),
        }
    }
}
