use super::extractor::LinkExtractor;
use crate::services::{RemoteArtifactReference, ServiceError, ServiceResult};
use reqwest::Url;
use serde::Deserialize;

#[derive(Deserialize)]
struct GithubRelease {
    tag_name: Option<String>,
    assets: Vec<GithubAsset>,
}

#[derive(Deserialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
}

/// Reads the GitHub releases API (`/releases/latest`) and picks the first
/// asset whose name ends with the configured suffix.
pub struct GithubReleaseAsset {
    asset_suffix: String,
}

impl GithubReleaseAsset {
    pub fn new(asset_suffix: &str) -> Self {
        Self {
            asset_suffix: asset_suffix.to_string(),
        }
    }
}

impl LinkExtractor for GithubReleaseAsset {
    fn extract(&self, document: &str, listing_url: &Url) -> ServiceResult<RemoteArtifactReference> {
        let fail = |reason: String| ServiceError::Resolution {
            url: listing_url.to_string(),
            reason,
        };

        let release: GithubRelease = serde_json::from_str(document)
            .map_err(|e| fail(format!("unexpected release document: {}", e)))?;

        let asset = release
            .assets
            .iter()
            .find(|a| a.name.ends_with(&self.asset_suffix))
            .ok_or_else(|| {
                fail(format!(
                    "release lists {} assets, none ending with '{}'",
                    release.assets.len(),
                    self.asset_suffix
                ))
            })?;

        let download_url = Url::parse(&asset.browser_download_url).map_err(|e| {
            fail(format!(
                "invalid download url '{}': {}",
                asset.browser_download_url, e
            ))
        })?;

        Ok(RemoteArtifactReference {
            download_url,
            release: release.tag_name,
        })
    }

    fn name(&self) -> &str {
        "github-api"
    }
}
