use super::extractor::LinkExtractor;
use crate::services::{RemoteArtifactReference, ServiceError, ServiceResult};
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).expect("valid anchor pattern")
});

const DOWNLOAD_MARKER: &str = "/download/";

/// Scans an HTML releases page for `<a href>` download links.
///
/// Releases are tagged with their `yyyy-mm-dd` build date, so the link with
/// the greatest tag segment after `/download/` is the newest.
pub struct ReleasePageLinks {
    asset_suffix: String,
}

impl ReleasePageLinks {
    pub fn new(asset_suffix: &str) -> Self {
        Self {
            asset_suffix: asset_suffix.to_string(),
        }
    }
}

impl LinkExtractor for ReleasePageLinks {
    fn extract(&self, document: &str, listing_url: &Url) -> ServiceResult<RemoteArtifactReference> {
        let fail = |reason: String| ServiceError::Resolution {
            url: listing_url.to_string(),
            reason,
        };

        let hrefs: Vec<&str> = ANCHOR_HREF
            .captures_iter(document)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        if hrefs.is_empty() {
            return Err(fail(
                "no anchor elements found; the page markup may have changed".to_string(),
            ));
        }

        let latest = hrefs
            .iter()
            .copied()
            .filter(|href| href.contains(DOWNLOAD_MARKER) && href.ends_with(&self.asset_suffix))
            .max_by(|a, b| (release_tag(a), *a).cmp(&(release_tag(b), *b)))
            .ok_or_else(|| {
                fail(format!(
                    "{} links found, none pointing at a '{}' download",
                    hrefs.len(),
                    self.asset_suffix
                ))
            })?;

        let download_url = listing_url
            .join(latest)
            .map_err(|e| fail(format!("invalid download link '{}': {}", latest, e)))?;

        let release = release_tag(latest).map(str::to_string);

        Ok(RemoteArtifactReference {
            download_url,
            release,
        })
    }

    fn name(&self) -> &str {
        "release-page"
    }
}

/// Path segment following `/download/`, the release tag
fn release_tag(href: &str) -> Option<&str> {
    href.split_once(DOWNLOAD_MARKER)
        .and_then(|(_, rest)| rest.split('/').next())
        .filter(|segment| !segment.is_empty())
}
