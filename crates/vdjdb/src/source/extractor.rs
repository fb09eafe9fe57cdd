use crate::services::{RemoteArtifactReference, ServiceResult};
use reqwest::Url;

/// Strategy for picking the current artifact link out of a listing document.
///
/// Implementations must fail with [`crate::ServiceError::Resolution`] when the
/// markers they rely on are missing rather than guess at a link.
pub trait LinkExtractor: Send + Sync {
    /// Select the latest artifact from the fetched listing body
    fn extract(&self, document: &str, listing_url: &Url) -> ServiceResult<RemoteArtifactReference>;

    /// Short strategy name for logs
    fn name(&self) -> &str;
}
