pub mod extractor;
pub mod github;
pub mod release_page;

pub use extractor::LinkExtractor;

use crate::services::{SourceConfig, SourceStrategy};
use std::sync::Arc;

/// Create the link extraction strategy named by configuration
pub fn create_extractor(config: &SourceConfig) -> Arc<dyn LinkExtractor> {
    match config.strategy {
        SourceStrategy::GithubApi => {
            Arc::new(github::GithubReleaseAsset::new(&config.asset_suffix))
        },
        SourceStrategy::ReleasePage => {
            Arc::new(release_page::ReleasePageLinks::new(&config.asset_suffix))
        },
    }
}
