//! Test utilities for the vdjdb crate
//!
//! Fixture builders for snapshot containers and a link extractor that
//! always answers with a fixed URL.

use crate::services::{RemoteArtifactReference, ServiceResult};
use crate::source::LinkExtractor;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::Url;
use std::io::{Cursor, Write};
use std::path::Path;

/// Three records over `epitope`, `cdr3` and `gene`
pub const SAMPLE_TSV: &str = "epitope\tcdr3\tgene\nA\tXYZ\tTRB\nB\tXYZ\tTRA\nA\tQRS\tTRB\n";

/// Gzip-compress `text`
pub fn gzip_bytes(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Build a ZIP archive holding `text` under `member`
pub fn zip_bytes(member: &str, text: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(member, zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(text.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Write a snapshot file, creating parent directories
pub fn seed_snapshot(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

/// Extractor that ignores the listing and returns a fixed artifact URL
pub struct FixedExtractor {
    url: Url,
}

impl FixedExtractor {
    pub fn new(url: &str) -> Self {
        Self {
            url: Url::parse(url).unwrap(),
        }
    }
}

impl LinkExtractor for FixedExtractor {
    fn extract(
        &self,
        _document: &str,
        _listing_url: &Url,
    ) -> ServiceResult<RemoteArtifactReference> {
        Ok(RemoteArtifactReference {
            download_url: self.url.clone(),
            release: Some("fixture".to_string()),
        })
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
