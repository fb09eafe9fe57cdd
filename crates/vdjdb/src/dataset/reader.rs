//! Decoding of cached snapshots into a [`TabularDataset`].
//!
//! The container is detected from magic bytes: the upstream ZIP release
//! archive (a named member is read), a GZIP stream, or plain text.

use super::TabularDataset;
use crate::services::{ServiceError, ServiceResult};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Container format of a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Zip,
    Gzip,
    Plain,
}

impl Container {
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) {
            Container::Zip
        } else if bytes.starts_with(GZIP_MAGIC) {
            Container::Gzip
        } else {
            Container::Plain
        }
    }
}

/// Read and parse the snapshot at `path`.
///
/// `member` names the table inside a ZIP archive and is ignored otherwise.
pub fn read_snapshot(path: &Path, member: &str) -> ServiceResult<TabularDataset> {
    let parse_error = |reason: String| ServiceError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = std::fs::read(path).map_err(|e| parse_error(format!("cannot read file: {}", e)))?;
    let text = decode(&bytes, member).map_err(parse_error)?;
    parse_table(&text).map_err(parse_error)
}

fn decode(bytes: &[u8], member: &str) -> Result<String, String> {
    let mut text = String::new();
    match Container::detect(bytes) {
        Container::Zip => {
            let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
                .map_err(|e| format!("invalid zip archive: {}", e))?;
            let mut entry = archive.by_name(member).map_err(|e| match e {
                zip::result::ZipError::FileNotFound => {
                    format!("archive has no member named '{}'", member)
                },
                other => format!("cannot open '{}' in archive: {}", member, other),
            })?;
            entry
                .read_to_string(&mut text)
                .map_err(|e| format!("cannot decompress '{}': {}", member, e))?;
        },
        Container::Gzip => {
            GzDecoder::new(bytes)
                .read_to_string(&mut text)
                .map_err(|e| format!("cannot decompress gzip stream: {}", e))?;
        },
        Container::Plain => {
            text = String::from_utf8(bytes.to_vec())
                .map_err(|e| format!("content is not UTF-8 text: {}", e))?;
        },
    }
    Ok(text)
}

/// Parse tab-delimited text whose first record is the header row
pub fn parse_table(text: &str) -> Result<TabularDataset, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| format!("cannot read header row: {}", e))?
        .iter()
        .map(str::to_string)
        .collect();

    if header.iter().all(|name| name.trim().is_empty()) {
        return Err("missing header row".to_string());
    }

    let mut seen = HashSet::new();
    for name in &header {
        if !seen.insert(name.as_str()) {
            return Err(format!("duplicate column '{}' in header", name));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("malformed record: {}", e))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(TabularDataset::new(header, rows))
}
