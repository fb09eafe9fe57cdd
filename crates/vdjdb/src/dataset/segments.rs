//! V/J segment renaming into zero-padded `TCR` nomenclature.
//!
//! VDJdb reports IMGT names such as `TRAV8-1`; some downstream tools expect
//! `TCRAV08-01`. Single-digit family and member numbers are padded, longer
//! numbers are left alone.

use super::TabularDataset;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Columns holding V and J segment names
pub const SEGMENT_COLUMNS: &[&str] = &["v.segm", "j.segm"];

static LOCUS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T(R[ABVJ]+)").expect("valid locus pattern"));
static FAMILY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([TCRABVJ]+)(\d+)").expect("valid family pattern"));
static MEMBER_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)").expect("valid member pattern"));

/// Rename one segment, e.g. `TRBV7-2*01` to `TCRBV07-02*01`
pub fn normalize_segment(name: &str) -> String {
    let name = LOCUS_PREFIX.replacen(name, 1, "TC$1");
    let name = FAMILY_NUMBER.replace_all(&name, |caps: &Captures| {
        pad_single_digit(&caps[1], &caps[2])
    });
    let name = MEMBER_NUMBER.replace_all(&name, |caps: &Captures| pad_single_digit("-", &caps[1]));
    name.into_owned()
}

fn pad_single_digit(prefix: &str, digits: &str) -> String {
    if digits.len() == 1 {
        format!("{}0{}", prefix, digits)
    } else {
        format!("{}{}", prefix, digits)
    }
}

/// Rename the segment columns present in the dataset
pub fn normalize_dataset(dataset: &mut TabularDataset) {
    for column in SEGMENT_COLUMNS {
        if let Some(index) = dataset.column_index(column) {
            dataset.map_column(index, normalize_segment);
        }
    }
}
