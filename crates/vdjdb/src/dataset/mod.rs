//! In-memory tabular form of a cached snapshot.
//!
//! Columns come from the source header row and carry a type tag computed once
//! at load time, which drives how filter values are compared.

pub mod filter;
pub mod reader;
pub mod segments;

use crate::services::{ServiceError, ServiceResult};
use std::collections::HashMap;

/// Columns describing a TCR construct: complex, locus, CDR3 and V/J segments
pub const CONSTRUCT_COLUMNS: &[&str] = &["complex.id", "gene", "cdr3", "v.segm", "j.segm"];

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

/// Ordered records with a named, typed column set
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    /// Build a dataset from a header and rows, inferring a type per column.
    ///
    /// Callers check that every row has one cell per header name; outside the
    /// crate, datasets come from [`reader::parse_table`].
    pub(crate) fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column {
                kind: infer_type(rows.iter().map(|row| row[i].as_str())),
                name,
            })
            .collect();
        Self::with_columns(columns, rows)
    }

    fn with_columns(columns: Vec<Column>, rows: Vec<Vec<String>>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a column, failing with the list of known names
    pub fn require_column(&self, name: &str) -> ServiceResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ServiceError::UnknownColumn {
                column: name.to_string(),
                available: self.column_names(),
            })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row position and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Keep only rows accepted by `keep`, preserving order and column types
    pub fn retain(mut self, mut keep: impl FnMut(&[String]) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    /// Keep only the named columns, in the order given
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> ServiceResult<TabularDataset> {
        let positions = names
            .iter()
            .map(|name| self.require_column(name.as_ref()))
            .collect::<ServiceResult<Vec<_>>>()?;

        let columns = positions.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Self::with_columns(columns, rows))
    }

    /// Rewrite the values of a text column in place
    pub(crate) fn map_column(&mut self, column: usize, f: impl Fn(&str) -> String) {
        for row in &mut self.rows {
            row[column] = f(&row[column]);
        }
    }
}

/// A column is numeric when it has at least one value and every non-empty
/// value parses as a number.
fn infer_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut seen = false;
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if value.parse::<f64>().is_err() {
            return ColumnType::Text;
        }
        seen = true;
    }
    if seen {
        ColumnType::Numeric
    } else {
        ColumnType::Text
    }
}
