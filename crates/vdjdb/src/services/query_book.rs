use super::types::{FilterSpecification, FilterValue};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(FilterValue),
    Many(Vec<FilterValue>),
}

/// Named filter specifications read from a TOML file.
///
/// Each top-level table is one query; its keys are column names and its
/// values a scalar or an array of accepted values:
///
/// ```toml
/// [flu_m1]
/// epitope = "GILGFVFTL"
/// gene = ["TRA", "TRB"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBook {
    queries: Vec<(String, FilterSpecification)>,
}

impl QueryBook {
    /// Load a query file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid query file {}", path.display()))
    }

    /// Parse query file contents, keeping the order queries appear in
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content).context("Failed to parse TOML")?;

        let mut queries = Vec::with_capacity(table.len());
        for (id, value) in table {
            if !value.is_table() {
                return Err(anyhow::anyhow!("Query '{}' must be a table of column = value(s)", id));
            }

            let predicates: BTreeMap<String, OneOrMany> = value.try_into().with_context(|| {
                format!("Query '{}' has values that are not strings or numbers", id)
            })?;

            let mut filter = FilterSpecification::new();
            for (column, values) in predicates {
                let values = match values {
                    OneOrMany::One(value) => vec![value],
                    OneOrMany::Many(values) => values,
                };
                if values.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Query '{}' lists no accepted values for column '{}'",
                        id,
                        column
                    ));
                }
                filter = filter.with(&column, values);
            }

            queries.push((id, filter));
        }

        Ok(Self { queries })
    }

    pub fn get(&self, id: &str) -> Option<&FilterSpecification> {
        self.queries.iter().find(|(qid, _)| qid == id).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterSpecification)> {
        self.queries.iter().map(|(id, f)| (id.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
