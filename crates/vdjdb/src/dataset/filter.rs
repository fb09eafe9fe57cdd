use super::{ColumnType, TabularDataset};
use crate::services::{FilterSpecification, ServiceResult};
use std::collections::HashSet;

/// Accepted values for one column, coerced to the column's type
enum Matcher {
    Numeric(Vec<f64>),
    Text(HashSet<String>),
}

impl Matcher {
    fn accepts(&self, cell: &str) -> bool {
        match self {
            Matcher::Numeric(accepted) => cell
                .trim()
                .parse::<f64>()
                .map(|value| accepted.contains(&value))
                .unwrap_or(false),
            Matcher::Text(accepted) => accepted.contains(cell),
        }
    }
}

/// A filter resolved against a dataset's columns
pub struct CompiledFilter {
    checks: Vec<(usize, Matcher)>,
}

impl CompiledFilter {
    /// Resolve every predicate column and coerce its values.
    ///
    /// Fails with `UnknownColumn` on the first predicate naming a column the
    /// dataset does not have.
    pub fn compile(filter: &FilterSpecification, dataset: &TabularDataset) -> ServiceResult<Self> {
        let mut checks = Vec::with_capacity(filter.predicates().len());

        for (column, values) in filter.predicates() {
            let index = dataset.require_column(column)?;
            let matcher = match dataset.columns()[index].kind {
                // values that cannot be read as numbers never match a numeric column
                ColumnType::Numeric => {
                    Matcher::Numeric(values.iter().filter_map(|v| v.as_number()).collect())
                },
                ColumnType::Text => Matcher::Text(values.iter().map(|v| v.as_text()).collect()),
            };
            checks.push((index, matcher));
        }

        Ok(Self { checks })
    }

    pub fn matches(&self, row: &[String]) -> bool {
        self.checks
            .iter()
            .all(|(index, matcher)| matcher.accepts(&row[*index]))
    }
}

/// Keep the records matching every predicate, in source order
pub fn apply(
    filter: &FilterSpecification,
    dataset: TabularDataset,
) -> ServiceResult<TabularDataset> {
    let compiled = CompiledFilter::compile(filter, &dataset)?;
    Ok(dataset.retain(|row| compiled.matches(row)))
}
