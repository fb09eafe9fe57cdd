use crate::dataset::TabularDataset;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Service for writing query results to TSV files
pub struct ExportService {
    output_dir: PathBuf,
}

impl ExportService {
    /// Create a new export service
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a query's results are written to
    pub fn path_for(&self, query_id: &str) -> PathBuf {
        let stem = slug::slugify(query_id);
        let stem = if stem.is_empty() {
            "query".to_string()
        } else {
            stem
        };
        self.output_dir.join(format!("{}.tsv", stem))
    }

    /// Write `results` for `query_id`, returning the file path.
    ///
    /// Empty results are not written.
    pub fn write(&self, query_id: &str, results: &TabularDataset) -> Result<Option<PathBuf>> {
        if results.is_empty() {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory {}",
                self.output_dir.display()
            )
        })?;

        let path = self.path_for(query_id);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_tsv(file, results).with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(
            query = query_id,
            path = %path.display(),
            rows = results.len(),
            "Wrote query results"
        );
        Ok(Some(path))
    }
}

/// Write a dataset as tab-separated text with a header row
pub fn write_tsv<W: Write>(writer: W, dataset: &TabularDataset) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    writer.write_record(dataset.columns().iter().map(|c| c.name.as_str()))?;
    for row in dataset.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::reader::parse_table;
    use crate::testing::SAMPLE_TSV;
    use tempfile::TempDir;

    #[test]
    fn write_tsv_roundtrips_through_parser() {
        let dataset = parse_table(SAMPLE_TSV).unwrap();
        let mut buffer = Vec::new();
        write_tsv(&mut buffer, &dataset).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, SAMPLE_TSV);
    }

    #[test]
    fn write_creates_slugged_file() {
        let dir = TempDir::new().unwrap();
        let service = ExportService::new(dir.path().join("vdjdb_queries"));
        let dataset = parse_table(SAMPLE_TSV).unwrap();

        let path = service.write("Flu M1 (HLA-A*02)", &dataset).unwrap().unwrap();

        assert_eq!(path, dir.path().join("vdjdb_queries").join("flu-m1-hla-a-02.tsv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE_TSV);
    }

    #[test]
    fn empty_results_are_not_written() {
        let dir = TempDir::new().unwrap();
        let service = ExportService::new(dir.path().join("out"));
        let dataset = parse_table("gene\tcdr3\n").unwrap();

        assert!(service.write("nothing", &dataset).unwrap().is_none());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn path_for_falls_back_when_slug_is_empty() {
        let service = ExportService::new(PathBuf::from("out"));
        assert_eq!(service.path_for("***"), PathBuf::from("out/query.tsv"));
    }
}
