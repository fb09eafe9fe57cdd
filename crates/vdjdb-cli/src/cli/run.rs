use super::{select_columns, Project};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use vdjdb::services::QueryBook;

#[derive(Args)]
pub struct RunArgs {
    /// TOML file of named queries
    query_file: PathBuf,

    /// Write each query's matches to <output_dir>/<query>.tsv
    #[arg(long)]
    output: bool,

    /// Keep only the complex, gene, CDR3 and V/J segment columns
    #[arg(long)]
    construct_only: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let book = QueryBook::load(&args.query_file)?;
    if book.is_empty() {
        println!("No queries in {}", args.query_file.display());
        return Ok(());
    }

    let project = Project::open()?;
    let query_service = project.query_service()?;
    let export = project.export_service()?;

    // Acquire at most once, then reuse the loaded table for every query
    let snapshot = query_service.ensure_snapshot()?;
    let dataset = query_service.load(&snapshot)?;

    for (id, filter) in book.iter() {
        let matched = vdjdb::dataset::filter::apply(filter, dataset.clone())?;
        let matched = select_columns(matched, args.construct_only)?;
        tracing::info!(query = id, filter = %filter, hits = matched.len(), "Query complete");

        if !args.output {
            println!("{}: {} hits", id, matched.len());
            continue;
        }

        match export.write(id, &matched)? {
            Some(path) => println!("{}: {} hits -> {}", id, matched.len(), path.display()),
            None => println!("{}: 0 hits", id),
        }
    }

    Ok(())
}
