use super::Project;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct ColumnsArgs {}

pub fn execute(_args: ColumnsArgs) -> Result<()> {
    let project = Project::open()?;
    let query_service = project.query_service()?;

    let snapshot = query_service.ensure_snapshot()?;
    let dataset = query_service.load(&snapshot)?;

    let width = dataset
        .columns()
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);

    for column in dataset.columns() {
        println!("{:width$}  {}", column.name, column.kind, width = width);
    }

    Ok(())
}
