use super::{parse_filters, select_columns, Project};
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct FindArgs {
    /// Accept records whose column equals value (column=value, repeatable)
    #[arg(long = "filter", short = 'f')]
    filters: Vec<String>,

    /// Keep only the complex, gene, CDR3 and V/J segment columns
    #[arg(long)]
    construct_only: bool,

    /// Write matches to <output_dir>/<ID>.tsv instead of stdout
    #[arg(long, value_name = "ID")]
    output: Option<String>,
}

pub fn execute(args: FindArgs) -> Result<()> {
    let project = Project::open()?;
    let filter = parse_filters(&args.filters)?;

    let matched = project.query_service()?.find(&filter)?;
    let matched = select_columns(matched, args.construct_only)?;

    if let Some(query_id) = args.output {
        match project.export_service()?.write(&query_id, &matched)? {
            Some(path) => println!("Wrote {} records to {}", matched.len(), path.display()),
            None => println!("No matching records"),
        }
        return Ok(());
    }

    eprintln!("{} matching records", matched.len());
    vdjdb::export::write_tsv(std::io::stdout().lock(), &matched)?;

    Ok(())
}
