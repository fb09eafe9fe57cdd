use super::Project;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct FetchArgs {
    /// Only print the artifact the latest release resolves to
    #[arg(long)]
    dry_run: bool,
}

pub fn execute(args: FetchArgs) -> Result<()> {
    let project = Project::open()?;
    let acquirer = project.acquirer()?;

    if args.dry_run {
        let reference = acquirer.resolve_latest_artifact()?;
        println!(
            "Latest release: {}",
            reference.release.as_deref().unwrap_or("unknown")
        );
        println!("  URL: {}", reference.download_url);
        return Ok(());
    }

    let snapshot = acquirer.acquire()?;
    let size = std::fs::metadata(&snapshot.path)?.len();
    println!("Cached VDJdb snapshot at {} ({} bytes)", snapshot.path.display(), size);

    Ok(())
}
