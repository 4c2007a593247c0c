use crate::infra::build_results_repo;
use std::path::PathBuf;
use tracing::info;
use vesta_application::analysis::export_csv;

pub(super) fn run_export(results: PathBuf, out: PathBuf) -> Result<(), String> {
    let repo = build_results_repo(&results)?;
    let records = repo.load_all()?;
    let rows = export_csv(&records, &out)?;
    info!(rows, out = %out.display(), "results exported");
    println!("exported {} run(s) to {}", rows, out.display());
    Ok(())
}

pub(super) fn run_clear(results: PathBuf, yes: bool) -> Result<(), String> {
    if !yes {
        return Err(format!(
            "refusing to clear {} without --yes",
            results.display()
        ));
    }
    let repo = build_results_repo(&results)?;
    repo.clear()?;
    println!("cleared {}", results.display());
    Ok(())
}
