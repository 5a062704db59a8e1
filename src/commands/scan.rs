use crate::cli::{Cli, ScanArgs};
use crate::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};

use super::context::{LOG_TARGET, ProjectContext, write_output};

#[must_use]
pub fn run_scan(args: &ScanArgs, cli: &Cli) -> i32 {
    match run_scan_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

pub(crate) fn run_scan_impl(args: &ScanArgs, cli: &Cli) -> crate::Result<i32> {
    let project = ProjectContext::load(&args.scan.path, args.scan.config.as_deref(), cli.no_config)?;
    let snapshot = project.scan(&args.scan, cli)?;
    log::info!(
        target: LOG_TARGET,
        "Collected {} metrics, hit logs in {}",
        snapshot.len(),
        project.hit_logs().path().display()
    );

    // The snapshot is the command's result, so --quiet only silences logs.
    write_output(args.output.as_deref(), &snapshot.to_json()?, false)?;
    Ok(EXIT_SUCCESS)
}
