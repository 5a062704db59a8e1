use std::time::{SystemTime, UNIX_EPOCH};

use crate::cli::{Cli, ReportArgs, ScanOptions};
use crate::ledger::{self, HistoryOrder};
use crate::output::build_report;
use crate::{EXIT_CONFIG_ERROR, EXIT_SUCCESS, state};

use super::context::{LOG_TARGET, ProjectContext};

const WORKING_TREE: &str = "working-tree";

#[must_use]
pub fn run_report(args: &ReportArgs, cli: &Cli) -> i32 {
    match run_report_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

pub(crate) fn run_report_impl(args: &ReportArgs, cli: &Cli) -> crate::Result<i32> {
    let project = ProjectContext::load(&args.path, args.config.as_deref(), cli.no_config)?;
    let ledger = project.ledger();
    let refs = project.config.ledger.note_refs();
    ledger::sync(&ledger, &refs);

    let max_points = args.max_points.unwrap_or(project.config.report.max_points);
    let limit = history_limit(max_points, args.current);
    let history = ledger::snapshot_history(&ledger, &refs, HistoryOrder::OldestFirst, Some(limit))?;

    let current = if args.current {
        let options = ScanOptions {
            path: args.path.clone(),
            config: args.config.clone(),
            filter: None,
            build_number: None,
        };
        Some(project.scan(&options, cli)?)
    } else {
        None
    };
    let head = project.commit().unwrap_or(WORKING_TREE);
    let data = build_report(&history, current.as_ref().map(|s| (head, s)), unix_now());

    let path = args.output.clone().unwrap_or_else(|| {
        project
            .config
            .report
            .output
            .as_ref()
            .map_or_else(|| state::report_path(&project.root), |p| project.root.join(p))
    });
    data.save(&path)?;
    log::info!(target: LOG_TARGET, "Wrote {} report points to {}", data.points.len(), path.display());
    if !cli.quiet {
        println!("{}", path.display());
    }
    Ok(EXIT_SUCCESS)
}

/// Recorded points to load so the current point, if any, still fits in `max_points`.
fn history_limit(max_points: usize, with_current: bool) -> usize {
    if with_current { max_points.saturating_sub(1) } else { max_points }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
