use crate::cli::{CheckArgs, Cli};
use crate::gate::{self, GateOutcome, GateReport, Prompter, ResolveContext, StdinPrompter};
use crate::ledger::{self, GitNotesLedger, NoteRefs};
use crate::output::{JUnitFormatter, OutputFormatter, TextFormatter};
use crate::snapshot::Snapshot;
use crate::{EXIT_CONFIG_ERROR, EXIT_REGRESSION, EXIT_SUCCESS, EhMetricsError, git, state};

use super::context::{LOG_TARGET, ProjectContext, color_choice_to_mode, write_output};

#[must_use]
pub fn run_check(args: &CheckArgs, cli: &Cli) -> i32 {
    match run_check_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

pub(crate) fn run_check_impl(args: &CheckArgs, cli: &Cli) -> crate::Result<i32> {
    // 1. Project, configuration and ledger
    let project = ProjectContext::load(&args.scan.path, args.scan.config.as_deref(), cli.no_config)?;
    if !git::is_repository(&project.root) {
        return Err(EhMetricsError::GitRepoNotFound(project.root.display().to_string()));
    }
    let ledger = project.ledger();
    let refs = project.config.ledger.note_refs();

    // 2. Current values
    let snapshot = match &args.snapshot {
        Some(path) => Snapshot::load(path)?,
        None => project.scan(&args.scan, cli)?,
    };

    // 3. Judge against the baseline
    ledger::sync(&ledger, &refs);
    let baseline = gate::load_baseline(&ledger, &refs)?;
    let filtered = args.scan.filter.as_deref().is_some_and(|f| !f.is_empty());
    let report = gate::evaluate(&snapshot, baseline.as_ref(), filtered);

    // 4. Reports
    write_reports(&report, args, cli, &project)?;

    // 5. Pass, accept or fail
    let marker = state::failure_marker_path(&project.root);
    let ctx = ResolveContext {
        ledger: &ledger,
        refs: &refs,
        failure_marker: &marker,
    };
    let mut stdin = StdinPrompter;
    let prompter: Option<&mut dyn Prompter> = if args.interactive { Some(&mut stdin) } else { None };

    match gate::resolve(&report, &ctx, prompter)? {
        GateOutcome::Passed => {}
        GateOutcome::Accepted { commit } => {
            eprintln!("Exclusion recorded on {commit}.");
        }
        GateOutcome::Failed { message } => {
            eprintln!("{message}");
            return Ok(EXIT_REGRESSION);
        }
    }

    if args.record {
        record(&ledger, &refs, &snapshot, filtered)?;
    }
    Ok(EXIT_SUCCESS)
}

fn write_reports(report: &GateReport, args: &CheckArgs, cli: &Cli, project: &ProjectContext) -> crate::Result<()> {
    let junit_path = args
        .junit
        .clone()
        .unwrap_or_else(|| state::junit_path(&project.root));
    write_output(Some(junit_path.as_path()), &JUnitFormatter.format(report)?, true)?;
    log::debug!(target: LOG_TARGET, "Wrote JUnit report {}", junit_path.display());

    let text = TextFormatter::with_verbose(color_choice_to_mode(cli.color), cli.verbose).format(report)?;
    write_output(None, &text, cli.quiet)
}

fn record(ledger: &GitNotesLedger, refs: &NoteRefs, snapshot: &Snapshot, filtered: bool) -> crate::Result<()> {
    if filtered {
        log::warn!(target: LOG_TARGET, "Not recording a filtered snapshot as the baseline");
        return Ok(());
    }
    let commit = ledger::record_snapshot(ledger, refs, snapshot)?;
    log::info!(target: LOG_TARGET, "Recorded snapshot on {commit}");
    Ok(())
}
