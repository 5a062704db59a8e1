use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use super::{GateReport, LOG_TARGET};
use crate::Result;
use crate::ledger::{self, Ledger, NoteRefs};
use crate::snapshot::Exclusion;
use crate::state::ensure_parent_dir;

const JUSTIFICATION_ATTEMPTS: usize = 3;

/// Source of answers for the interactive acceptance flow.
pub trait Prompter {
    /// Ask `question`; `None` once input is exhausted.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be read.
    fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// Asks on stderr and reads answers from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{question} ")?;
        stderr.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

pub struct ResolveContext<'a> {
    pub ledger: &'a dyn Ledger,
    pub refs: &'a NoteRefs,
    pub failure_marker: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Passed,
    /// Regressions were accepted with an exclusion on `commit`.
    Accepted { commit: String },
    Failed { message: String },
}

impl GateOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Turn a report into an outcome.
///
/// Without a prompter a failing report writes the failure marker. With one,
/// the user may accept the regressed values by justifying them, which
/// records an exclusion on HEAD.
///
/// # Errors
/// Returns an error if the marker or the exclusion cannot be written.
pub fn resolve(
    report: &GateReport,
    ctx: &ResolveContext<'_>,
    prompter: Option<&mut dyn Prompter>,
) -> Result<GateOutcome> {
    if report.is_success() {
        clear_marker(ctx.failure_marker);
        return Ok(GateOutcome::Passed);
    }
    let explanation = report.explain();

    let Some(prompter) = prompter else {
        if let Some(marker) = report.failure_marker() {
            ensure_parent_dir(ctx.failure_marker)?;
            fs::write(ctx.failure_marker, marker)?;
            log::debug!(target: LOG_TARGET, "Wrote failure marker {}", ctx.failure_marker.display());
        }
        return Ok(GateOutcome::Failed {
            message: explanation,
        });
    };

    if !ctx.ledger.is_clean_workspace()? {
        return Ok(GateOutcome::Failed {
            message: format!(
                "You have uncommitted changes. Commit first, then run the check again to accept the new values.\n{explanation}"
            ),
        });
    }

    let summary: Vec<String> = report.regressions().map(|c| c.message.clone()).collect();
    let answer = prompter
        .ask(&format!(
            "{}\nAccept these values and record an exclusion? [y/N]",
            summary.join("\n")
        ))?
        .map(|a| a.to_ascii_lowercase());
    if !matches!(answer.as_deref(), Some("y" | "yes")) {
        return Ok(GateOutcome::Failed {
            message: explanation,
        });
    }

    let Some(reason) = ask_justification(prompter)? else {
        return Ok(GateOutcome::Failed {
            message: format!("No justification given; exclusion cancelled.\n{explanation}"),
        });
    };

    let exclusion = report
        .regressions()
        .fold(Exclusion::new(ctx.ledger.committer()?, reason), |e, check| {
            e.with_value(&check.key, check.value)
        });
    let commit = ledger::record_exclusion(ctx.ledger, ctx.refs, &exclusion)?;
    clear_marker(ctx.failure_marker);
    Ok(GateOutcome::Accepted { commit })
}

fn ask_justification(prompter: &mut dyn Prompter) -> Result<Option<String>> {
    for _ in 0..JUSTIFICATION_ATTEMPTS {
        match prompter.ask("Why are these values acceptable?")? {
            Some(reason) if !reason.trim().is_empty() => return Ok(Some(reason.trim().to_string())),
            Some(_) => log::warn!(target: LOG_TARGET, "A justification is required"),
            None => break,
        }
    }
    Ok(None)
}

fn clear_marker(path: &Path) {
    if path.exists()
        && let Err(e) = fs::remove_file(path)
    {
        log::warn!(target: LOG_TARGET, "Cannot remove stale failure marker {}: {e}", path.display());
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
