//! Commit-addressed storage for accepted snapshots and exclusions.
//!
//! Two note channels are kept apart by ref name: one holds the snapshot
//! accepted for a commit, the other the exclusions negotiated on a commit.
//! Notes are only ever added; re-recording the same commit overwrites.

mod git;
#[cfg(test)]
pub(crate) mod memory;

pub use git::GitNotesLedger;

use crate::snapshot::{Exclusion, Snapshot};
use crate::{EhMetricsError, Result};

const LOG_TARGET: &str = "eh_metrics::ledger";

/// A commit carrying a note in some ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedCommit {
    pub hash: String,
    pub committer: String,
    /// Committer timestamp, seconds since the epoch.
    pub timestamp: i64,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOrder {
    OldestFirst,
    NewestFirst,
}

/// Note storage keyed by `(ref, commit)`.
pub trait Ledger {
    /// Update a local note ref from the remote. Returns false when nothing
    /// could be fetched.
    ///
    /// # Errors
    /// Returns an error only if the repository itself is unusable.
    fn fetch_notes(&self, notes_ref: &str) -> Result<bool>;

    /// Annotated commits reachable from HEAD, stopping after `limit` notes.
    ///
    /// With `since`, only commits after it plus `since` itself are listed.
    ///
    /// # Errors
    /// Returns an error if history cannot be read.
    fn annotated_commits(
        &self,
        notes_ref: &str,
        since: Option<&str>,
        order: HistoryOrder,
        limit: Option<usize>,
    ) -> Result<Vec<AnnotatedCommit>>;

    /// Most recent annotated commit reachable from HEAD.
    ///
    /// # Errors
    /// Returns an error if history cannot be read.
    fn latest_annotated(&self, notes_ref: &str) -> Result<Option<AnnotatedCommit>> {
        Ok(self
            .annotated_commits(notes_ref, None, HistoryOrder::NewestFirst, Some(1))?
            .into_iter()
            .next())
    }

    /// # Errors
    /// Returns an error if the note cannot be written.
    fn put_note(&self, notes_ref: &str, commit: &str, json: &str, force: bool) -> Result<()>;

    /// # Errors
    /// Returns an error if the remote rejects the notes.
    fn push_notes(&self, notes_ref: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the status cannot be determined.
    fn is_clean_workspace(&self) -> Result<bool>;

    /// # Errors
    /// Returns an error outside a repository or without commits.
    fn current_commit(&self) -> Result<String>;

    /// # Errors
    /// Returns an error outside a repository.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Identity used to sign exclusions (`Name <email>`).
    ///
    /// # Errors
    /// Returns an error if no identity is configured.
    fn committer(&self) -> Result<String>;
}

/// Ref names of the two note channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRefs {
    pub snapshots: String,
    pub exclusions: String,
}

/// A parsed snapshot note with the commit it annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSnapshot {
    pub commit: AnnotatedCommit,
    pub snapshot: Snapshot,
}

fn parse_snapshot(notes_ref: &str, commit: AnnotatedCommit) -> Result<RecordedSnapshot> {
    let snapshot = serde_json::from_str(&commit.note).map_err(|source| EhMetricsError::MalformedNote {
        notes_ref: notes_ref.to_string(),
        commit: commit.hash.clone(),
        source,
    })?;
    Ok(RecordedSnapshot { commit, snapshot })
}

/// Fetch both channels from the remote, warning when that fails.
pub fn sync(ledger: &dyn Ledger, refs: &NoteRefs) {
    for notes_ref in [&refs.snapshots, &refs.exclusions] {
        match ledger.fetch_notes(notes_ref) {
            Ok(true) => log::debug!(target: LOG_TARGET, "Fetched notes {notes_ref}"),
            Ok(false) => log::debug!(target: LOG_TARGET, "No remote notes fetched for {notes_ref}"),
            Err(e) => log::warn!(target: LOG_TARGET, "Cannot fetch notes {notes_ref}: {e}"),
        }
    }
}

/// The most recently accepted snapshot, if any.
///
/// # Errors
/// Returns [`EhMetricsError::MalformedNote`] if the latest note is not a
/// snapshot; an unreadable baseline is never treated as a missing one.
pub fn latest_snapshot(ledger: &dyn Ledger, refs: &NoteRefs) -> Result<Option<RecordedSnapshot>> {
    ledger
        .latest_annotated(&refs.snapshots)?
        .map(|commit| parse_snapshot(&refs.snapshots, commit))
        .transpose()
}

/// Accepted snapshots, newest `limit` of them, in the requested order.
///
/// # Errors
/// Returns an error if history cannot be read or a note is malformed.
pub fn snapshot_history(
    ledger: &dyn Ledger,
    refs: &NoteRefs,
    order: HistoryOrder,
    limit: Option<usize>,
) -> Result<Vec<RecordedSnapshot>> {
    ledger
        .annotated_commits(&refs.snapshots, None, order, limit)?
        .into_iter()
        .map(|commit| parse_snapshot(&refs.snapshots, commit))
        .collect()
}

/// Exclusions recorded on `since` or any later commit, oldest first.
/// Unparseable exclusion notes are skipped with a warning.
///
/// # Errors
/// Returns an error if history cannot be read.
pub fn exclusions_since(ledger: &dyn Ledger, refs: &NoteRefs, since: &str) -> Result<Vec<Exclusion>> {
    let commits = ledger.annotated_commits(&refs.exclusions, Some(since), HistoryOrder::OldestFirst, None)?;
    let mut exclusions = Vec::with_capacity(commits.len());
    for commit in commits {
        match Exclusion::from_json(&commit.note) {
            Ok(exclusion) => exclusions.push(exclusion),
            Err(e) => log::warn!(
                target: LOG_TARGET,
                "Ignoring malformed exclusion on {}: {e}",
                commit.hash
            ),
        }
    }
    Ok(exclusions)
}

fn record(ledger: &dyn Ledger, notes_ref: &str, json: &str, what: &str) -> Result<String> {
    if !ledger.is_clean_workspace()? {
        return Err(EhMetricsError::DirtyWorkspace {
            what: what.to_string(),
        });
    }
    let commit = ledger.current_commit()?;
    ledger.put_note(notes_ref, &commit, json, true)?;
    ledger.push_notes(notes_ref)?;
    log::info!(target: LOG_TARGET, "Recorded {what} on {commit}");
    Ok(commit)
}

/// Attach `snapshot` to HEAD and push it. Returns the annotated commit.
///
/// # Errors
/// Returns an error if the working tree is dirty or git fails.
pub fn record_snapshot(ledger: &dyn Ledger, refs: &NoteRefs, snapshot: &Snapshot) -> Result<String> {
    record(ledger, &refs.snapshots, &snapshot.to_json()?, "metrics")
}

/// Attach `exclusion` to HEAD and push it. Returns the annotated commit.
///
/// # Errors
/// Returns an error if the working tree is dirty or git fails.
pub fn record_exclusion(ledger: &dyn Ledger, refs: &NoteRefs, exclusion: &Exclusion) -> Result<String> {
    record(ledger, &refs.exclusions, &exclusion.to_json()?, "an exclusion")
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
