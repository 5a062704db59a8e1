//! In-memory ledger over a linear history, for tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{AnnotatedCommit, HistoryOrder, Ledger};
use crate::{EhMetricsError, Result};

#[derive(Debug, Default)]
pub struct MemoryLedger {
    /// Oldest first; the last entry is HEAD.
    history: RefCell<Vec<String>>,
    notes: RefCell<BTreeMap<(String, String), String>>,
    pub pushed: RefCell<Vec<String>>,
    pub dirty: bool,
    pub committer: String,
}

impl MemoryLedger {
    pub fn with_history(commits: &[&str]) -> Self {
        Self {
            history: RefCell::new(commits.iter().map(|c| (*c).to_string()).collect()),
            committer: "Dev <dev@example.com>".to_string(),
            ..Self::default()
        }
    }

    pub fn commit(&self, hash: &str) {
        self.history.borrow_mut().push(hash.to_string());
    }

    pub fn note(&self, notes_ref: &str, commit: &str) -> Option<String> {
        self.notes
            .borrow()
            .get(&(notes_ref.to_string(), commit.to_string()))
            .cloned()
    }

    pub fn annotate(&self, notes_ref: &str, commit: &str, json: &str) {
        self.notes
            .borrow_mut()
            .insert((notes_ref.to_string(), commit.to_string()), json.to_string());
    }
}

impl Ledger for MemoryLedger {
    fn fetch_notes(&self, _notes_ref: &str) -> Result<bool> {
        Ok(false)
    }

    fn annotated_commits(
        &self,
        notes_ref: &str,
        since: Option<&str>,
        order: HistoryOrder,
        limit: Option<usize>,
    ) -> Result<Vec<AnnotatedCommit>> {
        let history = self.history.borrow();
        let start = match since {
            Some(since) => history
                .iter()
                .position(|c| c == since)
                .ok_or_else(|| EhMetricsError::Git(format!("unknown revision {since}")))?,
            None => 0,
        };
        let mut found: Vec<AnnotatedCommit> = history[start..]
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(i, hash)| {
                self.note(notes_ref, hash).map(|note| AnnotatedCommit {
                    hash: hash.clone(),
                    committer: self.committer.clone(),
                    timestamp: 1_700_000_000 + i64::try_from(start + i).unwrap_or(0) * 60,
                    note,
                })
            })
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        if order == HistoryOrder::OldestFirst {
            found.reverse();
        }
        Ok(found)
    }

    fn put_note(&self, notes_ref: &str, commit: &str, json: &str, force: bool) -> Result<()> {
        if !force && self.note(notes_ref, commit).is_some() {
            return Err(EhMetricsError::Git("note already exists".to_string()));
        }
        self.annotate(notes_ref, commit, json);
        Ok(())
    }

    fn push_notes(&self, notes_ref: &str) -> Result<()> {
        self.pushed.borrow_mut().push(notes_ref.to_string());
        Ok(())
    }

    fn is_clean_workspace(&self) -> Result<bool> {
        Ok(!self.dirty)
    }

    fn current_commit(&self) -> Result<String> {
        self.history
            .borrow()
            .last()
            .cloned()
            .ok_or_else(|| EhMetricsError::Git("no commits".to_string()))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(Some("main".to_string()))
    }

    fn committer(&self) -> Result<String> {
        Ok(self.committer.clone())
    }
}
