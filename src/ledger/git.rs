//! Ledger backed by `git notes`.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{AnnotatedCommit, HistoryOrder, LOG_TARGET, Ledger};
use crate::git::GitContext;
use crate::{EhMetricsError, Result};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: u8 = 0x1e;
const LOG_FORMAT: &str = "--format=%H%x1f%cn <%ce>%x1f%ct%x1f%N%x1e";

/// Strips `GIT_DIR` and `GIT_WORK_TREE` so the explicit `-C` path wins.
fn git_cmd() -> Command {
    let mut cmd = Command::new("git");
    cmd.env_remove("GIT_DIR").env_remove("GIT_WORK_TREE");
    cmd
}

/// `refs/notes/<name>` for a bare note ref name.
#[must_use]
pub fn full_ref(notes_ref: &str) -> String {
    if notes_ref.starts_with("refs/") {
        notes_ref.to_string()
    } else {
        format!("refs/notes/{notes_ref}")
    }
}

/// Notes stored in the repository at `dir`, synced with `remote`.
#[derive(Debug, Clone)]
pub struct GitNotesLedger {
    dir: PathBuf,
    remote: Option<String>,
}

impl GitNotesLedger {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, remote: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            remote: remote.filter(|r| !r.is_empty()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn command(&self) -> Command {
        let mut cmd = git_cmd();
        cmd.arg("-C").arg(&self.dir);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| EhMetricsError::Git(format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(EhMetricsError::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether HEAD names a commit. An unborn HEAD in a repository is
    /// `false`; outside a repository this is an error.
    fn has_head(&self) -> Result<bool> {
        let status = self
            .command()
            .args(["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| EhMetricsError::Git(format!("failed to run git: {e}")))?;
        if status.success() {
            return Ok(true);
        }
        self.run(&["rev-parse", "--git-dir"])?;
        Ok(false)
    }

    fn context(&self) -> Result<GitContext> {
        GitContext::from_path(&self.dir)
            .ok_or_else(|| EhMetricsError::GitRepoNotFound(self.dir.display().to_string()))
    }
}

fn parse_record(record: &str) -> Option<AnnotatedCommit> {
    let mut fields = record.trim_start_matches(['\n', '\r']).splitn(4, FIELD_SEP);
    let hash = fields.next()?.trim();
    let committer = fields.next()?;
    let timestamp = fields.next()?.trim().parse().ok()?;
    let note = fields.next()?.trim();
    if hash.is_empty() || note.is_empty() {
        return None;
    }
    Some(AnnotatedCommit {
        hash: hash.to_string(),
        committer: committer.to_string(),
        timestamp,
        note: note.to_string(),
    })
}

impl Ledger for GitNotesLedger {
    fn fetch_notes(&self, notes_ref: &str) -> Result<bool> {
        let Some(remote) = &self.remote else {
            return Ok(false);
        };
        let full = full_ref(notes_ref);
        let status = self
            .command()
            .args(["fetch", "--quiet", remote, &format!("+{full}:{full}")])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| EhMetricsError::Git(format!("failed to run git: {e}")))?;
        Ok(status.success())
    }

    fn annotated_commits(
        &self,
        notes_ref: &str,
        since: Option<&str>,
        order: HistoryOrder,
        limit: Option<usize>,
    ) -> Result<Vec<AnnotatedCommit>> {
        if !self.has_head()? {
            log::debug!(target: LOG_TARGET, "No commits yet in {}", self.dir.display());
            return Ok(Vec::new());
        }
        let notes = format!("--notes={}", full_ref(notes_ref));
        let mut cmd = self.command();
        cmd.args(["log", "--no-notes", &notes, LOG_FORMAT, "HEAD"]);
        if let Some(since) = since {
            // Everything after `since`, and `since` itself.
            cmd.args(["--not", &format!("{since}^@")]);
        }
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EhMetricsError::Git(format!("failed to run git: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EhMetricsError::Git("git log produced no output stream".to_string()))?;

        let limit = limit.unwrap_or(usize::MAX);
        let mut found = Vec::new();
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        while found.len() < limit {
            buf.clear();
            if reader.read_until(RECORD_SEP, &mut buf)? == 0 {
                break;
            }
            let record = String::from_utf8_lossy(&buf);
            if let Some(commit) = parse_record(record.trim_end_matches(char::from(RECORD_SEP))) {
                found.push(commit);
            }
        }

        if found.len() >= limit {
            let _ = child.kill();
            let _ = child.wait();
        } else {
            let output = child.wait_with_output()?;
            if !output.status.success() {
                return Err(EhMetricsError::Git(format!(
                    "git log failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                )));
            }
        }

        if order == HistoryOrder::OldestFirst {
            found.reverse();
        }
        Ok(found)
    }

    fn put_note(&self, notes_ref: &str, commit: &str, json: &str, force: bool) -> Result<()> {
        let full = full_ref(notes_ref);
        let mut args = vec!["notes", "--ref", full.as_str(), "add"];
        if force {
            args.push("-f");
        }
        args.extend(["-F", "-", commit]);

        let mut child = self
            .command()
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EhMetricsError::Git(format!("failed to run git: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(json.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(EhMetricsError::Git(format!(
                "cannot add note to {commit}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        log::debug!(target: LOG_TARGET, "Wrote note {full} on {commit}");
        Ok(())
    }

    fn push_notes(&self, notes_ref: &str) -> Result<()> {
        let Some(remote) = &self.remote else {
            log::info!(target: LOG_TARGET, "No ledger remote configured; notes kept locally");
            return Ok(());
        };
        let full = full_ref(notes_ref);
        self.run(&["push", "--quiet", remote, &full])?;
        Ok(())
    }

    fn is_clean_workspace(&self) -> Result<bool> {
        let status = self.run(&["status", "--porcelain", "--untracked-files=no"])?;
        Ok(status.trim().is_empty())
    }

    fn current_commit(&self) -> Result<String> {
        Ok(self.context()?.commit)
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.context()?.branch)
    }

    fn committer(&self) -> Result<String> {
        let name = self.run(&["config", "--get", "user.name"])?;
        let email = self.run(&["config", "--get", "user.email"]).unwrap_or_default();
        let (name, email) = (name.trim(), email.trim());
        if email.is_empty() {
            Ok(name.to_string())
        } else {
            Ok(format!("{name} <{email}>"))
        }
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
