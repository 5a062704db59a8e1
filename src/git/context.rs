//! Git context helpers for capturing repository state.

use std::path::Path;

/// Git repository context at a point in time.
///
/// Contains the full commit hash and optionally the branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitContext {
    /// Full commit hash of HEAD; ledger notes are keyed by it.
    pub commit: String,
    /// Branch name if on a branch (None for detached HEAD)
    pub branch: Option<String>,
}

impl GitContext {
    /// Short hash length (7 characters, Git's default for short SHA)
    const SHORT_HASH_LEN: usize = 7;

    /// Get current git context for a repository at the given path.
    ///
    /// Returns `None` if:
    /// - Path is not in a git repository
    /// - Repository has no commits
    /// - Any git operation fails
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let repo = gix::discover(path).ok()?;
        let head_commit = repo.head_commit().ok()?;
        let commit = head_commit.id().to_string();

        // Get current branch name (None if detached HEAD)
        let branch = repo
            .head_name()
            .ok()
            .flatten()
            .map(|name| name.shorten().to_string());

        Some(Self { commit, branch })
    }

    /// Abbreviated commit hash for messages.
    #[must_use]
    pub fn short_commit(&self) -> &str {
        self.commit.get(..Self::SHORT_HASH_LEN).unwrap_or(&self.commit)
    }
}

/// Whether `path` is inside a git work tree.
#[must_use]
pub fn is_repository(path: &Path) -> bool {
    gix::discover(path).is_ok()
}
