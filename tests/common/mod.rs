#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the eh-metrics binary.
#[macro_export]
macro_rules! eh_metrics {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("eh-metrics"))
    };
}

/// Creates a temporary directory with test fixtures for integration tests.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    /// Creates a new test fixture with an empty temp directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a fixture that is a git repository with a committer identity.
    pub fn git_repo() -> Self {
        let fixture = Self::new();
        fixture.git(&["init", "--quiet"]);
        fixture.git(&["config", "user.name", "Dev"]);
        fixture.git(&["config", "user.email", "dev@example.com"]);
        fixture.git(&["config", "commit.gpgsign", "false"]);
        fixture
    }

    /// Creates a file with the given content in the temp directory.
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    /// Returns the path to the temp directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates the project config file.
    pub fn create_config(&self, content: &str) {
        self.create_file(".eh-metrics.toml", content);
    }

    /// Creates a Java source file in the core module using `CacheBuilder` `uses` times.
    pub fn create_cache_user(&self, name: &str, uses: usize) {
        let mut content = String::from("package a;\n\nclass ");
        content.push_str(name);
        content.push_str(" {\n");
        for i in 0..uses {
            content.push_str(&format!("    Object c{i} = CacheBuilder.newBuilder();\n"));
        }
        content.push_str("}\n");
        self.create_file(&format!("core/src/main/java/a/{name}.java"), &content);
    }

    /// Runs git in the fixture and returns its trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .arg("-C")
            .arg(self.path())
            .args(args)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {args:?}: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Stages and commits everything; returns the new HEAD.
    pub fn commit_all(&self, message: &str) -> String {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Note attached to `commit` in `notes_ref`, if any.
    pub fn note(&self, notes_ref: &str, commit: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(["notes", "--ref", notes_ref, "show", commit])
            .output()
            .expect("Failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run state directory inside the repository.
    pub fn state_dir(&self) -> PathBuf {
        self.path().join(".git").join("eh-metrics")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Local-only ledger and source metrics only.
pub const LOCAL_CONFIG: &str = r#"
version = "1"

[metrics]
include_tests = false
include_plugins = false

[ledger]
remote = ""
"#;

/// Writes a hit log for `key` into `dir`, one evidence line per entry.
pub fn write_hit_log(dir: &Path, key: &str, lines: &[&str]) {
    fs::create_dir_all(dir).expect("Failed to create log directory");
    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(dir.join(format!("eh-metrics-hit-for-{key}.log")), content).expect("Failed to write hit log");
}
