//! Running the user-configured build commands.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::{EhMetricsError, Result};

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Run `command` through the platform shell in `dir` and return its stdout
/// followed by its stderr.
///
/// # Errors
/// Returns [`EhMetricsError::ExternalCommand`] if the command cannot be
/// started or exits unsuccessfully.
pub fn run(command: &str, dir: &Path) -> Result<String> {
    let output = shell(command)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| EhMetricsError::ExternalCommand {
            command: command.to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        return Err(EhMetricsError::ExternalCommand {
            command: command.to_string(),
            detail: format!("{} {}", output.status, last.trim()),
        });
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text)
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;
