//! Retrieval of a previous build's hit logs from the CI artifact store.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;

use crate::hitlog::{COMMIT_MARKER, HitLogDir};
use crate::{EhMetricsError, Result};

use super::LOG_TARGET;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Placeholder replaced by the build number in artifact URL templates.
pub const BUILD_PLACEHOLDER: &str = "{build}";

/// HTTP abstraction for dependency injection.
pub trait ArtifactFetcher {
    /// Download the body at `url`.
    ///
    /// # Errors
    /// Returns an error if the request fails or the status is not 2xx.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production fetcher using reqwest.
#[derive(Debug, Default)]
pub struct ReqwestFetcher;

#[cfg(not(tarpaulin_include))]
impl ArtifactFetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EhMetricsError::Http(format!("Failed to create HTTP client: {e}")))?;

        let response = client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                EhMetricsError::Http(format!("Request timeout fetching {url}"))
            } else if e.is_connect() {
                EhMetricsError::Http(format!("Failed to connect to {url}"))
            } else {
                EhMetricsError::Http(format!("Failed to fetch {url}: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EhMetricsError::Http(format!("Failed to fetch {url}: HTTP {status}")));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| EhMetricsError::Http(format!("Failed to read response from {url}: {e}")))
    }
}

/// Artifact URL for `build`.
///
/// # Errors
/// Returns an error if the template is not an http(s) URL.
pub fn artifact_url(template: &str, build: &str) -> Result<String> {
    if !(template.starts_with("http://") || template.starts_with("https://")) {
        return Err(EhMetricsError::Config(format!(
            "Invalid artifact URL (must start with http:// or https://): {template}"
        )));
    }
    Ok(template.replace(BUILD_PLACEHOLDER, build))
}

/// Unpack a zipped hit log directory into `dest`, replacing its content.
/// Entries are flattened to their file names.
///
/// # Errors
/// Returns an error if the archive is invalid or `dest` cannot be written.
pub fn unpack_logs(bytes: &[u8], dest: &Path) -> Result<HitLogDir> {
    let archive_error = |source| EhMetricsError::Archive {
        path: dest.to_path_buf(),
        source,
    };
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;

    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_error)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(ToOwned::to_owned))
        else {
            log::warn!(target: LOG_TARGET, "Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        fs::write(dest.join(name), content)?;
    }
    Ok(HitLogDir::at(dest))
}

/// Fail unless the logs in `logs` were produced at `expected`.
///
/// # Errors
/// Returns [`EhMetricsError::CommitMismatch`] on a missing or different
/// `.commit` marker.
pub fn verify_commit(logs: &HitLogDir, expected: &str) -> Result<()> {
    let actual = logs.commit().unwrap_or_else(|| format!("<no {COMMIT_MARKER}>"));
    if actual == expected {
        Ok(())
    } else {
        Err(EhMetricsError::CommitMismatch {
            dir: logs.path().to_path_buf(),
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Download the hit logs of `build` into `dest`, verified against
/// `expected_commit` when given.
///
/// # Errors
/// Returns an error if the download, unpacking, or verification fails.
pub fn download_logs(
    fetcher: &dyn ArtifactFetcher,
    template: &str,
    build: &str,
    expected_commit: Option<&str>,
    dest: &Path,
) -> Result<HitLogDir> {
    let url = artifact_url(template, build)?;
    log::info!(target: LOG_TARGET, "Downloading hit logs of build {build} from {url}");
    let bytes = fetcher.fetch(&url)?;
    let logs = unpack_logs(&bytes, dest)?;
    if let Some(expected) = expected_commit {
        verify_commit(&logs, expected)?;
    }
    Ok(logs)
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
