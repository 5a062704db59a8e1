use crate::cli::{Cli, InvestigateArgs};
use crate::hitlog::HitLogDir;
use crate::investigate::{FailureMarker, ReqwestFetcher, diff_logs, download_logs, strip_prefix};
use crate::{EXIT_CONFIG_ERROR, EXIT_SUCCESS, EhMetricsError, state};

use super::context::{LOG_TARGET, ProjectContext, write_output};

#[must_use]
pub fn run_investigate(args: &InvestigateArgs, cli: &Cli) -> i32 {
    match run_investigate_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

pub(crate) fn run_investigate_impl(args: &InvestigateArgs, cli: &Cli) -> crate::Result<i32> {
    let project = ProjectContext::load(&args.path, args.config.as_deref(), cli.no_config)?;
    let prefix = project.config.metrics.prefix.as_str();
    let marker = FailureMarker::load(&state::failure_marker_path(&project.root))?;

    let keys = select_keys(&args.keys, marker.as_ref(), prefix)?;
    let current = args
        .current
        .as_ref()
        .map_or_else(|| project.hit_logs(), HitLogDir::at);
    let previous = previous_logs(args, marker.as_ref(), &project)?;
    log::info!(
        target: LOG_TARGET,
        "Diffing {} metrics: {} against {}",
        keys.len(),
        previous.path().display(),
        current.path().display()
    );

    let output: String = diff_logs(&previous, &current, &keys)?
        .iter()
        .map(crate::investigate::MetricDiff::render)
        .collect();
    write_output(None, &output, false)?;
    Ok(EXIT_SUCCESS)
}

/// Keys named on the command line, else those of the last failed check.
pub(crate) fn select_keys(
    explicit: &[String],
    marker: Option<&FailureMarker>,
    prefix: &str,
) -> crate::Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit
            .iter()
            .map(|key| strip_prefix(key, prefix).to_string())
            .collect());
    }
    match marker {
        Some(marker) if !marker.keys.is_empty() => Ok(marker.metric_keys(prefix)),
        _ => Err(EhMetricsError::Config(
            "No metric keys given and no failed check to investigate".to_string(),
        )),
    }
}

fn previous_logs(
    args: &InvestigateArgs,
    marker: Option<&FailureMarker>,
    project: &ProjectContext,
) -> crate::Result<HitLogDir> {
    if let Some(dir) = &args.previous {
        return Ok(HitLogDir::at(dir));
    }

    // An explicit build is not the marker's baseline, so its commit is unknown.
    let (build, expected_commit) = match (&args.build, marker) {
        (Some(build), _) => (build.clone(), None),
        (None, Some(marker)) if !marker.build.is_empty() => {
            (marker.build.clone(), Some(marker.commit.as_str()).filter(|c| !c.is_empty()))
        }
        _ => {
            return Err(EhMetricsError::Config(
                "No previous build known; pass --previous or --build".to_string(),
            ));
        }
    };
    let template = project.config.investigate.artifact_url.as_deref().ok_or_else(|| {
        EhMetricsError::Config(
            "No [investigate] artifact_url configured; pass --previous with a log directory".to_string(),
        )
    })?;

    download_logs(
        &ReqwestFetcher,
        template,
        &build,
        expected_commit,
        &state::previous_log_dir(&project.root),
    )
}

#[cfg(test)]
#[path = "investigate_tests.rs"]
mod tests;
