//! Job fan-in and the overall outcome.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use super::dispatch::LaunchedJob;
use crate::error::{Error, JobFailure, Result, TransferError};
use crate::types::{BuildId, DownloadSummary, Event, SkippedArtifact, TransferOutcome};

/// Wait for every launched job, returning outcomes in launch order.
///
/// A failing job never cancels its siblings. A panicked or cancelled task is
/// recorded as [`TransferError::Aborted`].
pub(crate) async fn join_jobs(launched: Vec<LaunchedJob>) -> Vec<TransferOutcome> {
    let (names, handles): (Vec<_>, Vec<_>) = launched
        .into_iter()
        .map(|job| (job.artifact, job.handle))
        .unzip();

    let joined = futures::future::join_all(handles).await;

    names
        .into_iter()
        .zip(joined)
        .map(|(artifact, joined)| {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(artifact = %artifact, error = %e, "transfer task aborted");
                    Err(TransferError::Aborted(e.to_string()))
                }
            };
            TransferOutcome { artifact, result }
        })
        .collect()
}

/// Parameters for [`summarize`]
pub(crate) struct SummaryParams<'a> {
    pub build_id: BuildId,
    pub pattern: String,
    pub outcomes: Vec<TransferOutcome>,
    pub skipped: Vec<SkippedArtifact>,
    pub started_at: DateTime<Utc>,
    pub event_tx: &'a broadcast::Sender<Event>,
}

/// Reduce job outcomes to the download result.
///
/// Succeeds only when every job succeeded (vacuously with no jobs). Otherwise
/// every failure is reported, in launch order.
pub(crate) fn summarize(params: SummaryParams<'_>) -> Result<DownloadSummary> {
    let SummaryParams {
        build_id,
        pattern,
        outcomes,
        skipped,
        started_at,
        event_tx,
    } = params;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    let succeeded = outcomes.len() - failed;

    event_tx
        .send(Event::DownloadFinished {
            succeeded,
            failed,
            skipped: skipped.len(),
        })
        .ok();

    if failed > 0 {
        let failures: Vec<JobFailure> = outcomes
            .into_iter()
            .filter_map(|o| match o.result {
                Ok(_) => None,
                Err(error) => Some(JobFailure {
                    artifact: o.artifact,
                    error,
                }),
            })
            .collect();
        tracing::error!(build_id = build_id.0, failed, succeeded, "download failed");
        return Err(Error::TransfersFailed { failures });
    }

    let summary = DownloadSummary {
        build_id,
        pattern,
        outcomes,
        skipped,
        started_at,
        finished_at: Utc::now(),
    };
    tracing::info!(
        build_id = build_id.0,
        artifacts = succeeded,
        skipped = summary.skipped.len(),
        items = summary.total_items(),
        bytes = summary.total_bytes(),
        "download completed"
    );
    Ok(summary)
}
