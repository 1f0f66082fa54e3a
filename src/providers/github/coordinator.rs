use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::client::GitHubClient;
use super::job::EnrichmentJob;
use super::options::EnrichOptions;
use crate::models::RepoRecord;

const PROGRESS_EVERY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichStats {
    /// Jobs that ran to the end.
    pub completed: usize,
    /// Most jobs observed in flight at once.
    pub peak_in_flight: usize,
}

/// Enriches every record in place with at most `options.workers` jobs in
/// flight, and returns only after every dispatched job has finished.
///
/// `completed` is `records.len()` unless `cancel` fired, in which case
/// undispatched records keep their zero enrichment values.
pub async fn enrich_all(
    client: &GitHubClient,
    records: &mut [RepoRecord],
    options: &EnrichOptions,
    cancel: &CancellationToken,
) -> EnrichStats {
    let total = records.len();
    let workers = options.workers.clamp(1, total.max(1));
    info!("Enriching {total} repositories with {workers} workers...");

    let completed = AtomicUsize::new(0);
    let in_flight = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);

    stream::iter(records.iter_mut().enumerate())
        .take_until(cancel.cancelled())
        .for_each_concurrent(workers, |(index, record)| {
            let (completed, in_flight, peak) = (&completed, &in_flight, &peak);
            async move {
                if cancel.is_cancelled() {
                    return;
                }
                let running = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(running, Ordering::SeqCst);

                EnrichmentJob::new(index, record)
                    .run(client, options, cancel)
                    .await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if done % PROGRESS_EVERY == 0 || done == total {
                    info!("Progress: {done}/{total} repositories enriched");
                }

                // the slot stays taken while pacing
                tokio::select! {
                    () = cancel.cancelled() => {}
                    () = tokio::time::sleep(options.pacing) => {}
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

    let stats = EnrichStats {
        completed: completed.into_inner(),
        peak_in_flight: peak.into_inner(),
    };
    if stats.completed < total {
        warn!(
            "Enrichment stopped early: {}/{total} repositories processed",
            stats.completed
        );
    }
    debug!("peak of {} jobs in flight", stats.peak_in_flight);
    stats
}
