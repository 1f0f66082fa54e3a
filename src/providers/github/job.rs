use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use super::client::GitHubClient;
use super::enrichers::{fetch_language_breakdown, fetch_last_commit, fetch_top_contributors};
use super::options::EnrichOptions;
use super::retry::{ActivityOutcome, ActivityRetry};
use crate::models::{RepoRecord, WeeklyStat};

/// Exclusive handle on one slot of the record list.
pub struct EnrichmentJob<'a> {
    pub index: usize,
    record: &'a mut RepoRecord,
}

impl<'a> EnrichmentJob<'a> {
    pub fn new(index: usize, record: &'a mut RepoRecord) -> Self {
        Self { index, record }
    }

    /// Runs the four enrichers in order. A failing enricher leaves its field
    /// at the zero value and the next one still runs; cancellation skips
    /// whatever has not started yet.
    pub async fn run(
        self,
        client: &GitHubClient,
        options: &EnrichOptions,
        cancel: &CancellationToken,
    ) {
        let Self { index, record } = self;
        let full_name = record.full_name.clone();
        debug!("[{index}] enriching {full_name}");

        if cancel.is_cancelled() {
            return;
        }
        match fetch_last_commit(client, &full_name, options.message_cap).await {
            Ok(Some(commit)) => {
                record.last_commit_at = commit.committed_at;
                record.last_commit_message = Some(commit.message);
            }
            Ok(None) => debug!("{full_name}: no commits"),
            Err(e) => warn!("{full_name}: last commit unavailable: {e}"),
        }

        if cancel.is_cancelled() {
            return;
        }
        match ActivityRetry::new(client, &options.backoff, cancel)
            .run(&full_name)
            .await
        {
            ActivityOutcome::Ready(weeks) => apply_weekly_stats(record, weeks),
            ActivityOutcome::Pending => {
                info!("{full_name}: commit activity still computing, marked pending");
                record.stats_cache_pending = true;
            }
            ActivityOutcome::Failed(e) => warn!("{full_name}: commit activity unavailable: {e}"),
        }

        if cancel.is_cancelled() {
            return;
        }
        match fetch_language_breakdown(client, &full_name).await {
            Ok(languages) => record.language_breakdown = languages,
            Err(e) => warn!("{full_name}: languages unavailable: {e}"),
        }

        if cancel.is_cancelled() {
            return;
        }
        match fetch_top_contributors(client, &full_name, options.contributors_cap).await {
            Ok(contributors) => {
                record.top_contributors = contributors.top;
                record.contributor_count = contributors.count;
            }
            Err(e) => warn!("{full_name}: contributors unavailable: {e}"),
        }
    }
}

fn apply_weekly_stats(record: &mut RepoRecord, weeks: Vec<WeeklyStat>) {
    record.weekly_commits_52w = weeks.iter().map(|week| week.total).collect();
    record.total_commits = record.weekly_commits_52w.iter().sum();
    record.weekly_stats_52w = weeks;
    record.stats_cache_pending = false;
}
