//! Commit-activity fetch with a fixed backoff schedule.
//!
//! The activity endpoint answers `202 Accepted` while upstream is still
//! generating statistics. The machine below re-requests after each entry of
//! the backoff table; once the table is used up it gives up and marks the
//! record as pending instead of failing.
//!
//! ```text
//! Requesting(n) --200--> Ready
//! Requesting(n) --202--> Computing(n) --sleep table[n]--> Requesting(n + 1)
//! Computing(n), n == table.len --> Pending
//! Requesting(n) --other--> Failed
//! ```

use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use super::client::{ActivityResponse, GitHubClient};
use crate::error::RepoLensError;
use crate::models::WeeklyStat;

const DEFAULT_BACKOFF_MS: [u64; 4] = [700, 1200, 2000, 3000];

/// Ordered waits between attempts. Not randomized, not exponential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffTable(Vec<Duration>);

impl BackoffTable {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self(delays)
    }

    pub fn retries(&self) -> usize {
        self.0.len()
    }

    /// Wait before attempt `attempt + 1`, or `None` once the table is spent.
    pub fn delay(&self, attempt: usize) -> Option<Duration> {
        self.0.get(attempt).copied()
    }
}

impl Default for BackoffTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_BACKOFF_MS
                .iter()
                .copied()
                .map(Duration::from_millis)
                .collect(),
        )
    }
}

/// Terminal states of the machine.
#[derive(Debug)]
pub enum ActivityOutcome {
    Ready(Vec<WeeklyStat>),
    /// Still computing after the last table entry. Not an error.
    Pending,
    /// Any other status, a transport/parse error, or cancellation while waiting.
    Failed(RepoLensError),
}

enum State {
    Requesting { attempt: usize },
    Computing { attempt: usize },
    Done(ActivityOutcome),
}

pub struct ActivityRetry<'a> {
    client: &'a GitHubClient,
    backoff: &'a BackoffTable,
    cancel: &'a CancellationToken,
}

impl<'a> ActivityRetry<'a> {
    pub fn new(
        client: &'a GitHubClient,
        backoff: &'a BackoffTable,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            backoff,
            cancel,
        }
    }

    pub async fn run(&self, full_name: &str) -> ActivityOutcome {
        let mut state = State::Requesting { attempt: 0 };

        loop {
            state = match state {
                State::Requesting { attempt } => {
                    match self.client.fetch_commit_activity(full_name).await {
                        Ok(ActivityResponse::Ready(weeks)) => {
                            State::Done(ActivityOutcome::Ready(weeks))
                        }
                        Ok(ActivityResponse::Computing) => State::Computing { attempt },
                        Err(e) => State::Done(ActivityOutcome::Failed(e)),
                    }
                }
                State::Computing { attempt } => match self.backoff.delay(attempt) {
                    None => State::Done(ActivityOutcome::Pending),
                    Some(delay) => {
                        debug!(
                            "{full_name}: commit activity still computing, retry {}/{} in {delay:?}",
                            attempt + 1,
                            self.backoff.retries()
                        );
                        tokio::select! {
                            () = self.cancel.cancelled() => {
                                State::Done(ActivityOutcome::Failed(RepoLensError::Cancelled))
                            }
                            () = tokio::time::sleep(delay) => State::Requesting { attempt: attempt + 1 },
                        }
                    }
                },
                State::Done(outcome) => return outcome,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::github::testing::{client_for, mock_json, route, weeks_json};

    const ACTIVITY: &str = "/repos/acme/alpha/stats/commit_activity";

    fn fast_table() -> BackoffTable {
        BackoffTable::new(vec![Duration::from_millis(1); 4])
    }

    #[test]
    fn test_default_table_values() {
        let table = BackoffTable::default();

        assert_eq!(table.retries(), 4);
        assert_eq!(table.delay(0), Some(Duration::from_millis(700)));
        assert_eq!(table.delay(1), Some(Duration::from_millis(1200)));
        assert_eq!(table.delay(2), Some(Duration::from_millis(2000)));
        assert_eq!(table.delay(3), Some(Duration::from_millis(3000)));
        assert_eq!(table.delay(4), None);
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_json(&mut server, ACTIVITY, 200, &weeks_json(52)).await;
        let client = client_for(&server);
        let table = fast_table();
        let cancel = CancellationToken::new();

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        mock.assert_async().await;
        let weeks = match outcome {
            ActivityOutcome::Ready(weeks) => weeks,
            other => panic!("expected ready, got {other:?}"),
        };
        assert_eq!(weeks.len(), 52);
    }

    #[tokio::test]
    async fn test_ready_after_computing() {
        let mut server = mockito::Server::new_async().await;
        let computing = server
            .mock("GET", route(ACTIVITY))
            .with_status(202)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let ready = mock_json(&mut server, ACTIVITY, 200, &weeks_json(52)).await;
        let client = client_for(&server);
        let table = fast_table();
        let cancel = CancellationToken::new();

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        computing.assert_async().await;
        ready.assert_async().await;
        assert!(matches!(outcome, ActivityOutcome::Ready(ref weeks) if weeks.len() == 52));
    }

    #[tokio::test]
    async fn test_gives_up_pending_after_table_is_spent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", route(ACTIVITY))
            .with_status(202)
            .with_body("{}")
            .expect(5)
            .create_async()
            .await;
        let client = client_for(&server);
        let table = fast_table();
        let cancel = CancellationToken::new();

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        mock.assert_async().await;
        assert!(matches!(outcome, ActivityOutcome::Pending));
    }

    #[tokio::test]
    async fn test_other_status_fails_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", route(ACTIVITY))
            .with_status(403)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server);
        let table = fast_table();
        let cancel = CancellationToken::new();

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        mock.assert_async().await;
        assert!(matches!(outcome, ActivityOutcome::Failed(RepoLensError::Api(_))));
    }

    #[tokio::test]
    async fn test_no_content_is_ready_and_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", route(ACTIVITY))
            .with_status(204)
            .create_async()
            .await;
        let client = client_for(&server);
        let table = fast_table();
        let cancel = CancellationToken::new();

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        assert!(matches!(outcome, ActivityOutcome::Ready(ref weeks) if weeks.is_empty()));
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_fails() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", route(ACTIVITY))
            .with_status(202)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let client = client_for(&server);
        let table = BackoffTable::new(vec![Duration::from_secs(60); 4]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let outcome = ActivityRetry::new(&client, &table, &cancel)
            .run("acme/alpha")
            .await;

        mock.assert_async().await;
        assert!(matches!(outcome, ActivityOutcome::Failed(RepoLensError::Cancelled)));
    }
}
