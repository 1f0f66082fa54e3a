use std::time::Duration;

use super::retry::BackoffTable;

pub const DEFAULT_WORKERS: usize = 6;
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);
pub const COMMIT_MESSAGE_CAP: usize = 100;
pub const CONTRIBUTORS_CAP: usize = 10;

/// Tunables for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Upper bound on jobs running at once.
    pub workers: usize,
    /// Wait after each job before a worker takes the next one.
    pub pacing: Duration,
    pub backoff: BackoffTable,
    pub message_cap: usize,
    /// Contributors page size; also the most contributors kept per record.
    pub contributors_cap: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            pacing: DEFAULT_PACING,
            backoff: BackoffTable::default(),
            message_cap: COMMIT_MESSAGE_CAP,
            contributors_cap: CONTRIBUTORS_CAP,
        }
    }
}

impl EnrichOptions {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
