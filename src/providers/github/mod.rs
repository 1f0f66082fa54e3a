mod aggregate;
mod client;
mod coordinator;
mod enrichers;
mod job;
mod options;
mod provider;
mod retry;

pub use options::{EnrichOptions, DEFAULT_WORKERS};
pub use provider::GitHubProvider;
