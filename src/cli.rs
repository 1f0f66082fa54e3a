use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::auth::Token;
use crate::models::EnrichedReport;
use crate::providers::github::{EnrichOptions, GitHubProvider, DEFAULT_WORKERS};

const INDEX_FILE: &str = "repos_index_enriched.json";
const SUMMARY_FILE: &str = "repos_summary.json";

#[derive(Parser)]
#[command(name = "repolens")]
#[command(author, version, about = "Repository Insights Tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the two JSON artifacts are written to
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect and enrich every repository visible to a GitHub token
    Github {
        /// GitHub API token
        #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// GitHub API base URL
        #[arg(short, long, default_value = "https://api.github.com")]
        url: String,

        /// Number of repositories enriched concurrently
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Stop dispatching enrichment after this many seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Repository affiliations to list
        #[arg(long, default_value = "owner,collaborator,organization_member")]
        affiliation: String,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Github {
                token,
                url,
                workers,
                timeout,
                deadline,
                affiliation,
            } => {
                let token = Token::parse(token)?;
                let options = EnrichOptions::default().with_workers(*workers);
                let provider = GitHubProvider::new(
                    url,
                    token,
                    Duration::from_secs(*timeout),
                    options,
                    affiliation.clone(),
                )?;

                let cancel = CancellationToken::new();
                spawn_cancel_triggers(&cancel, deadline.map(Duration::from_secs));

                let report = provider.collect_insights(&cancel).await?;
                self.write_report(&report)?;
                log_stats(&report);

                Ok(())
            }
        }
    }

    fn write_report(&self, report: &EnrichedReport) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;

        let index_path = self.output_dir.join(INDEX_FILE);
        let summary_path = self.output_dir.join(SUMMARY_FILE);
        self.write_json(&index_path, &report.repos)?;
        self.write_json(&summary_path, &report.summary)?;

        info!("Repository index written to: {}", index_path.display());
        info!("Summary written to: {}", summary_path.display());
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json_output = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        std::fs::write(path, json_output)?;
        Ok(())
    }
}

/// Cancels on Ctrl-C, and after `deadline` when one is given.
fn spawn_cancel_triggers(cancel: &CancellationToken, deadline: Option<Duration>) {
    if let Some(deadline) = deadline {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            warn!("Deadline of {deadline:?} reached, stopping enrichment");
            cancel.cancel();
        });
    }

    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping enrichment");
            cancel.cancel();
        }
    });
}

fn log_stats(report: &EnrichedReport) {
    let summary = &report.summary;
    info!("Repositories: {}", report.repos.len());
    info!("Total stars: {}", summary.engagement.total_stars);
    info!("Total commits: {}", summary.engagement.total_commits);
    info!(
        "Stats pending (202): {}",
        summary.enrichment.repos_stats_pending
    );
}
