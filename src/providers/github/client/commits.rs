use reqwest::StatusCode;
use serde::Deserialize;

use super::core::{ensure_success, is_no_content, GitHubClient};
use crate::error::Result;
use crate::models::WeeklyStat;

#[derive(Debug, Deserialize)]
pub struct CommitAuthorDto {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetailDto {
    pub author: Option<CommitAuthorDto>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CommitListItemDto {
    pub sha: String,
    pub commit: CommitDetailDto,
}

/// One answer from the commit-activity endpoint.
#[derive(Debug, PartialEq, Eq)]
pub enum ActivityResponse {
    Ready(Vec<WeeklyStat>),
    /// `202 Accepted`: statistics are still being generated upstream.
    Computing,
}

impl GitHubClient {
    /// Newest commit on the default branch, `None` when the repository has no
    /// commits (an empty list, or `409 Conflict` for an empty repository).
    pub async fn fetch_latest_commit(&self, full_name: &str) -> Result<Option<CommitListItemDto>> {
        let url = self.repo_url(full_name, &["commits"])?;
        let response = self.get(url, &[("per_page", "1")]).await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(None);
        }

        let response = ensure_success("commits", response)?;
        let commits = response.json::<Vec<CommitListItemDto>>().await?;
        Ok(commits.into_iter().next())
    }

    /// Single request against the 52-week activity endpoint. Retrying on
    /// `Computing` is the caller's job.
    pub async fn fetch_commit_activity(&self, full_name: &str) -> Result<ActivityResponse> {
        let url = self.repo_url(full_name, &["stats", "commit_activity"])?;
        let response = self.get(url, &[]).await?;
        if response.status() == StatusCode::ACCEPTED {
            return Ok(ActivityResponse::Computing);
        }

        let response = ensure_success("commit_activity", response)?;
        if is_no_content(&response) {
            return Ok(ActivityResponse::Ready(Vec::new()));
        }
        let weeks = response.json::<Vec<WeeklyStat>>().await?;
        Ok(ActivityResponse::Ready(weeks))
    }
}
