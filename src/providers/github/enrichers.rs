//! Per-record field fetchers. Each one is independent of the others and
//! reports its own error; the job decides what a failure means for the record.

use indexmap::IndexMap;
use log::debug;

use super::client::GitHubClient;
use crate::error::Result;
use crate::models::Contributor;

const ELLIPSIS: &str = "...";

#[derive(Debug, PartialEq, Eq)]
pub struct LastCommit {
    pub committed_at: Option<String>,
    pub message: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Contributors {
    pub top: Vec<Contributor>,
    /// Number of contributors returned. A full page reports the cap, so the
    /// real total may be higher.
    pub count: usize,
}

/// `None` when the repository has no commits yet.
pub async fn fetch_last_commit(
    client: &GitHubClient,
    full_name: &str,
    message_cap: usize,
) -> Result<Option<LastCommit>> {
    let Some(item) = client.fetch_latest_commit(full_name).await? else {
        return Ok(None);
    };
    debug!("{full_name}: last commit {}", item.sha);

    Ok(Some(LastCommit {
        committed_at: item.commit.author.and_then(|author| author.date),
        message: truncate_message(&item.commit.message, message_cap),
    }))
}

/// Cuts `message` to `cap` characters and appends `...` if anything was cut.
pub fn truncate_message(message: &str, cap: usize) -> String {
    match message.char_indices().nth(cap) {
        Some((byte_offset, _)) => format!("{}{ELLIPSIS}", &message[..byte_offset]),
        None => message.to_string(),
    }
}

/// `None` when upstream reports no languages.
pub async fn fetch_language_breakdown(
    client: &GitHubClient,
    full_name: &str,
) -> Result<Option<IndexMap<String, u64>>> {
    let languages = client.fetch_languages(full_name).await?;
    Ok((!languages.is_empty()).then_some(languages))
}

pub async fn fetch_top_contributors(
    client: &GitHubClient,
    full_name: &str,
    cap: usize,
) -> Result<Contributors> {
    let mut top = client.fetch_contributors(full_name, cap).await?;
    top.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    top.truncate(cap);

    let count = top.len();
    Ok(Contributors { top, count })
}
