use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One repository, as listed upstream plus whatever enrichment succeeded.
///
/// Identified by `full_name` (`owner/name`). Enrichment fields start at their
/// zero value and stay there when the corresponding fetch fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    pub full_name: String,
    pub description: String,
    pub private: bool,
    pub fork: bool,
    pub archived: bool,
    pub disabled: bool,
    pub language: String,
    pub topics: Vec<String>,
    pub homepage: String,
    pub default_branch: String,

    pub size_kb: u64,
    pub size_readable: String,

    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,

    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,

    pub html_url: String,

    pub owner_login: String,
    pub owner_type: String,

    pub license: String,

    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_downloads: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_message: Option<String>,
    #[serde(default)]
    pub weekly_commits_52w: Vec<u64>,
    #[serde(default)]
    pub weekly_stats_52w: Vec<WeeklyStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_breakdown: Option<IndexMap<String, u64>>,
    #[serde(default)]
    pub top_contributors: Vec<Contributor>,
    /// Equals `top_contributors.len()`. When the page came back full this is
    /// the page cap, not the true number of contributors.
    #[serde(default)]
    pub contributor_count: usize,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub stats_cache_pending: bool,
}

/// One week of commit activity, oldest week first in a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStat {
    pub total: u64,
    /// Start of the week as a unix timestamp.
    #[serde(rename = "w", default)]
    pub week: i64,
    #[serde(default)]
    pub days: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub login: String,
    pub contributions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub generated_at: String,
    pub repo_counts: RepoCounts,
    pub size: SizeTotals,
    pub engagement: Engagement,
    pub languages: BTreeMap<String, usize>,
    pub topics: BTreeMap<String, usize>,
    pub licenses: BTreeMap<String, usize>,
    pub activity: Activity,
    pub enrichment: EnrichmentCoverage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoCounts {
    pub total: usize,
    pub public: usize,
    pub private: usize,
    pub archived: usize,
    pub forks: usize,
    #[serde(rename = "org_owned_or_member")]
    pub org: usize,
    #[serde(rename = "user_owned")]
    pub user: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeTotals {
    pub total_kb: u64,
    pub human: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_watchers: u64,
    pub total_commits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub most_recent_update: Option<String>,
    pub most_recent_push: Option<String>,
    pub oldest_created: Option<String>,
    pub oldest_update: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentCoverage {
    pub repos_with_last_commit: usize,
    pub repos_with_stats_52w: usize,
    pub repos_with_languages: usize,
    pub repos_with_contributors: usize,
    pub repos_stats_pending: usize,
}

/// Both artifacts of a run.
#[derive(Debug)]
pub struct EnrichedReport {
    pub repos: Vec<RepoRecord>,
    pub summary: Summary,
}
