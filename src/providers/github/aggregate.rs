use chrono::{DateTime, SecondsFormat, Utc};

use crate::format::human_size_from_kb;
use crate::models::{Activity, RepoRecord, Summary};

const ORGANIZATION: &str = "Organization";

/// Running min/max over the timestamps that parse as RFC 3339.
#[derive(Default)]
struct TimeRange {
    earliest: Option<DateTime<Utc>>,
    latest: Option<DateTime<Utc>>,
}

impl TimeRange {
    fn observe(&mut self, raw: &str) {
        let Ok(parsed) = DateTime::parse_from_rfc3339(raw) else {
            return;
        };
        let at = parsed.with_timezone(&Utc);
        self.earliest = Some(self.earliest.map_or(at, |current| current.min(at)));
        self.latest = Some(self.latest.map_or(at, |current| current.max(at)));
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> Option<String> {
    at.map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Folds the enriched record list into a [`Summary`].
///
/// Only `generated_at` depends on anything but `records`; the record order
/// does not affect any value.
pub fn build_summary(records: &[RepoRecord], generated_at: DateTime<Utc>) -> Summary {
    let mut summary = Summary {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ..Summary::default()
    };
    let mut created = TimeRange::default();
    let mut updated = TimeRange::default();
    let mut pushed = TimeRange::default();

    for repo in records {
        let counts = &mut summary.repo_counts;
        counts.total += 1;
        if repo.private {
            counts.private += 1;
        } else {
            counts.public += 1;
        }
        if repo.archived {
            counts.archived += 1;
        }
        if repo.fork {
            counts.forks += 1;
        }
        if repo.owner_type == ORGANIZATION {
            counts.org += 1;
        } else {
            counts.user += 1;
        }

        summary.size.total_kb += repo.size_kb;

        let engagement = &mut summary.engagement;
        engagement.total_stars += repo.stars;
        engagement.total_forks += repo.forks;
        engagement.total_watchers += repo.watchers;
        engagement.total_commits += repo.total_commits;

        if !repo.language.is_empty() {
            *summary.languages.entry(repo.language.clone()).or_default() += 1;
        }
        for topic in &repo.topics {
            *summary.topics.entry(topic.clone()).or_default() += 1;
        }
        if !repo.license.is_empty() {
            *summary.licenses.entry(repo.license.clone()).or_default() += 1;
        }

        created.observe(&repo.created_at);
        updated.observe(&repo.updated_at);
        pushed.observe(&repo.pushed_at);

        let coverage = &mut summary.enrichment;
        if repo.last_commit_at.as_deref().is_some_and(|at| !at.is_empty()) {
            coverage.repos_with_last_commit += 1;
        }
        if !repo.weekly_commits_52w.is_empty() {
            coverage.repos_with_stats_52w += 1;
        }
        if repo.language_breakdown.as_ref().is_some_and(|l| !l.is_empty()) {
            coverage.repos_with_languages += 1;
        }
        if !repo.top_contributors.is_empty() {
            coverage.repos_with_contributors += 1;
        }
        if repo.stats_cache_pending {
            coverage.repos_stats_pending += 1;
        }
    }

    summary.size.human = human_size_from_kb(summary.size.total_kb);
    summary.activity = Activity {
        most_recent_update: format_time(updated.latest),
        most_recent_push: format_time(pushed.latest),
        oldest_created: format_time(created.earliest),
        oldest_update: format_time(updated.earliest),
    };

    summary
}
