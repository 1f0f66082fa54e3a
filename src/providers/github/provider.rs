use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::aggregate::build_summary;
use super::client::{GitHubClient, GitHubRepoDto};
use super::coordinator::enrich_all;
use super::options::EnrichOptions;
use crate::auth::Token;
use crate::error::Result;
use crate::format::human_size_from_kb;
use crate::models::{EnrichedReport, RepoRecord};

const PER_PAGE: u32 = 100;

pub struct GitHubProvider {
    pub client: GitHubClient,
    pub options: EnrichOptions,
    pub affiliation: String,
}

impl GitHubProvider {
    pub fn new(
        base_url: &str,
        token: Token,
        timeout: Duration,
        options: EnrichOptions,
        affiliation: String,
    ) -> Result<Self> {
        let client = GitHubClient::new(base_url, token, timeout)?;

        Ok(Self {
            client,
            options,
            affiliation,
        })
    }

    /// Every repository visible to the token. Any failed page aborts the run.
    pub async fn fetch_repos(&self) -> Result<Vec<RepoRecord>> {
        let mut repos = Vec::new();
        let mut page = 1;

        info!("Fetching accessible repositories...");

        loop {
            let batch = self
                .client
                .fetch_repo_list_page(page, PER_PAGE, &self.affiliation)
                .await?;

            if batch.is_empty() {
                break;
            }

            let fetched_count = batch.len();
            repos.extend(batch.into_iter().map(RepoRecord::from));

            info!(
                "Page {page}: fetched {fetched_count} repositories (total: {})",
                repos.len()
            );

            page += 1;
        }

        Ok(repos)
    }

    pub async fn collect_insights(&self, cancel: &CancellationToken) -> Result<EnrichedReport> {
        let mut repos = self.fetch_repos().await?;
        info!("Found {} repositories", repos.len());

        if repos.is_empty() {
            warn!("No repositories visible to this token");
        }

        enrich_all(&self.client, &mut repos, &self.options, cancel).await;

        info!("Building summary...");
        let summary = build_summary(&repos, Utc::now());

        Ok(EnrichedReport { repos, summary })
    }
}

impl From<GitHubRepoDto> for RepoRecord {
    fn from(dto: GitHubRepoDto) -> Self {
        let license = dto
            .license
            .filter(|license| license.key.as_deref().is_some_and(|key| !key.is_empty()))
            .and_then(|license| license.name)
            .unwrap_or_default();

        Self {
            name: dto.name,
            full_name: dto.full_name,
            description: dto.description.unwrap_or_default(),
            private: dto.private,
            fork: dto.fork,
            archived: dto.archived,
            disabled: dto.disabled,
            language: dto.language.unwrap_or_default(),
            topics: dto.topics,
            homepage: dto.homepage.unwrap_or_default(),
            default_branch: dto.default_branch.unwrap_or_default(),
            size_kb: dto.size_kb,
            size_readable: human_size_from_kb(dto.size_kb),
            stars: dto.stargazers_count,
            forks: dto.forks_count,
            watchers: dto.watchers_count,
            open_issues: dto.open_issues_count,
            created_at: dto.created_at.unwrap_or_default(),
            updated_at: dto.updated_at.unwrap_or_default(),
            pushed_at: dto.pushed_at.unwrap_or_default(),
            html_url: dto.html_url,
            owner_login: dto.owner.login,
            owner_type: dto.owner.kind,
            license,
            has_issues: dto.has_issues,
            has_projects: dto.has_projects,
            has_wiki: dto.has_wiki,
            has_pages: dto.has_pages,
            has_downloads: dto.has_downloads,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::error::RepoLensError;
    use crate::providers::github::testing::{fast_options, mock_json, route};

    const REPO_JSON: &str = r#"{
        "name": "alpha",
        "full_name": "acme/alpha",
        "description": null,
        "private": false,
        "fork": false,
        "archived": false,
        "disabled": false,
        "language": "Rust",
        "size": 2048,
        "stargazers_count": 5,
        "watchers_count": 5,
        "forks_count": 1,
        "open_issues_count": 0,
        "default_branch": "main",
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "pushed_at": null,
        "html_url": "https://github.com/acme/alpha",
        "homepage": null,
        "topics": ["cli"],
        "has_issues": true,
        "owner": {"login": "acme", "type": "Organization"},
        "license": {"key": "mit", "name": "MIT License", "spdx_id": "MIT"}
    }"#;

    fn provider_for(server: &mockito::ServerGuard) -> GitHubProvider {
        GitHubProvider::new(
            &server.url(),
            Token::parse("test-token").unwrap(),
            Duration::from_secs(5),
            fast_options(2),
            "owner".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_record_from_dto() {
        let dto: GitHubRepoDto = serde_json::from_str(REPO_JSON).unwrap();

        let record = RepoRecord::from(dto);

        assert_eq!(record.full_name, "acme/alpha");
        assert_eq!(record.description, "");
        assert_eq!(record.size_readable, "2.0 MB");
        assert_eq!(record.stars, 5);
        assert_eq!(record.pushed_at, "");
        assert_eq!(record.owner_type, "Organization");
        assert_eq!(record.license, "MIT License");
        assert!(record.has_issues);
        assert_eq!(record.last_commit_at, None);
        assert!(!record.stats_cache_pending);
    }

    #[test]
    fn test_license_without_key_is_dropped() {
        let json = REPO_JSON.replace(r#""key": "mit""#, r#""key": null"#);
        let dto: GitHubRepoDto = serde_json::from_str(&json).unwrap();

        assert_eq!(RepoRecord::from(dto).license, "");
    }

    #[tokio::test]
    async fn test_fetch_repos_pages_until_empty() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", route("/user/repos"))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("affiliation".into(), "owner".into()),
            ]))
            .with_status(200)
            .with_body(format!("[{REPO_JSON}, {}]", REPO_JSON.replace("alpha", "beta")))
            .create_async()
            .await;
        let last = server
            .mock("GET", route("/user/repos"))
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let provider = provider_for(&server);

        let repos = provider.fetch_repos().await.unwrap();

        first.assert_async().await;
        last.assert_async().await;
        let names: Vec<_> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, ["acme/alpha", "acme/beta"]);
    }

    #[tokio::test]
    async fn test_fetch_repos_error_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_json(&mut server, "/user/repos", 401, r#"{"message": "Bad credentials"}"#).await;
        let provider = provider_for(&server);

        let err = provider.fetch_repos().await.unwrap_err();

        assert!(matches!(err, RepoLensError::Api(_)));
    }

    #[tokio::test]
    async fn test_collect_insights_with_no_repositories() {
        let mut server = mockito::Server::new_async().await;
        let _mock = mock_json(&mut server, "/user/repos", 200, "[]").await;
        let provider = provider_for(&server);

        let report = provider
            .collect_insights(&CancellationToken::new())
            .await
            .unwrap();

        assert!(report.repos.is_empty());
        assert_eq!(report.summary.repo_counts.total, 0);
    }
}
