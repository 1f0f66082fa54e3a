use serde::Deserialize;

use super::core::{ensure_success, GitHubClient};
use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
pub struct GitHubOwnerDto {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct GitHubLicenseDto {
    pub key: Option<String>,
    pub name: Option<String>,
}

/// Repository as returned by the listing endpoint. Nullable upstream fields
/// are `Option`s here and flattened to empty values on conversion.
#[derive(Debug, Deserialize)]
pub struct GitHubRepoDto {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    pub language: Option<String>,
    #[serde(rename = "size", default)]
    pub size_kb: u64,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    pub default_branch: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_projects: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_pages: bool,
    #[serde(default)]
    pub has_downloads: bool,
    #[serde(default)]
    pub owner: GitHubOwnerDto,
    pub license: Option<GitHubLicenseDto>,
}

impl GitHubClient {
    /// Fetch one page of repositories visible to the token.
    pub async fn fetch_repo_list_page(
        &self,
        page: u32,
        per_page: u32,
        affiliation: &str,
    ) -> Result<Vec<GitHubRepoDto>> {
        let url = self.endpoint_url("user/repos")?;
        let page = page.to_string();
        let per_page = per_page.to_string();

        let response = self
            .get(
                url,
                &[
                    ("per_page", per_page.as_str()),
                    ("page", page.as_str()),
                    ("sort", "updated"),
                    ("affiliation", affiliation),
                ],
            )
            .await?;
        let response = ensure_success("user/repos", response)?;
        Ok(response.json::<Vec<GitHubRepoDto>>().await?)
    }
}
