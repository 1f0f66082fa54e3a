use indexmap::IndexMap;

use super::core::{ensure_success, is_no_content, GitHubClient};
use crate::error::Result;
use crate::models::Contributor;

impl GitHubClient {
    /// Language name to byte count, in the order upstream reports them.
    pub async fn fetch_languages(&self, full_name: &str) -> Result<IndexMap<String, u64>> {
        let url = self.repo_url(full_name, &["languages"])?;
        let response = self.get(url, &[]).await?;
        let response = ensure_success("languages", response)?;
        Ok(response.json::<IndexMap<String, u64>>().await?)
    }

    /// First page of contributors, most contributions first.
    pub async fn fetch_contributors(
        &self,
        full_name: &str,
        per_page: usize,
    ) -> Result<Vec<Contributor>> {
        let url = self.repo_url(full_name, &["contributors"])?;
        let per_page = per_page.to_string();
        let response = self.get(url, &[("per_page", per_page.as_str())]).await?;
        let response = ensure_success("contributors", response)?;
        if is_no_content(&response) {
            return Ok(Vec::new());
        }
        Ok(response.json::<Vec<Contributor>>().await?)
    }
}
