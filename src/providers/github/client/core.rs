use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::auth::Token;
use crate::error::{RepoLensError, Result};

const USER_AGENT: &str = "RepoLens/0.1.0";
const ACCEPT: &str = "application/vnd.github+json";

/// Authenticated REST client, shared by every enrichment worker.
pub struct GitHubClient {
    pub client: Client,
    pub api_url: Url,
    pub token: Token,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Token, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| RepoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let mut api_url = Url::parse(base_url)
            .map_err(|e| RepoLensError::Config(format!("Invalid base URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(RepoLensError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(self.token.as_str())
            .header(reqwest::header::ACCEPT, ACCEPT)
    }

    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| RepoLensError::Config(format!("Invalid endpoint URL: {e}")))
    }

    /// `repos/{owner}/{name}/{endpoint...}`, with each segment percent-encoded.
    pub fn repo_url(&self, full_name: &str, endpoint: &[&str]) -> Result<Url> {
        let (owner, name) = full_name.split_once('/').ok_or_else(|| {
            RepoLensError::Config(format!("Repository name '{full_name}' is not owner/name"))
        })?;

        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| RepoLensError::Config("Base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["repos", owner, name])
            .extend(endpoint);
        Ok(url)
    }

    /// Issues an authenticated GET and hands back the raw response; status
    /// interpretation is left to the caller.
    pub async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let request = self.auth_request(self.client.get(url).query(query));
        Ok(request.send().await?)
    }
}

/// Maps any non-2xx status to an `Api` error naming the endpoint.
pub fn ensure_success(endpoint: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RepoLensError::status(endpoint, status))
    }
}

pub fn is_no_content(response: &reqwest::Response) -> bool {
    response.status() == StatusCode::NO_CONTENT
}
