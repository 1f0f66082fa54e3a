use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoLensError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RepoLensError {
    pub fn status(endpoint: &str, status: reqwest::StatusCode) -> Self {
        Self::Api(format!("{endpoint} returned {status}"))
    }
}

pub type Result<T> = std::result::Result<T, RepoLensError>;
