mod commits;
mod core;
mod repos;
mod stats;

pub use self::core::GitHubClient;
pub use commits::ActivityResponse;
pub use repos::GitHubRepoDto;
