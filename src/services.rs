pub mod github;
pub mod matching;

pub use github::{get_github_token, GitHubApi, GitHubClient, CLIENT_MUTATION_ID};
pub use matching::{
    active_environments, eligible_pull_requests, environment_matches, matched_pull_requests,
};
