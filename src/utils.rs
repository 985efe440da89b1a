pub mod actions;
pub mod git;

pub use actions::{is_github_actions, workflow_error_command};
pub use git::{get_current_repo, parse_github_url, parse_repository_slug};
