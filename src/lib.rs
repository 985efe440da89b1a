pub mod app;
pub mod config;
pub mod data;
pub mod services;
pub mod utils;

pub use app::run;
pub use config::{Config, ConfigArgs};
pub use data::{Deployment, DeploymentState, OpenPullRequests, PullRequest, RunSummary};
pub use services::{GitHubApi, GitHubClient};
