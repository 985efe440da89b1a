pub mod models;
pub mod types;

pub use models::{Deployment, OpenPullRequests, PullRequest, RunSummary};
pub use types::{ActivePolicy, DeploymentState, EligibilityPolicy, PAGE_SIZE};

pub(crate) use types::{AddLabelsData, DeploymentsData, GraphQlResponse, PullRequestsData};
