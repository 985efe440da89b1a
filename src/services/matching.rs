use std::collections::BTreeSet;

use crate::data::{
    ActivePolicy, Deployment, DeploymentState, EligibilityPolicy, OpenPullRequests, PullRequest,
};

/// Environment that is never treated as a preview under `ActivePolicy::SuccessExceptMain`.
pub const MAIN_ENVIRONMENT: &str = "main";

/// Whether a single deployment counts as live under `policy`.
pub fn is_active(deployment: &Deployment, policy: ActivePolicy) -> bool {
    match policy {
        ActivePolicy::StatusOnly => matches!(
            deployment.state,
            DeploymentState::Success | DeploymentState::InProgress
        ),
        ActivePolicy::SuccessExceptMain => {
            deployment.state == DeploymentState::Success
                && deployment.environment != MAIN_ENVIRONMENT
        }
    }
}

/// Names of the environments with a live deployment.
pub fn active_environments(deployments: &[Deployment], policy: ActivePolicy) -> BTreeSet<String> {
    deployments
        .iter()
        .filter(|d| is_active(d, policy))
        .map(|d| d.environment.clone())
        .collect()
}

/// Open pull requests that may be labeled, in API order.
pub fn eligible_pull_requests(prs: &OpenPullRequests, policy: EligibilityPolicy) -> Vec<&PullRequest> {
    prs.open
        .iter()
        .filter(|pr| {
            let skip = match policy {
                EligibilityPolicy::Label => prs.is_protected(pr),
                EligibilityPolicy::Draft => pr.is_draft,
                EligibilityPolicy::None => false,
            };
            if skip {
                tracing::debug!(number = pr.number, policy = policy.to_str(), "pull request not eligible");
            }
            !skip
        })
        .collect()
}

/// Preview environments are named `pr-<number>-<suffix>`. The trailing dash keeps
/// PR 1 from matching `pr-12-preview`.
pub fn environment_matches(number: u64, environment: &str) -> bool {
    environment.contains(&format!("pr-{}-", number))
}

/// Pull requests with at least one live environment, preserving input order.
pub fn matched_pull_requests<'a>(
    eligible: &[&'a PullRequest],
    active: &BTreeSet<String>,
) -> Vec<&'a PullRequest> {
    eligible
        .iter()
        .copied()
        .filter(|pr| active.iter().any(|env| environment_matches(pr.number, env)))
        .collect()
}
