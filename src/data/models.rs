use std::collections::{BTreeSet, HashSet};

use super::types::DeploymentState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// GraphQL node id, used as the `labelableId` of the label mutation.
    pub id: String,
    pub number: u64,
    pub is_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub environment: String,
    pub state: DeploymentState,
}

/// Open pull requests plus the ids of those carrying the excluding label.
#[derive(Debug, Clone, Default)]
pub struct OpenPullRequests {
    pub open: Vec<PullRequest>,
    pub protected_ids: HashSet<String>,
}

impl OpenPullRequests {
    pub fn is_protected(&self, pr: &PullRequest) -> bool {
        self.protected_ids.contains(&pr.id)
    }
}

/// What a single run saw and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub open: usize,
    pub eligible: usize,
    pub active_environments: BTreeSet<String>,
    /// PR numbers, in the order their labels were applied.
    pub labeled: Vec<u64>,
    pub dry_run: bool,
}
