use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use std::collections::HashSet;
use std::process::Command;

use crate::data::{
    AddLabelsData, Deployment, DeploymentState, DeploymentsData, GraphQlResponse,
    OpenPullRequests, PullRequest, PullRequestsData, PAGE_SIZE,
};

/// Echoed back by the label mutation; lets the audit log tell our writes apart.
pub const CLIENT_MUTATION_ID: &str = "apply-label-to-pr-deployed-action";

const OPEN_PULL_REQUESTS_QUERY: &str = r#"
    query($repo: String!, $owner: String!, $excludingLabel: [String!], $withProtected: Boolean!) {
        repository(name: $repo, owner: $owner) {
            pr_protected: pullRequests(first: 100, states: OPEN, labels: $excludingLabel) @include(if: $withProtected) {
                nodes {
                    id
                    number
                }
            }
            pullRequests(first: 100, states: OPEN) {
                nodes {
                    id
                    number
                    isDraft
                }
            }
        }
    }
"#;

const LAST_DEPLOYMENTS_QUERY: &str = r#"
    query($repo: String!, $owner: String!) {
        repository(name: $repo, owner: $owner) {
            deployments(last: 100) {
                nodes {
                    environment
                    latestStatus {
                        state
                    }
                }
            }
        }
    }
"#;

const ADD_LABEL_MUTATION: &str = r#"
    mutation AddLabelToPR($pullRequestId: ID!, $labelId: ID!, $clientMutationId: String!) {
        addLabelsToLabelable(input: {clientMutationId: $clientMutationId, labelableId: $pullRequestId, labelIds: [$labelId]}) {
            clientMutationId
        }
    }
"#;

/// The three remote calls a labeling run makes.
#[async_trait]
pub trait GitHubApi {
    /// Up to one page of open pull requests. With `excluding_label` set, also the ids
    /// of open pull requests carrying that label.
    async fn fetch_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        excluding_label: Option<&str>,
    ) -> Result<OpenPullRequests>;

    /// The last page of deployments, in the order GitHub returns them.
    async fn fetch_last_deployments(&self, owner: &str, repo: &str) -> Result<Vec<Deployment>>;

    /// Attach `label_id` to the pull request node `pull_request_id`.
    async fn add_label(&self, pull_request_id: &str, label_id: &str) -> Result<()>;
}

/// Fallback token source for local runs: the `gh` CLI's stored credential.
pub fn get_github_token() -> Result<String> {
    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token. Run 'gh auth login' first.");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to build GitHub client")?;
        Ok(Self { octocrab })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn fetch_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        excluding_label: Option<&str>,
    ) -> Result<OpenPullRequests> {
        let labels: Vec<&str> = excluding_label.into_iter().collect();

        let response: GraphQlResponse<PullRequestsData> = self
            .octocrab
            .graphql(&serde_json::json!({
                "query": OPEN_PULL_REQUESTS_QUERY,
                "variables": {
                    "owner": owner,
                    "repo": repo,
                    "excludingLabel": labels,
                    "withProtected": !labels.is_empty()
                }
            }))
            .await?;

        decode_pull_requests(response)
    }

    async fn fetch_last_deployments(&self, owner: &str, repo: &str) -> Result<Vec<Deployment>> {
        let response: GraphQlResponse<DeploymentsData> = self
            .octocrab
            .graphql(&serde_json::json!({
                "query": LAST_DEPLOYMENTS_QUERY,
                "variables": {
                    "owner": owner,
                    "repo": repo
                }
            }))
            .await?;

        decode_deployments(response)
    }

    async fn add_label(&self, pull_request_id: &str, label_id: &str) -> Result<()> {
        let response: GraphQlResponse<AddLabelsData> = self
            .octocrab
            .graphql(&serde_json::json!({
                "query": ADD_LABEL_MUTATION,
                "variables": {
                    "pullRequestId": pull_request_id,
                    "labelId": label_id,
                    "clientMutationId": CLIENT_MUTATION_ID
                }
            }))
            .await?;

        let data = response.into_data()?;
        let echoed = data
            .add_labels_to_labelable
            .and_then(|payload| payload.client_mutation_id);
        tracing::debug!(pull_request_id, ?echoed, "label mutation acknowledged");
        Ok(())
    }
}

pub fn decode_pull_requests(response: GraphQlResponse<PullRequestsData>) -> Result<OpenPullRequests> {
    let repository = response
        .into_data()?
        .repository
        .ok_or_else(|| anyhow::anyhow!("Repository not found"))?;

    let open: Vec<PullRequest> = repository
        .pull_requests
        .nodes
        .into_iter()
        .flatten()
        .map(|node| PullRequest {
            id: node.id,
            number: node.number,
            is_draft: node.is_draft,
        })
        .collect();

    let protected_ids: HashSet<String> = repository
        .protected
        .map(|connection| connection.nodes.into_iter().flatten().map(|n| n.id).collect())
        .unwrap_or_default();

    if open.len() >= PAGE_SIZE {
        tracing::debug!(
            count = open.len(),
            "open pull request page is full; later pull requests are not considered"
        );
    }
    if protected_ids.len() >= PAGE_SIZE {
        tracing::debug!(
            count = protected_ids.len(),
            "protected pull request page is full; later protected pull requests are not excluded"
        );
    }

    Ok(OpenPullRequests {
        open,
        protected_ids,
    })
}

pub fn decode_deployments(response: GraphQlResponse<DeploymentsData>) -> Result<Vec<Deployment>> {
    let repository = response
        .into_data()?
        .repository
        .ok_or_else(|| anyhow::anyhow!("Repository not found"))?;

    let deployments: Vec<Deployment> = repository
        .deployments
        .nodes
        .into_iter()
        .flatten()
        .filter_map(|node| {
            let environment = node.environment?;
            let state = node
                .latest_status
                .map(|s| s.state.parse().unwrap_or(DeploymentState::Unknown))
                .unwrap_or(DeploymentState::Unknown);
            Some(Deployment { environment, state })
        })
        .collect();

    if deployments.len() >= PAGE_SIZE {
        tracing::debug!(
            count = deployments.len(),
            "deployment page is full; older deployments are not considered"
        );
    }

    Ok(deployments)
}
