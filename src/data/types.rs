use clap::ValueEnum;
use serde::Deserialize;
use std::str::FromStr;

/// Page size of every GraphQL connection we request. Nothing past the first page is read.
pub const PAGE_SIZE: usize = 100;

// Deployment status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Abandoned,
    Active,
    Destroyed,
    Error,
    Failure,
    Inactive,
    Pending,
    Queued,
    Success,
    InProgress,
    Waiting,
    Unknown,
}

impl DeploymentState {
    pub fn to_str(self) -> &'static str {
        match self {
            DeploymentState::Abandoned => "ABANDONED",
            DeploymentState::Active => "ACTIVE",
            DeploymentState::Destroyed => "DESTROYED",
            DeploymentState::Error => "ERROR",
            DeploymentState::Failure => "FAILURE",
            DeploymentState::Inactive => "INACTIVE",
            DeploymentState::Pending => "PENDING",
            DeploymentState::Queued => "QUEUED",
            DeploymentState::Success => "SUCCESS",
            DeploymentState::InProgress => "IN_PROGRESS",
            DeploymentState::Waiting => "WAITING",
            DeploymentState::Unknown => "UNKNOWN",
        }
    }
}

impl FromStr for DeploymentState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "ABANDONED" => DeploymentState::Abandoned,
            "ACTIVE" => DeploymentState::Active,
            "DESTROYED" => DeploymentState::Destroyed,
            "ERROR" => DeploymentState::Error,
            "FAILURE" => DeploymentState::Failure,
            "INACTIVE" => DeploymentState::Inactive,
            "PENDING" => DeploymentState::Pending,
            "QUEUED" => DeploymentState::Queued,
            "SUCCESS" => DeploymentState::Success,
            "IN_PROGRESS" => DeploymentState::InProgress,
            "WAITING" => DeploymentState::Waiting,
            _ => DeploymentState::Unknown,
        })
    }
}

/// Which open pull requests are candidates for labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EligibilityPolicy {
    /// Skip pull requests carrying the excluding label
    #[default]
    Label,
    /// Skip draft pull requests
    Draft,
    /// Every open pull request is a candidate
    None,
}

impl EligibilityPolicy {
    pub fn to_str(self) -> &'static str {
        match self {
            EligibilityPolicy::Label => "label",
            EligibilityPolicy::Draft => "draft",
            EligibilityPolicy::None => "none",
        }
    }
}

/// Which deployments count as live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ActivePolicy {
    /// Latest status is SUCCESS or IN_PROGRESS
    #[default]
    #[value(name = "status")]
    StatusOnly,
    /// Latest status is SUCCESS and the environment is not `main`
    SuccessExceptMain,
}

impl ActivePolicy {
    pub fn to_str(self) -> &'static str {
        match self {
            ActivePolicy::StatusOnly => "status",
            ActivePolicy::SuccessExceptMain => "success-except-main",
        }
    }
}

// GraphQL response types

/// Envelope of every GraphQL response. GitHub answers 200 with an `errors` array
/// on query failures, so both halves have to be inspected.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Unwrap `data`, turning remote errors into a single error carrying their messages.
    pub fn into_data(self) -> anyhow::Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
            anyhow::bail!("{}", messages.join("; "));
        }
        self.data
            .ok_or_else(|| anyhow::anyhow!("GraphQL response contained no data"))
    }
}

#[derive(Debug, Deserialize)]
pub struct PullRequestsData {
    pub repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestsRepository {
    /// Absent when the query skipped it through `@include(if: false)`.
    #[serde(rename = "pr_protected")]
    pub protected: Option<PullRequestConnection>,
    #[serde(rename = "pullRequests")]
    pub pull_requests: PullRequestConnection,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestConnection {
    #[serde(default)]
    pub nodes: Vec<Option<PullRequestNode>>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestNode {
    pub id: String,
    pub number: u64,
    #[serde(rename = "isDraft", default)]
    pub is_draft: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentsData {
    pub repository: Option<DeploymentsRepository>,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentsRepository {
    pub deployments: DeploymentConnection,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentConnection {
    #[serde(default)]
    pub nodes: Vec<Option<DeploymentNode>>,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentNode {
    pub environment: Option<String>,
    #[serde(rename = "latestStatus")]
    pub latest_status: Option<DeploymentStatusNode>,
}

#[derive(Debug, Deserialize)]
pub struct DeploymentStatusNode {
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct AddLabelsData {
    #[serde(rename = "addLabelsToLabelable")]
    pub add_labels_to_labelable: Option<AddLabelPayload>,
}

#[derive(Debug, Deserialize)]
pub struct AddLabelPayload {
    #[serde(rename = "clientMutationId")]
    pub client_mutation_id: Option<String>,
}
