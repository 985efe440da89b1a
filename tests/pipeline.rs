use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use deployed_pr_labeler::data::{ActivePolicy, EligibilityPolicy};
use deployed_pr_labeler::{
    run, Config, Deployment, DeploymentState, GitHubApi, OpenPullRequests, PullRequest,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    PullRequests { excluding_label: Option<String> },
    Deployments,
    AddLabel { pull_request_id: String, label_id: String },
}

#[derive(Default)]
struct FakeGitHub {
    prs: Vec<PullRequest>,
    protected: Vec<&'static str>,
    deployments: Vec<Deployment>,
    fail_pull_requests: Option<&'static str>,
    fail_deployments: Option<&'static str>,
    fail_label_for: Option<&'static str>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGitHub {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn label_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddLabel { pull_request_id, .. } => Some(pull_request_id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn fetch_open_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
        excluding_label: Option<&str>,
    ) -> Result<OpenPullRequests> {
        self.calls.lock().unwrap().push(Call::PullRequests {
            excluding_label: excluding_label.map(String::from),
        });
        if let Some(message) = self.fail_pull_requests {
            anyhow::bail!("{message}");
        }
        let protected_ids: HashSet<String> = if excluding_label.is_some() {
            self.protected.iter().map(|id| id.to_string()).collect()
        } else {
            HashSet::new()
        };
        Ok(OpenPullRequests {
            open: self.prs.clone(),
            protected_ids,
        })
    }

    async fn fetch_last_deployments(&self, _owner: &str, _repo: &str) -> Result<Vec<Deployment>> {
        self.calls.lock().unwrap().push(Call::Deployments);
        if let Some(message) = self.fail_deployments {
            anyhow::bail!("{message}");
        }
        Ok(self.deployments.clone())
    }

    async fn add_label(&self, pull_request_id: &str, label_id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::AddLabel {
            pull_request_id: pull_request_id.to_string(),
            label_id: label_id.to_string(),
        });
        if self.fail_label_for == Some(pull_request_id) {
            anyhow::bail!("Could not add label to {pull_request_id}");
        }
        Ok(())
    }
}

fn config() -> Config {
    Config {
        token: "token".into(),
        label_id: "LA_deployed".into(),
        excluding_label: None,
        repo_owner: "acme".into(),
        repo_name: "web".into(),
        eligibility: EligibilityPolicy::Label,
        active_policy: ActivePolicy::StatusOnly,
        dry_run: false,
    }
}

fn pr(id: &str, number: u64) -> PullRequest {
    PullRequest {
        id: id.to_string(),
        number,
        is_draft: false,
    }
}

fn deployment(environment: &str, state: DeploymentState) -> Deployment {
    Deployment {
        environment: environment.to_string(),
        state,
    }
}

#[tokio::test]
async fn labels_pull_request_with_successful_preview() {
    let api = FakeGitHub {
        prs: vec![pr("A", 42)],
        deployments: vec![deployment("pr-42-preview", DeploymentState::Success)],
        ..Default::default()
    };

    let summary = run(&config(), &api).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            Call::PullRequests { excluding_label: None },
            Call::Deployments,
            Call::AddLabel {
                pull_request_id: "A".into(),
                label_id: "LA_deployed".into()
            },
        ]
    );
    assert_eq!(summary.labeled, vec![42]);
}

#[tokio::test]
async fn draft_pull_request_is_skipped_under_draft_policy() {
    let api = FakeGitHub {
        prs: vec![PullRequest {
            id: "B".into(),
            number: 7,
            is_draft: true,
        }],
        deployments: vec![deployment("pr-7-preview", DeploymentState::Success)],
        ..Default::default()
    };
    let config = Config {
        eligibility: EligibilityPolicy::Draft,
        ..config()
    };

    let summary = run(&config, &api).await.unwrap();

    assert!(api.label_calls().is_empty());
    assert_eq!(summary.eligible, 0);
}

#[tokio::test]
async fn protected_pull_request_is_skipped_under_label_policy() {
    let api = FakeGitHub {
        prs: vec![pr("A", 1), pr("B", 2)],
        protected: vec!["B"],
        deployments: vec![
            deployment("pr-1-preview", DeploymentState::Success),
            deployment("pr-2-preview", DeploymentState::Success),
        ],
        ..Default::default()
    };
    let config = Config {
        excluding_label: Some("keep-unlabeled".into()),
        ..config()
    };

    run(&config, &api).await.unwrap();

    assert_eq!(
        api.calls()[0],
        Call::PullRequests {
            excluding_label: Some("keep-unlabeled".into())
        }
    );
    assert_eq!(api.label_calls(), vec!["A"]);
}

#[tokio::test]
async fn pull_request_fetch_failure_aborts_the_run() {
    let api = FakeGitHub {
        prs: vec![pr("A", 42)],
        deployments: vec![deployment("pr-42-preview", DeploymentState::Success)],
        fail_pull_requests: Some("Bad credentials"),
        ..Default::default()
    };

    let err = run(&config(), &api).await.unwrap_err();

    assert_eq!(err.to_string(), "Bad credentials");
    assert_eq!(
        api.calls(),
        vec![Call::PullRequests {
            excluding_label: None
        }]
    );
}

#[tokio::test]
async fn deployment_fetch_failure_aborts_before_labeling() {
    let api = FakeGitHub {
        prs: vec![pr("A", 42)],
        deployments: vec![deployment("pr-42-preview", DeploymentState::Success)],
        fail_deployments: Some("Something went wrong while executing your query."),
        ..Default::default()
    };

    let err = run(&config(), &api).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Something went wrong while executing your query."
    );
    assert!(api.label_calls().is_empty());
}

#[tokio::test]
async fn labeling_failure_stops_remaining_labels() {
    let api = FakeGitHub {
        prs: vec![pr("A", 1), pr("B", 2), pr("C", 3)],
        deployments: vec![
            deployment("pr-1-preview", DeploymentState::Success),
            deployment("pr-2-preview", DeploymentState::Success),
            deployment("pr-3-preview", DeploymentState::Success),
        ],
        fail_label_for: Some("B"),
        ..Default::default()
    };

    let err = run(&config(), &api).await.unwrap_err();

    assert_eq!(err.to_string(), "Could not add label to B");
    assert_eq!(api.label_calls(), vec!["A", "B"]);
}

#[tokio::test]
async fn loose_number_prefix_does_not_match() {
    let api = FakeGitHub {
        prs: vec![pr("A", 1), pr("B", 12)],
        deployments: vec![deployment("pr-12-preview", DeploymentState::Success)],
        ..Default::default()
    };

    run(&config(), &api).await.unwrap();

    assert_eq!(api.label_calls(), vec!["B"]);
}

#[tokio::test]
async fn active_policy_controls_which_deployments_count() {
    let deployments = vec![
        deployment("pr-1-preview", DeploymentState::InProgress),
        deployment("pr-2-preview", DeploymentState::Success),
        deployment("pr-3-preview", DeploymentState::Inactive),
        deployment("main", DeploymentState::Success),
    ];
    let prs = vec![pr("A", 1), pr("B", 2), pr("C", 3)];

    let status_only = FakeGitHub {
        prs: prs.clone(),
        deployments: deployments.clone(),
        ..Default::default()
    };
    let summary = run(&config(), &status_only).await.unwrap();
    assert_eq!(status_only.label_calls(), vec!["A", "B"]);
    assert!(summary.active_environments.contains("main"));

    let success_except_main = FakeGitHub {
        prs,
        deployments,
        ..Default::default()
    };
    let config = Config {
        active_policy: ActivePolicy::SuccessExceptMain,
        ..config()
    };
    let summary = run(&config, &success_except_main).await.unwrap();
    assert_eq!(success_except_main.label_calls(), vec!["B"]);
    assert!(!summary.active_environments.contains("main"));
}

#[tokio::test]
async fn repeated_runs_issue_the_same_label_calls() {
    let api = FakeGitHub {
        prs: vec![pr("A", 42), pr("B", 43)],
        deployments: vec![
            deployment("pr-42-preview", DeploymentState::Success),
            deployment("pr-42-storybook", DeploymentState::InProgress),
        ],
        ..Default::default()
    };

    run(&config(), &api).await.unwrap();
    let first = api.label_calls();
    api.calls.lock().unwrap().clear();
    run(&config(), &api).await.unwrap();

    assert_eq!(first, vec!["A"]);
    assert_eq!(api.label_calls(), first);
}

#[tokio::test]
async fn dry_run_reports_matches_without_labeling() {
    let api = FakeGitHub {
        prs: vec![pr("A", 42)],
        deployments: vec![deployment("pr-42-preview", DeploymentState::Success)],
        ..Default::default()
    };
    let config = Config {
        dry_run: true,
        ..config()
    };

    let summary = run(&config, &api).await.unwrap();

    assert!(api.label_calls().is_empty());
    assert_eq!(summary.labeled, vec![42]);
    assert!(summary.dry_run);
}
