use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::data::RunSummary;
use crate::services::{
    active_environments, eligible_pull_requests, matched_pull_requests, GitHubApi,
};

/// Label every eligible open pull request that has a live preview deployment.
///
/// The calls are strictly sequential: pull requests, then deployments, then one label
/// mutation at a time. The first failing call aborts the run; labels applied before
/// it stay applied.
pub async fn run(config: &Config, api: &(impl GitHubApi + ?Sized)) -> Result<RunSummary> {
    info!(
        owner = %config.repo_owner,
        repo = %config.repo_name,
        eligibility = config.eligibility.to_str(),
        active_policy = config.active_policy.to_str(),
        "looking for pull requests with an active deployment"
    );

    let prs = api
        .fetch_open_pull_requests(
            &config.repo_owner,
            &config.repo_name,
            config.protected_label(),
        )
        .await?;
    info!(
        open = prs.open.len(),
        protected = prs.protected_ids.len(),
        "fetched open pull requests"
    );

    let deployments = api
        .fetch_last_deployments(&config.repo_owner, &config.repo_name)
        .await?;
    let active = active_environments(&deployments, config.active_policy);
    info!(
        deployments = deployments.len(),
        active = active.len(),
        "fetched deployments"
    );
    for environment in &active {
        debug!(%environment, "active environment");
    }

    let eligible = eligible_pull_requests(&prs, config.eligibility);
    let matched = matched_pull_requests(&eligible, &active);

    let mut labeled = Vec::with_capacity(matched.len());
    for pr in matched {
        if config.dry_run {
            info!(number = pr.number, "dry run: would label pull request");
        } else {
            api.add_label(&pr.id, &config.label_id).await?;
            info!(number = pr.number, "labeled pull request");
        }
        labeled.push(pr.number);
    }

    let summary = RunSummary {
        open: prs.open.len(),
        eligible: eligible.len(),
        active_environments: active,
        labeled,
        dry_run: config.dry_run,
    };
    info!(
        eligible = summary.eligible,
        labeled = summary.labeled.len(),
        dry_run = summary.dry_run,
        "done"
    );

    Ok(summary)
}
