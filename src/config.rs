use clap::{Args, ValueEnum};
use std::fmt;

use crate::data::{ActivePolicy, EligibilityPolicy};
use crate::services::get_github_token;
use crate::utils::{get_current_repo, parse_repository_slug};

/// Inputs of a run. Every value can come from a flag or from the `INPUT_*` variable
/// GitHub Actions sets for an action input of the same name.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Token used to call the GitHub API [fallback: GITHUB_TOKEN, then `gh auth token`]
    #[arg(long, env = "INPUT_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Node id of the label to attach
    #[arg(long, env = "INPUT_LABEL_ID")]
    pub label_id: Option<String>,

    /// Name of a label whose pull requests are never labeled
    #[arg(long, env = "INPUT_EXCLUDING_LABEL")]
    pub excluding_label: Option<String>,

    /// Repository name [fallback: GITHUB_REPOSITORY, then the origin remote]
    #[arg(long, env = "INPUT_REPO_NAME")]
    pub repo_name: Option<String>,

    /// Repository owner [fallback: GITHUB_REPOSITORY, then the origin remote]
    #[arg(long, env = "INPUT_REPO_OWNER")]
    pub repo_owner: Option<String>,

    /// Which open pull requests may be labeled: label, draft or none
    #[arg(long, env = "INPUT_ELIGIBILITY", default_value = "label", value_parser = policy_input::<EligibilityPolicy>)]
    pub eligibility: EligibilityPolicy,

    /// Which deployments count as live: status or success-except-main
    #[arg(long, env = "INPUT_ACTIVE_POLICY", default_value = "status", value_parser = policy_input::<ActivePolicy>)]
    pub active_policy: ActivePolicy,

    /// Report matches without applying any label
    #[arg(long, env = "INPUT_DRY_RUN", value_parser = flag_input)]
    pub dry_run: bool,
}

/// Where fallback values come from when an input is not given.
pub trait Fallbacks {
    fn env_var(&self, key: &str) -> Option<String>;
    fn gh_token(&self) -> Option<String>;
    fn origin_repo(&self) -> Option<(String, String)>;
}

/// Process environment, the `gh` CLI and the local git checkout.
pub struct SystemFallbacks;

impl Fallbacks for SystemFallbacks {
    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn gh_token(&self) -> Option<String> {
        match get_github_token() {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::debug!("no token from gh: {err}");
                None
            }
        }
    }

    fn origin_repo(&self) -> Option<(String, String)> {
        get_current_repo()
    }
}

/// Resolved once at startup and passed to every stage of the run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub label_id: String,
    pub excluding_label: Option<String>,
    pub repo_owner: String,
    pub repo_name: String,
    pub eligibility: EligibilityPolicy,
    pub active_policy: ActivePolicy,
    pub dry_run: bool,
}

impl Config {
    pub fn resolve(args: ConfigArgs) -> Self {
        Self::resolve_with(args, &SystemFallbacks)
    }

    /// Fill in missing inputs from `fallbacks`. Nothing is validated: a value that
    /// cannot be found stays empty and the API call using it fails.
    pub fn resolve_with(args: ConfigArgs, fallbacks: &impl Fallbacks) -> Self {
        let token = non_empty(args.github_token)
            .or_else(|| non_empty(fallbacks.env_var("GITHUB_TOKEN")))
            .or_else(|| non_empty(fallbacks.gh_token()))
            .unwrap_or_default();

        let mut repo_owner = non_empty(args.repo_owner);
        let mut repo_name = non_empty(args.repo_name);
        if repo_owner.is_none() || repo_name.is_none() {
            let detected = fallbacks
                .env_var("GITHUB_REPOSITORY")
                .and_then(|slug| parse_repository_slug(&slug))
                .or_else(|| fallbacks.origin_repo());
            if let Some((owner, name)) = detected {
                repo_owner = repo_owner.or(Some(owner));
                repo_name = repo_name.or(Some(name));
            }
        }

        Self {
            token,
            label_id: non_empty(args.label_id).unwrap_or_default(),
            excluding_label: non_empty(args.excluding_label),
            repo_owner: repo_owner.unwrap_or_default(),
            repo_name: repo_name.unwrap_or_default(),
            eligibility: args.eligibility,
            active_policy: args.active_policy,
            dry_run: args.dry_run,
        }
    }

    /// Label whose pull requests must be fetched as protected. Only the label
    /// policy looks at it.
    pub fn protected_label(&self) -> Option<&str> {
        match self.eligibility {
            EligibilityPolicy::Label => self.excluding_label.as_deref(),
            EligibilityPolicy::Draft | EligibilityPolicy::None => None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &if self.token.is_empty() { "<empty>" } else { "<redacted>" })
            .field("label_id", &self.label_id)
            .field("excluding_label", &self.excluding_label)
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("eligibility", &self.eligibility)
            .field("active_policy", &self.active_policy)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

// Unset action inputs arrive as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn policy_input<T: ValueEnum + Default>(value: &str) -> Result<T, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(T::default());
    }
    T::from_str(value, true)
}

fn flag_input(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "off" | "0" => Ok(false),
        "true" | "yes" | "on" | "1" => Ok(true),
        other => Err(format!("invalid boolean '{other}'")),
    }
}
