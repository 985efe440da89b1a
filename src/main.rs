use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use deployed_pr_labeler::utils::{is_github_actions, workflow_error_command};
use deployed_pr_labeler::{run, Config, ConfigArgs, GitHubClient, RunSummary};

/// Label open pull requests whose preview deployment is live
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(cli.config);
    tracing::debug!(?config, "resolved configuration");

    match label_deployed_prs(&config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            if is_github_actions() {
                println!("{}", workflow_error_command(&err));
            }
            ExitCode::FAILURE
        }
    }
}

async fn label_deployed_prs(config: &Config) -> Result<RunSummary> {
    let client = GitHubClient::new(&config.token)?;
    run(config, &client).await
}
