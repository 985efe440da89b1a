/// Whether the process runs as a GitHub Actions step.
pub fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// `::error::` workflow command that marks the current step failed with `err`'s message.
pub fn workflow_error_command(err: &anyhow::Error) -> String {
    // Workflow commands end at the first newline unless it is escaped.
    let message = format!("{err:#}")
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{message}")
}
