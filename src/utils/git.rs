use std::process::Command;

/// `(owner, repo)` of the `origin` remote of the working directory, if it is on GitHub.
pub fn get_current_repo() -> Option<(String, String)> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    parse_github_url(&url)
}

pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    // Handle SSH: git@github.com:owner/repo.git
    if let Some(path) = url.strip_prefix("git@github.com:") {
        return parse_repository_slug(path.strip_suffix(".git").unwrap_or(path));
    }

    // Handle HTTPS: https://github.com/owner/repo.git
    if url.contains("github.com") {
        let path = url.split("github.com").nth(1)?;
        let path = path.trim_start_matches('/').trim_start_matches(':');
        return parse_repository_slug(path.strip_suffix(".git").unwrap_or(path));
    }

    None
}

/// Split `owner/repo` as found in `GITHUB_REPOSITORY`.
pub fn parse_repository_slug(slug: &str) -> Option<(String, String)> {
    let mut parts = slug.trim().split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    Some((owner.to_string(), repo.to_string()))
}
