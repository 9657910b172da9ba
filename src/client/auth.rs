//! Provider token discovery.
//!
//! GitHub tokens come from `gh auth token` first, then `GITHUB_TOKEN` and
//! `GH_TOKEN`. GitLab and Gitea read `GITLAB_TOKEN` and `GITEA_TOKEN`.

use std::env;
use std::process::Command;

use crate::error::ClientError;

use super::Provider;

fn env_token(name: &str) -> Option<String> {
    env::var(name).ok().filter(|t| !t.is_empty())
}

/// Primary environment variable holding the token for `provider`.
pub fn token_env_var(provider: Provider) -> &'static str {
    match provider {
        Provider::GitHub => "GITHUB_TOKEN",
        Provider::GitLab => "GITLAB_TOKEN",
        Provider::Gitea => "GITEA_TOKEN",
    }
}

/// Get a token for `provider`.
pub fn get_token(provider: Provider) -> Result<String, ClientError> {
    let token = match provider {
        Provider::GitHub => get_token_from_gh_cli()
            .or_else(|| env_token("GITHUB_TOKEN"))
            .or_else(|| env_token("GH_TOKEN")),
        Provider::GitLab | Provider::Gitea => env_token(token_env_var(provider)),
    };

    token.ok_or(ClientError::AuthenticationFailed {
        provider: provider.as_str(),
        env_var: token_env_var(provider),
    })
}

/// Infer the provider from whichever credential is available.
///
/// Checked in order: GitHub, GitLab and Gitea token variables, then a
/// logged-in gh CLI (GitHub).
pub fn detect_provider() -> Option<Provider> {
    detect_provider_with(|| get_token_from_gh_cli().is_some())
}

fn detect_provider_with(gh_logged_in: impl FnOnce() -> bool) -> Option<Provider> {
    if env_token("GITHUB_TOKEN").is_some() || env_token("GH_TOKEN").is_some() {
        return Some(Provider::GitHub);
    }
    [Provider::GitLab, Provider::Gitea]
        .into_iter()
        .find(|p| env_token(token_env_var(*p)).is_some())
        .or_else(|| gh_logged_in().then_some(Provider::GitHub))
}

/// Try to get a token from the gh CLI.
fn get_token_from_gh_cli() -> Option<String> {
    which::which("gh").ok()?;

    let status = Command::new("gh").args(["auth", "status"]).output().ok()?;
    if !status.status.success() {
        return None;
    }

    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}
