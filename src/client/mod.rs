//! Provider clients that supply per-commit metadata.
//!
//! One variant per hosting provider, selected once from configuration and
//! handed to the changelog pipeline as an `Arc<dyn CommitInfoClient>`.

pub mod auth;
pub mod gitea;
pub mod github;
pub mod gitlab;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ConfigError};
use crate::git::RepoRef;

pub use gitea::GiteaClient;
pub use github::GitHubClient;
pub use gitlab::GitLabClient;

/// Authorship, timestamp and link data for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    pub id: String,
    pub short_id: String,
    pub committed_date: DateTime<FixedOffset>,
    pub author_email: String,
    pub committer_email: String,
    pub avatar_url: String,
    /// Web root that commit links are built from, without a trailing slash.
    pub base_url: String,
}

/// Capability the changelog needs from a hosting provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitInfoClient: Send + Sync {
    /// Fetch metadata for `commit_id` (full or abbreviated).
    async fn get_info_by_id(&self, commit_id: &str) -> Result<CommitMetadata, ClientError>;
}

/// Supported hosting providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    GitHub,
    GitLab,
    Gitea,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::GitHub => "GitHub",
            Provider::GitLab => "GitLab",
            Provider::Gitea => "Gitea",
        }
    }

    /// Joiner between rendered changelog lines.
    ///
    /// GitLab and Gitea only render a line break after two trailing spaces.
    pub fn line_joiner(&self) -> &'static str {
        match self {
            Provider::GitHub => "\n",
            Provider::GitLab | Provider::Gitea => "  \n",
        }
    }

    pub fn default_web_url(&self) -> &'static str {
        match self {
            Provider::GitHub => "https://github.com",
            Provider::GitLab => "https://gitlab.com",
            Provider::Gitea => "https://gitea.com",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            Provider::GitHub => "https://api.github.com",
            Provider::GitLab => "https://gitlab.com/api/v4",
            Provider::Gitea => "https://gitea.com/api/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "gitlab" => Ok(Provider::GitLab),
            "gitea" => Ok(Provider::Gitea),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Everything needed to construct a provider client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub provider: Provider,
    pub repo: RepoRef,
    pub token: String,
    pub api_url: String,
    pub web_url: String,
}

impl ClientSettings {
    /// Settings using the provider's public endpoints.
    pub fn new(provider: Provider, repo: RepoRef, token: impl Into<String>) -> Self {
        Self {
            provider,
            repo,
            token: token.into(),
            api_url: provider.default_api_url().to_string(),
            web_url: provider.default_web_url().to_string(),
        }
    }
}

/// Build the client for the configured provider.
pub fn new_client(settings: ClientSettings) -> Result<Arc<dyn CommitInfoClient>, ClientError> {
    Ok(match settings.provider {
        Provider::GitHub => Arc::new(GitHubClient::new(settings)?),
        Provider::GitLab => Arc::new(GitLabClient::new(settings)?),
        Provider::Gitea => Arc::new(GiteaClient::new(settings)?),
    })
}

/// First seven characters of a commit id.
pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(7).collect()
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Map a failed reqwest round trip onto [`ClientError`].
pub(crate) fn request_error(provider: &'static str, err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Decode {
            provider,
            message: err.to_string(),
        }
    } else {
        ClientError::Request {
            provider,
            message: err.to_string(),
        }
    }
}

/// Map a non-success HTTP status onto [`ClientError`].
pub(crate) fn status_error(
    provider: &'static str,
    status: reqwest::StatusCode,
    repo: &RepoRef,
    commit_id: &str,
) -> ClientError {
    match status.as_u16() {
        404 => ClientError::CommitNotFound {
            commit: commit_id.to_string(),
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
        },
        429 => ClientError::RateLimited { provider },
        _ => ClientError::Request {
            provider,
            message: format!("unexpected status {}", status),
        },
    }
}
