//! GitHub commit metadata via octocrab.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use octocrab::Octocrab;
use serde::Deserialize;

use crate::error::ClientError;
use crate::git::RepoRef;

use super::{ClientSettings, CommitInfoClient, CommitMetadata, short_id, trim_base};

const PROVIDER: &str = "GitHub";

/// Subset of `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitCommit,
    author: Option<GitHubUser>,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    author: GitSignature,
    committer: GitSignature,
}

#[derive(Debug, Deserialize)]
struct GitSignature {
    email: String,
    date: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    avatar_url: String,
}

pub struct GitHubClient {
    octocrab: Octocrab,
    repo: RepoRef,
    web_url: String,
}

impl GitHubClient {
    /// Construct the octocrab client from settings.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let build_error = |e: octocrab::Error| ClientError::Build {
            provider: PROVIDER,
            message: e.to_string(),
        };

        let octocrab = Octocrab::builder()
            .base_uri(settings.api_url.as_str())
            .map_err(build_error)?
            .personal_token(settings.token)
            .build()
            .map_err(build_error)?;

        Ok(Self::with_client(octocrab, settings.repo, &settings.web_url))
    }

    /// Use a pre-configured octocrab client.
    ///
    /// This allows dependency injection for testing with mock servers.
    pub fn with_client(octocrab: Octocrab, repo: RepoRef, web_url: &str) -> Self {
        Self {
            octocrab,
            repo,
            web_url: trim_base(web_url),
        }
    }

    fn map_error(&self, commit_id: &str, e: octocrab::Error) -> ClientError {
        // octocrab surfaces API failures through its Display/Debug output
        let err_display = e.to_string();
        let err_debug = format!("{:?}", e);

        if err_display.to_lowercase().contains("rate limit")
            || err_debug.to_lowercase().contains("rate limit")
        {
            return ClientError::RateLimited { provider: PROVIDER };
        }
        if err_display.contains("Not Found")
            || err_debug.contains("Not Found")
            || err_debug.contains("No commit found")
        {
            return ClientError::CommitNotFound {
                commit: commit_id.to_string(),
                owner: self.repo.owner.clone(),
                repo: self.repo.name.clone(),
            };
        }
        if err_display.starts_with("Serde Error") || err_display.starts_with("JSON Error") {
            return ClientError::Decode {
                provider: PROVIDER,
                message: err_display,
            };
        }
        ClientError::Request {
            provider: PROVIDER,
            message: err_display,
        }
    }
}

#[async_trait]
impl CommitInfoClient for GitHubClient {
    async fn get_info_by_id(&self, commit_id: &str) -> Result<CommitMetadata, ClientError> {
        let route = format!(
            "/repos/{}/{}/commits/{}",
            self.repo.owner, self.repo.name, commit_id
        );

        let commit: GitHubCommit = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| self.map_error(commit_id, e))?;

        Ok(CommitMetadata {
            short_id: short_id(&commit.sha),
            id: commit.sha,
            committed_date: commit.commit.committer.date,
            author_email: commit.commit.author.email,
            committer_email: commit.commit.committer.email,
            avatar_url: commit.author.map(|a| a.avatar_url).unwrap_or_default(),
            base_url: self.web_url.clone(),
        })
    }
}
