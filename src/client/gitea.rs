//! Gitea commit metadata via the REST v1 API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ClientError;
use crate::git::RepoRef;

use super::{
    ClientSettings, CommitInfoClient, CommitMetadata, request_error, short_id, status_error,
    trim_base,
};

const PROVIDER: &str = "Gitea";

/// Subset of `GET /repos/{owner}/{repo}/git/commits/{sha}`.
#[derive(Debug, Deserialize)]
struct GiteaCommit {
    sha: String,
    commit: GiteaCommitDetail,
    author: Option<GiteaUser>,
}

#[derive(Debug, Deserialize)]
struct GiteaCommitDetail {
    author: GiteaSignature,
    committer: GiteaSignature,
}

#[derive(Debug, Deserialize)]
struct GiteaSignature {
    email: String,
    date: DateTime<FixedOffset>,
}

#[derive(Debug, Deserialize)]
struct GiteaUser {
    #[serde(default)]
    avatar_url: String,
}

pub struct GiteaClient {
    client: Client,
    api_url: Url,
    repo: RepoRef,
    web_url: String,
}

impl GiteaClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let build_error = |message: String| ClientError::Build {
            provider: PROVIDER,
            message,
        };

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {}", settings.token))
            .map_err(|e| build_error(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| build_error(e.to_string()))?;
        let api_url = Url::parse(&settings.api_url).map_err(|e| build_error(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            repo: settings.repo,
            web_url: trim_base(&settings.web_url),
        })
    }

    fn commit_url(&self, commit_id: &str) -> Result<Url, ClientError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Build {
                provider: PROVIDER,
                message: format!("API url {} cannot be a base", self.api_url),
            })?
            .pop_if_empty()
            .extend([
                "repos",
                self.repo.owner.as_str(),
                self.repo.name.as_str(),
                "git",
                "commits",
                commit_id,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl CommitInfoClient for GiteaClient {
    async fn get_info_by_id(&self, commit_id: &str) -> Result<CommitMetadata, ClientError> {
        let url = self.commit_url(commit_id)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response.status(), &self.repo, commit_id));
        }

        let commit: GiteaCommit = response
            .json()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

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
