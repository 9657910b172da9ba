//! GitLab commit metadata via the REST v4 API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ClientError;
use crate::git::RepoRef;

use super::{
    ClientSettings, CommitInfoClient, CommitMetadata, request_error, status_error, trim_base,
};

const PROVIDER: &str = "GitLab";

/// Subset of `GET /projects/:id/repository/commits/:sha`.
#[derive(Debug, Deserialize)]
struct GitLabCommit {
    id: String,
    short_id: String,
    committed_date: DateTime<FixedOffset>,
    author_email: String,
    committer_email: String,
}

pub struct GitLabClient {
    client: Client,
    api_url: Url,
    repo: RepoRef,
    web_url: String,
}

impl GitLabClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let build_error = |message: String| ClientError::Build {
            provider: PROVIDER,
            message,
        };

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&settings.token).map_err(|e| build_error(e.to_string()))?;
        headers.insert("PRIVATE-TOKEN", token);

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

    /// `{api}/projects/{owner%2Fname}/repository/commits/{id}`
    fn commit_url(&self, commit_id: &str) -> Result<Url, ClientError> {
        let mut url = self.api_url.clone();
        let project = format!("{}/{}", self.repo.owner, self.repo.name);
        url.path_segments_mut()
            .map_err(|_| ClientError::Build {
                provider: PROVIDER,
                message: format!("API url {} cannot be a base", self.api_url),
            })?
            .pop_if_empty()
            .extend(["projects", project.as_str(), "repository", "commits", commit_id]);
        Ok(url)
    }
}

#[async_trait]
impl CommitInfoClient for GitLabClient {
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

        let commit: GitLabCommit = response
            .json()
            .await
            .map_err(|e| request_error(PROVIDER, e))?;

        // The commits endpoint carries no avatar; links still resolve without one.
        Ok(CommitMetadata {
            id: commit.id,
            short_id: commit.short_id,
            committed_date: commit.committed_date,
            author_email: commit.author_email,
            committer_email: commit.committer_email,
            avatar_url: String::new(),
            base_url: self.web_url.clone(),
        })
    }
}
