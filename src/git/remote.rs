//! Repository owner/name detection from the origin remote.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GitError};

use super::runner::{GitRunner, clean_output};

/// Owner and name of the hosted repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.owner.is_empty() && !self.name.is_empty()
    }

    /// Neither owner nor name is set.
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty() && self.name.is_empty()
    }
}

/// URL of the `origin` remote.
pub async fn origin_url<G: GitRunner + ?Sized>(git: &G) -> Result<String, GitError> {
    let out = git
        .run(vec![
            "config".to_string(),
            "--get".to_string(),
            "remote.origin.url".to_string(),
        ])
        .await?;
    Ok(clean_output(&out))
}

/// Extract owner and name from a git remote URL.
///
/// Handles `git@host:owner/name.git`, `ssh://git@host/owner/name.git` and
/// `https://host/owner/name`. For nested groups everything before the last
/// segment is the owner.
pub fn parse_remote_url(url: &str) -> Result<RepoRef, ConfigError> {
    let invalid = || ConfigError::InvalidRepositoryUrl(url.to_string());

    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/').ok_or_else(invalid)?.1
    } else if let Some((_, rest)) = url.split_once(':') {
        rest
    } else {
        return Err(invalid());
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, name) = path.rsplit_once('/').ok_or_else(invalid)?;

    if owner.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    Ok(RepoRef::new(owner, name))
}
