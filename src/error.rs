//! Error types for tagnotes modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git subprocess operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git was not found on PATH")]
    NotInstalled,

    #[error("Failed to spawn git {args}: {source}")]
    SpawnFailed {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {args} exited with code {code}: {stderr}")]
    NonZeroExit {
        args: String,
        code: i32,
        stderr: String,
    },

    #[error("git {args} timed out after {secs} seconds")]
    Timeout { args: String, secs: u64 },

    #[error("Malformed log line '{0}': expected '<hash> <subject>'")]
    MalformedLogLine(String),

    #[error("git {step} returned no output")]
    EmptyOutput { step: &'static str },
}

impl GitError {
    /// Stderr captured from a failed git invocation, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            GitError::NonZeroExit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Errors detected from configuration before any external work happens.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid sort direction '{0}': expected \"\", \"asc\" or \"desc\"")]
    InvalidSortDirection(String),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown provider '{0}': expected github, gitlab or gitea")]
    UnknownProvider(String),

    #[error("No provider credentials found. Set GITHUB_TOKEN, GITLAB_TOKEN or GITEA_TOKEN, or log in with gh")]
    NoProvider,

    #[error("Repository '{owner}/{name}' is incomplete: configure both release.owner and release.name")]
    MissingRepository { owner: String, name: String },

    #[error("Failed to parse repository URL '{0}'")]
    InvalidRepositoryUrl(String),
}

/// Errors from provider API clients.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{provider} authentication failed: set {env_var}")]
    AuthenticationFailed {
        provider: &'static str,
        env_var: &'static str,
    },

    #[error("Failed to build {provider} client: {message}")]
    Build {
        provider: &'static str,
        message: String,
    },

    #[error("Commit {commit} not found in {owner}/{repo}")]
    CommitNotFound {
        commit: String,
        owner: String,
        repo: String,
    },

    #[error("Rate limited by {provider} API")]
    RateLimited { provider: &'static str },

    #[error("{provider} request failed: {message}")]
    Request {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned an unexpected payload: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    #[error("Commit metadata request timed out after {0} seconds")]
    Timeout(u64),

    #[error("All {attempts} attempts failed: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::RateLimited { .. } | ClientError::Timeout(_) | ClientError::Request { .. }
        )
    }
}

/// Errors from changelog generation.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to {step}: {source}")]
    Git {
        step: &'static str,
        #[source]
        source: GitError,
    },

    #[error("Failed to set up provider client: {0}")]
    ClientSetup(#[source] ClientError),

    #[error("Failed to fetch metadata for commit {commit}: {source}")]
    Metadata {
        commit: String,
        #[source]
        source: ClientError,
    },

    #[error("Metadata worker for commit {commit} stopped unexpectedly: {message}")]
    WorkerFailed { commit: String, message: String },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from commit message validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to read recent commits: {0}")]
    Git(#[source] GitError),

    #[error("{} commit message(s) do not follow the conventional format:\n{}", entries.len(), entries.join("\n"))]
    InvalidCommits { entries: Vec<String> },
}
