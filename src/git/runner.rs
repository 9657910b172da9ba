//! Git subprocess execution.
//!
//! All source-control reads shell out to the system `git` binary so the
//! user's config and credential setup apply. The [`GitRunner`] trait is the
//! seam the changelog and validation pipelines consume, which lets tests
//! replace the subprocess with canned output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config;
use crate::error::GitError;

/// Trait for executing git commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitRunner: Send + Sync {
    /// Run `git <args>` and return its stdout.
    async fn run(&self, args: Vec<String>) -> Result<String, GitError>;
}

/// Runner backed by the system `git` binary.
pub struct SystemGit {
    workdir: Option<PathBuf>,
    timeout: Duration,
}

impl SystemGit {
    /// Runner for the current directory using the configured git timeout.
    pub fn new() -> Self {
        Self {
            workdir: None,
            timeout: config::git_timeout(),
        }
    }

    /// Runner rooted at `workdir`.
    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(workdir.into()),
            timeout: config::git_timeout(),
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, args: Vec<String>) -> Result<String, GitError> {
        let command_line = args.join(" ");
        debug!(args = %command_line, "running git");

        let mut command = Command::new("git");
        command
            .args(["-c", "log.showSignature=false"])
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| GitError::Timeout {
                args: command_line.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| GitError::SpawnFailed {
                args: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::NonZeroExit {
                args: command_line,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Check that the `git` binary is installed and accessible.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// First line of command output with surrounding quotes removed.
pub fn clean_output(output: &str) -> String {
    output
        .lines()
        .next()
        .unwrap_or("")
        .replace('\'', "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_git_version_succeeds() {
        let git = SystemGit::new();
        let out = git.run(vec!["--version".to_string()]).await.unwrap();
        assert!(out.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_run_git_invalid_command_fails() {
        let git = SystemGit::new();
        let err = git
            .run(vec!["not-a-real-command".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::NonZeroExit { .. }));
        assert!(err.stderr().is_some());
    }

    #[test]
    fn test_clean_output_takes_first_line() {
        assert_eq!(clean_output("'v1.0.0'\nother\n"), "v1.0.0");
        assert_eq!(clean_output(""), "");
    }
}
