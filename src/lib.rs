//! tagnotes - Release notes from the commits between two tags.
//!
//! # Overview
//!
//! tagnotes resolves the previous tag, reads the commit log for the range,
//! buckets each commit into a changelog section, enriches it with author and
//! date metadata from the hosting provider (GitHub, GitLab or Gitea), and
//! writes the rendered markdown to `dist/CHANGELOG.md`. It also validates that
//! recent commit messages follow the conventional-commit format.

pub mod changelog;
pub mod client;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod retry;

// Re-export commonly used types
pub use changelog::{ChangelogOptions, NotesOutcome, ReleaseTarget, SortDirection, run_changelog};
pub use client::{CommitInfoClient, CommitMetadata, Provider};
pub use commit::{Category, ClassifiedCommit, CommitType};
pub use config::Config;
pub use error::{ChangelogError, ClientError, ConfigError, GitError, ValidationError};
pub use git::{CommitLogEntry, GitRunner, RepoRef, SystemGit, TagRange};
