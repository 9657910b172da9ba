//! Conventional commit gate over the most recent commits.
//!
//! Uses the strict grammar. Every non-conforming entry is collected so a
//! single run reports all problems.

use tracing::{debug, info};

use crate::error::ValidationError;
use crate::git::{CommitLogEntry, GitRunner, VALIDATION_WINDOW, read_recent_log};

use super::grammar::parse_strict;

/// Raw entries (`<hash> <subject>`) that failed the strict grammar, in log order.
pub fn find_violations(entries: &[CommitLogEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| match parse_strict(&entry.subject) {
            Some(_) => {
                debug!(commit = %entry.raw(), "passed");
                false
            }
            None => true,
        })
        .map(CommitLogEntry::raw)
        .collect()
}

/// Check already-read entries, failing once if any entry is rejected.
pub fn check_entries(entries: &[CommitLogEntry]) -> Result<(), ValidationError> {
    let violations = find_violations(entries);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidCommits {
            entries: violations,
        })
    }
}

/// Validate the last [`VALIDATION_WINDOW`] commits on HEAD.
pub async fn validate_recent_commits<G: GitRunner + ?Sized>(git: &G) -> Result<(), ValidationError> {
    let entries = read_recent_log(git, VALIDATION_WINDOW)
        .await
        .map_err(ValidationError::Git)?;
    check_entries(&entries)?;
    info!(count = entries.len(), "commit messages are valid");
    Ok(())
}
