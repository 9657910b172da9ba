//! Commit log retrieval.

use crate::error::GitError;

use super::range::TagRange;
use super::runner::GitRunner;

/// Shortest abbreviated hash git prints.
const MIN_ABBREV_LEN: usize = 4;

/// Number of recent commits examined by the validator.
pub const VALIDATION_WINDOW: usize = 20;

/// One `<abbreviated-hash> <subject>` line from `git log --oneline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLogEntry {
    pub hash: String,
    pub subject: String,
}

impl CommitLogEntry {
    /// Parse a oneline log entry.
    ///
    /// The hash must be at least 4 hex characters, git's shortest
    /// abbreviation. A line with no subject yields an empty subject.
    pub fn parse(line: &str) -> Result<Self, GitError> {
        let (hash, subject) = line.split_once(' ').unwrap_or((line, ""));
        if hash.len() < MIN_ABBREV_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GitError::MalformedLogLine(line.to_string()));
        }
        Ok(Self {
            hash: hash.to_string(),
            subject: subject.to_string(),
        })
    }

    /// The raw line as git printed it.
    pub fn raw(&self) -> String {
        format!("{} {}", self.hash, self.subject)
    }
}

fn oneline_args() -> Vec<String> {
    [
        "log",
        "--pretty=oneline",
        "--abbrev-commit",
        "--no-decorate",
        "--no-color",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Read the commits in `range`, most recent first.
pub async fn read_range_log<G: GitRunner + ?Sized>(
    git: &G,
    range: &TagRange,
) -> Result<Vec<CommitLogEntry>, GitError> {
    let mut args = oneline_args();
    args.push(range.log_range());
    let out = git.run(args).await?;
    parse_log(&out)
}

/// Read the `count` most recent commits on HEAD.
pub async fn read_recent_log<G: GitRunner + ?Sized>(
    git: &G,
    count: usize,
) -> Result<Vec<CommitLogEntry>, GitError> {
    let mut args = oneline_args();
    args.push(format!("--max-count={}", count));
    let out = git.run(args).await?;
    parse_log(&out)
}

/// Split log output into entries, dropping the empty trailing line.
pub fn parse_log(output: &str) -> Result<Vec<CommitLogEntry>, GitError> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(CommitLogEntry::parse)
        .collect()
}
