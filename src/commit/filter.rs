//! Exclude-pattern filtering of log entries.

use regex_lite::Regex;
use tracing::debug;

use crate::error::ConfigError;
use crate::git::CommitLogEntry;

/// Ordered set of compiled exclude patterns.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Regex>,
}

impl ExcludeFilter {
    /// Compile every pattern up front. One invalid pattern rejects the whole set.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| ConfigError::InvalidExcludePattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Drop every entry whose subject matches any pattern.
    ///
    /// Patterns run as successive stages over the surviving entries, so
    /// relative order is preserved.
    pub fn apply(&self, entries: Vec<CommitLogEntry>) -> Vec<CommitLogEntry> {
        self.patterns.iter().fold(entries, |entries, pattern| {
            let before = entries.len();
            let kept: Vec<_> = entries
                .into_iter()
                .filter(|e| !pattern.is_match(&e.subject))
                .collect();
            debug!(
                pattern = pattern.as_str(),
                removed = before - kept.len(),
                "applied exclude filter"
            );
            kept
        })
    }
}
