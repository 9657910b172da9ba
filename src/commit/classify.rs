//! Lenient classification used for changelog bucketing.
//!
//! Unlike [`super::grammar::parse_strict`], this never fails: anything that
//! is not a recognised `fix`, `feat`, `chore` or `pref` prefix lands in
//! [`Category::Other`] with its subject untouched. A malformed commit message
//! must not stop a changelog from being built.

use crate::git::CommitLogEntry;

/// Changelog bucket for a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Fix,
    Feature,
    Chore,
    Other,
}

impl Category {
    /// All categories in section order.
    pub const ALL: [Category; 4] = [
        Category::Fix,
        Category::Feature,
        Category::Chore,
        Category::Other,
    ];

    /// Map a type token (the text before the first colon, scope removed).
    ///
    /// `pref` is kept as a historical misspelling of `perf`.
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "fix" => Some(Self::Fix),
            "feat" => Some(Self::Feature),
            "chore" | "pref" => Some(Self::Chore),
            _ => None,
        }
    }
}

/// A log entry with its changelog bucket and display description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub hash: String,
    pub raw_subject: String,
    pub category: Category,
    pub description: String,
}

/// Classify a log entry leniently.
pub fn classify(entry: &CommitLogEntry) -> ClassifiedCommit {
    let (category, description) = match split_prefix(&entry.subject) {
        Some((category, rest)) => (category, clean_description(rest)),
        None => (Category::Other, clean_description(&entry.subject)),
    };

    ClassifiedCommit {
        hash: entry.hash.clone(),
        raw_subject: entry.subject.clone(),
        category,
        description,
    }
}

fn split_prefix(subject: &str) -> Option<(Category, &str)> {
    let (prefix, rest) = subject.split_once(':')?;
    let token = match prefix.split_once('(') {
        Some((token, scope)) if scope.ends_with(')') => token,
        Some(_) => return None,
        None => prefix,
    };
    Category::from_prefix(token).map(|category| (category, rest))
}

/// Trim whitespace and a single trailing period.
fn clean_description(text: &str) -> String {
    let trimmed = text.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}
