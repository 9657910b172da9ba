//! Conventional commit grammar, classification, filtering and validation.

pub mod classify;
pub mod filter;
pub mod grammar;
pub mod validate;

pub use classify::{Category, ClassifiedCommit, classify};
pub use filter::ExcludeFilter;
pub use grammar::{CommitType, ConventionalSubject, is_merge_subject, parse_strict};
pub use validate::{check_entries, find_violations, validate_recent_commits};
