//! Git operations via the system git binary.

pub mod log;
pub mod range;
pub mod remote;
pub mod runner;

pub use log::{CommitLogEntry, VALIDATION_WINDOW, read_range_log, read_recent_log};
pub use range::{PreviousRef, TagRange, current_tag, is_sha1, resolve_tag_range};
pub use remote::{RepoRef, origin_url, parse_remote_url};
pub use runner::{GitRunner, SystemGit, check_git_installed};
