//! Tag range resolution.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, info};

use crate::error::GitError;

use super::runner::{GitRunner, clean_output};

static SHA1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]{40}$").expect("static SHA-1 pattern compiles"));

/// Stderr fragments git emits when no ancestor tag exists.
const NO_TAG_MARKERS: [&str; 3] = [
    "No names found",
    "No tags can describe",
    "cannot describe anything",
];

/// Where the previous reference of a range came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousRef {
    /// Supplied externally and used verbatim.
    Explicit(String),
    /// Nearest ancestor tag found by `git describe`.
    Tag(String),
    /// Repository root commit; no prior tag exists.
    Root(String),
}

impl PreviousRef {
    pub fn as_str(&self) -> &str {
        match self {
            PreviousRef::Explicit(r) | PreviousRef::Tag(r) | PreviousRef::Root(r) => r,
        }
    }
}

impl fmt::Display for PreviousRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The previous/current reference pair bounding a changelog slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRange {
    pub previous: PreviousRef,
    pub current: String,
}

impl TagRange {
    /// Revision range argument handed to `git log`.
    ///
    /// Commit ids are used as-is. Tags found by `describe` are qualified with
    /// `tags/` so a branch with the same name cannot shadow them.
    pub fn log_range(&self) -> String {
        match &self.previous {
            PreviousRef::Tag(prev) if !is_sha1(prev) => {
                format!("tags/{}..tags/{}", prev, self.current)
            }
            previous => format!("{}..{}", previous.as_str(), self.current),
        }
    }
}

/// Whether `reference` is a full 40-character hex commit id.
pub fn is_sha1(reference: &str) -> bool {
    SHA1.is_match(reference)
}

/// Resolve the range ending at `current_tag`.
///
/// Resolution order:
/// 1. `override_ref`, when present, is used verbatim.
/// 2. The nearest tag reachable from the tagged commit's first parent.
/// 3. When git reports that no such tag exists, the repository root commit.
/// 4. When the tag itself sits on a root commit, that commit.
///
/// `current_tag` must name an existing tag unless an override is given.
/// Any other git failure is returned as-is.
pub async fn resolve_tag_range<G: GitRunner + ?Sized>(
    git: &G,
    current_tag: &str,
    override_ref: Option<&str>,
) -> Result<TagRange, GitError> {
    let previous = match override_ref.filter(|r| !r.is_empty()) {
        Some(explicit) => {
            debug!(previous = %explicit, "using previous reference override");
            PreviousRef::Explicit(explicit.to_string())
        }
        None => previous_tag(git, current_tag).await?,
    };

    info!(previous = %previous, current = %current_tag, "resolved tag range");

    Ok(TagRange {
        previous,
        current: current_tag.to_string(),
    })
}

async fn previous_tag<G: GitRunner + ?Sized>(
    git: &G,
    current_tag: &str,
) -> Result<PreviousRef, GitError> {
    let tagged = tagged_commit(git, current_tag).await?;

    let describe = git
        .run(vec![
            "describe".to_string(),
            "--tags".to_string(),
            "--abbrev=0".to_string(),
            format!("tags/{}^", current_tag),
        ])
        .await;

    match describe {
        Ok(out) => {
            let tag = clean_output(&out);
            if tag.is_empty() {
                return Err(GitError::EmptyOutput { step: "describe" });
            }
            Ok(PreviousRef::Tag(tag))
        }
        Err(err) if is_no_tag_error(&err) => {
            debug!(tag = %current_tag, "no ancestor tag, falling back to root commit");
            root_commit(git).await.map(PreviousRef::Root)
        }
        Err(err) => {
            // `tags/<tag>^` does not exist when the tag is on a parentless commit.
            if matches!(is_root_commit(git, &tagged).await, Ok(true)) {
                debug!(tag = %current_tag, "tag is on the root commit");
                return Ok(PreviousRef::Root(tagged));
            }
            Err(err)
        }
    }
}

/// Commit id the tag points at; fails when the tag does not exist.
async fn tagged_commit<G: GitRunner + ?Sized>(
    git: &G,
    current_tag: &str,
) -> Result<String, GitError> {
    let out = git
        .run(vec![
            "rev-parse".to_string(),
            "--verify".to_string(),
            format!("tags/{}^{{commit}}", current_tag),
        ])
        .await?;
    let commit = clean_output(&out);
    if commit.is_empty() {
        return Err(GitError::EmptyOutput { step: "rev-parse" });
    }
    Ok(commit)
}

async fn is_root_commit<G: GitRunner + ?Sized>(git: &G, commit: &str) -> Result<bool, GitError> {
    let out = git
        .run(vec![
            "rev-list".to_string(),
            "--max-parents=0".to_string(),
            commit.to_string(),
        ])
        .await?;
    Ok(out.lines().any(|line| line.trim() == commit))
}

fn is_no_tag_error(err: &GitError) -> bool {
    err.stderr()
        .is_some_and(|stderr| NO_TAG_MARKERS.iter().any(|m| stderr.contains(m)))
}

/// Id of the repository's root commit.
pub async fn root_commit<G: GitRunner + ?Sized>(git: &G) -> Result<String, GitError> {
    let out = git
        .run(vec![
            "rev-list".to_string(),
            "--max-parents=0".to_string(),
            "HEAD".to_string(),
        ])
        .await?;
    let root = clean_output(&out);
    if root.is_empty() {
        return Err(GitError::EmptyOutput { step: "rev-list" });
    }
    Ok(root)
}

/// Most recent tag reachable from HEAD.
pub async fn current_tag<G: GitRunner + ?Sized>(git: &G) -> Result<String, GitError> {
    let out = git
        .run(vec![
            "describe".to_string(),
            "--tags".to_string(),
            "--abbrev=0".to_string(),
        ])
        .await?;
    let tag = clean_output(&out);
    if tag.is_empty() {
        return Err(GitError::EmptyOutput { step: "describe" });
    }
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::runner::MockGitRunner;

    const ROOT: &str = "0123456789abcdef0123456789abcdef01234567";
    const TAGGED: &str = "fedcba9876543210fedcba9876543210fedcba98";

    fn describe_error(stderr: &str) -> GitError {
        GitError::NonZeroExit {
            args: "describe".to_string(),
            code: 128,
            stderr: stderr.to_string(),
        }
    }

    fn no_tag_error() -> GitError {
        describe_error("fatal: No names found, cannot describe anything.")
    }

    #[tokio::test]
    async fn test_override_skips_describe() {
        let mut git = MockGitRunner::new();
        git.expect_run().never();

        let range = resolve_tag_range(&git, "v1.1.0", Some("v1.0.0")).await.unwrap();
        assert_eq!(range.previous, PreviousRef::Explicit("v1.0.0".to_string()));
        assert_eq!(range.log_range(), "v1.0.0..v1.1.0");
    }

    fn expect_tag_lookup(git: &mut MockGitRunner, tag: &'static str, commit: &'static str) {
        git.expect_run()
            .withf(move |args| args[0] == "rev-parse" && args[2] == format!("tags/{}^{{commit}}", tag))
            .times(1)
            .returning(move |_| Ok(format!("{}\n", commit)));
    }

    #[tokio::test]
    async fn test_empty_override_is_ignored() {
        let mut git = MockGitRunner::new();
        expect_tag_lookup(&mut git, "v1.1.0", TAGGED);
        git.expect_run()
            .withf(|args| args[0] == "describe" && args[3] == "tags/v1.1.0^")
            .times(1)
            .returning(|_| Ok("v1.0.0\n".to_string()));

        let range = resolve_tag_range(&git, "v1.1.0", Some("")).await.unwrap();
        assert_eq!(range.previous, PreviousRef::Tag("v1.0.0".to_string()));
        assert_eq!(range.log_range(), "tags/v1.0.0..tags/v1.1.0");
    }

    #[tokio::test]
    async fn test_unknown_tag_fails_before_describe() {
        let mut git = MockGitRunner::new();
        git.expect_run()
            .withf(|args| args[0] == "rev-parse")
            .times(1)
            .returning(|_| {
                Err(GitError::NonZeroExit {
                    args: "rev-parse --verify tags/v9.9.9^{commit}".to_string(),
                    code: 128,
                    stderr: "fatal: Needed a single revision".to_string(),
                })
            });
        git.expect_run().withf(|args| args[0] != "rev-parse").never();

        let err = resolve_tag_range(&git, "v9.9.9", None).await.unwrap_err();
        assert_eq!(err.stderr(), Some("fatal: Needed a single revision"));
    }

    #[tokio::test]
    async fn test_no_ancestor_tag_falls_back_to_root() {
        let mut git = MockGitRunner::new();
        expect_tag_lookup(&mut git, "v0.1.0", TAGGED);
        git.expect_run()
            .withf(|args| args[0] == "describe")
            .times(1)
            .returning(|_| Err(no_tag_error()));
        git.expect_run()
            .withf(|args| args[0] == "rev-list" && args[2] == "HEAD")
            .times(1)
            .returning(|_| Ok(format!("{}\n", ROOT)));

        let range = resolve_tag_range(&git, "v0.1.0", None).await.unwrap();
        assert_eq!(range.previous, PreviousRef::Root(ROOT.to_string()));
        assert_eq!(range.log_range(), format!("{}..v0.1.0", ROOT));
    }

    #[tokio::test]
    async fn test_tag_on_root_commit_resolves_to_root() {
        let mut git = MockGitRunner::new();
        expect_tag_lookup(&mut git, "v0.1.0", ROOT);
        git.expect_run()
            .withf(|args| args[0] == "describe")
            .times(1)
            .returning(|_| Err(describe_error("fatal: Not a valid object name tags/v0.1.0^")));
        git.expect_run()
            .withf(|args| args[0] == "rev-list" && args[2] == ROOT)
            .times(1)
            .returning(|_| Ok(format!("{}\n", ROOT)));

        let range = resolve_tag_range(&git, "v0.1.0", None).await.unwrap();
        assert_eq!(range.previous, PreviousRef::Root(ROOT.to_string()));
        assert_eq!(range.log_range(), format!("{}..v0.1.0", ROOT));
    }

    #[tokio::test]
    async fn test_other_describe_failure_is_fatal() {
        let mut git = MockGitRunner::new();
        expect_tag_lookup(&mut git, "v1.0.0", TAGGED);
        git.expect_run()
            .withf(|args| args[0] == "describe")
            .times(1)
            .returning(|_| Err(describe_error("fatal: not a git repository")));
        git.expect_run()
            .withf(|args| args[0] == "rev-list" && args[2] == TAGGED)
            .times(1)
            .returning(|_| Ok(format!("{}\n", ROOT)));

        let err = resolve_tag_range(&git, "v1.0.0", None).await.unwrap_err();
        assert_eq!(err.stderr(), Some("fatal: not a git repository"));
    }

    #[test]
    fn test_is_sha1() {
        assert!(is_sha1(ROOT));
        assert!(!is_sha1("v1.0.0"));
        assert!(!is_sha1("0123456"));
    }

    #[test]
    fn test_sha_shaped_tag_is_not_qualified() {
        let range = TagRange {
            previous: PreviousRef::Tag(ROOT.to_string()),
            current: "v2.0.0".to_string(),
        };
        assert_eq!(range.log_range(), format!("{}..v2.0.0", ROOT));
    }
}
