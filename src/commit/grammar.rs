//! Conventional commit vocabulary and the strict subject grammar.
//!
//! The compiled grammar is process-wide read-only state shared by every
//! caller.

use std::sync::LazyLock;

use regex_lite::Regex;

/// `[fixup! ]type[(scope)]: description`
const SUBJECT_PATTERN: &str =
    r"^(?:fixup!\s*)?(?P<type>\w+)(?:\((?P<scope>[\w$.*/-][^)]*)\))?: (?P<description>.*)$";

static SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUBJECT_PATTERN).expect("static subject grammar compiles"));

/// Subject prefixes git uses for merge commits.
const MERGE_PREFIXES: [&str; 2] = ["Merge branch", "Merge remote"];

/// Conventional commit types accepted by the strict grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Test,
    Chore,
    Perf,
    Hotfix,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Chore => "chore",
            Self::Perf => "perf",
            Self::Hotfix => "hotfix",
        }
    }
}

impl std::str::FromStr for CommitType {
    type Err = String;

    /// Case-sensitive; `doc` is the only alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" | "doc" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "test" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            "perf" => Ok(Self::Perf),
            "hotfix" => Ok(Self::Hotfix),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// A subject that satisfies the strict grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConventionalSubject {
    Conventional {
        commit_type: CommitType,
        scope: Option<String>,
        description: String,
    },
    Merge,
}

/// Whether `subject` is a git-generated merge subject.
pub fn is_merge_subject(subject: &str) -> bool {
    MERGE_PREFIXES.iter().any(|p| subject.starts_with(p))
}

/// Parse `subject` with the strict grammar.
///
/// Returns `None` when the subject does not match or its type is outside the
/// vocabulary. Merge subjects always parse.
pub fn parse_strict(subject: &str) -> Option<ConventionalSubject> {
    if is_merge_subject(subject) {
        return Some(ConventionalSubject::Merge);
    }

    let caps = SUBJECT.captures(subject)?;
    let commit_type = caps.name("type")?.as_str().parse::<CommitType>().ok()?;
    Some(ConventionalSubject::Conventional {
        commit_type,
        scope: caps.name("scope").map(|m| m.as_str().to_string()),
        description: caps
            .name("description")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}
