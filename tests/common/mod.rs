//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use git2::{Oid, Repository, Signature};

use tagnotes::client::{CommitInfoClient, CommitMetadata};
use tagnotes::error::{ChangelogError, ClientError, GitError};
use tagnotes::git::GitRunner;
use tagnotes::{Provider, RepoRef};

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Fixed timestamp used as the generation time in rendered notes.
pub fn generated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

/// Metadata as a provider would return it for `id`.
pub fn metadata(id: &str) -> CommitMetadata {
    CommitMetadata {
        id: format!("{}0000000000", id),
        short_id: id.to_string(),
        committed_date: FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 20, 14, 3, 9)
            .unwrap(),
        author_email: "dev@example.com".to_string(),
        committer_email: "dev@example.com".to_string(),
        avatar_url: "https://avatars.example.com/u/1".to_string(),
        base_url: "https://github.com".to_string(),
    }
}

/// Git runner that answers from a script keyed by the first argument.
///
/// Every call is recorded so tests can assert on the exact arguments.
#[derive(Default, Clone)]
pub struct FakeGit {
    responses: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `git <command> ...` with `stdout`.
    pub fn on(self, command: &str, stdout: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), Ok(stdout.to_string()));
        self
    }

    /// Fail `git <command> ...` with exit code 128 and `stderr`.
    pub fn fail(self, command: &str, stderr: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), Err(stderr.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose first argument is `command`.
    pub fn calls_to(&self, command: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|args| args.first().is_some_and(|a| a == command))
            .collect()
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, args: Vec<String>) -> Result<String, GitError> {
        self.calls.lock().unwrap().push(args.clone());
        let command = args.first().cloned().unwrap_or_default();
        match self.responses.lock().unwrap().get(&command) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => Err(GitError::NonZeroExit {
                args: args.join(" "),
                code: 128,
                stderr: stderr.clone(),
            }),
            None => panic!("unexpected git call: {:?}", args),
        }
    }
}

/// Provider client that serves [`metadata`] and records requested ids.
#[derive(Default, Clone)]
pub struct FakeClient {
    requested: Arc<Mutex<Vec<String>>>,
    missing: Arc<Mutex<Vec<String>>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make lookups of `id` fail with not-found.
    pub fn without(self, id: &str) -> Self {
        self.missing.lock().unwrap().push(id.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// Connector for `run_changelog` that hands out this client.
    pub fn connector(
        &self,
    ) -> impl FnOnce(Provider, &RepoRef) -> Result<Arc<dyn CommitInfoClient>, ChangelogError> {
        let client = self.clone();
        move |_: Provider, _: &RepoRef| Ok(Arc::new(client) as Arc<dyn CommitInfoClient>)
    }
}

#[async_trait]
impl CommitInfoClient for FakeClient {
    async fn get_info_by_id(&self, commit_id: &str) -> Result<CommitMetadata, ClientError> {
        self.requested.lock().unwrap().push(commit_id.to_string());
        if self.missing.lock().unwrap().iter().any(|m| m == commit_id) {
            return Err(ClientError::CommitNotFound {
                commit: commit_id.to_string(),
                owner: "acme".to_string(),
                repo: "rocket".to_string(),
            });
        }
        Ok(metadata(commit_id))
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        Self { dir, repo }
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Create a commit with the given message. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = self.signature();

        let file_path = self.dir.path().join("test.txt");
        let content = format!(
            "{}\n{}",
            message,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        );
        std::fs::write(&file_path, content).expect("Failed to write test file");

        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(std::path::Path::new("test.txt"))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a lightweight tag pointing to the given OID.
    pub fn tag_lightweight(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag_lightweight(name, &obj, false)
            .expect("Failed to create lightweight tag");
    }

    /// Create an annotated tag pointing to the given OID.
    pub fn tag_annotated(&self, name: &str, oid: Oid, message: &str) {
        let sig = self.signature();
        let obj = self.repo.find_object(oid, None).expect("Failed to find object");
        self.repo
            .tag(name, &obj, &sig, message, false)
            .expect("Failed to create annotated tag");
    }

    /// Point `origin` at `url`.
    pub fn set_origin(&self, url: &str) {
        self.repo.remote("origin", url).expect("Failed to add remote");
    }
}
