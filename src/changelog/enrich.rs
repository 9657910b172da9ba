//! Per-commit metadata enrichment.
//!
//! Each surviving commit costs one provider request (plus retries). With
//! `concurrency > 1` requests fan out over a semaphore-bounded set of tasks;
//! results are always reassembled in commit order so the rendered changelog
//! does not depend on completion order. The first failure aborts the build.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use crate::client::{CommitInfoClient, CommitMetadata};
use crate::commit::ClassifiedCommit;
use crate::error::{ChangelogError, ClientError};
use crate::retry::{DEFAULT_MAX_ATTEMPTS, retry_with_backoff};

use super::format::EnrichedCommit;

/// Tuning for metadata requests.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Maximum in-flight requests; 0 and 1 both mean sequential.
    pub concurrency: usize,
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout: Duration::from_secs(30),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Fetch metadata for one commit with timeout and retry.
async fn fetch_metadata(
    client: &dyn CommitInfoClient,
    commit_id: &str,
    options: &EnrichOptions,
) -> Result<CommitMetadata, ClientError> {
    let limit = options.timeout;
    retry_with_backoff(
        options.max_attempts,
        move || async move {
            timeout(limit, client.get_info_by_id(commit_id))
                .await
                .map_err(|_| ClientError::Timeout(limit.as_secs()))?
        },
        ClientError::is_retryable,
        |attempts, e| ClientError::RetriesExhausted {
            attempts,
            source: Box::new(e),
        },
    )
    .await
}

/// Attach provider metadata to every commit, preserving order.
pub async fn enrich(
    client: Arc<dyn CommitInfoClient>,
    commits: Vec<ClassifiedCommit>,
    options: &EnrichOptions,
) -> Result<Vec<EnrichedCommit>, ChangelogError> {
    if options.concurrency <= 1 {
        enrich_sequential(client.as_ref(), commits, options).await
    } else {
        enrich_concurrent(client, commits, options).await
    }
}

async fn enrich_sequential(
    client: &dyn CommitInfoClient,
    commits: Vec<ClassifiedCommit>,
    options: &EnrichOptions,
) -> Result<Vec<EnrichedCommit>, ChangelogError> {
    let mut enriched = Vec::with_capacity(commits.len());
    for commit in commits {
        debug!(commit = %commit.hash, "fetching commit metadata");
        let metadata = fetch_metadata(client, &commit.hash, options)
            .await
            .map_err(|source| ChangelogError::Metadata {
                commit: commit.hash.clone(),
                source,
            })?;
        enriched.push(EnrichedCommit { commit, metadata });
    }
    Ok(enriched)
}

type MetadataTask = JoinHandle<Result<CommitMetadata, ClientError>>;

fn abort_all(pending: impl IntoIterator<Item = (ClassifiedCommit, MetadataTask)>) {
    for (_, handle) in pending {
        handle.abort();
    }
}

async fn enrich_concurrent(
    client: Arc<dyn CommitInfoClient>,
    commits: Vec<ClassifiedCommit>,
    options: &EnrichOptions,
) -> Result<Vec<EnrichedCommit>, ChangelogError> {
    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let mut pending: Vec<(ClassifiedCommit, MetadataTask)> = Vec::with_capacity(commits.len());

    for commit in commits {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                abort_all(pending);
                return Err(ChangelogError::WorkerFailed {
                    commit: commit.hash,
                    message: e.to_string(),
                });
            }
        };

        let client = client.clone();
        let commit_id = commit.hash.clone();
        let options = options.clone();
        debug!(commit = %commit_id, "spawning metadata fetch");
        let handle = tokio::spawn(async move {
            let result = fetch_metadata(client.as_ref(), &commit_id, &options).await;
            drop(permit);
            result
        });
        pending.push((commit, handle));
    }

    let mut enriched = Vec::with_capacity(pending.len());
    let mut pending = pending.into_iter();
    while let Some((commit, handle)) = pending.next() {
        match handle.await {
            Ok(Ok(metadata)) => enriched.push(EnrichedCommit { commit, metadata }),
            Ok(Err(source)) => {
                abort_all(pending);
                return Err(ChangelogError::Metadata {
                    commit: commit.hash,
                    source,
                });
            }
            Err(e) => {
                abort_all(pending);
                return Err(ChangelogError::WorkerFailed {
                    commit: commit.hash,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(enriched)
}
