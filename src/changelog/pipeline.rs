//! End-to-end changelog generation.
//!
//! Stages run in a fixed order so that configuration mistakes surface before
//! any git or network work:
//!
//! 1. custom notes / skip checks
//! 2. header and footer files, sort direction, exclude patterns
//! 3. current tag and repository coordinates
//! 4. provider client
//! 5. tag range, log, filter, classify, enrich, format, sort, write

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::client::{CommitInfoClient, Provider, auth::detect_provider};
use crate::commit::{ExcludeFilter, classify};
use crate::error::{ChangelogError, ConfigError, GitError};
use crate::git::{
    GitRunner, RepoRef, current_tag, origin_url, parse_remote_url, read_range_log,
    resolve_tag_range,
};

use super::enrich::{EnrichOptions, enrich};
use super::format::{build_sections, render_sections};
use super::sort::{SortDirection, sort_sections};
use super::writer::{ReleaseDocument, compose_notes, load_from_file, write_notes};

/// Changelog settings after merging the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct ChangelogOptions {
    pub skip: bool,
    pub snapshot: bool,
    pub exclude: Vec<String>,
    pub sort: String,
    /// Pre-written notes that replace generation entirely.
    pub release_notes: Option<PathBuf>,
    pub release_header: Option<PathBuf>,
    pub release_footer: Option<PathBuf>,
    pub dist: PathBuf,
    /// Previous reference override; bypasses tag resolution.
    pub previous_tag: Option<String>,
    pub enrich: EnrichOptions,
}

impl Default for ChangelogOptions {
    fn default() -> Self {
        Self {
            skip: false,
            snapshot: false,
            exclude: Vec::new(),
            sort: String::new(),
            release_notes: None,
            release_header: None,
            release_footer: None,
            dist: PathBuf::from("dist"),
            previous_tag: None,
            enrich: EnrichOptions::default(),
        }
    }
}

/// What the release is for. Missing pieces are discovered from git / env.
#[derive(Debug, Clone, Default)]
pub struct ReleaseTarget {
    pub current_tag: Option<String>,
    pub repo: Option<RepoRef>,
    pub provider: Option<Provider>,
}

/// Result of a changelog run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesOutcome {
    /// Pre-written notes were loaded; nothing was generated.
    Custom(String),
    Skipped(&'static str),
    Generated { path: PathBuf, notes: String },
}

fn git_step(step: &'static str) -> impl FnOnce(GitError) -> ChangelogError {
    move |source| ChangelogError::Git { step, source }
}

/// Run the changelog pipeline.
///
/// `connect` builds the provider client once the provider and repository are
/// known; it is not called when the run is skipped.
pub async fn run_changelog<G, F>(
    options: &ChangelogOptions,
    target: ReleaseTarget,
    git: &G,
    connect: F,
    generated_at: NaiveDateTime,
) -> Result<NotesOutcome, ChangelogError>
where
    G: GitRunner + ?Sized,
    F: FnOnce(Provider, &RepoRef) -> Result<Arc<dyn CommitInfoClient>, ChangelogError>,
{
    let custom = match &options.release_notes {
        Some(path) => {
            let notes = load_from_file(path)?;
            info!(file = %path.display(), "loaded custom release notes");
            debug!(file = %path.display(), "custom release notes: \n{}", notes);
            Some(notes)
        }
        None => None,
    };

    if options.skip {
        info!("changelog should not be built, skipping");
        return Ok(NotesOutcome::Skipped("changelog should not be built"));
    }
    if options.snapshot {
        info!("changelog not available for snapshots, skipping");
        return Ok(NotesOutcome::Skipped("not available for snapshots"));
    }
    if let Some(notes) = custom {
        return Ok(NotesOutcome::Custom(notes));
    }

    let header = options
        .release_header
        .as_deref()
        .map(load_from_file)
        .transpose()?;
    let footer = options
        .release_footer
        .as_deref()
        .map(load_from_file)
        .transpose()?;

    let direction: SortDirection = options.sort.parse()?;
    let filter = ExcludeFilter::new(&options.exclude)?;

    let provider = target
        .provider
        .or_else(detect_provider)
        .ok_or(ConfigError::NoProvider)?;

    let tag = match target.current_tag {
        Some(tag) => tag,
        None => current_tag(git).await.map_err(git_step("detect current tag"))?,
    };

    let repo = match target.repo {
        Some(repo) if repo.is_complete() => repo,
        Some(repo) if !repo.is_empty() => {
            return Err(ConfigError::MissingRepository {
                owner: repo.owner,
                name: repo.name,
            }
            .into());
        }
        _ => {
            let url = origin_url(git)
                .await
                .map_err(git_step("read origin remote"))?;
            parse_remote_url(&url)?
        }
    };

    let client = connect(provider, &repo)?;

    let range = resolve_tag_range(git, &tag, options.previous_tag.as_deref())
        .await
        .map_err(git_step("resolve previous tag"))?;
    let entries = read_range_log(git, &range)
        .await
        .map_err(git_step("read commit log"))?;
    debug!(range = %range.log_range(), count = entries.len(), "read commit log");

    let entries = filter.apply(entries);
    let classified = entries.iter().map(classify).collect();
    let enriched = enrich(client, classified, &options.enrich).await?;

    let mut sections = build_sections(&enriched, &repo);
    sort_sections(&mut sections, direction);
    let lines = render_sections(&sections);

    let joiner = provider.line_joiner();
    debug!(provider = %provider, joiner = ?joiner, "selected line joiner");

    let notes = compose_notes(&ReleaseDocument {
        header: header.as_deref(),
        tag: &tag,
        generated_at,
        lines: &lines,
        joiner,
        footer: footer.as_deref(),
    });

    let path = write_notes(&options.dist, &notes)?;
    info!(changelog = %path.display(), "writing");

    Ok(NotesOutcome::Generated { path, notes })
}
