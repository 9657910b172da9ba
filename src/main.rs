//! tagnotes - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tagnotes::changelog::{ChangelogOptions, EnrichOptions, NotesOutcome, ReleaseTarget, run_changelog};
use tagnotes::client::{ClientSettings, CommitInfoClient, Provider, auth::get_token, new_client};
use tagnotes::commit::validate_recent_commits;
use tagnotes::config::{Config, metadata_timeout, previous_tag_override};
use tagnotes::error::ChangelogError;
use tagnotes::git::{RepoRef, SystemGit, check_git_installed};

/// Generate release notes from the commits between two tags.
#[derive(Parser, Debug)]
#[command(name = "tagnotes")]
#[command(about = "Generate release notes from the commits between two tags")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (default: .tagnotes.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the changelog for the current tag
    Changelog(ChangelogArgs),

    /// Check that recent commit messages follow the conventional format
    Validate,
}

#[derive(Args, Debug)]
struct ChangelogArgs {
    /// Tag being released (defaults to the most recent tag)
    #[arg(long)]
    tag: Option<String>,

    /// Sort entries within each section: asc or desc
    #[arg(long)]
    sort: Option<String>,

    /// Exclude commits whose subject matches this pattern (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Do not build the changelog
    #[arg(long)]
    skip: bool,

    /// Snapshot build; the changelog is not generated
    #[arg(long)]
    snapshot: bool,

    /// Use pre-written release notes instead of generating them
    #[arg(long)]
    release_notes: Option<PathBuf>,

    /// File prepended to the generated notes
    #[arg(long)]
    release_header: Option<PathBuf>,

    /// File appended to the generated notes
    #[arg(long)]
    release_footer: Option<PathBuf>,

    /// Output directory for CHANGELOG.md
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Hosting provider: github, gitlab or gitea
    #[arg(long)]
    provider: Option<String>,

    /// Repository owner (defaults to the origin remote)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (defaults to the origin remote)
    #[arg(long)]
    name: Option<String>,

    /// Maximum concurrent metadata requests
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    check_git_installed().context("git is required")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Changelog(args) => changelog(args, config).await,
        Commands::Validate => validate().await,
    }
}

/// Log to stderr, honouring `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn changelog(args: ChangelogArgs, config: Config) -> Result<()> {
    let provider = match args.provider.as_deref() {
        Some(p) => Some(p.parse::<Provider>()?),
        None => config.provider,
    };

    let mut repo = config.release.clone();
    if let Some(owner) = args.owner {
        repo.owner = owner;
    }
    if let Some(name) = args.name {
        repo.name = name;
    }

    let mut exclude = config.changelog.filters.exclude.clone();
    exclude.extend(args.exclude);

    let options = ChangelogOptions {
        skip: args.skip || config.changelog.skip,
        snapshot: args.snapshot,
        exclude,
        sort: args.sort.unwrap_or(config.changelog.sort.clone()),
        release_notes: args.release_notes,
        release_header: args.release_header,
        release_footer: args.release_footer,
        dist: args.dist.unwrap_or(config.dist.clone()),
        previous_tag: previous_tag_override(),
        enrich: EnrichOptions {
            concurrency: args.concurrency.unwrap_or(config.enrichment.concurrency),
            timeout: metadata_timeout(config.enrichment.timeout_secs),
            max_attempts: config.enrichment.max_attempts,
        },
    };

    let target = ReleaseTarget {
        current_tag: args.tag,
        repo: Some(repo),
        provider,
    };

    let api_url = config.api_url;
    let web_url = config.web_url;
    let connect = move |provider: Provider,
                        repo: &RepoRef|
          -> Result<Arc<dyn CommitInfoClient>, ChangelogError> {
        let token = get_token(provider).map_err(ChangelogError::ClientSetup)?;
        let mut settings = ClientSettings::new(provider, repo.clone(), token);
        if let Some(url) = api_url {
            settings.api_url = url;
        }
        if let Some(url) = web_url {
            settings.web_url = url;
        }
        new_client(settings).map_err(ChangelogError::ClientSetup)
    };

    let git = SystemGit::new();
    let outcome = run_changelog(
        &options,
        target,
        &git,
        connect,
        Local::now().naive_local(),
    )
    .await
    .context("Failed to generate changelog")?;

    match outcome {
        NotesOutcome::Custom(notes) => {
            println!("Using custom release notes");
            println!("{}", notes);
        }
        NotesOutcome::Skipped(reason) => println!("Skipped: {}", reason),
        NotesOutcome::Generated { path, .. } => println!("✓ Wrote {}", path.display()),
    }

    Ok(())
}

async fn validate() -> Result<()> {
    let git = SystemGit::new();
    validate_recent_commits(&git)
        .await
        .context("Commit message validation failed")?;

    println!("✓ Recent commit messages follow the conventional format");
    Ok(())
}
