//! Configuration file and environment tunables.
//!
//! The JSON config file supplies project defaults; CLI flags override it.
//! Timeouts and the previous-tag override come from the environment.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::Provider;
use crate::error::ConfigError;
use crate::git::RepoRef;
use crate::retry::DEFAULT_MAX_ATTEMPTS;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".tagnotes.json";

/// Environment variable that supplies the previous reference directly.
pub const PREVIOUS_TAG_ENV_VAR: &str = "TAGNOTES_PREVIOUS_TAG";

/// Environment variable overriding the per-call git timeout (seconds).
pub const GIT_TIMEOUT_ENV_VAR: &str = "TAGNOTES_GIT_TIMEOUT";

/// Environment variable overriding the per-call metadata timeout (seconds).
pub const METADATA_TIMEOUT_ENV_VAR: &str = "TAGNOTES_METADATA_TIMEOUT";

const DEFAULT_GIT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 30;

/// Top-level config file contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the generated CHANGELOG.md is written to.
    pub dist: PathBuf,
    pub changelog: ChangelogSection,
    pub release: RepoRef,
    pub provider: Option<Provider>,
    pub api_url: Option<String>,
    pub web_url: Option<String>,
    pub enrichment: EnrichmentSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dist: PathBuf::from("dist"),
            changelog: ChangelogSection::default(),
            release: RepoRef::default(),
            provider: None,
            api_url: None,
            web_url: None,
            enrichment: EnrichmentSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChangelogSection {
    pub skip: bool,
    /// `""`, `"asc"` or `"desc"`; validated when the pipeline starts.
    pub sort: String,
    pub filters: Filters,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Filters {
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentSection {
    /// Maximum in-flight metadata requests; 1 keeps requests sequential.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            concurrency: 1,
            timeout_secs: DEFAULT_METADATA_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load `path`, or the default file when `path` is `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!(file = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed { path, source })
    }
}

/// Previous reference supplied through the environment, if set and non-empty.
pub fn previous_tag_override() -> Option<String> {
    env::var(PREVIOUS_TAG_ENV_VAR).ok().filter(|v| !v.is_empty())
}

/// Timeout for each git subprocess.
pub fn git_timeout() -> Duration {
    Duration::from_secs(secs_from_env(GIT_TIMEOUT_ENV_VAR).unwrap_or(DEFAULT_GIT_TIMEOUT_SECS))
}

/// Timeout for each metadata request, preferring the environment over `configured`.
pub fn metadata_timeout(configured: u64) -> Duration {
    Duration::from_secs(secs_from_env(METADATA_TIMEOUT_ENV_VAR).unwrap_or(configured))
}

/// Read a positive number of seconds from `var`.
///
/// Logs a warning if the variable is set but not a valid number.
fn secs_from_env(var: &str) -> Option<u64> {
    match env::var(var) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(secs),
            _ => {
                warn!("Invalid {} value '{}', using default", var, v);
                None
            }
        },
        _ => None,
    }
}
