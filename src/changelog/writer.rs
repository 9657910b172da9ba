//! Release notes composition and output.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::NamedTempFile;

use crate::error::ChangelogError;

/// File name written inside the dist directory.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Separator between top-level blocks of the document.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Divider between the heading block and the sections.
const HEADING_DIVIDER: &str = "</br>\n";

const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inputs for the final markdown document.
#[derive(Debug, Clone)]
pub struct ReleaseDocument<'a> {
    pub header: Option<&'a str>,
    pub tag: &'a str,
    pub generated_at: NaiveDateTime,
    pub lines: &'a [String],
    /// Provider-specific joiner between section lines.
    pub joiner: &'a str,
    pub footer: Option<&'a str>,
}

/// Version shown in the heading: the tag without its leading `v`.
pub fn display_version(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Compose header, heading, timestamp, divider, sections and footer.
pub fn compose_notes(doc: &ReleaseDocument<'_>) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(6);
    if let Some(header) = doc.header {
        blocks.push(header.to_string());
    }
    blocks.push(format!("## Version {}", display_version(doc.tag)));
    blocks.push(doc.generated_at.format(GENERATED_AT_FORMAT).to_string());
    blocks.push(HEADING_DIVIDER.to_string());
    blocks.push(doc.lines.join(doc.joiner));
    if let Some(footer) = doc.footer {
        blocks.push(footer.to_string());
    }
    blocks.join(BLOCK_SEPARATOR)
}

/// Read a whole text file (custom notes, header, footer).
pub fn load_from_file(path: &Path) -> Result<String, ChangelogError> {
    fs::read_to_string(path).map_err(|source| ChangelogError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically write `notes` to `<dist>/CHANGELOG.md`, creating `dist` if needed.
pub fn write_notes(dist: &Path, notes: &str) -> Result<PathBuf, ChangelogError> {
    let path = dist.join(CHANGELOG_FILE);
    let write_failed = |source: std::io::Error| ChangelogError::WriteFailed {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dist).map_err(write_failed)?;

    let mut file = NamedTempFile::new_in(dist).map_err(write_failed)?;
    file.write_all(notes.as_bytes()).map_err(write_failed)?;
    file.as_file().sync_all().map_err(write_failed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_failed)?;
    }

    file.persist(&path).map_err(|e| write_failed(e.error))?;
    Ok(path)
}
