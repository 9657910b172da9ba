//! Changelog generation: enrichment, rendering, sorting and output.

pub mod enrich;
pub mod format;
pub mod pipeline;
pub mod sort;
pub mod writer;

pub use enrich::{EnrichOptions, enrich};
pub use format::{ChangelogSection, EnrichedCommit, RenderedEntry, build_sections, render_sections};
pub use pipeline::{ChangelogOptions, NotesOutcome, ReleaseTarget, run_changelog};
pub use sort::{SortDirection, sort_entries, sort_sections};
pub use writer::{CHANGELOG_FILE, ReleaseDocument, compose_notes, write_notes};
