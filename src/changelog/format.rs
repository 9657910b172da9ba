//! Section bucketing and per-entry markdown rendering.

use crate::client::CommitMetadata;
use crate::commit::{Category, ClassifiedCommit};
use crate::git::RepoRef;

/// Divider emitted under every section header.
pub const SECTION_DIVIDER: &str = "***";

/// Break emitted after every non-empty section.
pub const SECTION_BREAK: &str = "<br/>\n";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A classified commit together with its provider metadata.
#[derive(Debug, Clone)]
pub struct EnrichedCommit {
    pub commit: ClassifiedCommit,
    pub metadata: CommitMetadata,
}

/// Section header, emoji first.
pub fn section_header(category: Category) -> &'static str {
    match category {
        Category::Fix => "### 🐛Bug fixes",
        Category::Feature => "### 🚀Features",
        Category::Chore => "### 🔧Chores and Improvements",
        Category::Other => "### 📦Other",
    }
}

/// `{baseURL}/{owner}/{name}/commit/{fullCommitID}`
pub fn commit_url(metadata: &CommitMetadata, repo: &RepoRef) -> String {
    format!(
        "{}/{}/{}/commit/{}",
        metadata.base_url, repo.owner, repo.name, metadata.id
    )
}

/// One rendered changelog entry.
///
/// `link` is the bold hash link; `body` is everything after it and is what
/// sorting compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub link: String,
    pub body: String,
}

impl RenderedEntry {
    pub fn line(&self) -> String {
        format!("* {} {}", self.link, self.body)
    }
}

/// Render `enriched` as a markdown list item.
pub fn render_entry(enriched: &EnrichedCommit, repo: &RepoRef) -> RenderedEntry {
    let meta = &enriched.metadata;
    let link = format!(
        "__[{}]({})__",
        enriched.commit.hash,
        commit_url(meta, repo)
    );
    let avatar = format!(
        r#"<img src="{}" width="20" height="20" title="{}"/>"#,
        meta.avatar_url, meta.committer_email
    );
    let body = format!(
        "___{}___ created by <span style=\"display: inline-block;\"> {}</span>\n*at:{}*\n",
        enriched.commit.description,
        avatar,
        meta.committed_date.format(TIMESTAMP_FORMAT)
    );
    RenderedEntry { link, body }
}

/// Entries of one category, in commit order until sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSection {
    pub category: Category,
    pub entries: Vec<RenderedEntry>,
}

impl ChangelogSection {
    /// Header, divider, entries and trailing break.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.entries.len() + 3);
        lines.push(section_header(self.category).to_string());
        lines.push(SECTION_DIVIDER.to_string());
        lines.extend(self.entries.iter().map(RenderedEntry::line));
        lines.push(SECTION_BREAK.to_string());
        lines
    }
}

/// Bucket entries by category in a single pass.
///
/// Sections come back in [`Category::ALL`] order and empty ones are dropped.
pub fn build_sections(entries: &[EnrichedCommit], repo: &RepoRef) -> Vec<ChangelogSection> {
    let mut sections: Vec<ChangelogSection> = Category::ALL
        .iter()
        .map(|&category| ChangelogSection {
            category,
            entries: Vec::new(),
        })
        .collect();

    for enriched in entries {
        let rendered = render_entry(enriched, repo);
        if let Some(section) = sections
            .iter_mut()
            .find(|s| s.category == enriched.commit.category)
        {
            section.entries.push(rendered);
        }
    }

    sections.retain(|s| !s.entries.is_empty());
    sections
}

/// Flatten sections into output lines.
pub fn render_sections(sections: &[ChangelogSection]) -> Vec<String> {
    sections.iter().flat_map(ChangelogSection::lines).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn enriched(hash: &str, category: Category, description: &str) -> EnrichedCommit {
        EnrichedCommit {
            commit: ClassifiedCommit {
                hash: hash.to_string(),
                raw_subject: description.to_string(),
                category,
                description: description.to_string(),
            },
            metadata: CommitMetadata {
                id: format!("{}000000000000000000000000000000000", hash),
                short_id: hash.to_string(),
                committed_date: FixedOffset::east_opt(3600)
                    .unwrap()
                    .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
                    .unwrap(),
                author_email: "author@example.com".to_string(),
                committer_email: "committer@example.com".to_string(),
                avatar_url: "https://avatars.example.com/u/1".to_string(),
                base_url: "https://github.com".to_string(),
            },
        }
    }

    #[test]
    fn test_render_entry() {
        let repo = RepoRef::new("acme", "rocket");
        let entry = render_entry(&enriched("abc1234", Category::Feature, "add login"), &repo);

        assert_eq!(
            entry.link,
            "__[abc1234](https://github.com/acme/rocket/commit/abc1234000000000000000000000000000000000)__"
        );
        assert!(entry.body.starts_with("___add login___ created by "));
        assert!(entry.body.contains(
            r#"<img src="https://avatars.example.com/u/1" width="20" height="20" title="committer@example.com"/>"#
        ));
        assert!(entry.body.ends_with("*at:2024-03-09 14:05:07*\n"));
        assert!(entry.line().starts_with("* __[abc1234]"));
    }

    #[test]
    fn test_timestamp_keeps_provider_offset() {
        let repo = RepoRef::new("acme", "rocket");
        let mut commit = enriched("abc1234", Category::Fix, "x");
        commit.metadata.committed_date =
            DateTime::parse_from_rfc3339("2024-05-20T16:03:09+02:00").unwrap();

        let entry = render_entry(&commit, &repo);
        assert!(entry.body.ends_with("*at:2024-05-20 16:03:09*\n"));
    }

    #[test]
    fn test_sections_in_fixed_order_without_empty_ones() {
        let repo = RepoRef::new("acme", "rocket");
        let sections = build_sections(
            &[
                enriched("aaaaaaa", Category::Other, "misc"),
                enriched("bbbbbbb", Category::Feature, "one"),
                enriched("ccccccc", Category::Feature, "two"),
            ],
            &repo,
        );

        let categories: Vec<_> = sections.iter().map(|s| s.category).collect();
        assert_eq!(categories, vec![Category::Feature, Category::Other]);
        assert!(sections[0].entries[0].link.contains("bbbbbbb"));
        assert!(sections[0].entries[1].link.contains("ccccccc"));
    }

    #[test]
    fn test_section_lines() {
        let repo = RepoRef::new("acme", "rocket");
        let sections = build_sections(&[enriched("aaaaaaa", Category::Fix, "x")], &repo);
        let lines = render_sections(&sections);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "### 🐛Bug fixes");
        assert_eq!(lines[1], SECTION_DIVIDER);
        assert_eq!(lines[3], SECTION_BREAK);
    }

    #[test]
    fn test_no_entries_no_sections() {
        let repo = RepoRef::new("acme", "rocket");
        assert!(render_sections(&build_sections(&[], &repo)).is_empty());
    }
}
