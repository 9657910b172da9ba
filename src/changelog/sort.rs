//! Optional lexicographic ordering of rendered entries.

use std::str::FromStr;

use crate::error::ConfigError;

use super::format::{ChangelogSection, RenderedEntry};

/// Configured sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Keep log order (most recent first).
    #[default]
    Unsorted,
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Unsorted),
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ConfigError::InvalidSortDirection(other.to_string())),
        }
    }
}

/// Stable sort by entry body; the hash link never takes part in the comparison.
pub fn sort_entries(entries: &mut [RenderedEntry], direction: SortDirection) {
    match direction {
        SortDirection::Unsorted => {}
        SortDirection::Asc => entries.sort_by(|a, b| a.body.cmp(&b.body)),
        SortDirection::Desc => entries.sort_by(|a, b| b.body.cmp(&a.body)),
    }
}

/// Sort the entries inside every section; section order is left alone.
pub fn sort_sections(sections: &mut [ChangelogSection], direction: SortDirection) {
    for section in sections {
        sort_entries(&mut section.entries, direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(link: &str, body: &str) -> RenderedEntry {
        RenderedEntry {
            link: link.to_string(),
            body: body.to_string(),
        }
    }

    fn bodies(entries: &[RenderedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.body.as_str()).collect()
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("".parse::<SortDirection>().unwrap(), SortDirection::Unsorted);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("desc".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!(matches!(
            "badvalue".parse::<SortDirection>(),
            Err(ConfigError::InvalidSortDirection(v)) if v == "badvalue"
        ));
        assert!("ASC".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_unsorted_keeps_order() {
        let mut entries = vec![entry("z", "b"), entry("a", "a")];
        sort_entries(&mut entries, SortDirection::Unsorted);
        assert_eq!(bodies(&entries), vec!["b", "a"]);
    }

    #[test]
    fn test_asc_ignores_link() {
        let mut entries = vec![entry("[0]", "zeta"), entry("[9]", "alpha")];
        sort_entries(&mut entries, SortDirection::Asc);
        assert_eq!(bodies(&entries), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_desc_is_stable() {
        let mut entries = vec![
            entry("1", "same"),
            entry("2", "beta"),
            entry("3", "same"),
        ];
        sort_entries(&mut entries, SortDirection::Desc);
        let links: Vec<_> = entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, vec!["1", "3", "2"]);
    }
}
