use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::{Config, LinkSource, Rules};
use crate::domain::FriendLink;
use crate::fetcher::Fetcher;
use crate::friends::fetch_friends_page;

/// Friends to process in one run, unique by link.
///
/// Entries keep insertion order. A link already present is never replaced,
/// so static entries and earlier page sources shadow later page entries.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<FriendLink>,
    seen: HashSet<String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster seeded from the static list; the first entry for a link wins.
    pub fn from_static(entries: &[FriendLink]) -> Self {
        let mut roster = Self::new();
        roster.merge(entries.iter().cloned());
        roster
    }

    /// Add entries whose link is not yet present. Returns how many were added.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = FriendLink>) -> usize {
        let mut added = 0;
        for entry in entries {
            if entry.link.is_empty() {
                debug!(name = %entry.name, "Skipping friend without link");
                continue;
            }
            if self.seen.insert(entry.link.clone()) {
                self.entries.push(entry);
                added += 1;
            } else {
                debug!(link = %entry.link, "Duplicate friend link, keeping first entry");
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FriendLink] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FriendLink> {
        self.entries
    }
}

/// Build the run's roster: static friends first, then each `page` source in
/// configured order. A page source that fails is logged and skipped.
pub async fn assemble<F>(fetcher: &F, config: &Config, rules: &Rules) -> Roster
where
    F: Fetcher + Send + Sync + ?Sized,
{
    let mut roster = Roster::from_static(&config.static_friends);

    for source in config.page_sources() {
        match read_page_source(fetcher, source, rules).await {
            Some(found) => {
                let total = found.len();
                let added = roster.merge(found);
                info!(url = %source.url, count = total, added, "Read friends page");
            }
            None => continue,
        }
    }

    roster
}

async fn read_page_source<F>(fetcher: &F, source: &LinkSource, rules: &Rules) -> Option<Vec<FriendLink>>
where
    F: Fetcher + Send + Sync + ?Sized,
{
    let Some(preset) = rules.preset(&source.theme) else {
        warn!(url = %source.url, theme = %source.theme, "No rule preset for friends page");
        return None;
    };

    match fetch_friends_page(fetcher, &source.url, preset).await {
        Ok(found) => {
            if found.is_empty() {
                warn!(url = %source.url, theme = %source.theme, "No friends found on page");
            }
            Some(found)
        }
        Err(e) => {
            warn!(url = %source.url, error = %e, "Failed to read friends page");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(name: &str, link: &str) -> FriendLink {
        FriendLink::new(name, link, format!("{}.png", name))
    }

    #[test]
    fn test_static_dedup_first_wins() {
        let roster = Roster::from_static(&[
            link("A", "https://a"),
            link("B", "https://b"),
            link("A2", "https://a"),
        ]);
        let names: Vec<_> = roster.entries().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_page_entries_do_not_override_existing_links() {
        let mut roster = Roster::from_static(&[link("Static", "https://a")]);
        let added = roster.merge(vec![link("Page", "https://a"), link("C", "https://c")]);
        assert_eq!(added, 1);

        let added = roster.merge(vec![link("Later", "https://c"), link("D", "https://d")]);
        assert_eq!(added, 1);

        let entries = roster.into_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "Static");
        assert_eq!(entries[0].avatar, "Static.png");
        assert_eq!(entries[1].name, "C");
        assert_eq!(entries[2].name, "D");
    }

    #[test]
    fn test_empty_links_skipped() {
        let mut roster = Roster::new();
        assert_eq!(roster.merge(vec![link("NoLink", ""), link("", "https://x")]), 1);
        assert_eq!(roster.len(), 1);
        assert!(!roster.is_empty());
    }

    #[test]
    fn test_one_entry_per_distinct_link() {
        let statics = [link("A", "https://a"), link("B", "https://b")];
        let page = vec![
            link("b", "https://b"),
            link("c", "https://c"),
            link("c2", "https://c"),
            link("a", "https://a"),
        ];

        let mut roster = Roster::from_static(&statics);
        roster.merge(page);

        let links: HashSet<_> = roster.entries().iter().map(|f| f.link.clone()).collect();
        assert_eq!(links.len(), roster.len());
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.entries()[1].name, "B");
    }
}
