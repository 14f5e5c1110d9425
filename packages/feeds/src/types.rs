//! Core data types: editions, variants and the per-feed transform report.

use regex::Regex;

/// An upstream feed to republish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionSpec {
    /// Upstream RSS URL.
    pub url: String,

    /// Variants produced for this edition, in output order.
    pub variants: Vec<String>,

    /// Display title for the index page. Falls back to the edition name.
    pub title: Option<String>,

    /// Short icon text shown before the title on the index page.
    pub icon: Option<String>,
}

impl EditionSpec {
    /// Create an edition with no display metadata.
    pub fn new(url: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            url: url.into(),
            variants: variants.iter().map(|v| (*v).to_string()).collect(),
            title: None,
            icon: None,
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// One entry in the ordered edition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditionEntry {
    /// A real feed.
    Feed { name: String, spec: EditionSpec },

    /// Grouping boundary on the index page. Produces no feed.
    Break,
}

impl EditionEntry {
    /// Convenience constructor for a feed entry.
    pub fn feed(name: impl Into<String>, spec: EditionSpec) -> Self {
        Self::Feed {
            name: name.into(),
            spec,
        }
    }
}

/// A filtering policy applied to every edition that lists it.
#[derive(Debug, Clone)]
pub struct VariantRule {
    /// Items whose guid matches are rejected.
    pub reject_guids: Regex,

    /// Items whose title matches are rejected.
    pub reject_titles: Regex,

    /// Human readable description, used to label links on the index page.
    pub description: String,
}

impl VariantRule {
    /// Whether an item with this guid and title is filtered out.
    #[must_use]
    pub fn rejects(&self, guid: &str, title: &str) -> bool {
        self.reject_guids.is_match(guid) || self.reject_titles.is_match(title)
    }
}

/// What happened to the items of one republished feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Items left as live entries.
    pub live_items: usize,

    /// Items commented out by the variant's rules.
    pub rejected: usize,

    /// Items commented out because an earlier item had the same guid.
    pub duplicates: usize,

    /// Guids that had a `#fragment` removed.
    pub stripped_guids: usize,
}
