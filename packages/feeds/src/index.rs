//! Index page: the list of republished feeds.

use std::path::Path;

use crate::config::FEEDS_PLACEHOLDER;
use crate::error::{FeedError, Result};

/// Escape text for use in HTML content and attribute values.
///
/// # Examples
/// ```
/// use bbc_feeds::index::escape_html;
///
/// assert_eq!(escape_html(r#"Q&A <"live">"#), "Q&amp;A &lt;&quot;live&quot;&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text of one link on the index page.
///
/// `description` is only shown when the edition has more than one variant,
/// since a lone variant needs no disambiguation.
///
/// # Examples
/// ```
/// use bbc_feeds::index::link_text;
///
/// assert_eq!(link_text("BBC News", None, "with sports", 2), "[RSS] BBC News, with sports");
/// assert_eq!(link_text("BBC News", None, "with sports", 1), "[RSS] BBC News");
/// ```
pub fn link_text(title: &str, icon: Option<&str>, description: &str, variant_count: usize) -> String {
    let mut text = String::from("[RSS] ");
    if let Some(icon) = icon {
        text.push_str(icon);
        text.push(' ');
    }
    text.push_str(title);
    if variant_count > 1 {
        text.push_str(", ");
        text.push_str(description);
    }
    text
}

/// Accumulates feed links, split into groups at each break.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    groups: Vec<Vec<String>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            groups: vec![Vec::new()],
        }
    }

    /// Add a link to the current group.
    pub fn push_link(&mut self, href: &str, text: &str) {
        let entry = format!(
            "<li><a href=\"{}\">{}</a></li>",
            escape_html(href),
            escape_html(text)
        );
        match self.groups.last_mut() {
            Some(group) => group.push(entry),
            None => self.groups.push(vec![entry]),
        }
    }

    /// Close the current group and start a new one.
    pub fn push_break(&mut self) {
        if self.groups.last().is_some_and(|g| !g.is_empty()) {
            self.groups.push(Vec::new());
        }
    }

    /// Number of links added so far.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the groups as consecutive `<ul>` lists. Empty groups are skipped.
    pub fn finish(&self) -> String {
        self.groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(|g| format!("<ul>{}</ul>", g.concat()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Substitute the feed list into the index template.
///
/// `template_path` is only used in the error when the placeholder is absent.
pub fn render_index(template: &str, fragment: &str, template_path: &Path) -> Result<String> {
    if !template.contains(FEEDS_PLACEHOLDER) {
        return Err(FeedError::MissingPlaceholder {
            path: template_path.to_path_buf(),
            placeholder: FEEDS_PLACEHOLDER,
        });
    }
    Ok(template.replace(FEEDS_PLACEHOLDER, fragment))
}
