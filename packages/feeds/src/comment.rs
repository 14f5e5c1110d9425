//! Commenting-out of filtered items.
//!
//! XML comments may not contain `--`, so the serialized item is escaped
//! before it is wrapped. This works on plain strings and does not depend on
//! the XML crate.

/// Replacement for every `--` inside a commented-out item.
pub const HYPHEN_PLACEHOLDER: &str = "[hyphen][hyphen]";

/// Why an item was commented out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Matched the variant's rejection rules.
    Rejected,
    /// Same guid as an earlier item.
    Duplicate,
}

impl Disposition {
    /// Marker written at the start of the comment.
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Rejected => "[REJECTED]",
            Self::Duplicate => "[DUPLICATE]",
        }
    }
}

/// Make text safe to place inside an XML comment.
///
/// # Examples
/// ```
/// use bbc_feeds::comment::escape_comment_text;
///
/// assert_eq!(escape_comment_text("a -- b"), "a [hyphen][hyphen] b");
/// assert_eq!(escape_comment_text("no hyphens"), "no hyphens");
/// ```
pub fn escape_comment_text(text: &str) -> String {
    text.replace("--", HYPHEN_PLACEHOLDER)
}

/// Comment body for a commented-out item: ` [MARKER] {escaped} `.
///
/// The surrounding spaces keep the body from ending in `-`, which XML also
/// forbids directly before `-->`.
///
/// # Examples
/// ```
/// use bbc_feeds::comment::{comment_body, Disposition};
///
/// assert_eq!(
///     comment_body(Disposition::Duplicate, "<item>x--y</item>"),
///     " [DUPLICATE] <item>x[hyphen][hyphen]y</item> "
/// );
/// ```
pub fn comment_body(disposition: Disposition, serialized: &str) -> String {
    format!(
        " {} {} ",
        disposition.marker(),
        escape_comment_text(serialized)
    )
}
