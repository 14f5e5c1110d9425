//! Configuration constants and validation functions for the republisher.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{FeedError, Result};

/// Domain the republished feeds are hosted on.
pub const DOMAIN: &str = "bbc-feeds.danq.dev";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum HTTP response size in bytes (10 MB).
///
/// BBC News feeds are a few hundred kilobytes; anything far larger is not a feed.
/// Can be overridden via CLI --max-size flag.
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;

/// Directory the feeds and index page are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Template the index page is rendered from.
pub const DEFAULT_TEMPLATE_PATH: &str = "index.template.html";

/// File name of the rendered index page.
pub const INDEX_FILE_NAME: &str = "index.html";

/// Token in the template that is replaced with the list of feed links.
pub const FEEDS_PLACEHOLDER: &str = "{{FEEDS}}";

/// Atom namespace, used to find the feed's self link.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Marker used in catalog files for an index grouping boundary.
pub const BREAK_MARKER: &str = "break";

/// Edition and variant names end up in file names and URLs.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid regex"));

/// Validate an edition or variant name.
///
/// # Arguments
/// * `kind` - What the name identifies ("edition" or "variant"), used in the error
/// * `name` - The name to validate
///
/// # Examples
/// ```
/// use bbc_feeds::config::validate_name;
///
/// assert!(validate_name("edition", "world").is_ok());
/// assert!(validate_name("variant", "no-sports").is_ok());
/// assert!(validate_name("edition", "../etc").is_err());
/// ```
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) && name != BREAK_MARKER {
        Ok(())
    } else {
        Err(FeedError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// Text written into every republished feed's `<generator>` element.
///
/// # Examples
/// ```
/// use bbc_feeds::config::generator_text;
///
/// assert_eq!(
///     generator_text("example.org"),
///     "Dan Q's 'BBC News without the crap' <https://danq.me/> <https://example.org/> generator"
/// );
/// ```
pub fn generator_text(domain: &str) -> String {
    format!("Dan Q's 'BBC News without the crap' <https://danq.me/> <https://{domain}/> generator")
}

/// File name for one edition/variant pair, e.g. `world-no-sports.xml`.
pub fn feed_file_name(edition: &str, variant: &str) -> String {
    format!("{edition}-{variant}.xml")
}

/// Public URL of one edition/variant pair.
///
/// # Examples
/// ```
/// use bbc_feeds::config::feed_url;
///
/// assert_eq!(
///     feed_url("bbc-feeds.danq.dev", "uk", "sports"),
///     "https://bbc-feeds.danq.dev/uk-sports.xml"
/// );
/// ```
pub fn feed_url(domain: &str, edition: &str, variant: &str) -> String {
    format!("https://{domain}/{}", feed_file_name(edition, variant))
}
