//! Error types for the feed republisher.
//!
//! Every failure is fatal to the run, so a single `FeedError` carries enough
//! context (edition, variant, URL or path) to diagnose it from the message.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the feed republisher.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to fetch an edition's upstream feed.
    #[error("Failed to fetch feed for edition '{edition}' from {url}: {source}")]
    Fetch {
        edition: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream response exceeded the configured size limit.
    #[error("Response from {url} is {size} bytes, exceeding the limit of {limit} bytes")]
    ResponseTooLarge { url: String, size: u64, limit: u64 },

    /// An edition references a variant that has no rule definition.
    #[error("Edition '{edition}' references unknown variant '{variant}'")]
    UnknownVariant { edition: String, variant: String },

    /// Edition or variant name that is not safe to use in a file name.
    #[error("Invalid {kind} name: '{name}'. Expected lowercase letters, digits and hyphens")]
    InvalidName { kind: &'static str, name: String },

    /// Variant rule with a pattern that does not compile.
    #[error("Invalid pattern in variant '{variant}': {source}")]
    InvalidPattern {
        variant: String,
        #[source]
        source: regex::Error,
    },

    /// Two editions with the same name would overwrite each other's files.
    #[error("Edition '{0}' is defined more than once")]
    DuplicateEdition(String),

    /// Bare string in the edition list that is not the break marker.
    #[error("Unexpected edition entry '{0}'. Only 'break' may be given as a plain string")]
    InvalidBreak(String),

    /// Catalog file could not be deserialized.
    #[error("Failed to parse catalog {}: {source}", .path.display())]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// Index template without the substitution token.
    #[error("Template {} does not contain the placeholder {placeholder}", .path.display())]
    MissingPlaceholder {
        path: PathBuf,
        placeholder: &'static str,
    },

    /// Fetched content is not well-formed XML.
    #[error("Feed for edition '{edition}' is not valid XML: {source}")]
    Parse {
        edition: String,
        #[source]
        source: roxmltree::Error,
    },

    /// Well-formed XML that is not an RSS/Atom/RDF document.
    #[error("Feed for edition '{edition}' has unexpected root element <{root}>")]
    NotAFeed { edition: String, root: String },

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// Filesystem operation failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        let err = FeedError::UnknownVariant {
            edition: "full".to_string(),
            variant: "extreme".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Edition 'full' references unknown variant 'extreme'"
        );
    }

    #[test]
    fn test_missing_element_display() {
        let err = FeedError::MissingElement {
            element: "generator".to_string(),
            context: "full-sports".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required XML element: generator in full-sports"
        );
    }

    #[test]
    fn test_io_display_includes_path() {
        let err = FeedError::io(
            "build/index.html",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("build/index.html"));
        assert!(message.contains("denied"));
    }
}
