//! BBC News without the crap - republish BBC News RSS feeds.
//!
//! Fetches each configured edition of BBC News once, and for every variant
//! (e.g. with or without sport) writes a copy of the feed with unwanted
//! items commented out, duplicate stories removed and the metadata pointing
//! at the republished location. An index page links to every feed.
//!
//! # Example
//!
//! ```
//! use bbc_feeds::{transform_feed, Catalog};
//! use bbc_feeds::transform::parse_feed;
//!
//! let catalog = Catalog::builtin().unwrap();
//! let rule = catalog.variant("no-sports").unwrap();
//! let source = parse_feed(
//!     "full",
//!     r#"<rss><channel><generator>upstream</generator>
//!        <item><title>Goal</title><guid>https://www.bbc.co.uk/sport/football/1</guid></item>
//!        </channel></rss>"#,
//! )
//! .unwrap();
//!
//! let out = transform_feed(&source, "full", "no-sports", rule, catalog.domain()).unwrap();
//! assert_eq!(out.report.rejected, 1);
//! assert!(out.document.to_xml().contains("<!-- [REJECTED] <item>"));
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants and name validation
//! - [`types`]: Editions, variant rules and transform reports
//! - [`catalog`]: Built-in and YAML edition/variant tables
//! - [`error`]: Error types and Result alias
//! - [`http`]: Blocking HTTP fetcher
//! - [`xml`]: Owned feed document, queries and serializer
//! - [`comment`]: Escape-then-wrap for commented-out items
//! - [`transform`]: Rejection, guid stripping, de-duplication, metadata rewrite
//! - [`index`]: Index page link list and template rendering
//! - [`output`]: File output
//! - [`pipeline`]: The full run
//! - [`cli`]: Command-line interface

pub mod catalog;
pub mod cli;
pub mod comment;
pub mod config;
pub mod error;
pub mod http;
pub mod index;
pub mod output;
pub mod pipeline;
pub mod transform;
pub mod types;
pub mod xml;

// Re-export main functions
pub use pipeline::{build_feeds, BuildOptions, BuildSummary, FeedSource};
pub use transform::transform_feed;

// Re-export commonly used items
pub use catalog::Catalog;
pub use error::{FeedError, Result};
pub use types::{EditionEntry, EditionSpec, TransformReport, VariantRule};
pub use xml::FeedDocument;
