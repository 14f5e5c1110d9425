//! The full run: fetch every edition, transform each variant, write the
//! feeds and the index page.

use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::config::{feed_file_name, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_PATH};
use crate::error::Result;
use crate::index::{link_text, render_index, IndexBuilder};
use crate::output::{ensure_output_dir, read_template, save_feed, save_index};
use crate::transform::{parse_feed, transform_feed};
use crate::types::{EditionEntry, TransformReport};

/// Where upstream feed content comes from.
pub trait FeedSource {
    /// Fetch the raw feed text for an edition.
    fn fetch(&self, edition: &str, url: &str) -> Result<String>;
}

/// Paths used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub output_dir: PathBuf,
    pub template_path: PathBuf,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
        }
    }
}

/// One feed file written by a run.
#[derive(Debug, Clone)]
pub struct WrittenFeed {
    pub edition: String,
    pub variant: String,
    pub path: PathBuf,
    pub report: TransformReport,
}

/// Everything a successful run wrote.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub feeds: Vec<WrittenFeed>,
    pub index_path: PathBuf,
}

/// Run the whole pipeline.
///
/// Editions are processed in catalog order, variants in each edition's
/// order. Duplicate or invalid edition names fail before anything is
/// fetched. The first other error aborts the run; files already written stay.
pub fn build_feeds(
    catalog: &Catalog,
    source: &dyn FeedSource,
    options: &BuildOptions,
) -> Result<BuildSummary> {
    build_feeds_with_progress(catalog, source, options, |_| {})
}

/// Like [`build_feeds`], calling `progress` with each edition name before it is fetched.
pub fn build_feeds_with_progress<F>(
    catalog: &Catalog,
    source: &dyn FeedSource,
    options: &BuildOptions,
    mut progress: F,
) -> Result<BuildSummary>
where
    F: FnMut(&str),
{
    catalog.validate_editions()?;
    ensure_output_dir(&options.output_dir)?;

    let mut index = IndexBuilder::new();
    let mut feeds = Vec::new();

    for entry in catalog.editions() {
        let (edition, spec) = match entry {
            EditionEntry::Break => {
                index.push_break();
                continue;
            }
            EditionEntry::Feed { name, spec } => (name.as_str(), spec),
        };

        // Unknown variants fail before anything is fetched for this edition.
        let variants = catalog.resolve_variants(edition, spec)?;

        progress(edition);
        tracing::info!(edition, url = %spec.url, "Fetching edition");
        let xml = source.fetch(edition, &spec.url)?;
        let document = parse_feed(edition, &xml)?;

        let title = spec.title.as_deref().unwrap_or(edition);
        for (variant, rule) in &variants {
            let transformed = transform_feed(&document, edition, variant, rule, catalog.domain())?;
            let path = save_feed(
                &options.output_dir,
                edition,
                variant,
                &transformed.document.to_xml(),
            )?;

            let report = transformed.report;
            tracing::info!(
                edition,
                variant,
                live = report.live_items,
                rejected = report.rejected,
                duplicates = report.duplicates,
                "Wrote feed"
            );

            index.push_link(
                &feed_file_name(edition, variant),
                &link_text(title, spec.icon.as_deref(), &rule.description, variants.len()),
            );
            feeds.push(WrittenFeed {
                edition: edition.to_string(),
                variant: (*variant).to_string(),
                path,
                report,
            });
        }
    }

    let template = read_template(&options.template_path)?;
    let html = render_index(&template, &index.finish(), &options.template_path)?;
    let index_path = save_index(&options.output_dir, &html)?;
    tracing::info!(feeds = feeds.len(), path = %index_path.display(), "Wrote index");

    Ok(BuildSummary { feeds, index_path })
}
