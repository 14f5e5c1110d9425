//! Per-variant feed transformation.
//!
//! Steps run in a fixed order, each on the state left by the previous one:
//! reject, strip guid anchors, de-duplicate, rewrite generator, rewrite
//! self link.

use std::collections::HashSet;

use crate::comment::{comment_body, Disposition};
use crate::config::{feed_url, generator_text, ATOM_NAMESPACE};
use crate::error::{FeedError, Result};
use crate::types::{TransformReport, VariantRule};
use crate::xml::{Element, FeedDocument, Node};

/// Root elements accepted as feeds: RSS 2.0 and RSS 1.0 (RDF).
///
/// Atom documents are refused: their entries are not `item`s and every
/// `link` in them is Atom-namespaced.
const FEED_ROOTS: &[&str] = &["rss", "RDF"];

/// A transformed copy of an edition's feed.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub document: FeedDocument,
    pub report: TransformReport,
}

/// Parse fetched content into a feed document.
pub fn parse_feed(edition: &str, xml: &str) -> Result<FeedDocument> {
    let doc = FeedDocument::parse(xml).map_err(|source| FeedError::Parse {
        edition: edition.to_string(),
        source,
    })?;

    if !FEED_ROOTS.contains(&doc.root.name.as_str()) {
        return Err(FeedError::NotAFeed {
            edition: edition.to_string(),
            root: doc.root.name.clone(),
        });
    }
    Ok(doc)
}

/// Produce the feed for one (edition, variant) pair.
///
/// `source` is left untouched; all edits happen on a clone.
pub fn transform_feed(
    source: &FeedDocument,
    edition: &str,
    variant: &str,
    rule: &VariantRule,
    domain: &str,
) -> Result<Transformed> {
    let mut document = source.clone();

    let rejected = reject_items(&mut document, rule);
    let stripped_guids = strip_guid_fragments(&mut document);
    let duplicates = comment_out_duplicates(&mut document);

    rewrite_generator(
        &mut document,
        &generator_text(domain),
        &format!("{edition}-{variant}"),
    )?;

    let self_links = rewrite_self_links(&mut document, &feed_url(domain, edition, variant));
    if self_links == 0 {
        tracing::warn!(edition, variant, "Feed has no atom:link element to point at us");
    }

    let report = TransformReport {
        live_items: items(&document).count(),
        rejected,
        duplicates,
        stripped_guids,
    };
    Ok(Transformed { document, report })
}

fn is_item(el: &Element) -> bool {
    el.is_plain("item")
}

fn items(doc: &FeedDocument) -> impl Iterator<Item = &Element> {
    doc.root.descendants().filter(|el| is_item(el))
}

fn comment_out(item: &Element, disposition: Disposition) -> Node {
    Node::Comment(comment_body(disposition, &item.to_xml()))
}

/// Comment out every item whose guid or title matches the rule.
///
/// Returns the number of rejected items.
pub fn reject_items(doc: &mut FeedDocument, rule: &VariantRule) -> usize {
    let mut rejected = 0;
    doc.root.replace_descendants(&mut |el| {
        if !is_item(el) {
            return None;
        }
        let guid = el.child_text("guid").unwrap_or_default();
        let title = el.child_text("title").unwrap_or_default();
        if !rule.rejects(&guid, &title) {
            return None;
        }
        tracing::debug!(%guid, %title, "Rejecting item");
        rejected += 1;
        Some(comment_out(el, Disposition::Rejected))
    });
    rejected
}

/// Remove everything from the first `#` onward.
///
/// # Examples
/// ```
/// use bbc_feeds::transform::strip_fragment;
///
/// assert_eq!(strip_fragment("https://www.bbc.co.uk/news/uk-1#2"), "https://www.bbc.co.uk/news/uk-1");
/// assert_eq!(strip_fragment("https://www.bbc.co.uk/news/uk-1"), "https://www.bbc.co.uk/news/uk-1");
/// ```
pub fn strip_fragment(guid: &str) -> &str {
    guid.split_once('#').map_or(guid, |(head, _)| head)
}

/// Strip the `#fragment` from every live guid.
///
/// Returns the number of guids that changed.
pub fn strip_guid_fragments(doc: &mut FeedDocument) -> usize {
    let mut stripped = 0;
    doc.root.for_each_descendant_mut(&mut |el| {
        if !el.is_plain("guid") {
            return;
        }
        let text = el.text();
        let head = strip_fragment(&text);
        if head.len() != text.len() {
            el.set_text(head);
            stripped += 1;
        }
    });
    stripped
}

/// Comment out every item whose guid was already seen earlier in the document.
///
/// Items with no `<guid>` at all are left alone. Returns the number of
/// duplicates.
pub fn comment_out_duplicates(doc: &mut FeedDocument) -> usize {
    let mut seen = HashSet::new();
    let duplicate_positions: HashSet<usize> = items(doc)
        .enumerate()
        .filter_map(|(position, item)| {
            let guid = item.child_text("guid")?;
            (!seen.insert(guid)).then_some(position)
        })
        .collect();

    if duplicate_positions.is_empty() {
        return 0;
    }

    let mut position = 0;
    doc.root.replace_descendants(&mut |el| {
        if !is_item(el) {
            return None;
        }
        let current = position;
        position += 1;
        duplicate_positions
            .contains(&current)
            .then(|| comment_out(el, Disposition::Duplicate))
    });
    duplicate_positions.len()
}

/// Overwrite the first `<generator>` element's text.
///
/// Fails with [`FeedError::MissingElement`] naming `context` if the feed has none.
pub fn rewrite_generator(doc: &mut FeedDocument, text: &str, context: &str) -> Result<()> {
    let generator = doc
        .root
        .find_descendant_mut(&|el| el.is_plain("generator"))
        .ok_or_else(|| FeedError::MissingElement {
            element: "generator".to_string(),
            context: context.to_string(),
        })?;
    generator.set_text(text);
    Ok(())
}

/// Point every Atom `<link>` at `href`. Returns how many were updated.
pub fn rewrite_self_links(doc: &mut FeedDocument, href: &str) -> usize {
    let mut updated = 0;
    doc.root.for_each_descendant_mut(&mut |el| {
        if el.is_in(ATOM_NAMESPACE, "link") {
            el.set_attribute("href", href);
            updated += 1;
        }
    });
    updated
}
