//! End-to-end tests for the build pipeline.
//!
//! Upstream content comes from fixture files instead of the network. The
//! feed in `tests/fixtures/bbc/rss.xml` is hand-written in the shape of a
//! BBC News feed, with fragment duplicates, sport, iPlayer and app items.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use bbc_feeds::config::generator_text;
use bbc_feeds::xml::{Element, Node};
use bbc_feeds::{build_feeds, BuildOptions, Catalog, FeedDocument, FeedError, FeedSource};

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Serves the same fixture feed for every URL and records what was fetched.
struct FixtureSource {
    xml: String,
    fail_for: Option<&'static str>,
    fetched: RefCell<Vec<String>>,
}

impl FixtureSource {
    fn new() -> Self {
        Self {
            xml: load_fixture("bbc/rss.xml"),
            fail_for: None,
            fetched: RefCell::new(Vec::new()),
        }
    }

    fn failing_for(edition: &'static str) -> Self {
        Self {
            fail_for: Some(edition),
            ..Self::new()
        }
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl FeedSource for FixtureSource {
    fn fetch(&self, edition: &str, _url: &str) -> bbc_feeds::Result<String> {
        self.fetched.borrow_mut().push(edition.to_string());
        if self.fail_for.is_some_and(|e| e == edition) {
            return Err(FeedError::io(
                "unreachable",
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            ));
        }
        Ok(self.xml.clone())
    }
}

fn options(dir: &TempDir) -> BuildOptions {
    BuildOptions {
        output_dir: dir.path().join("build"),
        template_path: fixture_path("index.template.html"),
    }
}

fn yaml_catalog(editions: &str) -> Catalog {
    let yaml = format!(
        r#"
domain: feeds.example.org
variants:
  sports:
    reject_guids: '^https://www\.bbc\.(co\.uk|com)/(iplayer|sounds|ideas|news/videos|programmes)/'
    reject_titles: '^(BBC News app)$'
    description: with sports
  no-sports:
    reject_guids: '^https://www\.bbc\.(co\.uk|com)/(sport|iplayer|sounds|ideas|news/videos|programmes)/'
    reject_titles: '^(BBC News app)$'
    description: without sports
editions:
{editions}
"#
    );
    Catalog::from_yaml_str(&yaml, Path::new("test.yaml")).unwrap()
}

fn read_output(options: &BuildOptions, name: &str) -> String {
    fs::read_to_string(options.output_dir.join(name)).unwrap()
}

fn items(doc: &FeedDocument) -> Vec<&Element> {
    doc.root.descendants().filter(|el| el.is_plain("item")).collect()
}

fn comments(el: &Element, out: &mut Vec<String>) {
    for child in &el.children {
        match child {
            Node::Comment(text) => out.push(text.clone()),
            Node::Element(inner) => comments(inner, out),
            _ => {}
        }
    }
}

#[test]
fn test_builtin_catalog_writes_every_feed() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let source = FixtureSource::new();
    let catalog = Catalog::builtin().unwrap();

    let summary = build_feeds(&catalog, &source, &options).unwrap();

    assert_eq!(summary.feeds.len(), 14);
    // One fetch per edition, never per variant.
    assert_eq!(
        source.fetched(),
        vec!["full", "uk", "world", "business", "politics", "africa", "india"]
    );
    for feed in &summary.feeds {
        let expected = format!("{}-{}.xml", feed.edition, feed.variant);
        assert!(feed.path.ends_with(&expected), "{}", feed.path.display());
        assert!(feed.path.exists());
    }
    assert_eq!(summary.index_path, options.output_dir.join("index.html"));
}

#[test]
fn test_no_sports_output() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let catalog = Catalog::builtin().unwrap();
    build_feeds(&catalog, &FixtureSource::new(), &options).unwrap();

    let xml = read_output(&options, "full-no-sports.xml");
    let doc = FeedDocument::parse(&xml).unwrap();

    let guids: Vec<_> = items(&doc)
        .iter()
        .filter_map(|item| item.child_text("guid"))
        .collect();
    assert_eq!(
        guids,
        vec![
            "https://www.bbc.co.uk/news/articles/c1budget",
            "https://www.bbc.com/news/articles/c3floods",
        ]
    );

    let mut found = Vec::new();
    comments(&doc.root, &mut found);
    let rejected = found.iter().filter(|c| c.starts_with(" [REJECTED] ")).count();
    let duplicate = found.iter().filter(|c| c.starts_with(" [DUPLICATE] ")).count();
    assert_eq!(rejected, 3);
    assert_eq!(duplicate, 1);

    // The sport story only survives inside a comment, with its hyphens escaped.
    assert!(xml.contains("Final score [hyphen][hyphen] 2-1"));
    assert!(!items(&doc)
        .iter()
        .any(|item| item.child_text("guid").unwrap_or_default().contains("/sport/")));
}

#[test]
fn test_sports_output_keeps_sport() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let summary = build_feeds(&Catalog::builtin().unwrap(), &FixtureSource::new(), &options).unwrap();

    let report = summary
        .feeds
        .iter()
        .find(|f| f.edition == "full" && f.variant == "sports")
        .unwrap()
        .report;
    assert_eq!(report.live_items, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.stripped_guids, 3);
}

#[test]
fn test_metadata_rewritten() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let catalog = Catalog::builtin().unwrap();
    build_feeds(&catalog, &FixtureSource::new(), &options).unwrap();

    let doc = FeedDocument::parse(&read_output(&options, "world-sports.xml")).unwrap();
    let generator = doc
        .root
        .descendants()
        .find(|el| el.is_plain("generator"))
        .unwrap();
    assert_eq!(generator.text(), generator_text("bbc-feeds.danq.dev"));

    let link = doc
        .root
        .descendants()
        .find(|el| el.is_in("http://www.w3.org/2005/Atom", "link"))
        .unwrap();
    assert_eq!(
        link.attribute("href"),
        Some("https://bbc-feeds.danq.dev/world-sports.xml")
    );
}

#[test]
fn test_live_guids_never_contain_fragment() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let summary = build_feeds(&Catalog::builtin().unwrap(), &FixtureSource::new(), &options).unwrap();

    for feed in &summary.feeds {
        let doc = FeedDocument::parse(&fs::read_to_string(&feed.path).unwrap()).unwrap();
        for item in items(&doc) {
            let guid = item.child_text("guid").unwrap_or_default();
            assert!(!guid.contains('#'), "{}: {guid}", feed.path.display());
        }
    }
}

#[test]
fn test_output_is_idempotent_under_reserialization() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    build_feeds(&Catalog::builtin().unwrap(), &FixtureSource::new(), &options).unwrap();

    for name in ["full-sports.xml", "full-no-sports.xml"] {
        let once = read_output(&options, name);
        let twice = FeedDocument::parse(&once).unwrap().to_xml();
        assert_eq!(once, twice, "{name}");
    }
}

#[test]
fn test_index_groups_at_breaks() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let catalog = yaml_catalog(
        r#"
  - name: full
    url: https://feeds.bbci.co.uk/news/rss.xml
    variants: [sports]
    title: BBC News
  - break
  - name: uk
    url: https://feeds.bbci.co.uk/news/uk/rss.xml
    variants: [sports, no-sports]
    title: BBC News - UK
"#,
    );
    build_feeds(&catalog, &FixtureSource::new(), &options).unwrap();

    let html = read_output(&options, "index.html");
    let expected = "<ul><li><a href=\"full-sports.xml\">[RSS] BBC News</a></li></ul>\n\
         <ul><li><a href=\"uk-sports.xml\">[RSS] BBC News - UK, with sports</a></li>\
         <li><a href=\"uk-no-sports.xml\">[RSS] BBC News - UK, without sports</a></li></ul>";
    assert!(html.contains(expected), "{html}");
    assert!(!html.contains("{{FEEDS}}"));
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[test]
fn test_domain_from_catalog() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let catalog = yaml_catalog(
        r#"
  - name: world
    url: https://feeds.bbci.co.uk/news/world/rss.xml
    variants: [no-sports]
"#,
    );
    build_feeds(&catalog, &FixtureSource::new(), &options).unwrap();

    let xml = read_output(&options, "world-no-sports.xml");
    assert!(xml.contains("href=\"https://feeds.example.org/world-no-sports.xml\""));
    assert!(xml.contains("&lt;https://feeds.example.org/&gt; generator"));

    // Untitled single-variant editions are labelled by name, without a description.
    let html = read_output(&options, "index.html");
    assert!(html.contains("<a href=\"world-no-sports.xml\">[RSS] world</a>"));
}

#[test]
fn test_unknown_variant_stops_before_edition() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let source = FixtureSource::new();
    let catalog = yaml_catalog(
        r#"
  - name: uk
    url: https://feeds.bbci.co.uk/news/uk/rss.xml
    variants: [sports]
  - name: world
    url: https://feeds.bbci.co.uk/news/world/rss.xml
    variants: [sports, extreme]
"#,
    );

    let err = build_feeds(&catalog, &source, &options).unwrap_err();
    match err {
        FeedError::UnknownVariant { edition, variant } => {
            assert_eq!(edition, "world");
            assert_eq!(variant, "extreme");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Earlier editions are written; the failing one is neither fetched nor written.
    assert_eq!(source.fetched(), vec!["uk"]);
    assert!(options.output_dir.join("uk-sports.xml").exists());
    assert!(!options.output_dir.join("world-sports.xml").exists());
    assert!(!options.output_dir.join("index.html").exists());
}

#[test]
fn test_duplicate_edition_fails_before_fetching() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let source = FixtureSource::new();
    let catalog = yaml_catalog(
        r#"
  - name: uk
    url: https://feeds.bbci.co.uk/news/uk/rss.xml
    variants: [sports]
  - name: uk
    url: https://feeds.bbci.co.uk/news/world/rss.xml
    variants: [sports]
"#,
    );

    let err = build_feeds(&catalog, &source, &options).unwrap_err();

    assert!(matches!(err, FeedError::DuplicateEdition(ref name) if name == "uk"));
    assert!(source.fetched().is_empty());
    assert!(!options.output_dir.join("uk-sports.xml").exists());
    assert!(!options.output_dir.join("index.html").exists());
}

#[test]
fn test_fetch_failure_aborts_run() {
    let dir = tempdir().unwrap();
    let options = options(&dir);
    let source = FixtureSource::failing_for("uk");

    let result = build_feeds(&Catalog::builtin().unwrap(), &source, &options);

    assert!(result.is_err());
    assert_eq!(source.fetched(), vec!["full", "uk"]);
    assert!(options.output_dir.join("full-sports.xml").exists());
    assert!(!options.output_dir.join("uk-sports.xml").exists());
    assert!(!options.output_dir.join("index.html").exists());
}

#[test]
fn test_missing_template_is_io_error() {
    let dir = tempdir().unwrap();
    let options = BuildOptions {
        output_dir: dir.path().join("build"),
        template_path: dir.path().join("missing.html"),
    };

    let err = build_feeds(&Catalog::builtin().unwrap(), &FixtureSource::new(), &options).unwrap_err();
    assert!(matches!(err, FeedError::Io { .. }));
    assert!(err.to_string().contains("missing.html"));
}

#[test]
fn test_invalid_feed_is_parse_error() {
    struct Garbage;
    impl FeedSource for Garbage {
        fn fetch(&self, _edition: &str, _url: &str) -> bbc_feeds::Result<String> {
            Ok("<html><body>Service unavailable".to_string())
        }
    }

    let dir = tempdir().unwrap();
    let err = build_feeds(&Catalog::builtin().unwrap(), &Garbage, &options(&dir)).unwrap_err();
    assert!(matches!(err, FeedError::Parse { ref edition, .. } if edition == "full"));
}
