//! The edition and variant tables.
//!
//! A [`Catalog`] is built once at startup, either from the built-in table
//! below or from a YAML file, and is only read afterwards.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::config::{validate_name, BREAK_MARKER, DOMAIN};
use crate::error::{FeedError, Result};
use crate::types::{EditionEntry, EditionSpec, VariantRule};

struct BuiltinEdition {
    name: &'static str,
    url: &'static str,
    variants: &'static [&'static str],
    title: &'static str,
    icon: Option<&'static str>,
}

enum BuiltinEntry {
    Feed(BuiltinEdition),
    Break,
}

struct BuiltinVariant {
    name: &'static str,
    reject_guids: &'static str,
    reject_titles: &'static str,
    description: &'static str,
}

const BOTH: &[&str] = &["sports", "no-sports"];

/// Editions of BBC News that we improve.
const BUILTIN_EDITIONS: &[BuiltinEntry] = &[
    BuiltinEntry::Feed(BuiltinEdition {
        name: "full",
        url: "https://feeds.bbci.co.uk/news/rss.xml",
        variants: BOTH,
        title: "BBC News",
        icon: Some("📰"),
    }),
    BuiltinEntry::Break,
    BuiltinEntry::Feed(BuiltinEdition {
        name: "uk",
        url: "https://feeds.bbci.co.uk/news/uk/rss.xml",
        variants: BOTH,
        title: "BBC News - UK",
        icon: Some("🇬🇧"),
    }),
    BuiltinEntry::Feed(BuiltinEdition {
        name: "world",
        url: "https://feeds.bbci.co.uk/news/world/rss.xml",
        variants: BOTH,
        title: "BBC News - World",
        icon: Some("🌍"),
    }),
    BuiltinEntry::Break,
    BuiltinEntry::Feed(BuiltinEdition {
        name: "business",
        url: "https://feeds.bbci.co.uk/news/business/rss.xml",
        variants: BOTH,
        title: "BBC News - Business",
        icon: None,
    }),
    BuiltinEntry::Feed(BuiltinEdition {
        name: "politics",
        url: "https://feeds.bbci.co.uk/news/politics/rss.xml",
        variants: BOTH,
        title: "BBC News - Politics",
        icon: None,
    }),
    BuiltinEntry::Break,
    BuiltinEntry::Feed(BuiltinEdition {
        name: "africa",
        url: "https://feeds.bbci.co.uk/news/world/africa/rss.xml",
        variants: BOTH,
        title: "BBC News - Africa",
        icon: None,
    }),
    BuiltinEntry::Feed(BuiltinEdition {
        name: "india",
        url: "https://feeds.bbci.co.uk/news/world/asia/india/rss.xml",
        variants: BOTH,
        title: "BBC News - India",
        icon: None,
    }),
];

/// Kinds of improvements.
const BUILTIN_VARIANTS: &[BuiltinVariant] = &[
    BuiltinVariant {
        name: "sports",
        reject_guids: r"^https://www\.bbc\.(co\.uk|com)/(iplayer|sounds|ideas|news/videos|programmes)/",
        reject_titles: r"^(BBC News app)$",
        description: "with sports",
    },
    BuiltinVariant {
        name: "no-sports",
        reject_guids: r"^https://www\.bbc\.(co\.uk|com)/(sport|iplayer|sounds|ideas|news/videos|programmes)/",
        reject_titles: r"^(BBC News app)$",
        description: "without sports",
    },
];

/// Catalog file layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    domain: Option<String>,
    variants: BTreeMap<String, VariantFile>,
    editions: Vec<EditionFileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VariantFile {
    reject_guids: String,
    reject_titles: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EditionFileEntry {
    Marker(String),
    Feed(EditionFile),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EditionFile {
    name: String,
    url: String,
    variants: Vec<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

/// Compile a variant's patterns.
fn compile_rule(
    name: &str,
    reject_guids: &str,
    reject_titles: &str,
    description: &str,
) -> Result<VariantRule> {
    validate_name("variant", name)?;
    let compile = |pattern: &str| {
        Regex::new(pattern).map_err(|source| FeedError::InvalidPattern {
            variant: name.to_string(),
            source,
        })
    };
    Ok(VariantRule {
        reject_guids: compile(reject_guids)?,
        reject_titles: compile(reject_titles)?,
        description: description.to_string(),
    })
}

/// Hosting domain, ordered edition table and variant rules.
#[derive(Debug, Clone)]
pub struct Catalog {
    domain: String,
    editions: Vec<EditionEntry>,
    variants: BTreeMap<String, VariantRule>,
}

impl Catalog {
    /// Assemble a catalog from already-built parts.
    ///
    /// Names are not validated here; call [`Catalog::validate`] for that.
    pub fn new(
        domain: impl Into<String>,
        editions: Vec<EditionEntry>,
        variants: BTreeMap<String, VariantRule>,
    ) -> Self {
        Self {
            domain: domain.into(),
            editions,
            variants,
        }
    }

    /// The built-in BBC News catalog.
    pub fn builtin() -> Result<Self> {
        let variants = BUILTIN_VARIANTS
            .iter()
            .map(|v| {
                let rule = compile_rule(v.name, v.reject_guids, v.reject_titles, v.description)?;
                Ok((v.name.to_string(), rule))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let editions = BUILTIN_EDITIONS
            .iter()
            .map(|entry| match entry {
                BuiltinEntry::Break => EditionEntry::Break,
                BuiltinEntry::Feed(e) => {
                    let mut spec = EditionSpec::new(e.url, e.variants).with_title(e.title);
                    spec.icon = e.icon.map(str::to_string);
                    EditionEntry::feed(e.name, spec)
                }
            })
            .collect();

        Ok(Self::new(DOMAIN, editions, variants))
    }

    /// Load a catalog from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| FeedError::io(path, e))?;
        Self::from_yaml_str(&yaml, path)
    }

    /// Parse a catalog from YAML text. `path` is only used in error messages.
    pub fn from_yaml_str(yaml: &str, path: &Path) -> Result<Self> {
        let file: CatalogFile =
            serde_yaml_ng::from_str(yaml).map_err(|source| FeedError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;

        let variants = file
            .variants
            .iter()
            .map(|(name, v)| {
                let rule = compile_rule(name, &v.reject_guids, &v.reject_titles, &v.description)?;
                Ok((name.clone(), rule))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let editions = file
            .editions
            .into_iter()
            .map(|entry| match entry {
                EditionFileEntry::Marker(marker) if marker == BREAK_MARKER => {
                    Ok(EditionEntry::Break)
                }
                EditionFileEntry::Marker(other) => Err(FeedError::InvalidBreak(other)),
                EditionFileEntry::Feed(e) => {
                    validate_name("edition", &e.name)?;
                    let spec = EditionSpec {
                        url: e.url,
                        variants: e.variants,
                        title: e.title,
                        icon: e.icon,
                    };
                    Ok(EditionEntry::Feed { name: e.name, spec })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let domain = file.domain.unwrap_or_else(|| DOMAIN.to_string());
        Ok(Self::new(domain, editions, variants))
    }

    /// Replace the hosting domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Domain the republished feeds are served from.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Editions and breaks in configuration order.
    pub fn editions(&self) -> &[EditionEntry] {
        &self.editions
    }

    /// Look up a variant rule by name.
    pub fn variant(&self, name: &str) -> Option<&VariantRule> {
        self.variants.get(name)
    }

    /// Resolve every variant an edition lists, in the edition's order.
    ///
    /// Fails on the first variant that has no rule definition.
    pub fn resolve_variants<'a>(
        &'a self,
        edition: &str,
        spec: &'a EditionSpec,
    ) -> Result<Vec<(&'a str, &'a VariantRule)>> {
        spec.variants
            .iter()
            .map(|name| {
                self.variant(name)
                    .map(|rule| (name.as_str(), rule))
                    .ok_or_else(|| FeedError::UnknownVariant {
                        edition: edition.to_string(),
                        variant: name.clone(),
                    })
            })
            .collect()
    }

    /// Every (edition, variant) pair that a run would produce.
    pub fn feeds(&self) -> impl Iterator<Item = (&str, &str)> {
        self.editions.iter().flat_map(|entry| match entry {
            EditionEntry::Feed { name, spec } => spec
                .variants
                .iter()
                .map(|v| (name.as_str(), v.as_str()))
                .collect::<Vec<_>>(),
            EditionEntry::Break => Vec::new(),
        })
    }

    /// Check that edition names are valid and unique.
    ///
    /// Two editions with the same name would write the same output files.
    pub fn validate_editions(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.editions {
            let EditionEntry::Feed { name, .. } = entry else {
                continue;
            };
            validate_name("edition", name)?;
            if !seen.insert(name.as_str()) {
                return Err(FeedError::DuplicateEdition(name.clone()));
            }
        }
        Ok(())
    }

    /// Check names, uniqueness and every variant reference.
    pub fn validate(&self) -> Result<()> {
        for name in self.variants.keys() {
            validate_name("variant", name)?;
        }
        self.validate_editions()?;

        for entry in &self.editions {
            if let EditionEntry::Feed { name, spec } = entry {
                self.resolve_variants(name, spec)?;
            }
        }
        Ok(())
    }
}
