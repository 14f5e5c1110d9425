//! Command-line interface for the republisher.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::Catalog;
use crate::config::{
    feed_url, DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_PATH,
    HTTP_TIMEOUT_SECS,
};
use crate::error::{FeedError, Result};
use crate::http::HttpFetcher;
use crate::index::render_index;
use crate::output::read_template;
use crate::pipeline::{build_feeds_with_progress, BuildOptions};
use crate::transform::{parse_feed, transform_feed};

/// BBC News without the crap - republish BBC News RSS feeds, filtered and de-duplicated.
#[derive(Parser)]
#[command(name = "bbc-feeds")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every edition and write all feeds plus the index page.
    Build {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Index page template containing {{FEEDS}}
        #[arg(short, long, default_value = DEFAULT_TEMPLATE_PATH)]
        template: PathBuf,

        /// YAML catalog to use instead of the built-in editions
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Domain the feeds are served from (default: from catalog)
        #[arg(long)]
        domain: Option<String>,

        /// HTTP timeout in seconds
        #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
        timeout: u64,

        /// Maximum feed size in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_RESPONSE_SIZE)]
        max_size: u64,
    },

    /// Validate the catalog and list the feeds a build would write.
    Check {
        /// YAML catalog to use instead of the built-in editions
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Template to check for the {{FEEDS}} placeholder
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Transform a local feed file and print the result.
    Transform {
        /// Feed XML file
        #[arg(short, long)]
        input: PathBuf,

        /// Edition the feed belongs to (used for the self link)
        #[arg(short, long)]
        edition: String,

        /// Variant whose rules to apply
        #[arg(short, long)]
        variant: String,

        /// YAML catalog to use instead of the built-in editions
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Domain the feeds are served from (default: from catalog)
        #[arg(long)]
        domain: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            output,
            template,
            config,
            domain,
            timeout,
            max_size,
        } => build_command(
            BuildOptions {
                output_dir: output,
                template_path: template,
            },
            config.as_deref(),
            domain,
            Duration::from_secs(timeout),
            max_size,
        ),
        Commands::Check { config, template } => {
            check_command(config.as_deref(), template.as_deref())
        }
        Commands::Transform {
            input,
            edition,
            variant,
            config,
            domain,
        } => transform_command(&input, &edition, &variant, config.as_deref(), domain),
    }
}

/// Load the catalog from a file or fall back to the built-in one.
fn load_catalog(config: Option<&Path>, domain: Option<String>) -> Result<Catalog> {
    let catalog = match config {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    Ok(match domain {
        Some(domain) => catalog.with_domain(domain),
        None => catalog,
    })
}

/// Execute the build command.
fn build_command(
    options: BuildOptions,
    config: Option<&Path>,
    domain: Option<String>,
    timeout: Duration,
    max_size: u64,
) -> Result<()> {
    let catalog = load_catalog(config, domain)?;
    let fetcher = HttpFetcher::new(timeout, max_size)?;

    println!(
        "{} feeds for {} into {}",
        style("Building").bold(),
        style(catalog.domain()).cyan(),
        style(options.output_dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let summary = match build_feeds_with_progress(&catalog, &fetcher, &options, |edition| {
        pb.set_message(format!("Fetching {edition}..."));
    }) {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    for feed in &summary.feeds {
        let report = feed.report;
        let mut line = format!(
            "  {:<28} {} live",
            feed.path.file_name().unwrap_or_default().to_string_lossy(),
            report.live_items
        );
        if report.rejected > 0 {
            line.push_str(&format!(", {} rejected", style(report.rejected).yellow()));
        }
        if report.duplicates > 0 {
            line.push_str(&format!(", {} duplicate", style(report.duplicates).yellow()));
        }
        println!("{line}");
    }

    println!();
    println!(
        "{} {}",
        style("Index:").green().bold(),
        summary.index_path.display()
    );

    Ok(())
}

/// Execute the check command.
fn check_command(config: Option<&Path>, template: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(config, None)?;
    catalog.validate()?;

    if let Some(path) = template {
        render_index(&read_template(path)?, "", path)?;
    }

    for (edition, variant) in catalog.feeds() {
        println!("{}", feed_url(catalog.domain(), edition, variant));
    }
    println!();
    println!("{}", style("Catalog OK").green().bold());
    Ok(())
}

/// Execute the transform command.
fn transform_command(
    input: &Path,
    edition: &str,
    variant: &str,
    config: Option<&Path>,
    domain: Option<String>,
) -> Result<()> {
    let catalog = load_catalog(config, domain)?;
    let rule = catalog
        .variant(variant)
        .ok_or_else(|| FeedError::UnknownVariant {
            edition: edition.to_string(),
            variant: variant.to_string(),
        })?;

    let xml = std::fs::read_to_string(input).map_err(|e| FeedError::io(input, e))?;
    let document = parse_feed(edition, &xml)?;
    let transformed = transform_feed(&document, edition, variant, rule, catalog.domain())?;

    print!("{}", transformed.document.to_xml());
    let report = transformed.report;
    eprintln!(
        "{} live, {} rejected, {} duplicate",
        report.live_items, report.rejected, report.duplicates
    );
    Ok(())
}
