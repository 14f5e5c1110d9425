//! Writing feeds and the index page to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{feed_file_name, INDEX_FILE_NAME};
use crate::error::{FeedError, Result};

/// Create the output directory if it does not exist yet.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| FeedError::io(dir, e))
}

/// Write one serialized feed as `{edition}-{variant}.xml`.
///
/// # Returns
/// Path to the written file
pub fn save_feed(dir: &Path, edition: &str, variant: &str, xml: &str) -> Result<PathBuf> {
    let path = dir.join(feed_file_name(edition, variant));
    fs::write(&path, xml).map_err(|e| FeedError::io(&path, e))?;
    tracing::debug!(path = %path.display(), "Wrote feed");
    Ok(path)
}

/// Read the index template.
pub fn read_template(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| FeedError::io(path, e))
}

/// Write the rendered index page.
///
/// # Returns
/// Path to the written file
pub fn save_index(dir: &Path, html: &str) -> Result<PathBuf> {
    let path = dir.join(INDEX_FILE_NAME);
    fs::write(&path, html).map_err(|e| FeedError::io(&path, e))?;
    Ok(path)
}
