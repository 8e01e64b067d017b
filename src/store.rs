use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::listing::PostSummary;

pub const DEFAULT_CACHE: &str = "reddit_data.json";
pub const DEFAULT_OUTPUT: &str = "reddit_top_news.json";

/// Read a previously saved raw listing response.
pub fn read_raw(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Save a raw listing response for later reuse and debugging.
pub fn write_raw(path: &Path, raw: &str) -> Result<()> {
    fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write extracted posts as a pretty-printed JSON array.
pub fn save_posts(path: &Path, posts: &[PostSummary]) -> Result<()> {
    let json = serde_json::to_string_pretty(posts)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Load posts written by a previous run.
pub fn load_posts(path: &Path) -> Result<Vec<PostSummary>> {
    let json = read_raw(path)?;
    let posts = serde_json::from_str(&json)
        .with_context(|| format!("{} is not a valid posts file", path.display()))?;
    Ok(posts)
}

// ── Tests ──
