use anyhow::{bail, Context, Result};
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::info;

const HOT_LISTING_URL: &str = "https://www.reddit.com/r/all/hot.json";
const AGENT: &str = "reddit_extractor/1.0 (+feed archiver)";

/// Fetch the hot listing and return the raw body text.
///
/// One GET, no retry. A non-success status is fatal and carries the status
/// code plus the start of the body (usually an HTML error page).
pub async fn hot_listing(limit: u32) -> Result<String> {
    let client = reqwest::Client::new();
    let url = listing_url(limit);

    info!("Fetching listing: {}", url);
    let response = client
        .get(&url)
        .header(USER_AGENT, AGENT)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .context("Failed to reach the feed endpoint")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read the feed response body")?;

    if !status.is_success() {
        bail!(
            "HTTP {} from feed endpoint (body starts with {:?})",
            status.as_u16(),
            crate::listing::prefix(&body, 200)
        );
    }

    info!("Fetched {} bytes", body.len());
    Ok(body)
}

fn listing_url(limit: u32) -> String {
    format!("{}?limit={}", HOT_LISTING_URL, limit)
}

// ── Tests ──
