mod fetch;
mod listing;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "reddit_extractor", about = "Reddit hot-listing extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the hot listing (cache-first) and write extracted posts
    Run {
        /// Max posts to request from the feed
        #[arg(short = 'n', long, default_value_t = 25)]
        limit: u32,
        /// Skip the cache file and always hit the API
        #[arg(long)]
        refresh: bool,
        /// Raw-response cache file
        #[arg(long, default_value = store::DEFAULT_CACHE)]
        cache: PathBuf,
        /// Extracted-posts output file
        #[arg(short, long, default_value = store::DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Extract posts from a saved raw listing file
    File {
        /// Raw listing JSON to read instead of the network
        input: PathBuf,
        /// Extracted-posts output file
        #[arg(short, long, default_value = store::DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Posts overview table from a previous run
    Show {
        /// Max rows to display
        #[arg(short = 'n', long, default_value_t = 25)]
        limit: usize,
        /// Extracted-posts file to display
        #[arg(short, long, default_value = store::DEFAULT_OUTPUT)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            limit,
            refresh,
            cache,
            output,
        } => run(limit, refresh, &cache, &output).await,
        Commands::File { input, output } => extract_file(&input, &output),
        Commands::Show { limit, input } => show(&input, limit),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Cache-first run: reuse a saved raw response when it still yields posts,
/// otherwise fetch from the API and save the fresh response before
/// extracting.
async fn run(limit: u32, refresh: bool, cache: &Path, output: &Path) -> anyhow::Result<()> {
    if !refresh && cache.exists() {
        info!("Reading cached listing from {}", cache.display());
        match store::read_raw(cache) {
            Ok(raw) => match listing::extract(&raw) {
                Ok(posts) if !posts.is_empty() => {
                    store::save_posts(output, &posts)?;
                    report(posts.len(), output);
                    return Ok(());
                }
                Ok(_) => warn!("Cache file has no extractable posts, fetching from API"),
                Err(e) => warn!("Cache file unusable ({}), fetching from API", e),
            },
            Err(e) => warn!("{:#}, fetching from API", e),
        }
    }

    let raw = fetch::hot_listing(limit).await?;
    match store::write_raw(cache, &raw) {
        Ok(()) => info!("Raw response saved to {}", cache.display()),
        Err(e) => warn!("{:#}", e),
    }

    let posts = extract_or_empty(&raw);
    if posts.is_empty() {
        bail!("no posts could be extracted from the listing response");
    }

    store::save_posts(output, &posts)?;
    report(posts.len(), output);
    Ok(())
}

/// File-only run: extract from an existing raw listing file.
fn extract_file(input: &Path, output: &Path) -> anyhow::Result<()> {
    let raw = store::read_raw(input)?;
    let posts = extract_or_empty(&raw);
    if posts.is_empty() {
        bail!("no posts could be extracted from {}", input.display());
    }

    store::save_posts(output, &posts)?;
    report(posts.len(), output);
    Ok(())
}

/// Format and shape failures are logged and degrade to an empty result;
/// the callers turn that into a non-zero exit.
fn extract_or_empty(raw: &str) -> Vec<listing::PostSummary> {
    match listing::extract(raw) {
        Ok(posts) => posts,
        Err(e) => {
            error!("{}", e);
            Vec::new()
        }
    }
}

fn report(count: usize, output: &Path) {
    println!("Extracted {} posts", count);
    println!("Results saved to {}", output.display());
}

fn show(input: &Path, limit: usize) -> anyhow::Result<()> {
    let posts = store::load_posts(input)?;
    if posts.is_empty() {
        println!("No posts in {}. Run 'run' first.", input.display());
        return Ok(());
    }

    println!(
        "{:>3} | {:<50} | {:>6} | {:>5} | {}",
        "#", "Title", "Ups", "Ratio", "Permalink"
    );
    println!("{}", "-".repeat(110));

    for (i, p) in posts.iter().take(limit).enumerate() {
        println!(
            "{:>3} | {:<50} | {:>6} | {:>5.2} | {}",
            i + 1,
            truncate(&p.title, 50),
            p.ups,
            p.upvote_ratio,
            p.permalink
        );
    }

    println!("\n{} posts | {}", posts.len(), input.display());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
