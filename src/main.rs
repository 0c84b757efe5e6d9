mod cache;
mod config;
mod distance;
mod error;
mod http_client;
mod models;
mod pipeline;
mod renderer;
mod scrapers;
mod sink;

use anyhow::Result;
use cache::DatasetCache;
use clap::Parser;
use config::Config;
use distance::WalkingTimeClient;
use models::ApartmentRecord;
use pipeline::ExtractionPipeline;
use renderer::{ChromeRenderer, PageRenderer};
use scrapers::UniversityViewScraper;
use sink::CsvSink;

#[derive(Parser, Debug)]
#[command(name = "terpnest")]
#[command(about = "Scrapes student-housing floorplan listings into a normalized CSV", long_about = None)]
struct Args {
    /// Keep running, re-scraping whenever the cached dataset expires
    #[arg(long)]
    watch: bool,

    /// Test page rendering - render a URL in the headless browser and print the HTML
    #[arg(long)]
    test_render: Option<String>,

    /// Save HTML to file when using --test-render
    #[arg(long)]
    save_html: Option<String>,

    /// Print the walking time from the property to a campus school
    #[arg(long)]
    walk_time: Option<String>,

    /// Override the output CSV path from config
    #[arg(long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !std::path::Path::new("data/config.yaml").exists() {
        Config::create_default()?;
        eprintln!("No config file found, created data/config.yaml with defaults");
    }

    let mut config = Config::load()?;

    if let Some(output) = args.output {
        config.output_path = output;
    }

    // Initialize logging - use RUST_LOG env var if set, otherwise use config
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
        tracing::info!("Logging level set from RUST_LOG environment variable");
    } else {
        let level = config.tracing_level.to_lowercase();
        let max_level = match level.as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                eprintln!("Invalid tracing level '{}', using 'info'", level);
                tracing::Level::INFO
            }
        };

        tracing_subscriber::fmt().with_max_level(max_level).init();

        tracing::info!("Logging level set to: {} (from data/config.yaml)", level);
    }

    if let Some(url) = args.test_render {
        return test_render(&config, &url, args.save_html.as_deref()).await;
    }

    if let Some(school) = args.walk_time {
        return walk_time(&config, &school).await;
    }

    if args.watch {
        watch(&config).await
    } else {
        let records = run_once(&config).await?;
        print_records(&records);
        Ok(())
    }
}

fn build_pipeline(config: &Config) -> ExtractionPipeline<ChromeRenderer, UniversityViewScraper> {
    ExtractionPipeline::new(
        ChromeRenderer::from_config(config),
        UniversityViewScraper::new(config.property()),
        CsvSink::new(&config.output_path),
    )
}

async fn run_once(config: &Config) -> Result<Vec<ApartmentRecord>> {
    let records = build_pipeline(config).run().await?;
    tracing::info!(
        "Run complete: {} records written to {}",
        records.len(),
        config.output_path
    );
    Ok(records)
}

/// Long-running refresh loop. The cache entry owns the staleness decision;
/// a failed run keeps serving the last-known-good snapshot instead of
/// clearing it.
async fn watch(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config);
    let ttl = chrono::Duration::seconds(config.refresh_interval_seconds as i64);
    let mut cache: Option<DatasetCache> = None;

    let tick_seconds = config.refresh_interval_seconds.min(60);
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(tick_seconds));

    tracing::info!(
        "Watching {} (refresh every {} seconds)",
        config.listings_url,
        config.refresh_interval_seconds
    );

    loop {
        interval.tick().await;

        if let Some(entry) = &cache {
            if entry.is_fresh(ttl) {
                continue;
            }
            tracing::debug!("Cached dataset is {} minutes old, refreshing", entry.age().num_minutes());
        }

        match pipeline.run().await {
            Ok(records) => {
                tracing::info!("Refreshed dataset: {} records", records.len());
                cache = Some(DatasetCache::new(records));
            }
            Err(e) => {
                tracing::error!("Extraction run failed: {}", e);
                match &cache {
                    Some(entry) => tracing::warn!(
                        "Keeping last snapshot from {} ({} records)",
                        entry.fetched_at(),
                        entry.records().len()
                    ),
                    None => tracing::warn!("No cached dataset available yet"),
                }
            }
        }
    }
}

fn print_records(records: &[ApartmentRecord]) {
    println!("Found {} unique floorplans", records.len());
    println!("{}", "=".repeat(80));

    for (i, record) in records.iter().enumerate() {
        println!("\nListing #{}", i + 1);
        println!("Name: {}", record.name);
        match record.price {
            Some(price) => println!("Price: ${}/person", price),
            None => println!("Price: unavailable"),
        }
        println!("Beds: {}", record.beds);
        println!("Baths: {}", record.baths);
        if let Some(sqft) = record.sqft {
            println!("Sqft: {}", sqft);
        }
        println!("Address: {}", record.address);
        println!("Directions: {}", distance::directions_link(&record.address));
        println!("{}", "-".repeat(80));
    }

    if records.is_empty() {
        println!("No listings found. This might mean:");
        println!("  - The card marker selector needs updating");
        println!("  - The website structure has changed");
        println!("  - The page did not finish rendering before capture");
    }
}

/// Render a URL through the headless browser and dump the result, for
/// diagnosing markup changes on the listings page.
async fn test_render(config: &Config, url: &str, save_path: Option<&str>) -> Result<()> {
    println!("Testing page render: {}", url);
    println!("User-Agent: {}", config.user_agent);
    println!("{}", "=".repeat(80));

    let renderer = ChromeRenderer::from_config(config);
    let html = renderer.render(url).await?;

    if let Some(path) = save_path {
        std::fs::write(path, &html)?;
        println!("HTML saved to: {}", path);
    } else {
        println!("{}", html);
    }

    println!("{}", "=".repeat(80));
    println!("Total length: {} bytes", html.len());

    let marker_hits = html.matches("floorplan").count();
    if marker_hits == 0 {
        println!("\nWarning: no 'floorplan' markers found in the rendered page.");
        println!("The card selector may be stale, or content did not finish loading.");
    } else {
        println!("Found {} occurrences of 'floorplan' in the page", marker_hits);
    }

    Ok(())
}

async fn walk_time(config: &Config, school: &str) -> Result<()> {
    let destinations = distance::campus_destinations();
    let school_lower = school.to_lowercase();

    let Some((name, address)) = destinations
        .iter()
        .find(|(name, _)| name.to_lowercase().contains(&school_lower))
        .copied()
    else {
        eprintln!("Unknown school: {}", school);
        eprintln!("Available schools:");
        for (name, _) in destinations {
            eprintln!("  - {}", name);
        }
        return Ok(());
    };

    let client = WalkingTimeClient::new(config.google_maps_api_key.clone(), &config.user_agent);
    let duration = client.walking_time(&config.property_address, address).await;

    println!("{} -> {}", config.property_address, name);
    println!("Walking time: {}", duration);
    println!("Directions: {}", distance::directions_link(address));

    if duration == distance::UNAVAILABLE && config.google_maps_api_key.is_none() {
        println!("(set GOOGLE_MAPS_API_KEY to enable walking-time lookups)");
    }

    Ok(())
}
