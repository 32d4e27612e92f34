//! CLI command implementations

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset;
use crate::error::Error;
use crate::extract::extract_with_report;
use crate::fetch::{normalize_url, HttpPageFetcher, PageFetcher};
use crate::model::EventRecord;
use crate::pipeline::Enricher;
use crate::tiers::tier_map;

/// Arguments for the `enrich` command
#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    pub input: Option<PathBuf>,
    pub artist: Option<String>,
    pub outdir: Option<PathBuf>,
    pub annotations: Option<PathBuf>,
    pub today: Option<NaiveDate>,
}

/// Enrich a record set and write the ranked result
pub async fn enrich(config: &Config, opts: EnrichOptions) -> Result<()> {
    let input = match opts.input {
        Some(path) => path,
        None => dataset::detect_latest_input(Path::new(&config.data.raw_dir), opts.artist.as_deref())?,
    };

    let outdir = opts
        .outdir
        .unwrap_or_else(|| PathBuf::from(&config.data.enriched_dir));
    if !outdir.ends_with(&config.data.enriched_dir) {
        warn!(
            "Writing outside the configured enriched_dir ({})",
            config.data.enriched_dir
        );
    }
    // Fail before any network work if there is nowhere to write
    let out_path = dataset::output_path(&input, &outdir)?;

    let mut data = dataset::load_dataset(&input)?;
    if let Some(path) = &opts.annotations {
        data = data.annotate(dataset::load_annotations(path)?);
    }

    let today = opts.today.unwrap_or_else(|| Utc::now().date_naive());
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(config.fetch.clone())?);
    let enricher = Enricher::new(config.clone(), fetcher);

    let ranked = enricher.enrich(data, today).await?;
    dataset::write_events(&out_path, &ranked)?;

    println!("\n=== ENRICHED EVENTS ({}) ===\n", ranked.len());
    print!("{}", render_table(&ranked));
    println!("\nWrote {}", out_path.display());

    Ok(())
}

/// Run the price cascade against one page and print what matched
pub async fn extract(config: &Config, source: &str) -> Result<()> {
    let is_url = source.starts_with("http://") || source.starts_with("https://");
    let html = if is_url {
        let url = normalize_url(source, &config.fetch.base_url)?;
        info!("Fetching {}", url);
        let fetcher = HttpPageFetcher::new(config.fetch.clone())?;
        tokio::time::timeout(config.fetch.page_budget(), fetcher.fetch(&url))
            .await
            .with_context(|| format!("Timed out fetching {}", url))??
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Cannot read {}", source))?
    };

    let report = extract_with_report(&html);

    println!("\n=== PRICE EXTRACTION ===\n");
    println!("Source: {}", source);
    println!("Page size: {} bytes", html.len());
    for (strategy, miss) in &report.misses {
        println!("  {:<20} miss: {}", strategy.to_string(), miss);
    }
    match report.strategy {
        Some(strategy) => println!("  {:<20} matched", strategy.to_string()),
        None => println!("No strategy matched"),
    }

    println!("\nSamples ({}): {}", report.samples.len(), join_prices(&report.samples));

    let tiers = tier_map(&report.samples);
    println!("\n=== TIERS ===\n");
    println!("Upper: {}", fmt_price(tiers.upper));
    println!("Mid:   {}", fmt_price(tiers.mid));
    println!("Floor: {}", fmt_price(tiers.floor));
    println!("VIP:   {}", fmt_price(tiers.vip));

    Ok(())
}

/// Whether a command error came from a run-level condition (bad input,
/// missing output dir, no events) rather than a runtime failure
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Error>().is_some_and(Error::is_fatal)
}

/// Show configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

fn join_prices(samples: &[f64]) -> String {
    samples
        .iter()
        .map(|p| format!("{:.2}", p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fmt_price(price: Option<f64>) -> String {
    price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string())
}

fn cell(value: Option<&str>, width: usize) -> String {
    let value = value.unwrap_or("-");
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Fixed-width console table of ranked events
pub fn render_table(events: &[EventRecord]) -> String {
    let mut out = format!(
        "{:<18} {:<14} {:<22} {:<28} {:>8} {:>8} {:>5} {:>6} {:<6}\n",
        "ARTIST", "CITY", "VENUE", "EVENT", "VIP", "UPPER", "DAYS", "HYPE", "RISK"
    );

    for e in events {
        let days = e.days_to_event.map(|d| d.to_string());
        let hype = e.hype_index.map(|h| format!("{:.2}", h));
        let risk = e.risk.map(|r| r.to_string());
        out.push_str(&format!(
            "{:<18} {:<14} {:<22} {:<28} {:>8} {:>8} {:>5} {:>6} {:<6}\n",
            cell(Some(&e.artist), 18),
            cell(e.city.as_deref(), 14),
            cell(e.venue.as_deref(), 22),
            cell(e.name.as_deref(), 28),
            fmt_price(e.tiers.vip),
            fmt_price(e.tiers.upper),
            cell(days.as_deref(), 5),
            cell(hype.as_deref(), 6),
            cell(risk.as_deref(), 6),
        ));
    }
    out
}
