//! # Tiyatro Günlüğü
//!
//! Aggregates Istanbul theater listings from two public sources into one
//! deduplicated, normalized JSON catalog plus summary statistics.
//!
//! ## Sources
//!
//! - İBB Şehir Tiyatroları (municipal theater)
//! - Biletinial (ticketing marketplace, theater section for one city)
//!
//! ## Usage
//!
//! ```sh
//! tiyatro_gunlugu            # writes ./data/plays.json and ./data/stats.json
//! tiyatro_gunlugu -o ./out
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Listing**: Discover play detail URLs from each source
//! 2. **Detail**: Fetch and parse each detail page, one at a time
//! 3. **Validation & normalization**: Drop non-plays, map to the canonical schema
//! 4. **Merge, sort, stats**: Deduplicate across sources by title
//! 5. **Output**: Write `plays.json` and `stats.json`
//!
//! A failing source is logged and contributes nothing; only a failure to write
//! the output files makes the process exit with an error.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use outputs::json;
use scrapers::Fetcher;
use scrapers::biletinial::Biletinial;
use scrapers::sehir_tiyatrolari::SehirTiyatrolari;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tiyatro_gunlugu starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.city, "Parsed CLI arguments");

    // Fail before scraping if the results could not be saved anyway
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = Fetcher::new()?;
    let sehir = SehirTiyatrolari::new(fetcher.clone())?;
    let biletinial = Biletinial::new(fetcher, args.city.clone())?;

    let catalog = pipeline::run(&sehir, &biletinial).await;

    if let Err(e) = json::write_catalog(&catalog, &args.output_dir).await {
        error!(path = %args.output_dir, error = %e, "Failed to write output files");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        total_plays = catalog.stats.total_plays,
        with_showtimes = catalog.stats.plays_with_showtimes,
        without_showtimes = catalog.stats.plays_without_showtimes,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
