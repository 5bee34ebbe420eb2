//! Command-line interface definitions for Tiyatro Günlüğü.
//!
//! Every option has a default, so running the binary with no arguments
//! performs the standard pass. Options can also be set through environment
//! variables.

use clap::Parser;

/// Command-line arguments for the aggregator.
///
/// # Examples
///
/// ```sh
/// # Standard run, writes ./data/plays.json and ./data/stats.json
/// tiyatro_gunlugu
///
/// # Different output directory and Biletinial city
/// tiyatro_gunlugu -o ./site/data --city ankara
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for plays.json and stats.json
    #[arg(short, long, env = "TIYATRO_OUTPUT_DIR", default_value = "data")]
    pub output_dir: String,

    /// City whose Biletinial theater listing is scraped
    #[arg(long, env = "TIYATRO_CITY", default_value = "istanbul")]
    pub city: String,
}
