//! JSON output for the catalog and its statistics.
//!
//! Both files are pretty-printed with two-space indentation and UTF-8
//! encoded. Turkish characters are written literally, never `\u` escaped.

use crate::models::{Event, StatsReport};
use crate::pipeline::Catalog;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the event list inside the output directory.
pub const EVENTS_FILE: &str = "plays.json";
/// File name of the stats report inside the output directory.
pub const STATS_FILE: &str = "stats.json";

/// Write `plays.json` and `stats.json` for `catalog` into `output_dir`.
///
/// # Errors
///
/// Fails if the directory cannot be created or either file cannot be written.
#[instrument(level = "info", skip_all, fields(%output_dir))]
pub async fn write_catalog(
    catalog: &Catalog,
    output_dir: &str,
) -> Result<(PathBuf, PathBuf), Box<dyn Error>> {
    let events_path = write_events(&catalog.events, output_dir).await?;
    let stats_path = write_stats(&catalog.stats, output_dir).await?;
    Ok((events_path, stats_path))
}

/// Write the event array to `{output_dir}/plays.json`.
pub async fn write_events(events: &[Event], output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = Path::new(output_dir).join(EVENTS_FILE);
    write_pretty(events, &path).await?;
    info!(path = %path.display(), count = events.len(), "Wrote events JSON");
    Ok(path)
}

/// Write the stats object to `{output_dir}/stats.json`.
pub async fn write_stats(stats: &StatsReport, output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = Path::new(output_dir).join(STATS_FILE);
    write_pretty(stats, &path).await?;
    info!(path = %path.display(), "Wrote stats JSON");
    Ok(path)
}

async fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(dir) = path.parent() {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create output dir");
            return Err(e.into());
        }
    }
    fs::write(path, json).await?;
    Ok(())
}
