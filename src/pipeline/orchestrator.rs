//! Sequencing of extractors and pipeline stages for one full run.
//!
//! Sources are drained one after another and items within a source are fetched
//! strictly in order. Failures are contained at the smallest scope that keeps
//! the run moving: a failed item is skipped, a failed source contributes zero
//! events, and the other source is unaffected.

use super::{merge, normalize, sort, stats, validate};
use crate::models::{Event, Source, StatsReport};
use crate::scrapers::{Extractor, MAX_ITEMS_PER_SOURCE};
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

/// Events gathered so far in a run. Owned by the orchestrator and written by
/// one source at a time.
#[derive(Debug, Default)]
pub struct Accumulator {
    events: Vec<Event>,
    per_source: Vec<(Source, usize)>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append everything one source produced.
    pub fn extend(&mut self, source: Source, events: Vec<Event>) {
        self.per_source.push((source, events.len()));
        self.events.extend(events);
    }

    /// Number of events contributed by `source` so far.
    pub fn count_for(&self, source: Source) -> usize {
        self.per_source
            .iter()
            .filter(|(s, _)| *s == source)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Merge, sort and summarize the accumulated events.
    pub fn finish(self) -> Catalog {
        let merged = merge(self.events);
        let events = sort(merged);
        let stats = stats(&events);
        Catalog { events, stats }
    }
}

/// The two output artifacts of a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub events: Vec<Event>,
    pub stats: StatsReport,
}

/// Run one extractor to completion and return its validated, normalized events.
///
/// Per-item fetch failures are logged and skipped. An error is returned only
/// when the extractor cannot list the source at all.
#[instrument(level = "info", skip_all, fields(source = %extractor.source()))]
pub async fn collect_source<E: Extractor>(extractor: &E) -> Result<Vec<Event>, Box<dyn Error>> {
    let source = extractor.source();
    let links = extractor.list_source_links().await?;
    let total = links.len().min(MAX_ITEMS_PER_SOURCE);
    info!(total, "Fetching detail pages");

    let records: Vec<_> = stream::iter(links.iter().take(MAX_ITEMS_PER_SOURCE).enumerate())
        .then(|(i, link)| async move {
            let title = link.card.title.as_deref().unwrap_or("?");
            info!(progress = %format!("{}/{}", i + 1, total), %title, url = %link.url, "Fetching detail");
            match extractor.fetch_detail(link).await {
                Ok(Some(record)) => Some(record),
                Ok(None) => {
                    warn!(url = %link.url, "Detail page produced no data");
                    None
                }
                Err(e) => {
                    error!(url = %link.url, error = %e, "Detail fetch failed");
                    None
                }
            }
        })
        .filter_map(std::future::ready)
        .collect()
        .await;

    let fetched = records.len();
    let events: Vec<Event> = records
        .into_iter()
        .filter(|record| {
            let keep = validate(record, source);
            if !keep {
                debug!(title = ?record.title, category = ?record.category, "Rejected record");
            }
            keep
        })
        .map(|record| normalize(record, source))
        .collect();

    info!(
        fetched,
        accepted = events.len(),
        rejected = fetched - events.len(),
        "Source processed"
    );
    Ok(events)
}

/// Drain `extractor` into `acc`, treating a source-level failure as zero events.
pub async fn run_source<E: Extractor>(extractor: &E, acc: &mut Accumulator) {
    let source = extractor.source();
    match collect_source(extractor).await {
        Ok(events) => {
            info!(%source, count = events.len(), "Events added");
            acc.extend(source, events);
        }
        Err(e) => {
            error!(%source, error = %e, "Source failed; continuing without it");
            acc.extend(source, Vec::new());
        }
    }
}

/// One full pass: both sources in order, then merge, sort and stats.
pub async fn run<A: Extractor, B: Extractor>(first: &A, second: &B) -> Catalog {
    let mut acc = Accumulator::new();
    run_source(first, &mut acc).await;
    run_source(second, &mut acc).await;

    if acc.is_empty() {
        warn!("No events collected from any source");
    }
    info!(
        total = acc.len(),
        first = acc.count_for(first.source()),
        second = acc.count_for(second.source()),
        "Merging events"
    );
    acc.finish()
}
