//! Summary statistics over the final catalog.

use crate::models::{Event, StatsReport, UNKNOWN_CATEGORY};
use crate::utils::now_iso;
use indexmap::IndexMap;

/// Count plays by showtime presence, category and source.
pub fn stats(events: &[Event]) -> StatsReport {
    let mut categories: IndexMap<String, usize> = IndexMap::new();
    let mut sources: IndexMap<String, usize> = IndexMap::new();
    let mut with_showtimes = 0;

    for event in events {
        if event.has_showtimes() {
            with_showtimes += 1;
        }
        let category = event.category.as_deref().unwrap_or(UNKNOWN_CATEGORY);
        *categories.entry(category.to_string()).or_default() += 1;
        *sources.entry(event.source.as_str().to_string()).or_default() += 1;
    }

    StatsReport {
        total_plays: events.len(),
        plays_with_showtimes: with_showtimes,
        plays_without_showtimes: events.len() - with_showtimes,
        categories,
        sources,
        last_updated: now_iso(),
    }
}
