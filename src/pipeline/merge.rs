//! Cross-source deduplication of events that describe the same play.
//!
//! Two events are the same play when their merge keys (lowercased, trimmed
//! titles) are equal. The first event seen for a key survives; later duplicates
//! contribute their showtimes (union, deduplicated by `(date, location)`) and
//! fill in `summary`, `image_url` and `crew` only where the survivor has none.

use crate::models::{Event, Showtime};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::debug;

/// Merge `events` so that each distinct title appears once, in order of first
/// appearance. Events without a title are dropped.
pub fn merge(events: Vec<Event>) -> Vec<Event> {
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Event> = Vec::new();

    for mut event in events {
        let Some(key) = event.merge_key() else {
            debug!(id = %event.id, source = %event.source, "Dropping event without title");
            continue;
        };

        match by_key.get(&key) {
            Some(&index) => {
                debug!(%key, from = %event.source, into = %merged[index].source, "Merging duplicate play");
                absorb(&mut merged[index], event);
            }
            None => {
                event.dates_and_locations = dedup_showtimes(event.dates_and_locations, Vec::new());
                by_key.insert(key, merged.len());
                merged.push(event);
            }
        }
    }

    merged
}

/// Fold `duplicate` into `survivor`. Never overwrites a value the survivor has.
fn absorb(survivor: &mut Event, duplicate: Event) {
    let existing = std::mem::take(&mut survivor.dates_and_locations);
    survivor.dates_and_locations = dedup_showtimes(existing, duplicate.dates_and_locations);

    if survivor.summary.as_deref().is_none_or(str::is_empty) {
        if let Some(summary) = duplicate.summary.filter(|s| !s.is_empty()) {
            survivor.summary = Some(summary);
        }
    }
    if survivor.image_url.as_deref().is_none_or(str::is_empty) {
        if let Some(image_url) = duplicate.image_url.filter(|s| !s.is_empty()) {
            survivor.image_url = Some(image_url);
        }
    }
    if survivor.crew.as_ref().is_none_or(|crew| crew.is_empty()) {
        if let Some(crew) = duplicate.crew.filter(|crew| !crew.is_empty()) {
            survivor.crew = Some(crew);
        }
    }
}

/// `existing` followed by `incoming`, keeping the first occurrence of each pair.
fn dedup_showtimes(existing: Vec<Showtime>, incoming: Vec<Showtime>) -> Vec<Showtime> {
    existing.into_iter().chain(incoming).unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crew, PartialRecord, Source};
    use crate::pipeline::normalize;

    fn play(title: &str, source: Source, dates: &[(&str, &str)]) -> Event {
        normalize(
            PartialRecord {
                title: Some(title.to_string()),
                dates_and_locations: Some(
                    dates
                        .iter()
                        .map(|(date, location)| Showtime::new(*date, *location))
                        .collect(),
                ),
                scraped_at: Some("2025-05-06T08:00:00".to_string()),
                ..Default::default()
            },
            source,
        )
    }

    #[test]
    fn test_merges_titles_differing_in_case_and_whitespace() {
        let merged = merge(vec![
            play(" The Seagull ", Source::SehirTiyatrolari, &[("1 Haziran", "A")]),
            play("the seagull", Source::Biletinial, &[("2 Haziran", "B")]),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].merge_key().as_deref(), Some("the seagull"));
        assert_eq!(merged[0].source, Source::SehirTiyatrolari);
        assert_eq!(merged[0].dates_and_locations.len(), 2);
    }

    #[test]
    fn test_overlapping_showtimes_appear_once_in_first_seen_order() {
        let merged = merge(vec![
            play("Hamlet", Source::SehirTiyatrolari, &[("12 Mayıs", "X"), ("13 Mayıs", "X")]),
            play("Hamlet", Source::Biletinial, &[("13 Mayıs", "X"), ("12 Mayıs", "Y")]),
        ]);

        assert_eq!(
            merged[0].dates_and_locations,
            vec![
                Showtime::new("12 Mayıs", "X"),
                Showtime::new("13 Mayıs", "X"),
                Showtime::new("12 Mayıs", "Y"),
            ]
        );
    }

    #[test]
    fn test_duplicates_within_a_single_event_are_removed() {
        let merged = merge(vec![play(
            "Cimri",
            Source::Biletinial,
            &[("1 Ekim", ""), ("1 Ekim", "")],
        )]);
        assert_eq!(merged[0].dates_and_locations.len(), 1);
    }

    #[test]
    fn test_first_source_wins_for_scalars() {
        let mut first = play("Hamlet", Source::SehirTiyatrolari, &[("12 Mayıs", "X")]);
        first.summary = Some("Original".to_string());
        let mut second = play("Hamlet", Source::Biletinial, &[]);
        second.summary = Some("Other".to_string());
        second.image_url = Some("https://example.com/hamlet.jpg".to_string());
        let mut crew = Crew::new();
        crew.insert("Yazan".to_string(), "William Shakespeare".to_string());
        second.crew = Some(crew.clone());

        let merged = merge(vec![first, second]);

        assert_eq!(merged[0].summary.as_deref(), Some("Original"));
        assert_eq!(
            merged[0].image_url.as_deref(),
            Some("https://example.com/hamlet.jpg")
        );
        assert_eq!(merged[0].crew.as_ref(), Some(&crew));
    }

    #[test]
    fn test_preserves_first_appearance_order_and_drops_untitled() {
        let mut untitled = play("", Source::Biletinial, &[("1 Ocak", "")]);
        untitled.title = None;
        let merged = merge(vec![
            play("Yalnız", Source::Biletinial, &[]),
            untitled,
            play("Cimri", Source::SehirTiyatrolari, &[]),
            play(" yalnız ", Source::SehirTiyatrolari, &[]),
        ]);

        let titles: Vec<_> = merged.iter().filter_map(|e| e.title.as_deref()).collect();
        assert_eq!(titles, vec!["Yalnız", "Cimri"]);
    }

    #[test]
    fn test_dotless_and_dotted_i_stay_distinct() {
        let merged = merge(vec![
            play("YALNIZ", Source::SehirTiyatrolari, &[]),
            play("Yalnız", Source::Biletinial, &[]),
            play("Yalniz", Source::Biletinial, &[]),
        ]);

        let titles: Vec<_> = merged.iter().filter_map(|e| e.title.as_deref()).collect();
        assert_eq!(titles, vec!["YALNIZ", "Yalnız"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut with_summary = play("Martı", Source::Biletinial, &[("3 Mart", "B")]);
        with_summary.summary = Some("S".to_string());
        let input = vec![
            play("Martı", Source::SehirTiyatrolari, &[("3 Mart", "A"), ("3 Mart", "B")]),
            play("Hamlet", Source::SehirTiyatrolari, &[]),
            with_summary,
        ];

        let once = merge(input);
        let twice = merge(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merged_content_is_independent_of_duplicate_order() {
        let mut a = play("Hamlet", Source::SehirTiyatrolari, &[("1", "X")]);
        a.summary = Some("first".to_string());
        let mut b = play("Hamlet", Source::Biletinial, &[("2", "X"), ("1", "X")]);
        b.image_url = Some("b.jpg".to_string());
        let mut c = play("hamlet", Source::Biletinial, &[("3", "Y")]);
        c.image_url = Some("c.jpg".to_string());
        c.summary = Some("third".to_string());

        let abc = merge(vec![a.clone(), b.clone(), c.clone()]);
        let acb = merge(vec![a, c, b]);

        let mut abc_dates = abc[0].dates_and_locations.clone();
        let mut acb_dates = acb[0].dates_and_locations.clone();
        abc_dates.sort_by(|x, y| x.date.cmp(&y.date));
        acb_dates.sort_by(|x, y| x.date.cmp(&y.date));
        assert_eq!(abc_dates, acb_dates);
        assert_eq!(abc[0].summary, acb[0].summary);
    }

    #[test]
    fn test_hamlet_example_after_validation() {
        let first = PartialRecord {
            title: Some("Hamlet".to_string()),
            venue: Some("Sahne A".to_string()),
            dates_and_locations: Some(vec![]),
            ..Default::default()
        };
        let second = PartialRecord {
            title: Some("Hamlet".to_string()),
            venue: Some("Sahne B".to_string()),
            summary: Some("S".to_string()),
            dates_and_locations: Some(vec![Showtime::new("12 May", "X")]),
            ..Default::default()
        };

        let events: Vec<Event> = [(first, Source::SehirTiyatrolari), (second, Source::Biletinial)]
            .into_iter()
            .filter(|(record, source)| crate::pipeline::validate(record, *source))
            .map(|(record, source)| normalize(record, source))
            .collect();
        let merged = merge(events);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title.as_deref(), Some("Hamlet"));
        assert_eq!(merged[0].dates_and_locations, vec![Showtime::new("12 May", "X")]);
        assert_eq!(merged[0].summary.as_deref(), Some("S"));
    }
}
