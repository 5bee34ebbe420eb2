//! Data models for theater listings and the aggregated catalog.
//!
//! This module defines the core data structures used throughout the application:
//! - [`PartialRecord`]: Best-effort fields scraped from one listing/detail page
//! - [`Event`]: Canonical, normalized play record written to `plays.json`
//! - [`Showtime`]: One `(date, location)` performance occurrence
//! - [`StatsReport`]: Summary counts written to `stats.json`
//!
//! Every optional field is an explicit `Option` slot so that "absent" and
//! "present" are visible in the types. Empty strings and collections are folded
//! into `None` by the normalizer before anything is serialized.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned to a play when its source did not expose one ("Adult").
pub const DEFAULT_CATEGORY: &str = "Yetişkin";

/// Bucket used by the stats report for events without a category ("Unknown").
pub const UNKNOWN_CATEGORY: &str = "Bilinmeyen";

/// Crew credits in the order the page listed them, e.g. `"Yazan" -> "Shakespeare"`.
pub type Crew = IndexMap<String, String>;

/// The upstream sites the aggregator knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// İBB Şehir Tiyatroları, the Istanbul municipal theater.
    SehirTiyatrolari,
    /// Biletinial, a ticketing marketplace.
    Biletinial,
}

impl Source {
    /// Tag used in ids, JSON output and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::SehirTiyatrolari => "sehir_tiyatrolari",
            Source::Biletinial => "biletinial",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single performance: an opaque human-readable date and an optional stage.
///
/// Two showtimes are the same performance iff both strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Showtime {
    /// Date (and usually time) as printed by the source, e.g. `"12 Mayıs Cuma, 20:30"`.
    pub date: String,
    /// Stage or hall name; empty when the page did not say.
    #[serde(default)]
    pub location: String,
}

impl Showtime {
    pub fn new(date: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            location: location.into(),
        }
    }
}

/// Raw extractor output for one play.
///
/// Nothing is guaranteed: a field is `Some` only if the page happened to expose
/// it. A `Some("")` is legal here and is treated exactly like `None` downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    pub summary: Option<String>,
    pub crew: Option<Crew>,
    pub duration: Option<String>,
    pub act_count: Option<String>,
    pub dates_and_locations: Option<Vec<Showtime>>,
    pub venue: Option<String>,
    /// Source tag as written by the extractor; the orchestrator's known source wins.
    pub source: Option<String>,
    pub scraped_at: Option<String>,
}

impl PartialRecord {
    /// `true` if at least one showtime was scraped.
    pub fn has_showtimes(&self) -> bool {
        self.dates_and_locations
            .as_ref()
            .is_some_and(|dates| !dates.is_empty())
    }

    /// Copy every field that is missing or empty here from `card`, except `title`.
    ///
    /// Listing cards carry a few fields (image, venue, category) that detail
    /// pages sometimes lack. The detail page stays authoritative for the title.
    pub fn backfill_from(&mut self, card: &PartialRecord) {
        fill_str(&mut self.category, &card.category);
        fill_str(&mut self.image_url, &card.image_url);
        fill_str(&mut self.detail_url, &card.detail_url);
        fill_str(&mut self.summary, &card.summary);
        fill_str(&mut self.duration, &card.duration);
        fill_str(&mut self.act_count, &card.act_count);
        fill_str(&mut self.venue, &card.venue);
        fill_str(&mut self.source, &card.source);
        fill_str(&mut self.scraped_at, &card.scraped_at);

        if self.crew.as_ref().is_none_or(|crew| crew.is_empty()) {
            if let Some(crew) = card.crew.as_ref().filter(|crew| !crew.is_empty()) {
                self.crew = Some(crew.clone());
            }
        }
        if !self.has_showtimes() && card.has_showtimes() {
            self.dates_and_locations = card.dates_and_locations.clone();
        }
    }
}

fn fill_str(slot: &mut Option<String>, fallback: &Option<String>) {
    if slot.as_deref().is_none_or(str::is_empty) {
        if let Some(value) = fallback.as_deref().filter(|v| !v.is_empty()) {
            *slot = Some(value.to_string());
        }
    }
}

/// A canonical play record.
///
/// Produced once by [`crate::pipeline::normalize`], possibly amended by the
/// merger, then read-only. Every `Some` field holds a non-empty value, so
/// serialization never emits empty strings, maps or arrays.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    /// 12 hex characters derived from the merge key and the source tag.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<Crew>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_count: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dates_and_locations: Vec<Showtime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub source: Source,
    pub scraped_at: String,
}

impl Event {
    /// Lowercased, trimmed title; `None` when the event has no usable title.
    pub fn merge_key(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(|title| title.trim().to_lowercase())
            .filter(|key| !key.is_empty())
    }

    pub fn has_showtimes(&self) -> bool {
        !self.dates_and_locations.is_empty()
    }
}

impl From<Event> for PartialRecord {
    fn from(event: Event) -> Self {
        PartialRecord {
            title: event.title,
            category: event.category,
            image_url: event.image_url,
            detail_url: event.detail_url,
            summary: event.summary,
            crew: event.crew,
            duration: event.duration,
            act_count: event.act_count,
            dates_and_locations: Some(event.dates_and_locations),
            venue: event.venue,
            source: Some(event.source.as_str().to_string()),
            scraped_at: Some(event.scraped_at),
        }
    }
}

/// Summary counts over the final catalog, written to `stats.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatsReport {
    pub total_plays: usize,
    pub plays_with_showtimes: usize,
    pub plays_without_showtimes: usize,
    /// Category label to count, in order of first appearance.
    pub categories: IndexMap<String, usize>,
    /// Source tag to count, in order of first appearance.
    pub sources: IndexMap<String, usize>,
    /// Local ISO-8601 timestamp of when the report was generated.
    pub last_updated: String,
}
