//! Per-source acceptance rules applied to extractor output before normalization.

use crate::models::{PartialRecord, Source};

/// Acceptance rules for one source.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPolicy {
    /// Reject records without a venue.
    pub require_venue: bool,
    /// Lowercase terms that mark a listing as something other than a play.
    pub blocklist: &'static [&'static str],
}

/// Non-theater event types that show up on Biletinial's theater listing.
const BILETINIAL_BLOCKLIST: &[&str] = &[
    "konser",
    "concert",
    "stand-up",
    "standup",
    "atölye",
    "workshop",
    "festival",
    "çocuk",
    "children",
];

impl ValidationPolicy {
    pub fn for_source(source: Source) -> Self {
        match source {
            // The municipal theater lists only its own plays and prints the
            // stage per showtime, so there is no venue field to require.
            Source::SehirTiyatrolari => ValidationPolicy {
                require_venue: false,
                blocklist: &[],
            },
            Source::Biletinial => ValidationPolicy {
                require_venue: true,
                blocklist: BILETINIAL_BLOCKLIST,
            },
        }
    }

    /// Returns `true` if `record` should be kept.
    pub fn accepts(&self, record: &PartialRecord) -> bool {
        if !record.has_showtimes() {
            return false;
        }
        if is_blank(&record.title) {
            return false;
        }
        if self.require_venue && is_blank(&record.venue) {
            return false;
        }
        !self.is_blocklisted(record)
    }

    fn is_blocklisted(&self, record: &PartialRecord) -> bool {
        if self.blocklist.is_empty() {
            return false;
        }
        let haystack = format!(
            "{} {}",
            record.title.as_deref().unwrap_or_default(),
            record.category.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        self.blocklist.iter().any(|term| haystack.contains(term))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Decide whether a scraped record from `source` belongs in the catalog.
pub fn validate(record: &PartialRecord, source: Source) -> bool {
    ValidationPolicy::for_source(source).accepts(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Showtime;

    fn record(title: &str, category: &str, venue: Option<&str>) -> PartialRecord {
        PartialRecord {
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            venue: venue.map(str::to_string),
            dates_and_locations: Some(vec![Showtime::new("12 Mayıs 20:30", "Ana Sahne")]),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_records_without_showtimes() {
        let mut hamlet = record("Hamlet", "Dram", Some("Kadıköy Haldun Taner"));
        hamlet.dates_and_locations = Some(vec![]);
        assert!(!validate(&hamlet, Source::Biletinial));
        hamlet.dates_and_locations = None;
        assert!(!validate(&hamlet, Source::SehirTiyatrolari));
    }

    #[test]
    fn test_rejects_missing_title() {
        let mut play = record("", "Dram", Some("Sahne"));
        assert!(!validate(&play, Source::SehirTiyatrolari));
        play.title = None;
        assert!(!validate(&play, Source::Biletinial));
    }

    #[test]
    fn test_venue_required_only_for_biletinial() {
        let play = record("Martı", "Dram", None);
        assert!(validate(&play, Source::SehirTiyatrolari));
        assert!(!validate(&play, Source::Biletinial));

        let play = record("Martı", "Dram", Some(""));
        assert!(!validate(&play, Source::Biletinial));
    }

    #[test]
    fn test_blocklist_matches_title_or_category_case_insensitively() {
        let venue = Some("Zorlu PSM");
        assert!(!validate(&record("Yaz KONSERİ", "Müzik", venue), Source::Biletinial));
        assert!(!validate(&record("Cem Yılmaz", "Stand-Up", venue), Source::Biletinial));
        assert!(!validate(&record("Oyun Atölyesi", "Eğitim", venue), Source::Biletinial));
        assert!(!validate(&record("Pinokyo", "Çocuk", venue), Source::Biletinial));
        assert!(validate(&record("Cimri", "Komedi", venue), Source::Biletinial));
    }

    #[test]
    fn test_source_without_blocklist_passes_that_rule() {
        let play = record("Festival Gecesi", "Konser", None);
        assert!(validate(&play, Source::SehirTiyatrolari));
    }
}
