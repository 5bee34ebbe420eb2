//! Mapping of scraped records onto the canonical [`Event`] schema.

use crate::models::{DEFAULT_CATEGORY, Event, PartialRecord, Source};
use crate::utils::now_iso;

/// Length of the hex fingerprint used as [`Event::id`].
const ID_LEN: usize = 12;

/// Deterministic id for a play: MD5 of `lowercase(trim(title)) + "_" + source`,
/// truncated to 12 hex characters.
pub fn generate_id(title: &str, source: Source) -> String {
    let unique = format!("{}_{}", title.trim().to_lowercase(), source.as_str());
    let digest = format!("{:x}", md5::compute(unique.as_bytes()));
    digest[..ID_LEN].to_string()
}

/// Convert `record` scraped from `source` into an [`Event`].
///
/// Never fails. Empty strings, maps and sequences are dropped; a missing
/// category becomes [`DEFAULT_CATEGORY`] and a missing `scraped_at` becomes now.
pub fn normalize(record: PartialRecord, source: Source) -> Event {
    let title = present(record.title.map(|t| t.trim().to_string()));
    let id = generate_id(title.as_deref().unwrap_or_default(), source);

    Event {
        id,
        title,
        category: present(record.category).or_else(|| Some(DEFAULT_CATEGORY.to_string())),
        image_url: present(record.image_url),
        detail_url: present(record.detail_url),
        summary: present(record.summary),
        crew: record.crew.filter(|crew| !crew.is_empty()),
        duration: present(record.duration),
        act_count: present(record.act_count),
        dates_and_locations: record.dates_and_locations.unwrap_or_default(),
        venue: present(record.venue),
        source,
        scraped_at: present(record.scraped_at).unwrap_or_else(now_iso),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Crew, Showtime};

    fn full_record() -> PartialRecord {
        let mut crew = Crew::new();
        crew.insert("Yazan".to_string(), "Anton Çehov".to_string());
        crew.insert("Yöneten".to_string(), "Ayşe Kaya".to_string());
        PartialRecord {
            title: Some("  Martı ".to_string()),
            category: Some("Dram".to_string()),
            image_url: Some("https://example.com/marti.jpg".to_string()),
            detail_url: Some("https://example.com/oyun/marti".to_string()),
            summary: Some("Bir göl kıyısında geçen oyun.".to_string()),
            crew: Some(crew),
            duration: Some("02:30:00".to_string()),
            act_count: Some("2".to_string()),
            dates_and_locations: Some(vec![Showtime::new("12 Mayıs 20:30", "Harbiye")]),
            venue: None,
            source: None,
            scraped_at: Some("2025-05-06T08:00:00".to_string()),
        }
    }

    #[test]
    fn test_id_is_twelve_hex_chars_of_md5() {
        let id = generate_id("Hamlet", Source::Biletinial);
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        let expected = format!("{:x}", md5::compute(b"hamlet_biletinial"));
        assert_eq!(id, &expected[..12]);
    }

    #[test]
    fn test_id_depends_only_on_normalized_title_and_source() {
        assert_eq!(
            generate_id(" HAMLET ", Source::Biletinial),
            generate_id("hamlet", Source::Biletinial)
        );
        assert_ne!(
            generate_id("Hamlet", Source::Biletinial),
            generate_id("Hamlet", Source::SehirTiyatrolari)
        );
        assert_ne!(
            generate_id("Hamlet", Source::Biletinial),
            generate_id("Macbeth", Source::Biletinial)
        );
    }

    #[test]
    fn test_normalize_trims_title_and_keeps_fields() {
        let event = normalize(full_record(), Source::SehirTiyatrolari);
        assert_eq!(event.title.as_deref(), Some("Martı"));
        assert_eq!(event.id, generate_id("Martı", Source::SehirTiyatrolari));
        assert_eq!(event.category.as_deref(), Some("Dram"));
        assert_eq!(event.crew.as_ref().map(|c| c.len()), Some(2));
        assert_eq!(event.dates_and_locations.len(), 1);
        assert_eq!(event.source, Source::SehirTiyatrolari);
        assert_eq!(event.scraped_at, "2025-05-06T08:00:00");
    }

    #[test]
    fn test_normalize_applies_defaults_and_drops_empty_values() {
        let record = PartialRecord {
            title: Some("Cimri".to_string()),
            category: Some(String::new()),
            summary: Some(String::new()),
            image_url: Some(String::new()),
            crew: Some(Crew::new()),
            dates_and_locations: Some(vec![]),
            ..Default::default()
        };

        let event = normalize(record, Source::Biletinial);
        assert_eq!(event.category.as_deref(), Some(DEFAULT_CATEGORY));
        assert!(event.summary.is_none());
        assert!(event.image_url.is_none());
        assert!(event.crew.is_none());
        assert!(event.dates_and_locations.is_empty());
        assert!(!event.scraped_at.is_empty());

        let json = serde_json::to_value(&event).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["category", "id", "scraped_at", "source", "title"]);
    }

    #[test]
    fn test_normalize_uses_known_source_over_record_tag() {
        let mut record = full_record();
        record.source = Some("biletinial".to_string());
        let event = normalize(record, Source::SehirTiyatrolari);
        assert_eq!(event.source, Source::SehirTiyatrolari);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(full_record(), Source::Biletinial);
        let twice = normalize(PartialRecord::from(once.clone()), Source::Biletinial);
        assert_eq!(once, twice);

        let sparse = normalize(
            PartialRecord {
                title: Some("Yalnız".to_string()),
                ..Default::default()
            },
            Source::SehirTiyatrolari,
        );
        let again = normalize(PartialRecord::from(sparse.clone()), Source::SehirTiyatrolari);
        assert_eq!(sparse, again);
    }
}
