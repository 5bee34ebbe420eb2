//! İBB Şehir Tiyatroları scraper.
//!
//! This module scrapes the [Istanbul municipal theater](https://sehirtiyatrolari.ibb.istanbul).
//! All current plays are listed on a single `/oyunlar` page; each play has a
//! detail page under `/oyun/<slug>` with crew credits, running time, act count
//! and upcoming showtimes.
//!
//! # Duration
//!
//! Running times are printed as prose ("2 saat 15 dakika") or clock time
//! ("2:15"); both are normalized to `HH:MM:SS`.

use super::{
    DETAIL_DELAY, Extractor, Fetcher, LISTING_DELAY, ListingLink, MAX_ITEMS_PER_SOURCE, absolutize,
    card_href, element_text, first_match, first_text, image_src, select_cascade, selector,
};
use crate::models::{Crew, DEFAULT_CATEGORY, PartialRecord, Showtime, Source};
use crate::utils::{now_iso, upcase};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::error::Error;
use tracing::{info, instrument, warn};
use url::Url;

const BASE_URL: &str = "https://sehirtiyatrolari.ibb.istanbul";
const LISTING_PATH: &str = "/oyunlar";

const CARD_STRATEGIES: &[&str] = &[
    r#".play-card, .card, [class*="oyun"], [class*="play"]"#,
    r#"a[href*="/oyun/"]"#,
];
const CARD_TITLE: &str = ".title, .name, h3, h4";

const TITLE: &str = "h1, .play-title, .title";
const IMAGE: &str = r#".play-image img, .poster img, [class*="image"] img"#;
const SUMMARY: &str = r#".summary, .description, .content p, [class*="ozet"]"#;
const CATEGORY: &str = r#".category, .type, [class*="kategori"]"#;
const DURATION: &str = r#"[class*="sure"], [class*="duration"], .duration"#;
const ACT_COUNT: &str = r#"[class*="perde"], [class*="act"]"#;
const CREW_SECTION: &str = r#".crew, .cast, [class*="kadro"], [class*="ekip"]"#;
const CREW_ITEMS: &str = "li, p, div";
const SHOWTIME_CARDS: &str =
    r#".showtime, .session, .seans, [class*="gosterim"], [class*="tarih"]"#;
const SHOWTIME_DATE: &str = r#".date, [class*="tarih"]"#;
const SHOWTIME_LOCATION: &str =
    r#".venue, .location, .theater, [class*="sahne"], [class*="mekan"]"#;
const TICKET_BUTTONS: &str = r#"a[href*="bilet"], .ticket-btn, [class*="bilet"]"#;

/// Labels looked for when the page has no dedicated crew section.
const CREW_LABELS: &[&str] = &["Yazan", "Yöneten", "Çeviren", "Oyuncular"];

static HOURS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*saat").expect("valid regex"));
static MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*dakika").expect("valid regex"));
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("valid regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid regex"));
static TICKET_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}\s+\w+\s+\w+,?\s*\d{2}:\d{2})").expect("valid regex")
});
static CREW_LABEL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    CREW_LABELS
        .iter()
        .map(|label| Regex::new(&format!("(?i){}", regex::escape(label))).expect("valid regex"))
        .collect()
});

/// Extractor for İBB Şehir Tiyatroları.
#[derive(Debug, Clone)]
pub struct SehirTiyatrolari {
    fetcher: Fetcher,
    base: Url,
}

impl SehirTiyatrolari {
    pub fn new(fetcher: Fetcher) -> Result<Self, url::ParseError> {
        Ok(Self {
            fetcher,
            base: Url::parse(BASE_URL)?,
        })
    }
}

impl Extractor for SehirTiyatrolari {
    fn source(&self) -> Source {
        Source::SehirTiyatrolari
    }

    #[instrument(level = "info", skip_all, fields(source = "sehir_tiyatrolari"))]
    async fn list_source_links(&self) -> Result<Vec<ListingLink>, Box<dyn Error>> {
        let listing_url = self.base.join(LISTING_PATH)?;
        let Some(html) = self
            .fetcher
            .fetch_html(listing_url.as_str(), LISTING_DELAY)
            .await
        else {
            return Err(format!("listing page {listing_url} unavailable").into());
        };

        let links = parse_listing(&html, &self.base);
        info!(count = links.len(), url = %listing_url, "Indexed Şehir Tiyatroları plays");
        Ok(links)
    }

    #[instrument(level = "info", skip_all, fields(url = %link.url))]
    async fn fetch_detail(
        &self,
        link: &ListingLink,
    ) -> Result<Option<PartialRecord>, Box<dyn Error>> {
        let Some(html) = self.fetcher.fetch_html(&link.url, DETAIL_DELAY).await else {
            return Ok(None);
        };
        Ok(Some(parse_detail(&html, &link.url, &self.base)))
    }
}

/// Play links from the `/oyunlar` page, deduplicated and capped.
pub fn parse_listing(html: &str, base: &Url) -> Vec<ListingLink> {
    let document = Html::parse_document(html);
    let cards = select_cascade(document.root_element(), CARD_STRATEGIES);
    if cards.is_empty() {
        warn!("No play cards found on listing page");
    }

    cards
        .into_iter()
        .filter_map(|card| {
            let href = card_href(card)?;
            if !href.contains("/oyun/") {
                return None;
            }
            let url = absolutize(base, href)?;
            let title = first_text(card, CARD_TITLE).unwrap_or_else(|| title_from_slug(&url));
            Some(ListingLink {
                card: PartialRecord {
                    title: Some(title),
                    detail_url: Some(url.clone()),
                    ..Default::default()
                },
                url,
            })
        })
        .unique_by(|link| link.url.clone())
        .take(MAX_ITEMS_PER_SOURCE)
        .collect()
}

/// `https://…/oyun/kralin-yeni-giysileri` -> `"Kralin Yeni Giysileri"`.
fn title_from_slug(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .split('-')
        .filter(|word| !word.is_empty())
        .map(upcase)
        .join(" ")
}

/// Everything a play detail page exposes.
pub fn parse_detail(html: &str, url: &str, base: &Url) -> PartialRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let act_count = first_text(root, ACT_COUNT).map(|text| {
        NUMBER
            .captures(&text)
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| "1".to_string())
    });

    PartialRecord {
        title: Some(first_text(root, TITLE).unwrap_or_default()),
        category: Some(first_text(root, CATEGORY).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
        image_url: image_src(root, IMAGE, base),
        detail_url: Some(url.to_string()),
        summary: Some(first_text(root, SUMMARY).unwrap_or_default()),
        crew: Some(parse_crew(&document)),
        duration: first_text(root, DURATION).and_then(|text| parse_duration(&text)),
        act_count,
        dates_and_locations: Some(parse_showtimes(root)),
        venue: None,
        source: Some(Source::SehirTiyatrolari.as_str().to_string()),
        scraped_at: Some(now_iso()),
    }
}

/// Normalize a running time to `HH:MM:SS`.
///
/// Accepts "2 saat 15 dakika", "90 dakika" or clock notation like "2:15".
pub fn parse_duration(text: &str) -> Option<String> {
    let hours = captured_number(&HOURS, text);
    let minutes = captured_number(&MINUTES, text);
    if hours > 0 || minutes > 0 {
        return Some(format!("{hours:02}:{minutes:02}:00"));
    }

    let caps = CLOCK.captures(text)?;
    let h: u32 = caps[1].parse().ok()?;
    let m: u32 = caps[2].parse().ok()?;
    let s: u32 = caps.get(3).and_then(|s| s.as_str().parse().ok()).unwrap_or(0);
    Some(format!("{h:02}:{m:02}:{s:02}"))
}

fn captured_number(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// `role: name` pairs from the crew section, or from labelled lines anywhere
/// on the page when there is no crew section.
fn parse_crew(document: &Html) -> Crew {
    let mut crew = Crew::new();

    if let (Some(section), Some(items)) = (
        first_match(document.root_element(), CREW_SECTION),
        selector(CREW_ITEMS),
    ) {
        for item in section.select(&items) {
            if let Some((role, name)) = split_credit(&element_text(item)) {
                crew.insert(role, name);
            }
        }
    }
    if !crew.is_empty() {
        return crew;
    }

    for pattern in CREW_LABEL_PATTERNS.iter() {
        let labelled = document.tree.nodes().find(|node| {
            node.value()
                .as_text()
                .is_some_and(|text| pattern.is_match(text))
        });
        let Some(parent) = labelled.and_then(|node| node.parent()).and_then(ElementRef::wrap)
        else {
            continue;
        };
        if let Some((role, name)) = split_credit(&element_text(parent)) {
            crew.insert(role, name);
        }
    }
    crew
}

fn split_credit(text: &str) -> Option<(String, String)> {
    let (role, name) = text.split_once(':')?;
    let (role, name) = (role.trim(), name.trim());
    (!role.is_empty() && !name.is_empty()).then(|| (role.to_string(), name.to_string()))
}

/// Showtimes from session cards, falling back to dates printed next to
/// ticket buttons.
fn parse_showtimes(root: ElementRef<'_>) -> Vec<Showtime> {
    let mut showtimes = Vec::new();

    if let Some(cards) = selector(SHOWTIME_CARDS) {
        for card in root.select(&cards) {
            let Some(date) = first_text(card, SHOWTIME_DATE) else {
                continue;
            };
            let location = first_text(card, SHOWTIME_LOCATION).unwrap_or_default();
            showtimes.push(Showtime::new(date, location));
        }
    }

    if showtimes.is_empty() {
        if let Some(buttons) = selector(TICKET_BUTTONS) {
            for button in root.select(&buttons) {
                let Some(parent) = nearest_ancestor(button, "div")
                    .or_else(|| nearest_ancestor(button, "li"))
                else {
                    continue;
                };
                let text = element_text(parent);
                if let Some(found) = TICKET_DATE.find(&text) {
                    let date = found.as_str().to_string();
                    let location = text.replace(&date, "").trim().to_string();
                    showtimes.push(Showtime::new(date, location));
                }
            }
        }
    }

    showtimes.into_iter().unique().collect()
}

fn nearest_ancestor<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == name)
}
