//! Biletinial theater listing scraper.
//!
//! [Biletinial](https://biletinial.com) is a ticketing marketplace. Its theater
//! listing is paginated by city (`/tr-tr/tiyatro?city=istanbul&page=N`) and
//! mixes plays with concerts, stand-up shows and workshops; those are filtered
//! out later by the validator.
//!
//! Listing cards carry image, venue and category. Detail pages are
//! authoritative, but card fields fill in whatever the detail page lacks. The
//! card never supplies the title.

use super::{
    DETAIL_DELAY, Extractor, Fetcher, LISTING_DELAY, ListingLink, MAX_ITEMS_PER_SOURCE,
    MAX_LISTING_PAGES, absolutize, card_href, first_match, first_text, image_src,
    select_cascade, selector,
};
use crate::models::{PartialRecord, Showtime, Source};
use crate::utils::{now_iso, truncate_chars};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::error::Error;
use tracing::{info, instrument, warn};
use url::Url;

const BASE_URL: &str = "https://biletinial.com";
const THEATER_PATH: &str = "/tr-tr/tiyatro";

/// Longest summary kept from a detail page, in characters.
const SUMMARY_MAX_CHARS: usize = 500;
/// Category used when the detail page does not name a genre.
const FALLBACK_CATEGORY: &str = "Tiyatro";
/// Suffix appended to `og:title` on every play page.
const TITLE_SUFFIX: &str = " - Tiyatro";

const CARD_STRATEGIES: &[&str] = &[
    r#".event-card, .card, [class*="etkinlik"], [data-event]"#,
    r#"a[href*="/tiyatro/"], a[href*="/etkinlik/"]"#,
];
const CARD_IMAGE: &str = "img";
const CARD_VENUE: &str = r#".venue, .location, [class*="mekan"], [class*="venue"]"#;
const CARD_CATEGORY: &str = r#".category, .genre, [class*="tur"], [class*="kategori"]"#;

const OG_TITLE: &str = r#"meta[property="og:title"]"#;
const TITLE: &str = "h1";
const IMAGE: &str = r#".event-image img, .poster img, [class*="gorsel"] img"#;
const SUMMARY: &str = r#".description, .content, [class*="aciklama"]"#;
const GENRE: &str = r#".genre, .type, [class*="tur"]"#;
const DURATION: &str = r#"[class*="sure"], .duration"#;
const VENUE: &str = r#".venue-name, [class*="mekan"]"#;
const SESSION_CARDS: &str = r#".session, .showtime, [class*="seans"], [class*="tarih"]"#;
const SESSION_DATE: &str = r#".date, [class*="gun"], [class*="tarih"]"#;
const SESSION_TIME: &str = r#".time, [class*="saat"]"#;
const SESSION_VENUE: &str = r#".venue, [class*="mekan"], [class*="salon"]"#;

/// Extractor for Biletinial's theater section in one city.
#[derive(Debug, Clone)]
pub struct Biletinial {
    fetcher: Fetcher,
    base: Url,
    city: String,
}

impl Biletinial {
    pub fn new(fetcher: Fetcher, city: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            fetcher,
            base: Url::parse(BASE_URL)?,
            city: city.into(),
        })
    }

    fn listing_url(&self, page: usize) -> String {
        format!(
            "{BASE_URL}{THEATER_PATH}?city={}&page={page}",
            urlencoding::encode(&self.city)
        )
    }
}

impl Extractor for Biletinial {
    fn source(&self) -> Source {
        Source::Biletinial
    }

    #[instrument(level = "info", skip_all, fields(source = "biletinial", city = %self.city))]
    async fn list_source_links(&self) -> Result<Vec<ListingLink>, Box<dyn Error>> {
        let links = paginate(&self.base, move |page| {
            let url = self.listing_url(page);
            async move {
                info!(page, %url, "Fetching listing page");
                self.fetcher.fetch_html(&url, LISTING_DELAY).await
            }
        })
        .await?;
        info!(count = links.len(), "Indexed Biletinial events");
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
        let mut details = parse_detail(&html, &link.url, &self.base);
        details.backfill_from(&link.card);
        Ok(Some(details))
    }
}

/// Walk listing pages from 1 until a page is missing or empty, the page cap
/// is reached, or `MAX_ITEMS_PER_SOURCE` distinct links are collected.
///
/// Only a missing first page is an error.
async fn paginate<F, Fut>(base: &Url, mut fetch_page: F) -> Result<Vec<ListingLink>, Box<dyn Error>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut links: Vec<ListingLink> = Vec::new();

    for page in 1..=MAX_LISTING_PAGES {
        let Some(html) = fetch_page(page).await else {
            if page == 1 {
                return Err("first listing page unavailable".into());
            }
            warn!(page, "Listing page unavailable; stopping");
            break;
        };

        let cards = parse_listing(&html, base);
        if cards.is_empty() {
            warn!(page, "No events on listing page; stopping");
            break;
        }
        info!(page, count = cards.len(), "Found events on listing page");
        links.extend(cards.into_iter().filter(|card| seen.insert(card.url.clone())));

        if links.len() >= MAX_ITEMS_PER_SOURCE {
            links.truncate(MAX_ITEMS_PER_SOURCE);
            break;
        }
    }

    Ok(links)
}

/// Event cards from one listing page. Cards without a link are skipped.
pub fn parse_listing(html: &str, base: &Url) -> Vec<ListingLink> {
    let document = Html::parse_document(html);
    select_cascade(document.root_element(), CARD_STRATEGIES)
        .into_iter()
        .filter_map(|card| parse_card(card, base))
        .collect()
}

fn parse_card(card: ElementRef<'_>, base: &Url) -> Option<ListingLink> {
    let url = absolutize(base, card_href(card)?)?;
    Some(ListingLink {
        card: PartialRecord {
            detail_url: Some(url.clone()),
            image_url: image_src(card, CARD_IMAGE, base),
            venue: first_text(card, CARD_VENUE),
            category: first_text(card, CARD_CATEGORY),
            source: Some(Source::Biletinial.as_str().to_string()),
            ..Default::default()
        },
        url,
    })
}

/// Everything an event detail page exposes.
pub fn parse_detail(html: &str, url: &str, base: &Url) -> PartialRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = first_match(root, OG_TITLE)
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.replace(TITLE_SUFFIX, "").trim().to_string())
        .filter(|title| !title.is_empty())
        .or_else(|| first_text(root, TITLE))
        .unwrap_or_default();

    PartialRecord {
        title: Some(title),
        category: Some(first_text(root, GENRE).unwrap_or_else(|| FALLBACK_CATEGORY.to_string())),
        image_url: image_src(root, IMAGE, base),
        detail_url: Some(url.to_string()),
        summary: Some(
            first_text(root, SUMMARY)
                .map(|text| truncate_chars(&text, SUMMARY_MAX_CHARS))
                .unwrap_or_default(),
        ),
        crew: None,
        duration: first_text(root, DURATION),
        act_count: None,
        dates_and_locations: Some(parse_showtimes(root)),
        venue: first_text(root, VENUE),
        source: Some(Source::Biletinial.as_str().to_string()),
        scraped_at: Some(now_iso()),
    }
}

/// Session cards: date and time are printed separately and joined here.
fn parse_showtimes(root: ElementRef<'_>) -> Vec<Showtime> {
    let Some(cards) = selector(SESSION_CARDS) else {
        return Vec::new();
    };

    root.select(&cards)
        .filter_map(|card| {
            let date = first_text(card, SESSION_DATE).unwrap_or_default();
            let time = first_text(card, SESSION_TIME).unwrap_or_default();
            let when = format!("{date} {time}").trim().to_string();
            if when.is_empty() {
                return None;
            }
            let location = first_text(card, SESSION_VENUE).unwrap_or_default();
            Some(Showtime::new(when, location))
        })
        .unique()
        .collect()
}
