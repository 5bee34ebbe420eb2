//! Theater listing scrapers for the supported upstream sites.
//!
//! Each scraper follows the same two-phase pattern:
//!
//! 1. **Listing**: Discover play detail URLs from the site's listing page(s)
//! 2. **Detail**: Download one detail page and parse it into a [`PartialRecord`]
//!
//! # Supported Sources
//!
//! | Source | Module | Listing | Notes |
//! |--------|--------|---------|-------|
//! | İBB Şehir Tiyatroları | [`sehir_tiyatrolari`] | single `/oyunlar` page | Crew, duration and act count on detail pages |
//! | Biletinial | [`biletinial`] | paginated `/tr-tr/tiyatro` | Listing cards back-fill detail fields |
//!
//! # Fetching
//!
//! All requests go through [`Fetcher`]: one shared client with browser-like
//! headers and a fixed timeout. Requests are strictly sequential and every
//! fetch is followed by a fixed pause. There are no retries; a failed fetch is
//! logged and yields no data for that item.
//!
//! # Markup
//!
//! Site markup changes without notice, so every field is read through an
//! ordered list of selectors and the first one that matches wins. A missing
//! element simply leaves the field empty.

pub mod biletinial;
pub mod sehir_tiyatrolari;

use crate::models::{PartialRecord, Source};
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{ElementRef, Selector};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

/// Hard ceiling on listing pages walked per source.
pub const MAX_LISTING_PAGES: usize = 10;
/// Hard ceiling on detail pages fetched per source.
pub const MAX_ITEMS_PER_SOURCE: usize = 200;
/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Pause after every listing page fetch.
pub const LISTING_DELAY: Duration = Duration::from_secs(1);
/// Pause after every detail page fetch.
pub const DETAIL_DELAY: Duration = Duration::from_millis(500);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_TURKISH: &str = "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7";

/// A detail page discovered on a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingLink {
    /// Absolute URL of the detail page.
    pub url: String,
    /// Whatever the listing card exposed about the play.
    pub card: PartialRecord,
}

/// One upstream site.
///
/// The pipeline depends only on these operations, never on how markup is
/// queried. Implementations must be tolerant: a missing element is an absent
/// field, not an error.
pub trait Extractor {
    /// The site this extractor scrapes.
    fn source(&self) -> Source;

    /// Discover detail pages, deduplicated by URL and capped at
    /// [`MAX_ITEMS_PER_SOURCE`].
    ///
    /// An error here means the whole source is unavailable.
    async fn list_source_links(&self) -> Result<Vec<ListingLink>, Box<dyn Error>>;

    /// Fetch and parse one detail page. `Ok(None)` when the page could not be
    /// fetched.
    async fn fetch_detail(&self, link: &ListingLink)
    -> Result<Option<PartialRecord>, Box<dyn Error>>;
}

/// Shared HTTP client used by every scraper.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_TURKISH));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return its body, then wait `pause` before returning.
    ///
    /// Network errors, timeouts and non-2xx statuses are logged and become `None`.
    #[instrument(level = "debug", skip(self, pause), fields(%url))]
    pub async fn fetch_html(&self, url: &str, pause: Duration) -> Option<String> {
        let result = self.get_text(url).await;
        sleep(pause).await;
        match result {
            Ok(body) => {
                debug!(bytes = body.len(), "Fetched page");
                Some(body)
            }
            Err(e) => {
                warn!(%url, error = %e, "Fetch failed");
                None
            }
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

/// Parse a CSS selector, logging instead of failing on bad syntax.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(%css, error = %e, "Invalid selector");
            None
        }
    }
}

/// Elements matched by the first strategy that matches anything.
pub(crate) fn select_cascade<'a>(scope: ElementRef<'a>, strategies: &[&str]) -> Vec<ElementRef<'a>> {
    for css in strategies {
        let Some(sel) = selector(css) else { continue };
        let found: Vec<ElementRef<'a>> = scope.select(&sel).collect();
        if !found.is_empty() {
            debug!(%css, count = found.len(), "Selector strategy matched");
            return found;
        }
    }
    Vec::new()
}

/// First descendant of `scope` matching `css`.
pub(crate) fn first_match<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

/// Text of the first descendant matching `css`, if it has any.
pub(crate) fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    first_match(scope, css)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Whitespace-trimmed text nodes of `element`, joined by single spaces.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Absolute image URL from the first `img` matching `css`.
///
/// Lazy-loading sites put the real URL in `data-src` or `data-lazy`.
pub(crate) fn image_src(scope: ElementRef<'_>, css: &str, base: &Url) -> Option<String> {
    let img = first_match(scope, css)?;
    let value = img.value();
    let src = ["src", "data-src", "data-lazy"]
        .iter()
        .filter_map(|attr| value.attr(attr))
        .map(str::trim)
        .find(|src| !src.is_empty())?;
    absolutize(base, src)
}

/// `href` of `card` itself if it is a link, else of its first descendant link.
pub(crate) fn card_href<'a>(card: ElementRef<'a>) -> Option<&'a str> {
    if card.value().name() == "a" {
        if let Some(href) = card.value().attr("href") {
            return Some(href);
        }
    }
    first_match(card, "a[href]").and_then(|a| a.value().attr("href"))
}

/// Resolve `href` against `base`.
pub(crate) fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|url| url.to_string())
}
