//! Per-page extraction of films and watchlist slugs
//!
//! Listing pages carry a poster grid of `li.poster-container` items. Each
//! item wraps a `div.film-poster` with a `data-film-slug` attribute and an
//! optional `data-film-release-year`; the film name comes from the poster
//! image's `alt` text. Watched-films pages additionally carry per-film
//! viewing data: a `span.rating` whose `rated-{n}` class encodes the 0-10
//! half-star rating, and a `span.like` marker when the film was liked.
//!
//! Pagination markers are `.paginate-page` elements holding page numbers;
//! the highest number present is the page count.

use crate::listing::{Film, FilmMap, Listing, ResourceKind, SlugSet};
use crate::FetchError;
use scraper::{ElementRef, Html, Selector};

/// A parsed listing page
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parses an HTML body into a page document
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    /// Determines the total page count from pagination markers.
    ///
    /// Returns the highest page number found, or 1 when the listing has no
    /// pagination markers (a single-page listing).
    pub fn page_count(&self) -> u32 {
        let mut highest = 1;
        if let Ok(selector) = Selector::parse(".paginate-page") {
            for element in self.html.select(&selector) {
                let text = element.text().collect::<String>();
                if let Ok(page) = text.trim().parse::<u32>() {
                    highest = highest.max(page);
                }
            }
        }
        highest
    }
}

/// Strategy for decoding one page of a listing
pub trait PageExtractor: Send + Sync {
    /// The resource kind this extractor decodes
    fn kind(&self) -> ResourceKind;

    /// Decodes one page's document into a partial listing
    fn extract(&self, doc: &PageDocument) -> Result<Listing, FetchError>;
}

/// Returns the extractor for a resource kind
pub fn extractor_for(kind: ResourceKind) -> &'static dyn PageExtractor {
    match kind {
        ResourceKind::Films => &FilmsExtractor,
        ResourceKind::Watchlist => &WatchlistExtractor,
    }
}

/// Extracts slug → attributes from a watched-films page
pub struct FilmsExtractor;

impl PageExtractor for FilmsExtractor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Films
    }

    fn extract(&self, doc: &PageDocument) -> Result<Listing, FetchError> {
        let mut films = FilmMap::new();
        if let Ok(container) = Selector::parse("li.poster-container") {
            for item in doc.html.select(&container) {
                if let Some((slug, film)) = extract_film(item) {
                    films.insert(slug, film);
                }
            }
        }
        Ok(Listing::Films(films))
    }
}

/// Extracts the slug set from a watchlist page
pub struct WatchlistExtractor;

impl PageExtractor for WatchlistExtractor {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Watchlist
    }

    fn extract(&self, doc: &PageDocument) -> Result<Listing, FetchError> {
        let mut slugs = SlugSet::new();
        if let Ok(container) = Selector::parse("li.poster-container") {
            for item in doc.html.select(&container) {
                if let Some(slug) = extract_slug(item) {
                    slugs.insert(slug);
                }
            }
        }
        Ok(Listing::Watchlist(slugs))
    }
}

/// Pulls the film slug out of one poster container, if present
fn extract_slug(item: ElementRef) -> Option<String> {
    let poster = Selector::parse("div.film-poster").ok()?;
    let element = item.select(&poster).next()?;
    element
        .value()
        .attr("data-film-slug")
        .map(|slug| slug.trim_matches('/').to_string())
        .filter(|slug| !slug.is_empty())
}

/// Decodes one poster container into (slug, attributes)
fn extract_film(item: ElementRef) -> Option<(String, Film)> {
    let slug = extract_slug(item)?;

    let poster = Selector::parse("div.film-poster").ok()?;
    let element = item.select(&poster).next()?;

    let year = element
        .value()
        .attr("data-film-release-year")
        .and_then(|y| y.trim().parse::<u16>().ok());

    // The poster image's alt text carries the display name
    let name = Selector::parse("img")
        .ok()
        .and_then(|sel| item.select(&sel).next())
        .and_then(|img| img.value().attr("alt"))
        .map(|alt| alt.trim().to_string())
        .filter(|alt| !alt.is_empty())
        .unwrap_or_else(|| slug.clone());

    let rating = Selector::parse("span.rating")
        .ok()
        .and_then(|sel| item.select(&sel).next())
        .and_then(|span| {
            span.value()
                .classes()
                .find_map(|class| class.strip_prefix("rated-"))
                .and_then(|n| n.parse::<u8>().ok())
        });

    let liked = Selector::parse("span.like")
        .ok()
        .map(|sel| item.select(&sel).next().is_some())
        .unwrap_or(false);

    Some((
        slug,
        Film {
            name,
            year,
            rating,
            liked,
        },
    ))
}
