//! Comparison of two users' listings
//!
//! Produces the candidate list: films the first user has watched that the
//! second has not, ordered by the first user's signals. The order is a
//! fixed tuple comparison (rating, liked, watchlisted, then slug for
//! determinism), not a scoring model.

mod render;

pub use render::{render_markdown, render_row, star_glyphs};

use crate::listing::{Film, FilmMap, SlugSet};

/// One film the first user has watched and the second has not
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub slug: String,
    pub film: Film,
    /// Whether the first user also has this film on their watchlist
    pub watchlisted: bool,
}

/// Computes the ranked candidate list.
///
/// # Arguments
///
/// * `watched` - The first user's watched films
/// * `seen_by_other` - The second user's watched films
/// * `watchlist` - The first user's watchlist slugs
pub fn candidates(watched: &FilmMap, seen_by_other: &FilmMap, watchlist: &SlugSet) -> Vec<Candidate> {
    let mut result: Vec<Candidate> = watched
        .iter()
        .filter(|(slug, _)| !seen_by_other.contains_key(*slug))
        .map(|(slug, film)| Candidate {
            slug: slug.clone(),
            film: film.clone(),
            watchlisted: watchlist.contains(slug),
        })
        .collect();

    result.sort_by(|a, b| {
        let key_a = (a.film.rating.unwrap_or(0), a.film.liked, a.watchlisted);
        let key_b = (b.film.rating.unwrap_or(0), b.film.liked, b.watchlisted);
        key_b.cmp(&key_a).then_with(|| a.slug.cmp(&b.slug))
    });
    result
}
