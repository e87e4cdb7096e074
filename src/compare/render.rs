//! Rendering of candidate rows
//!
//! Ratings on the 0-10 half-star scale render as five glyph positions:
//! `rating / 2` full stars, `rating % 2` half stars, `(10 - rating) / 2`
//! empty stars. An unrated film renders a blank column of the same width
//! so rows stay aligned.

use crate::compare::Candidate;
use url::Url;

const GLYPH_WIDTH: usize = 5;

/// Renders a rating as a fixed-width star string
pub fn star_glyphs(rating: Option<u8>) -> String {
    let rating = rating.unwrap_or(0).min(10);
    if rating == 0 {
        return " ".repeat(GLYPH_WIDTH);
    }

    let full = usize::from(rating / 2);
    let half = usize::from(rating % 2);
    let empty = usize::from((10 - rating) / 2);
    format!(
        "{}{}{}",
        "★".repeat(full),
        "½".repeat(half),
        "☆".repeat(empty)
    )
}

/// Canonical URL of a film page under the base URL
fn film_url(base: &Url, slug: &str) -> String {
    // The base URL is validated to end with a slash
    format!("{}film/{}/", base, slug)
}

/// Renders one candidate as a terminal row
pub fn render_row(candidate: &Candidate, base: &Url) -> String {
    let stars = star_glyphs(candidate.film.rating);
    let heart = if candidate.film.liked { "♥" } else { " " };
    let year = candidate
        .film
        .year
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    let flag = if candidate.watchlisted {
        "  [watchlisted]"
    } else {
        ""
    };

    format!(
        "{} {} {}{}{}  {}",
        stars,
        heart,
        candidate.film.name,
        year,
        flag,
        film_url(base, &candidate.slug)
    )
}

/// Renders the full candidate list as a markdown document
pub fn render_markdown(candidates: &[Candidate], base: &Url) -> String {
    let mut out = String::new();
    out.push_str("# Films to recommend\n\n");
    out.push_str(&format!("{} candidate film(s).\n\n", candidates.len()));

    for candidate in candidates {
        let stars = star_glyphs(candidate.film.rating);
        let rating_cell = if stars.trim().is_empty() {
            String::new()
        } else {
            format!("`{}` ", stars)
        };
        let heart = if candidate.film.liked { "♥ " } else { "" };
        let year = candidate
            .film
            .year
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        let flag = if candidate.watchlisted {
            " — watchlisted"
        } else {
            ""
        };

        out.push_str(&format!(
            "- {}{}[{}{}]({}){}\n",
            rating_cell,
            heart,
            candidate.film.name,
            year,
            film_url(base, &candidate.slug),
            flag
        ));
    }
    out
}
