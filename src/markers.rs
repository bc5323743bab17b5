//! Marker construction for the library map.
//!
//! [`make_markers`] is a pure function from one library's joined data to a
//! pair of marker descriptors; [`build_markers`] joins the two scraped
//! mappings by library name and runs it for every branch. Rendering the
//! descriptors onto a map is the caller's responsibility.

use crate::models::{BookMap, CircleMarker, Coordinates, LabelMarker, LibraryMap};
use crate::popularity;
use crate::utils::slugify_library;
use std::fmt::Write;
use tracing::info;

/// Base URL of the library system's per-branch pages.
pub const LIBRARY_BASE_URL: &str = "https://www.queenslibrary.org/about-us/locations";

const CIRCLE_RADIUS: u32 = 5;
const CIRCLE_WEIGHT: u32 = 20;
const ICON_SIZE: (u32, u32) = (20, 20);
const ICON_ANCHOR: (u32, u32) = (10, 20);
const POPUP_WIDTH: u32 = 210;

/// Separator between a book's title and its subtitle.
const SUBTITLE_SEPARATOR: &str = " \u{2013} ";

/// URL of a library's page on the library system's website.
pub fn library_url(library: &str) -> String {
    format!("{LIBRARY_BASE_URL}/{}", slugify_library(library))
}

/// Create the marker pair for one library.
///
/// # Arguments
///
/// * `library` - The library name
/// * `book` - Its most popular book, optionally `"Title – Subtitle"`
/// * `book_count` - Number of libraries where this book is the most
///   popular, including this one
/// * `coords` - The library's coordinates
/// * `colour` - Marker colour
pub fn make_markers(
    library: &str,
    book: &str,
    book_count: usize,
    coords: &Coordinates,
    colour: &str,
) -> (CircleMarker, LabelMarker) {
    let circle = CircleMarker {
        coords: coords.clone(),
        radius: CIRCLE_RADIUS,
        weight: CIRCLE_WEIGHT,
        colour: colour.to_string(),
    };

    let badge_html = format!(
        "<div style='display: flex; justify-content: center; align-items: center; font-size: 20pt'>{book_count}</div>"
    );
    let tooltip_html = format!("<b>{library}</b><br>{book}");

    let mut popup_html = format!(
        "<h3><a href='{}' target='_blank'>{library}</a></h3>",
        library_url(library)
    );
    match book.split_once(SUBTITLE_SEPARATOR) {
        Some((title, subtitle)) => {
            write!(popup_html, "<h4>{title}</h4><h5>{subtitle}</h5>").unwrap()
        }
        None => write!(popup_html, "<h4>{book}</h4>").unwrap(),
    }
    write!(popup_html, "Most popular book at {book_count} libraries").unwrap();

    let label = LabelMarker {
        coords: coords.clone(),
        badge_html,
        icon_size: ICON_SIZE,
        icon_anchor: ICON_ANCHOR,
        tooltip_html,
        popup_html,
        popup_width: POPUP_WIDTH,
    };

    (circle, label)
}

/// Join books and locations by library name and build every marker pair.
///
/// Libraries absent from the book mapping are skipped; the join is by exact
/// name equality across the two scraped sources.
pub fn build_markers(books: &BookMap, libraries: &LibraryMap) -> Vec<(CircleMarker, LabelMarker)> {
    let by_book = popularity::locations_by_book(books);
    let colours = popularity::book_colours(&by_book);

    let mut markers = Vec::new();
    for (library, location) in libraries {
        let Some(book) = books.get(library) else {
            continue;
        };
        let book_count = by_book[book.as_str()].len();
        let colour = &colours[book.as_str()];
        markers.push(make_markers(library, book, book_count, location.coords(), colour));
    }

    info!(count = markers.len(), "Built library markers");
    markers
}
