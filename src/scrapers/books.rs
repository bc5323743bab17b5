//! Popular-books scraper for the Queens Public Library site.
//!
//! This module scrapes the library system's "most popular books" page, which
//! lists the most-borrowed title at each branch as pipe-delimited text
//! blocks (`Location | Book | …`) inside a fixed pair of nested containers.
//!
//! The container ids are CMS-generated and brittle; they are kept as named
//! constants so a markup change is a one-line fix.

use crate::models::BookMap;
use crate::scrapers::StructureMismatch;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use tracing::{info, instrument};

/// Page listing the most popular book at each branch.
pub const BOOKS_URL: &str = "http://connect.queenslibrary.org/12070";

/// Outer wrapper around the by-location listing.
const WRAPPER_ID: &str = "idmSge3";
/// Container whose child blocks are the pipe-delimited listings.
const BY_LOCATION_ID: &str = "mce_23";

static WRAPPER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&format!("#{WRAPPER_ID}")).unwrap());
static BY_LOCATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(&format!("#{BY_LOCATION_ID}")).unwrap());

/// Download and parse the list of popular books by library.
///
/// # Returns
///
/// A mapping of library name to book title, or an error if the fetch fails
/// or the page no longer matches the expected structure.
#[instrument(level = "info")]
pub async fn fetch_books() -> Result<BookMap, Box<dyn Error>> {
    let html = reqwest::get(BOOKS_URL).await?.text().await?;
    let books = parse_books(&html)?;
    info!(
        count = books.len(),
        source = BOOKS_URL,
        "Scraped popular books by location"
    );
    Ok(books)
}

/// Extract the library → book mapping from the page HTML.
///
/// Locates the by-location container, then splits each non-empty child text
/// block on `'|'` into library name and book title. Both fields are
/// trimmed; the title additionally has the page's no-break-space-plus-en-dash
/// sequence collapsed to a bare en dash.
///
/// # Errors
///
/// [`StructureMismatch`] if either container is absent or a block has no
/// `'|'` separator.
pub fn parse_books(html: &str) -> Result<BookMap, Box<dyn Error>> {
    let document = Html::parse_document(html);

    let wrapper = document
        .select(&WRAPPER_SELECTOR)
        .next()
        .ok_or_else(|| StructureMismatch::new(format!("missing #{WRAPPER_ID} wrapper")))?;
    let by_location = wrapper
        .select(&BY_LOCATION_SELECTOR)
        .next()
        .ok_or_else(|| {
            StructureMismatch::new(format!("missing #{BY_LOCATION_ID} by-location container"))
        })?;

    let mut books = BookMap::new();
    for node in by_location.children() {
        let text = match ElementRef::wrap(node) {
            Some(element) => element.text().collect::<String>(),
            None => node
                .value()
                .as_text()
                .map(|text| text.to_string())
                .unwrap_or_default(),
        };
        let block = text.trim();
        if block.is_empty() {
            continue;
        }

        let mut fields = block.split('|');
        let (Some(location), Some(book)) = (fields.next(), fields.next()) else {
            return Err(StructureMismatch::new(format!(
                "location block without a '|' separator: {block}"
            ))
            .into());
        };
        books.insert(location.trim().to_string(), normalize_title(book));
    }

    Ok(books)
}

/// Trim a title and collapse the page's no-break-space-plus-en-dash into a
/// bare en dash.
fn normalize_title(raw: &str) -> String {
    raw.trim().replace("\u{a0}\u{2013}", "\u{2013}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(blocks: &str) -> String {
        format!(
            "<html><body><div id=\"idmSge3\"><div id=\"mce_23\">{blocks}</div></div></body></html>"
        )
    }

    #[test]
    fn test_parse_books_extracts_trimmed_pairs() {
        let html = page(
            "<p> Astoria | Lessons in Chemistry | 14 </p>\
             <p>Bayside | Spare</p>",
        );

        let books = parse_books(&html).unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books["Astoria"], "Lessons in Chemistry");
        assert_eq!(books["Bayside"], "Spare");
    }

    #[test]
    fn test_parse_books_normalizes_dash_variant() {
        let html = page("<p>Flushing | Crying in H Mart \u{a0}\u{2013} A Memoir</p>");

        let books = parse_books(&html).unwrap();
        assert_eq!(books["Flushing"], "Crying in H Mart \u{2013} A Memoir");
    }

    #[test]
    fn test_parse_books_skips_empty_blocks() {
        let html = page("<p>  </p><p>Astoria | Spare</p><p></p>");

        let books = parse_books(&html).unwrap();
        assert_eq!(books.len(), 1);
    }

    #[test]
    fn test_parse_books_reads_bare_text_blocks() {
        let html = page("Corona | Beautiful Country\u{a0}\u{2013} A Memoir of an Undocumented Childhood");

        let books = parse_books(&html).unwrap();
        assert_eq!(
            books["Corona"],
            "Beautiful Country\u{2013} A Memoir of an Undocumented Childhood"
        );
    }

    #[test]
    fn test_parse_books_missing_wrapper_is_an_error() {
        let err = parse_books("<html><body><div id=\"other\"></div></body></html>").unwrap_err();
        assert!(err.to_string().contains("idmSge3"));
    }

    #[test]
    fn test_parse_books_missing_container_is_an_error() {
        let err =
            parse_books("<html><body><div id=\"idmSge3\"></div></body></html>").unwrap_err();
        assert!(err.to_string().contains("mce_23"));
    }

    #[test]
    fn test_parse_books_block_without_separator_is_an_error() {
        let html = page("<p>Astoria Lessons in Chemistry</p>");
        let err = parse_books(&html).unwrap_err();
        assert!(err.to_string().contains("separator"));
    }
}
