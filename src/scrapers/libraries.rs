//! Branch-location scraper for the Wikipedia list of library branches.
//!
//! This module scrapes the Wikipedia table of Queens Public Library
//! branches, keeping the branch name and the first line of its multi-line
//! street-address cell, then geocodes every address sequentially.
//!
//! # Table Layout
//!
//! Column positions are assumed fixed and kept as named constants. A layout
//! change on Wikipedia breaks parsing with a [`StructureMismatch`] rather
//! than silently producing wrong data.

use crate::geocode::{self, Lookup};
use crate::models::{LibraryLocation, LibraryMap};
use crate::scrapers::StructureMismatch;
use futures::stream::{self, StreamExt, TryStreamExt};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{debug, info, instrument};

/// Wikipedia page listing every branch of the library system.
pub const LOCATIONS_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_Queens_Public_Library_branches";

/// Settlement substituted into an address that fails to geocode as written.
pub const FALLBACK_SETTLEMENT: &str = "Queens";

/// Table column holding the branch name.
const NAME_COLUMN: usize = 1;
/// Table column holding the multi-line street address.
const ADDRESS_COLUMN: usize = 3;

/// Wikipedia's address for one branch omits the street ordinal; fix such
/// quirks before geocoding. The unfixed address is what gets recorded.
const ADDRESS_FIXES: [(&str, &str); 1] = [("14 Road", "14th Road")];

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.wikitable").unwrap());
static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// Download the branch table and geocode every branch.
///
/// # Returns
///
/// A mapping of library name to street address and coordinates, or an error
/// if the fetch fails, the table structure changed, or any address cannot
/// be geocoded.
#[instrument(level = "info", skip(lookup))]
pub async fn fetch_locations<L: Lookup>(lookup: &L) -> Result<LibraryMap, Box<dyn Error>> {
    let html = reqwest::get(LOCATIONS_URL).await?.text().await?;
    let addresses = parse_locations(&html)?;
    info!(
        count = addresses.len(),
        source = LOCATIONS_URL,
        "Scraped branch street addresses"
    );
    geocode_locations(lookup, addresses).await
}

/// Extract the library → street address mapping from the table HTML.
///
/// Skips the header row. Per row, takes the branch name from
/// [`NAME_COLUMN`] and only the first text line of the address cell at
/// [`ADDRESS_COLUMN`].
pub fn parse_locations(html: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    let document = Html::parse_document(html);

    let table = document
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| StructureMismatch::new("missing branch table (table.wikitable)"))?;

    let mut libraries = BTreeMap::new();
    for row in table.select(&ROW_SELECTOR).skip(1) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();

        let name_cell = cells
            .get(NAME_COLUMN)
            .ok_or_else(|| StructureMismatch::new("branch row without a name cell"))?;
        let address_cell = cells
            .get(ADDRESS_COLUMN)
            .ok_or_else(|| StructureMismatch::new("branch row without an address cell"))?;

        let library = name_cell.text().collect::<String>().trim().to_string();
        let address = first_line(address_cell)
            .ok_or_else(|| StructureMismatch::new(format!("empty address cell for {library}")))?;

        libraries.insert(library, address);
    }

    Ok(libraries)
}

/// Geocode every address sequentially, one or two queries each.
///
/// Coordinates are recorded against the scraped (unfixed) address; a single
/// geocoding miss aborts the whole batch.
pub async fn geocode_locations<L: Lookup>(
    lookup: &L,
    addresses: BTreeMap<String, String>,
) -> Result<LibraryMap, Box<dyn Error>> {
    let libraries: LibraryMap = stream::iter(addresses)
        .then(|(library, address)| async move {
            let coords =
                geocode::geocode(lookup, &fix_address(&address), Some(FALLBACK_SETTLEMENT))
                    .await?;
            debug!(%library, %address, lat = %coords.lat(), lon = %coords.lon(), "Geocoded branch");
            Ok::<_, Box<dyn Error>>((library, LibraryLocation(address, coords)))
        })
        .try_collect()
        .await?;

    info!(count = libraries.len(), "Geocoded branch locations");
    Ok(libraries)
}

/// First non-empty text line of a table cell.
fn first_line(cell: &ElementRef) -> Option<String> {
    cell.text()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn fix_address(address: &str) -> String {
    let mut fixed = address.to_string();
    for (from, to) in ADDRESS_FIXES {
        fixed = fixed.replace(from, to);
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, Place};

    const TABLE: &str = "<html><body><table class=\"wikitable\">\
        <tr><th>#</th><th>Branch</th><th>Image</th><th>Address</th></tr>\
        <tr><td>1</td><td>Astoria</td><td></td><td>14-01 Astoria Boulevard<br>Astoria, NY 11102</td></tr>\
        <tr><td>2</td><td> Bayside </td><td></td><td>214-20 Northern Boulevard<br>Bayside, NY 11361</td></tr>\
        </table></body></html>";

    #[test]
    fn test_parse_locations_keeps_first_address_line() {
        let libraries = parse_locations(TABLE).unwrap();
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries["Astoria"], "14-01 Astoria Boulevard");
        assert_eq!(libraries["Bayside"], "214-20 Northern Boulevard");
    }

    #[test]
    fn test_parse_locations_missing_table_is_an_error() {
        let err = parse_locations("<html><body><p>no table</p></body></html>").unwrap_err();
        assert!(err.to_string().contains("wikitable"));
    }

    #[test]
    fn test_parse_locations_short_row_is_an_error() {
        let html = "<html><body><table class=\"wikitable\">\
            <tr><th>Branch</th></tr>\
            <tr><td>1</td><td>Astoria</td></tr>\
            </table></body></html>";
        let err = parse_locations(html).unwrap_err();
        assert!(err.to_string().contains("address cell"));
    }

    #[test]
    fn test_fix_address_applies_wikipedia_quirks() {
        assert_eq!(fix_address("14 Road and Cross Bay"), "14th Road and Cross Bay");
        assert_eq!(fix_address("90-27 196th Street"), "90-27 196th Street");
    }

    /// Lookup stub that resolves every query to a fixed position.
    struct FixedLookup;

    impl Lookup for FixedLookup {
        async fn search(&self, _query: &str) -> Result<Vec<Place>, Box<dyn Error>> {
            Ok(vec![Place {
                lat: "40.675".to_string(),
                lon: "-73.87".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_geocode_locations_records_unfixed_address() {
        let mut addresses = BTreeMap::new();
        addresses.insert("Broad Channel".to_string(), "14 Road at Noel Road".to_string());

        let libraries = geocode_locations(&FixedLookup, addresses).await.unwrap();

        let location = &libraries["Broad Channel"];
        assert_eq!(location.address(), "14 Road at Noel Road");
        assert_eq!(
            location.coords(),
            &Coordinates("40.675".into(), "-73.87".into())
        );
    }
}
