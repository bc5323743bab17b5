//! Address geocoding via the OpenStreetMap Nominatim service.
//!
//! This module turns a free-text street address into latitude/longitude.
//! It uses a trait-based design so the retry logic can be exercised without
//! the network:
//! - [`Lookup`]: core trait defining an async address search
//! - [`NominatimClient`]: [`Lookup`] implementation backed by the public
//!   Nominatim search endpoint
//! - [`geocode`]: query normalization, the single settlement fallback, and
//!   first-result extraction, generic over any [`Lookup`]
//!
//! # Fallback Strategy
//!
//! Wikipedia addresses sometimes name a neighbourhood Nominatim does not
//! know. If the first query returns no results and a fallback settlement was
//! supplied, the second-to-last comma-separated segment of the address is
//! replaced with the settlement and the search is retried exactly once.
//! There is no caching and no further retrying: every address costs one or
//! two outbound queries.

use crate::models::{Coordinates, Place};
use std::error::Error;
use std::fmt;
use tracing::{debug, instrument, warn};
use url::Url;

/// Query endpoint of the public Nominatim instance.
pub const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Error returned when an address yields no results even after the
/// settlement fallback.
#[derive(Debug)]
pub struct AddressNotFound(pub String);

impl fmt::Display for AddressNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "address not found: {}", self.0)
    }
}

impl Error for AddressNotFound {}

/// Trait for async address lookups.
///
/// Implementors take an already-normalized query string and return the raw
/// list of matching places. This abstraction lets the fallback logic be
/// unit-tested against a stub.
pub trait Lookup {
    /// Search for places matching `query`.
    async fn search(&self, query: &str) -> Result<Vec<Place>, Box<dyn Error>>;
}

/// [`Lookup`] implementation backed by the Nominatim search endpoint.
#[derive(Debug, Default)]
pub struct NominatimClient;

impl Lookup for NominatimClient {
    #[instrument(level = "debug", skip_all, fields(%query))]
    async fn search(&self, query: &str) -> Result<Vec<Place>, Box<dyn Error>> {
        let url = Url::parse(&format!("{SEARCH_URL}?q={query}&format=json"))?;
        let places = reqwest::get(url).await?.json::<Vec<Place>>().await?;
        debug!(count = places.len(), "Geocoding query returned");
        Ok(places)
    }
}

/// Normalize an address into a query string.
///
/// Truncates the address at the first `'.'`, then substitutes newlines with
/// `",+"` and spaces with `'+'`.
pub fn build_query(address: &str) -> String {
    let head = match address.split_once('.') {
        Some((head, _)) => head,
        None => address,
    };
    head.replace('\n', ",+").replace(' ', "+")
}

/// Build the fallback query with the second-to-last comma-separated segment
/// of `address` replaced by `settlement`.
///
/// Returns `None` when the address has fewer than two comma-separated
/// segments, in which case there is nothing to substitute.
pub fn fallback_query(address: &str, settlement: &str) -> Option<String> {
    let mut segments: Vec<&str> = address.split(", ").collect();
    if segments.len() < 2 {
        return None;
    }
    let index = segments.len() - 2;
    segments[index] = settlement;
    Some(segments.join(", ").replace(' ', "+"))
}

/// Geocode a free-text address, retrying once with the fallback settlement.
///
/// # Arguments
///
/// * `lookup` - The address search backend
/// * `address` - The free-text street address
/// * `fallback_settlement` - Settlement substituted into the address when
///   the first query returns no results
///
/// # Returns
///
/// The first result's latitude/longitude as strings, unchanged from the
/// service response, or [`AddressNotFound`] if both attempts come back
/// empty.
#[instrument(level = "info", skip(lookup))]
pub async fn geocode<L: Lookup>(
    lookup: &L,
    address: &str,
    fallback_settlement: Option<&str>,
) -> Result<Coordinates, Box<dyn Error>> {
    let mut places = lookup.search(&build_query(address)).await?;

    if places.is_empty() {
        if let Some(settlement) = fallback_settlement {
            if let Some(query) = fallback_query(address, settlement) {
                warn!(%address, settlement, "No results; retrying with fallback settlement");
                places = lookup.search(&query).await?;
            }
        }
    }

    match places.into_iter().next() {
        Some(place) => Ok(Coordinates(place.lat, place.lon)),
        None => Err(Box::new(AddressNotFound(address.to_string()))),
    }
}
