//! Data models for scraped library data and map markers.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`BookMap`] / [`LibraryMap`]: the two scraped mappings keyed by library name
//! - [`LibraryLocation`] / [`Coordinates`]: a branch's address and geocoded position
//! - [`Place`]: one result from the geocoding service
//! - [`CircleMarker`] / [`LabelMarker`]: pure marker descriptors consumed by the
//!   map document builder
//!
//! The location types serialize as arrays (`[address, [lat, lon]]`) to match the
//! shape of the JSON data files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping of library name to its currently most popular book title.
///
/// A `BTreeMap` keeps serialization order deterministic. Titles may carry an
/// en-dash-separated subtitle (`"Title – Subtitle"`).
pub type BookMap = BTreeMap<String, String>;

/// Mapping of library name to its street address and geocoded coordinates.
pub type LibraryMap = BTreeMap<String, LibraryLocation>;

/// A branch's street address plus coordinates, stored as `[address, [lat, lon]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryLocation(pub String, pub Coordinates);

impl LibraryLocation {
    /// The first line of the branch's street address.
    pub fn address(&self) -> &str {
        &self.0
    }

    pub fn coords(&self) -> &Coordinates {
        &self.1
    }
}

/// Latitude and longitude as decimal-degree strings, verbatim from the
/// geocoding service, stored as `[lat, lon]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub String, pub String);

impl Coordinates {
    pub fn lat(&self) -> &str {
        &self.0
    }

    pub fn lon(&self) -> &str {
        &self.1
    }
}

/// A single search result from the geocoding service.
///
/// The service returns more fields (display name, bounding box, OSM ids);
/// only the coordinates are consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
}

/// A small fixed-radius circle drawn at a branch's coordinates, coloured by
/// the popularity of its most popular book.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleMarker {
    pub coords: Coordinates,
    pub radius: u32,
    pub weight: u32,
    pub colour: String,
}

/// A label marker at the same coordinates carrying the popularity badge,
/// a tooltip, and a rich popup.
///
/// All `*_html` fields hold ready-to-embed HTML fragments; the map document
/// builder JSON-escapes them when emitting the page.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMarker {
    pub coords: Coordinates,
    /// Numeric popularity badge rendered inside the marker icon.
    pub badge_html: String,
    pub icon_size: (u32, u32),
    pub icon_anchor: (u32, u32),
    pub tooltip_html: String,
    pub popup_html: String,
    /// Fixed popup width (used as both minimum and maximum).
    pub popup_width: u32,
}
