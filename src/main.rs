//! # Borough Books Map
//!
//! A one-shot data-collection-and-visualization pipeline for the Queens
//! Public Library system. It scrapes the library's "most popular books by
//! location" page and the Wikipedia table of branch addresses, geocodes
//! every branch via OpenStreetMap's Nominatim service, and renders the
//! joined result as an interactive map: one colour-coded marker pair per
//! branch, on top of an overlay that dims everything outside the borough.
//!
//! ## Usage
//!
//! ```sh
//! borough_books_map fetch
//! borough_books_map render --boundaries "data/Borough Boundaries.geojson"
//! ```
//!
//! ## Architecture
//!
//! Two sequential stages communicating through flat JSON files:
//! 1. **Fetch**: scrape both sources, geocode each address (one fallback
//!    retry per address, no other recovery), write `books.json` and
//!    `libraries.json`
//! 2. **Render**: load the data files and the borough boundaries, compute
//!    the outside-the-borough overlay, rank books by popularity, build the
//!    markers, and write a self-contained Leaflet HTML page

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod geocode;
mod geometry;
mod markers;
mod models;
mod outputs;
mod popularity;
mod scrapers;
mod utils;

use cli::{Cli, Command};
use geocode::NominatimClient;
use models::{BookMap, LibraryMap};
use outputs::map::{MapPage, OVERLAY_FILL};

/// Borough whose libraries are mapped.
const BOROUGH: &str = "Queens";
/// Map centre, roughly the middle of the borough.
const MAP_CENTRE: (f64, f64) = (40.675, -73.8729094);
const MAP_ZOOM: u8 = 11;

const BOOKS_FILE: &str = "books.json";
const LIBRARIES_FILE: &str = "libraries.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Fetch { data_dir } => run_fetch(&data_dir).await,
        Command::Render {
            data_dir,
            boundaries,
            output,
        } => run_render(&data_dir, &boundaries, &output).await,
    }
}

/// Scrape both sources and write the JSON data files.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir.display()))]
async fn run_fetch(data_dir: &Path) -> Result<(), Box<dyn Error>> {
    let books = scrapers::books::fetch_books().await?;
    outputs::json::dump(&data_dir.join(BOOKS_FILE), &books).await?;

    let lookup = NominatimClient;
    let libraries = scrapers::libraries::fetch_locations(&lookup).await?;
    outputs::json::dump(&data_dir.join(LIBRARIES_FILE), &libraries).await?;

    info!(
        books = books.len(),
        libraries = libraries.len(),
        "Data files written"
    );
    Ok(())
}

/// Load the data files and render the map document.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
async fn run_render(
    data_dir: &Path,
    boundaries: &Path,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let books: BookMap = outputs::json::load(&data_dir.join(BOOKS_FILE)).await?;
    let libraries: LibraryMap = outputs::json::load(&data_dir.join(LIBRARIES_FILE)).await?;
    info!(
        books = books.len(),
        libraries = libraries.len(),
        "Loaded data files"
    );

    let borough = geometry::load_borough_features(boundaries, BOROUGH)?;
    let overlay = geometry::merge_geometry(&borough)?;

    let mut page = MapPage::new(MAP_CENTRE, MAP_ZOOM);
    page.add_overlay(overlay, OVERLAY_FILL);

    for (circle, label) in markers::build_markers(&books, &libraries) {
        page.add_markers(circle, label);
    }

    page.write(output).await?;
    Ok(())
}
