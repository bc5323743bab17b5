//! Command-line interface definitions.
//!
//! The pipeline runs in two stages so the slow, network-bound scrape can be
//! repeated independently of rendering:
//!
//! ```sh
//! # Scrape both sources and write the JSON data files
//! borough_books_map fetch
//!
//! # Render the map from the data files
//! borough_books_map render --boundaries "data/Borough Boundaries.geojson"
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape both sources, geocode every branch, and write the JSON data files
    Fetch {
        /// Directory for the JSON data files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Read the JSON data files and render the interactive map
    Render {
        /// Directory holding the JSON data files
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// GeoJSON file of borough boundaries
        #[arg(short, long, default_value = "data/Borough Boundaries.geojson")]
        boundaries: PathBuf,

        /// Path of the map HTML document
        #[arg(short, long, default_value = "books/index.html")]
        output: PathBuf,
    },
}
