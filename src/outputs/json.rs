//! JSON data file reading and writing.
//!
//! The pipeline's two stages communicate through flat JSON files
//! (`books.json` and `libraries.json`), written with 2-space indentation so
//! they stay reviewable in a diff.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `value` to `path` as indented JSON, creating parent
/// directories as needed.
#[instrument(level = "info", skip(value), fields(path = %path.display()))]
pub async fn dump<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).await?;
    info!("Wrote JSON data file");
    Ok(())
}

/// Read and deserialize a JSON data file.
#[instrument(level = "info", fields(path = %path.display()))]
pub async fn load<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}
