//! Borough boundary loading and the outside-the-borough overlay.
//!
//! The boundaries datafile is a GeoJSON FeatureCollection covering every
//! borough; [`load_borough_features`] filters it down to one borough.
//! [`merge_geometry`] then unions the borough's polygon parts (islands and
//! discontinuous areas) and subtracts the union from a world-covering
//! polygon. Rendered with a dark fill, the resulting feature dims
//! everything outside the borough.

use geo::{BooleanOps, LineString, MultiPolygon, Polygon};
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, GeoJson, Value};
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, instrument};

/// Feature property naming the borough in the boundaries file.
const BOROUGH_PROPERTY: &str = "boro_name";

/// Vertices of a polygon covering the whole world.
const WORLD_VERTICES: [(f64, f64); 8] = [
    (0.0, 90.0),
    (180.0, 90.0),
    (180.0, -90.0),
    (0.0, -90.0),
    (-180.0, -90.0),
    (-180.0, 0.0),
    (-180.0, 90.0),
    (0.0, 90.0),
];

/// Error raised when the boundaries file does not hold the expected
/// geometry.
#[derive(Debug)]
pub struct GeometryMismatch(String);

impl GeometryMismatch {
    fn new(what: impl Into<String>) -> Self {
        Self(what.into())
    }
}

impl fmt::Display for GeometryMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected boundary geometry: {}", self.0)
    }
}

impl Error for GeometryMismatch {}

/// Load the boundaries datafile and keep only the named borough's features.
#[instrument(level = "info", fields(path = %path.display()))]
pub fn load_borough_features(
    path: &Path,
    borough: &str,
) -> Result<FeatureCollection, Box<dyn Error>> {
    let reader = BufReader::new(File::open(path)?);
    let geojson = GeoJson::from_reader(reader)?;

    let GeoJson::FeatureCollection(mut collection) = geojson else {
        return Err(GeometryMismatch::new("boundaries file is not a FeatureCollection").into());
    };

    collection.features.retain(|feature| {
        feature
            .properties
            .as_ref()
            .and_then(|properties| properties.get(BOROUGH_PROPERTY))
            .and_then(|name| name.as_str())
            == Some(borough)
    });
    debug!(count = collection.features.len(), borough, "Filtered borough features");

    Ok(collection)
}

/// Union the borough's polygon parts and subtract them from the world.
///
/// Takes the first feature's geometry, interprets it as one or more polygon
/// parts (outer ring of each part only; holes are not modeled), unions the
/// parts, and computes world-rectangle-minus-union. The result is wrapped
/// as a single feature with empty id and name, inside a FeatureCollection.
pub fn merge_geometry(collection: &FeatureCollection) -> Result<FeatureCollection, Box<dyn Error>> {
    let feature = collection
        .features
        .first()
        .ok_or_else(|| GeometryMismatch::new("no features for the borough"))?;
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| GeometryMismatch::new("borough feature has no geometry"))?;

    let parts = polygon_parts(&geometry.value)?;
    let mut merged = MultiPolygon::new(vec![
        parts
            .first()
            .cloned()
            .ok_or_else(|| GeometryMismatch::new("borough geometry has no polygon parts"))?,
    ]);
    for part in &parts[1..] {
        merged = merged.union(&MultiPolygon::new(vec![part.clone()]));
    }

    let world = MultiPolygon::new(vec![Polygon::new(
        LineString::from(WORLD_VERTICES.to_vec()),
        vec![],
    )]);
    let outside = world.difference(&merged);

    let mut properties = geojson::JsonObject::new();
    properties.insert("Name".to_string(), serde_json::Value::String(String::new()));

    let masked = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(Value::from(&outside))),
        id: Some(Id::String(String::new())),
        properties: Some(properties),
        foreign_members: None,
    };

    Ok(FeatureCollection {
        bbox: None,
        features: vec![masked],
        foreign_members: None,
    })
}

/// Outer rings of a polygon or multi-polygon geometry, one polygon each.
fn polygon_parts(value: &Value) -> Result<Vec<Polygon<f64>>, Box<dyn Error>> {
    match value {
        Value::Polygon(rings) => Ok(vec![outer_ring(rings)?]),
        Value::MultiPolygon(parts) => parts.iter().map(|rings| outer_ring(rings)).collect(),
        other => Err(GeometryMismatch::new(format!(
            "expected a polygon or multi-polygon, found {}",
            other.type_name()
        ))
        .into()),
    }
}

fn outer_ring(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, Box<dyn Error>> {
    let outer = rings
        .first()
        .ok_or_else(|| GeometryMismatch::new("polygon part without an outer ring"))?;

    let mut coords = Vec::with_capacity(outer.len());
    for position in outer {
        match position.as_slice() {
            [x, y, ..] => coords.push((*x, *y)),
            _ => return Err(GeometryMismatch::new("position with fewer than two ordinates").into()),
        }
    }

    Ok(Polygon::new(LineString::from(coords), vec![]))
}
