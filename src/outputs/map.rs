//! Self-contained Leaflet map document.
//!
//! [`MapPage`] collects the overlay and marker descriptors and emits a
//! single HTML page with Leaflet loaded from a CDN, so the result can be
//! opened from disk or served as a static file. Layers are emitted in
//! insertion order: the base tile layer, then overlays, then circle
//! markers, then label markers, so badges always sit on top of circles.
//!
//! All dynamic strings are embedded through JSON escaping; coordinates are
//! parsed into numbers before being written into the script.

use crate::models::{CircleMarker, Coordinates, LabelMarker};
use geojson::FeatureCollection;
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// Fill colour of the outside-the-borough overlay.
pub const OVERLAY_FILL: &str = "#000000";

/// An interactive map document under construction.
#[derive(Debug, Default)]
pub struct MapPage {
    centre: (f64, f64),
    zoom: u8,
    overlays: Vec<(FeatureCollection, String)>,
    circles: Vec<CircleMarker>,
    labels: Vec<LabelMarker>,
}

impl MapPage {
    pub fn new(centre: (f64, f64), zoom: u8) -> Self {
        Self {
            centre,
            zoom,
            ..Self::default()
        }
    }

    /// Add a GeoJSON overlay rendered with the given fill colour.
    pub fn add_overlay(&mut self, collection: FeatureCollection, fill: &str) {
        self.overlays.push((collection, fill.to_string()));
    }

    /// Add one library's circle and label markers.
    pub fn add_markers(&mut self, circle: CircleMarker, label: LabelMarker) {
        self.circles.push(circle);
        self.labels.push(label);
    }

    /// Render the page as a complete HTML document.
    pub fn to_html(&self) -> Result<String, Box<dyn Error>> {
        let mut script = String::new();
        writeln!(
            script,
            "var map = L.map('map').setView([{}, {}], {});",
            self.centre.0, self.centre.1, self.zoom
        )?;
        writeln!(
            script,
            "L.tileLayer({}, {{ maxZoom: 19, attribution: {} }}).addTo(map);",
            js_string(TILE_URL)?,
            js_string(TILE_ATTRIBUTION)?
        )?;

        for (collection, fill) in &self.overlays {
            writeln!(
                script,
                "L.geoJSON({}, {{ style: {{ fillColor: {} }} }}).addTo(map);",
                serde_json::to_string(collection)?,
                js_string(fill)?
            )?;
        }

        for circle in &self.circles {
            let (lat, lon) = parse_coords(&circle.coords)?;
            writeln!(
                script,
                "L.circleMarker([{lat}, {lon}], {{ radius: {}, weight: {}, color: {} }}).addTo(map);",
                circle.radius,
                circle.weight,
                js_string(&circle.colour)?
            )?;
        }

        for label in &self.labels {
            let (lat, lon) = parse_coords(&label.coords)?;
            writeln!(
                script,
                "L.marker([{lat}, {lon}], {{ icon: L.divIcon({{ iconSize: [{}, {}], iconAnchor: [{}, {}], html: {} }}) }})\n    \
                 .bindTooltip({})\n    \
                 .bindPopup({}, {{ minWidth: {width}, maxWidth: {width} }})\n    \
                 .addTo(map);",
                label.icon_size.0,
                label.icon_size.1,
                label.icon_anchor.0,
                label.icon_anchor.1,
                js_string(&label.badge_html)?,
                js_string(&label.tooltip_html)?,
                js_string(&label.popup_html)?,
                width = label.popup_width
            )?;
        }

        Ok(format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Most popular books by library</title>\n\
             <link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">\n\
             <script src=\"{LEAFLET_JS}\"></script>\n\
             <style>html, body, #map {{ height: 100%; margin: 0; }}</style>\n\
             </head>\n\
             <body>\n\
             <div id=\"map\"></div>\n\
             <script>\n{script}</script>\n\
             </body>\n\
             </html>\n"
        ))
    }

    /// Write the document to `path`, creating parent directories as needed.
    #[instrument(level = "info", skip(self), fields(path = %path.display()))]
    pub async fn write(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let html = self.to_html()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, html).await?;
        info!(
            overlays = self.overlays.len(),
            markers = self.circles.len(),
            "Wrote map document"
        );
        Ok(())
    }
}

/// Escape a string for embedding as a JavaScript string literal.
fn js_string(value: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn parse_coords(coords: &Coordinates) -> Result<(f64, f64), Box<dyn Error>> {
    let lat: f64 = coords.lat().parse()?;
    let lon: f64 = coords.lon().parse()?;
    Ok((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::make_markers;
    use crate::models::Coordinates;
    use geojson::{Feature, Geometry, Value};

    fn overlay() -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![vec![
                    vec![0.0, 0.0],
                    vec![1.0, 0.0],
                    vec![1.0, 1.0],
                    vec![0.0, 0.0],
                ]]))),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        }
    }

    #[test]
    fn test_page_embeds_overlay_and_markers() {
        let mut page = MapPage::new((40.675, -73.8729094), 11);
        page.add_overlay(overlay(), OVERLAY_FILL);

        let coords = Coordinates("40.7".to_string(), "-73.8".to_string());
        let (circle, label) = make_markers("Astoria", "Spare", 2, &coords, "#665191");
        page.add_markers(circle, label);

        let html = page.to_html().unwrap();

        assert!(html.contains("L.map('map').setView([40.675, -73.8729094], 11);"));
        assert!(html.contains("fillColor: \"#000000\""));
        assert!(html.contains("\"FeatureCollection\""));
        assert!(html.contains(
            "L.circleMarker([40.7, -73.8], { radius: 5, weight: 20, color: \"#665191\" })"
        ));
        assert!(html.contains("iconSize: [20, 20], iconAnchor: [10, 20]"));
        assert!(html.contains("minWidth: 210, maxWidth: 210"));
        // Marker HTML arrives JSON-escaped.
        assert!(html.contains("\"<b>Astoria</b><br>Spare\""));
    }

    #[test]
    fn test_page_rejects_unparseable_coordinates() {
        let mut page = MapPage::new((40.675, -73.8729094), 11);
        let coords = Coordinates("not-a-number".to_string(), "-73.8".to_string());
        let (circle, label) = make_markers("Astoria", "Spare", 1, &coords, "#ffffff");
        page.add_markers(circle, label);

        assert!(page.to_html().is_err());
    }
}
