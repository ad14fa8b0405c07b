//! Map surface capability and an in-memory implementation.
//!
//! The renderer never talks to a concrete map library. It draws through
//! [`MapSurface`], which needs only two operations: add a tile layer and add a
//! styled polyline. [`MapCanvas`] records those calls in order and can export
//! them as a GeoJSON `FeatureCollection` or a standalone Leaflet page.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::geo_utils;
use crate::{Bounds, GpsPoint};

const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

// ============================================================================
// Styling
// ============================================================================

/// A raster tile source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url: String,
    /// HTML attribution shown in the map corner
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url: OSM_TILE_URL.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }
}

/// Shape drawn where two segments of a line meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Round,
    Miter,
    Bevel,
}

/// Visual style of a route overlay.
///
/// Field names serialize to Leaflet's path options (`lineJoin`, ...), so a
/// style can be handed to `L.polyline` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineStyle {
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f64,
    pub line_join: LineJoin,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "green".to_string(),
            weight: 5.0,
            opacity: 0.7,
            line_join: LineJoin::Round,
        }
    }
}

// ============================================================================
// Surface
// ============================================================================

/// The drawing capabilities the renderer needs from a map.
pub trait MapSurface: Send {
    fn add_tile_layer(&mut self, layer: &TileLayer);

    /// Add one connected line through `coordinates`, in order.
    fn add_polyline(&mut self, coordinates: &[GpsPoint], style: &LineStyle);
}

/// A map surface shared between renderers. Overlays only ever accumulate.
pub type SharedSurface<M> = Arc<Mutex<M>>;

pub fn shared<M: MapSurface>(surface: M) -> SharedSurface<M> {
    Arc::new(Mutex::new(surface))
}

/// A recorded polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineOverlay {
    pub coordinates: Vec<GpsPoint>,
    pub style: LineStyle,
}

/// Records every layer added to it, in call order.
#[derive(Debug, Clone, Default)]
pub struct MapCanvas {
    tile_layers: Vec<TileLayer>,
    overlays: Vec<PolylineOverlay>,
}

impl MapSurface for MapCanvas {
    fn add_tile_layer(&mut self, layer: &TileLayer) {
        self.tile_layers.push(layer.clone());
    }

    fn add_polyline(&mut self, coordinates: &[GpsPoint], style: &LineStyle) {
        self.overlays.push(PolylineOverlay {
            coordinates: coordinates.to_vec(),
            style: style.clone(),
        });
    }
}

impl MapCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_layers(&self) -> &[TileLayer] {
        &self.tile_layers
    }

    pub fn overlays(&self) -> &[PolylineOverlay] {
        &self.overlays
    }

    /// Bounds of every drawn route, `None` before anything is drawn.
    pub fn bounds(&self) -> Option<Bounds> {
        geo_utils::merge_bounds(self.overlays.iter().map(|o| o.coordinates.as_slice()))
    }

    /// Export the overlays as a GeoJSON `FeatureCollection`.
    ///
    /// Positions are `[lng, lat]`. A single-point route becomes a `Point`,
    /// an empty one a feature with a null geometry.
    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self
            .overlays
            .iter()
            .enumerate()
            .map(|(index, overlay)| {
                let line = geo_utils::to_line_string(&overlay.coordinates);
                let positions: Vec<[f64; 2]> = line.coords().map(|c| [c.x, c.y]).collect();
                let geometry = match positions.len() {
                    0 => Value::Null,
                    1 => json!({ "type": "Point", "coordinates": positions[0] }),
                    _ => json!({ "type": "LineString", "coordinates": positions }),
                };

                let mut properties = json!({
                    "index": index,
                    "color": overlay.style.color,
                    "weight": overlay.style.weight,
                    "opacity": overlay.style.opacity,
                    "lineJoin": overlay.style.line_join,
                    "distance_m": geo_utils::route_length(&overlay.coordinates),
                });
                if let Some(bounds) = Bounds::from_points(&overlay.coordinates) {
                    properties["bbox"] = json!(bounds.to_bbox());
                }

                json!({ "type": "Feature", "geometry": geometry, "properties": properties })
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Render a self-contained HTML page drawing the recorded layers with Leaflet.
    ///
    /// The view is fitted to the drawn routes; with no routes it shows the world.
    pub fn to_leaflet_html(&self, title: &str) -> Result<String> {
        let routes: Vec<Value> = self
            .overlays
            .iter()
            .map(|o| {
                let latlngs: Vec<[f64; 2]> = o.coordinates.iter().map(GpsPoint::lat_lng).collect();
                json!({ "latlngs": latlngs, "style": o.style })
            })
            .collect();
        let bounds = self
            .bounds()
            .map(|b| json!([[b.min_lat, b.min_lng], [b.max_lat, b.max_lng]]));

        let data = json!({
            "tileLayers": self.tile_layers,
            "routes": routes,
            "bounds": bounds,
        });
        // Keep `</script>` inside string values from closing the script element
        let data = serde_json::to_string(&data)?.replace("</", "<\\/");

        Ok(LEAFLET_TEMPLATE
            .replace("__TITLE__", &escape_html(title))
            .replace("__DATA__", &data))
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const LEAFLET_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>__TITLE__</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
  <div id="map"></div>
  <script>
    const data = __DATA__;
    const map = L.map('map');
    for (const layer of data.tileLayers) {
      L.tileLayer(layer.url, { attribution: layer.attribution }).addTo(map);
    }
    for (const route of data.routes) {
      L.polyline(route.latlngs, route.style).addTo(map);
    }
    if (data.bounds) {
      map.fitBounds(data.bounds);
    } else {
      map.setView([0, 0], 2);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_route() -> Vec<GpsPoint> {
        vec![
            GpsPoint::new(38.5, -120.2),
            GpsPoint::new(40.7, -120.95),
            GpsPoint::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_style_serializes_as_leaflet_options() {
        let value = serde_json::to_value(LineStyle::default()).unwrap();
        assert_eq!(
            value,
            json!({ "color": "green", "weight": 5.0, "opacity": 0.7, "lineJoin": "round" })
        );
    }

    #[test]
    fn test_canvas_records_in_order() {
        let mut canvas = MapCanvas::new();
        let style = LineStyle::default();
        canvas.add_tile_layer(&TileLayer::default());
        canvas.add_polyline(&reference_route(), &style);
        canvas.add_polyline(&[GpsPoint::new(37.77, -85.91765)], &style);

        assert_eq!(canvas.tile_layers().len(), 1);
        assert_eq!(canvas.overlays().len(), 2);
        assert_eq!(canvas.overlays()[0].coordinates, reference_route());

        let bounds = canvas.bounds().unwrap();
        assert_eq!(bounds.min_lat, 37.77);
        assert_eq!(bounds.max_lng, -85.91765);
    }

    #[test]
    fn test_feature_collection() {
        let mut canvas = MapCanvas::new();
        let style = LineStyle::default();
        canvas.add_polyline(&reference_route(), &style);
        canvas.add_polyline(&[GpsPoint::new(37.77, -85.91765)], &style);
        canvas.add_polyline(&[], &style);

        let fc = canvas.to_feature_collection();
        assert_eq!(fc["type"], "FeatureCollection");
        let features = fc["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);

        let line = &features[0];
        assert_eq!(line["geometry"]["type"], "LineString");
        assert_eq!(line["geometry"]["coordinates"][0], json!([-120.2, 38.5]));
        assert_eq!(line["properties"]["bbox"], json!([-126.453, 38.5, -120.2, 43.252]));
        assert!(line["properties"]["distance_m"].as_f64().unwrap() > 500_000.0);

        assert_eq!(features[1]["geometry"]["type"], "Point");
        assert_eq!(features[1]["geometry"]["coordinates"], json!([-85.91765, 37.77]));

        assert!(features[2]["geometry"].is_null());
        assert!(features[2]["properties"].get("bbox").is_none());
    }

    #[test]
    fn test_leaflet_html() {
        let mut canvas = MapCanvas::new();
        canvas.add_tile_layer(&TileLayer::default());
        canvas.add_polyline(&reference_route(), &LineStyle::default());

        let html = canvas.to_leaflet_html("Rides <2024>").unwrap();
        assert!(html.contains("<title>Rides &lt;2024&gt;</title>"));
        assert!(html.contains("[38.5,-120.2]"));
        assert!(html.contains("\"lineJoin\":\"round\""));
        assert!(html.contains("tile.openstreetmap.org"));
        // The attribution link must not close the script element early
        assert!(!html.contains("</a>"));
        assert!(html.contains("<\\/a>"));
        assert!(!html.contains("__DATA__"));
    }

    #[test]
    fn test_leaflet_html_empty_canvas() {
        let html = MapCanvas::new().to_leaflet_html("empty").unwrap();
        assert!(html.contains("\"bounds\":null"));
        assert!(html.contains("\"routes\":[]"));
    }
}
