//! Map viewport: base tile layer plus the optional claims overlay.

use geo::{BoundingRect, Coord, MultiPoint, Point};
use geo_types::Rect;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::models::GeoPayload;

/// OpenStreetMap standard tiles
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Central India
pub const DEFAULT_CENTER: [f64; 2] = [22.5, 80.0];

pub const DEFAULT_ZOOM: u8 = 6;

const MAX_ZOOM: u8 = 19;

/// Slippy-map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Tile containing a lat/lon at `zoom`
    pub fn containing(lat: f64, lon: f64, zoom: u8) -> Self {
        let zoom = zoom.min(MAX_ZOOM);
        let n = 1_i64 << zoom;
        let x_raw = ((lon + 180.0) / 360.0 * (n as f64)).floor() as i64;
        let lat_rad = lat.to_radians();
        let y_raw = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI)
            / 2.0
            * (n as f64))
            .floor() as i64;

        Self {
            z: zoom,
            x: (((x_raw % n) + n) % n) as u32,
            y: y_raw.clamp(0, n - 1) as u32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapViewport {
    /// [lat, lon]
    pub center: [f64; 2],
    pub zoom: u8,
    pub tile_url: String,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
        }
    }
}

impl MapViewport {
    pub fn center_tile(&self) -> TileCoord {
        TileCoord::containing(self.center[0], self.center[1], self.zoom)
    }

    /// Interpolate the tile template for one tile
    pub fn tile_url(&self, tile: TileCoord) -> String {
        let mut values: HashMap<&str, String> = HashMap::new();
        values.insert("z", tile.z.to_string());
        values.insert("x", tile.x.to_string());
        values.insert("y", tile.y.to_string());
        if self.tile_url.contains("{s}") {
            values.insert("s", "a".to_string());
        }

        let mut url = self.tile_url.clone();
        for (key, value) in &values {
            url = url.replace(&format!("{{{key}}}"), value);
        }
        url
    }
}

/// Read-only summary of a loaded payload. The payload itself is passed to
/// the renderer untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub feature_count: usize,
    pub bounds: Option<Rect<f64>>,
}

impl Overlay {
    pub fn from_payload(payload: &GeoPayload) -> Self {
        let root = payload.as_value();
        let feature_count = match root_type(root) {
            Some("FeatureCollection") => root
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            Some(_) => 1,
            None => 0,
        };

        let mut points = Vec::new();
        collect_points(root, &mut points);
        let bounds = MultiPoint::new(points).bounding_rect();

        debug!("Overlay has {} features, bounds {:?}", feature_count, bounds);

        Self {
            feature_count,
            bounds,
        }
    }
}

fn root_type(value: &Value) -> Option<&str> {
    match value.get("type").and_then(Value::as_str) {
        Some(
            t @ ("FeatureCollection" | "Feature" | "Point" | "MultiPoint" | "LineString"
            | "MultiLineString" | "Polygon" | "MultiPolygon" | "GeometryCollection"),
        ) => Some(t),
        _ => None,
    }
}

/// Walk a GeoJSON object and gather every position
fn collect_points(value: &Value, out: &mut Vec<Point<f64>>) {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            for feature in value.get("features").and_then(Value::as_array).into_iter().flatten() {
                collect_points(feature, out);
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                collect_points(geometry, out);
            }
        }
        Some("GeometryCollection") => {
            for geometry in value
                .get("geometries")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                collect_points(geometry, out);
            }
        }
        Some("Point" | "MultiPoint" | "LineString" | "MultiLineString" | "Polygon" | "MultiPolygon") => {
            if let Some(coordinates) = value.get("coordinates") {
                collect_positions(coordinates, out);
            }
        }
        _ => {}
    }
}

/// Positions are arrays of numbers; anything deeper is nested rings/lines
fn collect_positions(value: &Value, out: &mut Vec<Point<f64>>) {
    let Some(items) = value.as_array() else {
        return;
    };
    match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
        (Some(x), Some(y)) => out.push(Point::from(Coord { x, y })),
        _ => {
            for item in items {
                collect_positions(item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_center_tile_for_central_india() {
        let viewport = MapViewport::default();
        let tile = viewport.center_tile();
        assert_eq!(tile, TileCoord { z: 6, x: 46, y: 27 });
        assert_eq!(
            viewport.tile_url(tile),
            "https://a.tile.openstreetmap.org/6/46/27.png"
        );
    }

    #[test]
    fn test_tile_wraps_longitude() {
        let tile = TileCoord::containing(0.0, 180.0, 1);
        assert_eq!(tile.x, 0);
        let tile = TileCoord::containing(89.9, 0.0, 2);
        assert_eq!(tile.y, 0);
    }

    #[test]
    fn test_overlay_for_feature_collection() {
        let payload = GeoPayload(json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"claim": "IFR-1"},
                    "geometry": {"type": "Point", "coordinates": [78.5, 23.1]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[77.0, 22.0], [79.0, 22.0], [79.0, 24.5], [77.0, 22.0]]]
                    }
                }
            ]
        }));

        let overlay = Overlay::from_payload(&payload);
        assert_eq!(overlay.feature_count, 2);
        let bounds = overlay.bounds.unwrap();
        assert_eq!(bounds.min(), Coord { x: 77.0, y: 22.0 });
        assert_eq!(bounds.max(), Coord { x: 79.0, y: 24.5 });
    }

    #[test]
    fn test_overlay_for_unrecognised_payload() {
        let overlay = Overlay::from_payload(&GeoPayload(json!({"error": "no such layer"})));
        assert_eq!(overlay.feature_count, 0);
        assert!(overlay.bounds.is_none());
    }

    #[test]
    fn test_overlay_for_bare_geometry() {
        let overlay = Overlay::from_payload(&GeoPayload(json!({
            "type": "MultiLineString",
            "coordinates": [[[80.0, 21.0], [81.0, 21.5]], [[82.0, 20.0]]]
        })));
        assert_eq!(overlay.feature_count, 1);
        let bounds = overlay.bounds.unwrap();
        assert_eq!(bounds.min(), Coord { x: 80.0, y: 20.0 });
        assert_eq!(bounds.max(), Coord { x: 82.0, y: 21.5 });
    }
}
