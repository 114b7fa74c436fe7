use crate::data::process_geojson_lines;
use crate::map::spatial::SpatialIndex;
use crate::map::Viewport;
use crate::style::{self, MarkerStyle};
use geojson::{Feature, GeoJson, Value};
use rayon::prelude::*;

/// Braille pixels per marker-radius unit
pub const MARKER_SCALE: f64 = 0.25;

/// A rendered earthquake circle
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeMarker {
    pub lon: f64,
    pub lat: f64,
    /// `None` when the feed reports a null magnitude
    pub magnitude: Option<f64>,
    pub depth: f64,
    pub place: Option<String>,
    pub style: MarkerStyle,
}

impl QuakeMarker {
    /// Build a marker from a point feature. Non-point features are skipped.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let geometry = feature.geometry.as_ref()?;
        let Value::Point(coords) = &geometry.value else {
            return None;
        };
        if coords.len() < 2 {
            return None;
        }

        let props = feature.properties.as_ref();
        let magnitude = props.and_then(|p| p.get("mag")).and_then(|v| v.as_f64());
        let place = props
            .and_then(|p| p.get("place"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let depth = coords.get(2).copied().unwrap_or(0.0);

        Some(Self {
            lon: coords[0],
            lat: coords[1],
            magnitude,
            depth,
            place,
            style: style::marker_style(magnitude.unwrap_or(0.0), depth),
        })
    }

    /// Radius on the Braille canvas
    pub fn pixel_radius(&self) -> i32 {
        ((self.style.radius * MARKER_SCALE).round() as i32).max(1)
    }

    pub fn depth_band(&self) -> usize {
        style::depth_band(self.depth)
    }

    /// Lines shown in the marker's popup
    pub fn popup_lines(&self) -> Vec<String> {
        let magnitude = match self.magnitude {
            Some(m) => m.to_string(),
            None => "unknown".to_string(),
        };
        vec![
            format!("Magnitude: {}", magnitude),
            format!("Depth: {}", self.depth),
            format!("Location: {}", self.place.as_deref().unwrap_or("unknown")),
        ]
    }
}

/// A tectonic plate boundary polyline
#[derive(Debug, Clone, PartialEq)]
pub struct PlateLine {
    pub points: Vec<(f64, f64)>,
}

impl PlateLine {
    pub const COLOR: &'static str = style::PLATE_COLOR;
    pub const WEIGHT: f64 = style::PLATE_WEIGHT;
}

/// A togglable group of shapes derived from one feed.
/// Starts empty and pending; filled at most once.
#[derive(Debug)]
pub struct OverlayGroup<T> {
    pub name: &'static str,
    pub visible: bool,
    pending: bool,
    items: Vec<T>,
}

impl<T> OverlayGroup<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visible: true,
            pending: true,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Waiting on its feed
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn fill(&mut self, items: Vec<T>) {
        self.items.extend(items);
        self.pending = false;
    }

    /// The feed will never arrive; the group stays as it is
    pub fn abandon(&mut self) {
        self.pending = false;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

pub const PLATES_NAME: &str = "Tectonic Plates";
pub const EARTHQUAKES_NAME: &str = "Earthquakes";

/// Both overlay groups plus the pick index over quake markers
pub struct Overlays {
    pub plates: OverlayGroup<PlateLine>,
    pub quakes: OverlayGroup<QuakeMarker>,
    quake_index: SpatialIndex,
}

impl Overlays {
    pub fn new() -> Self {
        Self {
            plates: OverlayGroup::new(PLATES_NAME),
            quakes: OverlayGroup::new(EARTHQUAKES_NAME),
            quake_index: SpatialIndex::default(),
        }
    }

    /// Fill the plate group from a boundaries document; returns lines added
    pub fn populate_plates(&mut self, geojson: &GeoJson) -> usize {
        let mut lines = Vec::new();
        process_geojson_lines(geojson, |points| {
            if points.len() >= 2 {
                lines.push(PlateLine { points });
            }
        });
        let count = lines.len();
        self.plates.fill(lines);
        count
    }

    /// Fill the quake group from an earthquake feed; returns markers added
    pub fn populate_quakes(&mut self, geojson: &GeoJson) -> usize {
        let markers: Vec<QuakeMarker> = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .par_iter()
                .filter_map(QuakeMarker::from_feature)
                .collect(),
            GeoJson::Feature(f) => QuakeMarker::from_feature(f).into_iter().collect(),
            GeoJson::Geometry(_) => Vec::new(),
        };
        let count = markers.len();
        self.quakes.fill(markers);
        self.quake_index = SpatialIndex::build(
            self.quakes.items().iter().map(|m| (m.lon, m.lat)),
            1.0,
        );
        count
    }

    /// Nearest visible quake marker covering pixel (px, py)
    pub fn quake_at(&self, viewport: &Viewport, px: i32, py: i32) -> Option<&QuakeMarker> {
        if !self.quakes.visible || self.quake_index.is_empty() {
            return None;
        }

        let (lon, lat) = viewport.unproject(px, py);
        // Largest plausible marker plus a little slack, converted to degrees
        let reach_px = 12.0;
        let degrees_per_px = 360.0 / (viewport.zoom * viewport.width.max(1) as f64);
        let radius_degrees = (reach_px * degrees_per_px).min(360.0);

        self.quake_index
            .query_radius(lon, lat, radius_degrees)
            .into_iter()
            .filter_map(|idx| self.quakes.items().get(idx))
            .filter_map(|marker| {
                let (mx, my) = viewport.project(marker.lon, marker.lat);
                let dist2 = (mx - px).pow(2) + (my - py).pow(2);
                let hit = marker.pixel_radius() + 1;
                (dist2 <= hit * hit).then_some((dist2, marker))
            })
            .min_by_key(|(dist2, _)| *dist2)
            .map(|(_, marker)| marker)
    }
}

impl Default for Overlays {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quake_feed() -> GeoJson {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "mag": 5.2, "place": "X" },
                    "geometry": { "type": "Point", "coordinates": [-120.0, 36.0, 45.0] }
                },
                {
                    "type": "Feature",
                    "properties": { "mag": null, "place": null },
                    "geometry": { "type": "Point", "coordinates": [140.0, -20.0, -5.0] }
                },
                {
                    "type": "Feature",
                    "properties": { "mag": 3.0 },
                    "geometry": null
                }
            ]
        }"#
        .parse()
        .unwrap()
    }

    #[test]
    fn test_sample_marker() {
        let mut overlays = Overlays::new();
        assert_eq!(overlays.populate_quakes(&quake_feed()), 2);

        let marker = overlays
            .quakes
            .items()
            .iter()
            .find(|m| m.place.as_deref() == Some("X"))
            .unwrap();
        assert_eq!(marker.style.fill_color, "#decb23");
        assert!((marker.style.radius - 20.8).abs() < 1e-9);
        assert_eq!(marker.pixel_radius(), 5);
        assert_eq!(
            marker.popup_lines(),
            vec!["Magnitude: 5.2", "Depth: 45", "Location: X"]
        );
    }

    #[test]
    fn test_null_magnitude() {
        let mut overlays = Overlays::new();
        overlays.populate_quakes(&quake_feed());

        let marker = overlays
            .quakes
            .items()
            .iter()
            .find(|m| m.place.is_none())
            .unwrap();
        assert_eq!(marker.magnitude, None);
        assert_eq!(marker.style.radius, 1.0);
        assert_eq!(marker.style.fill_color, "#5fde23");
        assert_eq!(marker.popup_lines()[0], "Magnitude: unknown");
    }

    #[test]
    fn test_group_lifecycle() {
        let mut overlays = Overlays::new();
        assert!(overlays.quakes.is_pending());
        assert!(overlays.quakes.visible);
        assert!(overlays.quakes.is_empty());

        overlays.populate_quakes(&quake_feed());
        assert!(!overlays.quakes.is_pending());

        overlays.plates.abandon();
        assert!(!overlays.plates.is_pending());
        assert!(overlays.plates.is_empty());
    }

    #[test]
    fn test_populate_plates() {
        let geojson: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "Name": "AF-AN" },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-0.4, -54.8], [0.1, -54.5], [1.2, -54.1]]
                }
            }]
        }"#
        .parse()
        .unwrap();

        let mut overlays = Overlays::new();
        assert_eq!(overlays.populate_plates(&geojson), 1);
        assert_eq!(overlays.plates.items()[0].points.len(), 3);
        assert_eq!(PlateLine::COLOR, "purple");
    }

    #[test]
    fn test_pick_marker() {
        let mut overlays = Overlays::new();
        overlays.populate_quakes(&quake_feed());

        let vp = Viewport::from_level(-120.0, 36.0, 4.0, 400, 200);
        let (px, py) = vp.project(-120.0, 36.0);
        let marker = overlays.quake_at(&vp, px + 2, py).unwrap();
        assert_eq!(marker.place.as_deref(), Some("X"));

        assert!(overlays.quake_at(&vp, px + 40, py).is_none());

        overlays.quakes.toggle();
        assert!(overlays.quake_at(&vp, px, py).is_none());
    }

    #[test]
    fn test_pick_on_zero_width_viewport() {
        let mut overlays = Overlays::new();
        overlays.populate_quakes(&quake_feed());

        // Pick radius in degrees blows up as the canvas width approaches zero
        let vp = Viewport::new(0.0, 0.0, 0.5, 0, 4);
        let start = std::time::Instant::now();
        let _ = overlays.quake_at(&vp, 0, 0);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }
}
