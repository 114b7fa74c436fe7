use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_line, draw_thick_line};
use crate::map::overlay::Overlays;
use crate::map::projection::Viewport;
use crate::style::DEPTH_COLORS;
use rayon::prelude::*;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for outline data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }
}

/// Rasterized layers for one frame, back to front
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    pub plates: BrailleCanvas,
    /// One canvas per depth band, shallowest first
    pub quakes: Vec<BrailleCanvas>,
}

/// Draws the outline backdrop and the overlay groups
pub struct MapRenderer {
    pub coastlines_low: Vec<LineString>,
    pub coastlines_medium: Vec<LineString>,
    pub coastlines_high: Vec<LineString>,
    pub borders_medium: Vec<LineString>,
    pub borders_high: Vec<LineString>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
            coastlines_high: Vec::new(),
            borders_medium: Vec::new(),
            borders_high: Vec::new(),
        }
    }

    /// Best available coastlines for the LOD, falling back to coarser data
    fn get_coastlines(&self, lod: Lod) -> &[LineString] {
        if lod == Lod::High && !self.coastlines_high.is_empty() {
            &self.coastlines_high
        } else if lod != Lod::Low && !self.coastlines_medium.is_empty() {
            &self.coastlines_medium
        } else {
            &self.coastlines_low
        }
    }

    fn get_borders(&self, lod: Lod) -> &[LineString] {
        if lod == Lod::High && !self.borders_high.is_empty() {
            &self.borders_high
        } else {
            &self.borders_medium
        }
    }

    /// Rasterize the backdrop and every visible overlay.
    /// `width`/`height` are in characters; the viewport is in Braille pixels.
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, overlays: &Overlays) -> MapLayers {
        let lod = Lod::from_zoom(viewport.zoom);

        let mut coastlines = BrailleCanvas::new(width, height);
        for line in self.get_coastlines(lod) {
            draw_linestring(&mut coastlines, line, viewport, false);
        }

        let mut borders = BrailleCanvas::new(width, height);
        if lod != Lod::Low {
            for line in self.get_borders(lod) {
                draw_linestring(&mut borders, line, viewport, false);
            }
        }

        let mut plates = BrailleCanvas::new(width, height);
        if overlays.plates.visible {
            for line in overlays.plates.items() {
                draw_linestring(&mut plates, &line.points, viewport, true);
            }
        }

        // Each depth band is independent, so bands rasterize in parallel
        let quakes = (0..DEPTH_COLORS.len())
            .into_par_iter()
            .map(|band| {
                let mut canvas = BrailleCanvas::new(width, height);
                if overlays.quakes.visible {
                    for marker in overlays.quakes.items().iter().filter(|m| m.depth_band() == band) {
                        let (px, py) = viewport.project(marker.lon, marker.lat);
                        if viewport.is_visible(px, py) {
                            draw_circle(&mut canvas, px, py, marker.pixel_radius());
                        }
                    }
                }
                canvas
            })
            .collect();

        MapLayers {
            coastlines,
            borders,
            plates,
            quakes,
        }
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    pub fn add_border(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::High => self.borders_high.push(line),
            Lod::Medium | Lod::Low => self.borders_medium.push(line),
        }
    }

    /// Check if any outline data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a linestring with viewport culling.
/// Segments wider than the canvas are skipped; they are antimeridian jumps.
fn draw_linestring(canvas: &mut BrailleCanvas, line: &[(f64, f64)], viewport: &Viewport, thick: bool) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                if thick {
                    draw_thick_line(canvas, prev_x, prev_y, px, py);
                } else {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }
        }

        prev = Some((px, py));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn blank(canvas: &BrailleCanvas) -> bool {
        canvas.rows().all(|row| row.chars().all(|c| c == '\u{2800}'))
    }

    #[test]
    fn test_lod_fallback() {
        let mut renderer = MapRenderer::new();
        renderer.add_coastline(vec![(0.0, 0.0), (1.0, 1.0)], Lod::Low);
        assert_eq!(renderer.get_coastlines(Lod::High).len(), 1);
        assert!(renderer.get_borders(Lod::High).is_empty());
    }

    #[test]
    fn test_quake_lands_in_its_band() {
        let feed: GeoJson = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "mag": 4.0, "place": "Deep" },
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0, 120.0] }
            }]
        }"#
        .parse()
        .unwrap();

        let mut overlays = Overlays::new();
        overlays.populate_quakes(&feed);

        let renderer = MapRenderer::new();
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        let layers = renderer.render(20, 10, &vp, &overlays);

        assert_eq!(layers.quakes.len(), 6);
        assert!(!blank(&layers.quakes[5]));
        assert!(layers.quakes[..5].iter().all(blank));

        overlays.quakes.toggle();
        let layers = renderer.render(20, 10, &vp, &overlays);
        assert!(layers.quakes.iter().all(blank));
    }

    #[test]
    fn test_hidden_plates_not_drawn() {
        let feed: GeoJson = r#"{"type": "LineString", "coordinates": [[-10, 0], [10, 0]]}"#
            .parse()
            .unwrap();
        let mut overlays = Overlays::new();
        overlays.populate_plates(&feed);

        let renderer = MapRenderer::new();
        let vp = Viewport::new(0.0, 0.0, 1.0, 40, 40);
        assert!(!blank(&renderer.render(20, 10, &vp, &overlays).plates));

        overlays.plates.toggle();
        assert!(blank(&renderer.render(20, 10, &vp, &overlays).plates));
    }
}
