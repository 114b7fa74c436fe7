use std::f64::consts::PI;

/// Offset between the tile zoom level and the viewport scale factor.
/// At level 2 the whole world spans the canvas width once.
const LEVEL_OFFSET: f64 = 2.0;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 1024.0;

/// Viewport representing the visible map area and zoom level
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Scale factor (world widths per canvas width)
    pub zoom: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// Create a viewport from a tile zoom level
    pub fn from_level(center_lon: f64, center_lat: f64, level: f64, width: usize, height: usize) -> Self {
        Self::new(center_lon, center_lat, level_to_zoom(level), width, height)
    }

    /// Current tile zoom level
    pub fn level(&self) -> f64 {
        self.zoom.log2() + LEVEL_OFFSET
    }

    /// Keep the zoom within a tile layer's level range
    pub fn clamp_level(&mut self, min_level: f64, max_level: f64) {
        let lo = level_to_zoom(min_level).max(MIN_ZOOM);
        let hi = level_to_zoom(max_level).min(MAX_ZOOM);
        self.zoom = self.zoom.clamp(lo, hi.max(lo));
    }

    /// Pan the viewport by pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let scale = 360.0 / (self.zoom * self.width.max(1) as f64);
        self.center_lon += dx as f64 * scale;
        self.center_lat -= dy as f64 * scale * 0.5;

        if self.center_lon > 180.0 {
            self.center_lon -= 360.0;
        } else if self.center_lon < -180.0 {
            self.center_lon += 360.0;
        }

        self.center_lat = self.center_lat.clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 1.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 1.5).max(MIN_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.5);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 1.0 / 1.5);
    }

    /// Zoom by factor keeping the point under (px, py) fixed
    fn zoom_at(&mut self, px: i32, py: i32, factor: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);

        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Unproject pixel coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.zoom * self.width as f64;
        let (center_x, center_y) = mercator(self.center_lon, self.center_lat);

        let x = (px as f64 - self.width as f64 / 2.0) / scale + center_x;
        let y = (py as f64 - self.height as f64 / 2.0) / scale + center_y;

        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

        (lon, lat)
    }

    /// Project a geographic coordinate (lon, lat) to pixel coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let (x, y) = mercator(lon, lat);
        let (center_x, center_y) = mercator(self.center_lon, self.center_lat);
        let scale = self.zoom * self.width as f64;

        let px = ((x - center_x) * scale + self.width as f64 / 2.0) as i32;
        let py = ((y - center_y) * scale + self.height as f64 / 2.0) as i32;

        (px, py)
    }

    /// Geographic bounds of the canvas as (west, south, east, north)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (west, north) = self.unproject(0, 0);
        let (east, south) = self.unproject(self.width as i32, self.height as i32);
        (west, south, east, north)
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

fn level_to_zoom(level: f64) -> f64 {
    2f64.powf(level - LEVEL_OFFSET)
}

/// Normalized Web Mercator coordinates in [0, 1]
fn mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(0.0, 0.0, 1.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_level_round_trip() {
        let vp = Viewport::from_level(-95.7129, 37.0902, 4.0, 200, 100);
        assert!((vp.zoom - 4.0).abs() < 1e-9);
        assert!((vp.level() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_level() {
        let mut vp = Viewport::from_level(0.0, 0.0, 9.5, 200, 100);
        vp.clamp_level(1.0, 8.0);
        assert!((vp.level() - 8.0).abs() < 1e-9);

        let mut vp = Viewport::from_level(0.0, 0.0, 1.2, 200, 100);
        vp.clamp_level(1.0, 8.0);
        assert!((vp.level() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let vp = Viewport::from_level(-95.7, 37.1, 4.0, 400, 200);
        let (px, py) = vp.project(-100.0, 40.0);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon + 100.0).abs() < 0.5);
        assert!((lat - 40.0).abs() < 0.5);
    }
}
