//! Base layer descriptors.
//!
//! Each [`TileLayer`] describes a remote raster tile source by URL template,
//! attribution and zoom bounds. The terminal cannot show raster imagery, so
//! the active layer instead picks the backdrop palette (see [`Basemap`]) and
//! bounds how far the view can zoom.

use crate::map::Viewport;

/// Which backdrop palette a base layer renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basemap {
    Street,
    Satellite,
    Dark,
    Night,
}

/// Geographic bounds as ((south, west), (north, east))
pub type LatLngBounds = ((f64, f64), (f64, f64));

/// A named remote tile source. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: &'static str,
    pub basemap: Basemap,
    pub url_template: &'static str,
    /// Attribution as published by the provider (HTML)
    pub attribution: &'static str,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub subdomains: &'static [&'static str],
    pub bounds: Option<LatLngBounds>,
    pub time: Option<&'static str>,
    pub tilematrixset: Option<&'static str>,
    pub format: Option<&'static str>,
}

impl TileLayer {
    const BASE: TileLayer = TileLayer {
        name: "",
        basemap: Basemap::Street,
        url_template: "",
        attribution: "",
        min_zoom: 0,
        max_zoom: 18,
        subdomains: &["a", "b", "c"],
        bounds: None,
        time: None,
        tilematrixset: None,
        format: None,
    };

    pub fn street() -> Self {
        Self {
            name: "Street Map",
            basemap: Basemap::Street,
            url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
            max_zoom: 19,
            ..Self::BASE
        }
    }

    pub fn satellite() -> Self {
        Self {
            name: "Satellite View",
            basemap: Basemap::Satellite,
            url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            attribution: "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
            ..Self::BASE
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Dark Mode",
            basemap: Basemap::Dark,
            url_template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>",
            subdomains: &["a", "b", "c", "d"],
            max_zoom: 20,
            ..Self::BASE
        }
    }

    pub fn earth_at_night() -> Self {
        Self {
            name: "Earth at Night",
            basemap: Basemap::Night,
            url_template: "https://map1.vis.earthdata.nasa.gov/wmts-webmerc/VIIRS_CityLights_2012/default/{time}/{tilematrixset}{maxZoom}/{z}/{y}/{x}.{format}",
            attribution: "Imagery provided by services from the Global Imagery Browse Services (GIBS), operated by the NASA/GSFC/Earth Science Data and Information System (<a href=\"https://earthdata.nasa.gov\">ESDIS</a>) with funding provided by NASA/HQ.",
            bounds: Some(((-85.0511287776, -179.999999975), (85.0511287776, 179.999999975))),
            min_zoom: 1,
            max_zoom: 8,
            format: Some("jpg"),
            time: Some(""),
            tilematrixset: Some("GoogleMapsCompatible_Level"),
            ..Self::BASE
        }
    }

    /// Expand the URL template for one tile
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        let subdomain = if self.subdomains.is_empty() {
            ""
        } else {
            self.subdomains[((x as usize) + (y as usize)) % self.subdomains.len()]
        };

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{r}", "")
            .replace("{time}", self.time.unwrap_or(""))
            .replace("{tilematrixset}", self.tilematrixset.unwrap_or(""))
            .replace("{maxZoom}", &self.max_zoom.to_string())
            .replace("{format}", self.format.unwrap_or(""))
    }

    /// Attribution with markup stripped, for display in the status bar
    pub fn plain_attribution(&self) -> String {
        let mut out = String::with_capacity(self.attribution.len());
        let mut in_tag = false;
        for ch in self.attribution.chars() {
            match ch {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag => out.push(ch),
                _ => {}
            }
        }
        out.replace("&copy;", "©").replace("&mdash;", "-").replace("&amp;", "&")
    }

    /// Tile zoom level and x/y tile spans that cover the viewport
    pub fn tile_range(&self, viewport: &Viewport) -> TileRange {
        let z = (viewport.level().floor().max(0.0) as u8).clamp(self.min_zoom, self.max_zoom);
        let n = 1u32 << z;

        let (mut west, mut south, mut east, mut north) = viewport.bounds();
        if let Some(((b_south, b_west), (b_north, b_east))) = self.bounds {
            west = west.max(b_west);
            south = south.max(b_south);
            east = east.min(b_east);
            north = north.min(b_north);
        }

        let tile_x = |lon: f64| {
            let x = ((lon + 180.0) / 360.0 * n as f64).floor();
            x.clamp(0.0, (n - 1) as f64) as u32
        };
        let tile_y = |lat: f64| {
            let lat = lat.clamp(-85.0511287776, 85.0511287776).to_radians();
            let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n as f64;
            y.floor().clamp(0.0, (n - 1) as f64) as u32
        };

        TileRange {
            z,
            x: (tile_x(west), tile_x(east)),
            y: (tile_y(north), tile_y(south)),
        }
    }
}

/// Inclusive tile spans at one zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u8,
    pub x: (u32, u32),
    pub y: (u32, u32),
}

impl TileRange {
    pub fn count(&self) -> usize {
        let nx = self.x.1.saturating_sub(self.x.0) as usize + 1;
        let ny = self.y.1.saturating_sub(self.y.0) as usize + 1;
        nx * ny
    }
}

/// The four base layers in switcher order
pub fn base_layers() -> Vec<TileLayer> {
    vec![
        TileLayer::satellite(),
        TileLayer::dark(),
        TileLayer::earth_at_night(),
        TileLayer::street(),
    ]
}

/// Name of the base layer shown on startup
pub const DEFAULT_BASE_LAYER: &str = "Street Map";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_url() {
        let url = TileLayer::street().tile_url(4, 3, 6);
        assert_eq!(url, "https://tile.openstreetmap.org/4/3/6.png");
    }

    #[test]
    fn test_satellite_url_swaps_xy() {
        let url = TileLayer::satellite().tile_url(2, 1, 3);
        assert!(url.ends_with("/tile/2/3/1"));
    }

    #[test]
    fn test_dark_url_subdomain_and_retina() {
        let layer = TileLayer::dark();
        assert_eq!(
            layer.tile_url(4, 3, 5),
            "https://a.basemaps.cartocdn.com/dark_all/4/3/5.png"
        );
        assert_eq!(
            layer.tile_url(4, 3, 6),
            "https://b.basemaps.cartocdn.com/dark_all/4/3/6.png"
        );
    }

    #[test]
    fn test_night_url_tokens() {
        let url = TileLayer::earth_at_night().tile_url(3, 2, 1);
        assert_eq!(
            url,
            "https://map1.vis.earthdata.nasa.gov/wmts-webmerc/VIIRS_CityLights_2012/default//GoogleMapsCompatible_Level8/3/1/2.jpg"
        );
    }

    #[test]
    fn test_base_layer_order() {
        let names: Vec<_> = base_layers().iter().map(|l| l.name).collect();
        assert_eq!(names, ["Satellite View", "Dark Mode", "Earth at Night", "Street Map"]);
    }

    #[test]
    fn test_plain_attribution() {
        let text = TileLayer::street().plain_attribution();
        assert_eq!(text, "© OpenStreetMap contributors");
    }

    #[test]
    fn test_tile_range_clamps_zoom() {
        let vp = Viewport::from_level(0.0, 0.0, 12.0, 200, 100);
        let range = TileLayer::earth_at_night().tile_range(&vp);
        assert_eq!(range.z, 8);

        let vp = Viewport::from_level(0.0, 0.0, 1.0, 200, 100);
        let range = TileLayer::earth_at_night().tile_range(&vp);
        assert_eq!(range.z, 1);
        assert!(range.count() <= 4);
    }

    #[test]
    fn test_tile_range_us_view() {
        let vp = Viewport::from_level(-95.7129, 37.0902, 4.0, 400, 200);
        let range = TileLayer::street().tile_range(&vp);
        assert_eq!(range.z, 4);
        assert!(range.x.0 <= 3 && range.x.1 >= 3);
        assert!(range.y.0 <= 6 && range.y.1 >= 6);
    }
}
