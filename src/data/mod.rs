use crate::error::Result;
use crate::map::{Lod, MapRenderer};
use geojson::{GeoJson, Geometry, Value};
use std::fs;
use std::path::Path;

/// Outline files looked up in the data directory, with the LOD they feed
const COASTLINE_FILES: [(&str, Lod); 4] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("natural-earth.json", Lod::Medium),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const BORDER_FILES: [(&str, Lod); 2] = [
    ("ne_50m_borders.json", Lod::Medium),
    ("ne_10m_borders.json", Lod::High),
];

/// Load whatever Natural Earth outlines exist in `data_dir`.
/// Missing files are skipped; unreadable ones are logged and skipped.
pub fn load_outlines(renderer: &mut MapRenderer, data_dir: &Path) -> usize {
    let mut loaded = 0;

    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_geojson(&path) {
            Ok(geojson) => {
                process_geojson_lines(&geojson, |line| renderer.add_coastline(line, lod));
                loaded += 1;
            }
            Err(e) => log::warn!("failed to load {}: {}", filename, e),
        }
    }

    for (filename, lod) in BORDER_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_geojson(&path) {
            Ok(geojson) => {
                process_geojson_lines(&geojson, |line| renderer.add_border(line, lod));
                loaded += 1;
            }
            Err(e) => log::warn!("failed to load {}: {}", filename, e),
        }
    }

    log::debug!("loaded {} outline files from {}", loaded, data_dir.display());
    loaded
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    let content = fs::read_to_string(path)?;
    Ok(content.parse()?)
}

/// Walk any GeoJSON document and hand every line-like ring to `add_line`
pub fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    let to_line = |coords: &Vec<Vec<f64>>| -> Vec<(f64, f64)> {
        coords
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| (c[0], c[1]))
            .collect()
    };

    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                if let Some(exterior) = rings.first() {
                    add_line(to_line(exterior));
                }
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines used when no data directory is present
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    let continents: [&[(f64, f64)]; 6] = [
        // North America
        &[
            (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
            (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
            (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
            (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
            (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
            (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
            (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
            (-168.0, 65.0),
        ],
        // South America
        &[
            (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
            (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
            (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
            (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
            (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
            (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
        ],
        // Europe
        &[
            (-10.0, 36.0), (0.0, 38.0), (5.0, 43.0), (15.0, 45.0),
            (20.0, 40.0), (30.0, 40.0), (40.0, 43.0), (40.0, 55.0),
            (30.0, 60.0), (20.0, 70.0), (10.0, 71.0), (5.0, 62.0),
            (-5.0, 58.0), (-10.0, 52.0), (-5.0, 43.0), (-10.0, 36.0),
        ],
        // Africa
        &[
            (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
            (10.0, 37.0), (25.0, 32.0), (35.0, 30.0), (42.0, 12.0),
            (50.0, 12.0), (45.0, 5.0), (35.0, -5.0), (35.0, -25.0),
            (20.0, -35.0), (15.0, -30.0), (10.0, -15.0), (10.0, 0.0),
            (-5.0, 5.0), (-17.0, 15.0),
        ],
        // Asia
        &[
            (40.0, 43.0), (55.0, 37.0), (60.0, 25.0), (70.0, 20.0),
            (80.0, 8.0), (88.0, 22.0), (95.0, 16.0), (105.0, 10.0),
            (110.0, 20.0), (122.0, 25.0), (130.0, 35.0), (140.0, 40.0),
            (145.0, 50.0), (135.0, 55.0), (130.0, 43.0), (110.0, 45.0),
            (90.0, 50.0), (60.0, 55.0), (40.0, 43.0),
        ],
        // Australia
        &[
            (115.0, -20.0), (130.0, -12.0), (140.0, -12.0), (150.0, -25.0),
            (153.0, -30.0), (145.0, -38.0), (135.0, -35.0), (125.0, -32.0),
            (115.0, -35.0), (115.0, -20.0),
        ],
    ];

    for outline in continents {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}
