use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV: &str = "QUAKE_MAP_CONFIG";

pub const PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";
pub const EARTHQUAKES_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";

/// Runtime settings. Every field has a built-in default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial map center as (lat, lon)
    pub center: (f64, f64),
    /// Initial zoom level (tile zoom scale)
    pub zoom: f64,
    pub plates_url: String,
    pub earthquakes_url: String,
    /// Directory with optional Natural Earth outlines
    pub data_dir: PathBuf,
    /// Where log output goes; the terminal is owned by the UI
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center: (37.0902, -95.7129),
            zoom: 4.0,
            plates_url: PLATES_URL.to_string(),
            earthquakes_url: EARTHQUAKES_URL.to_string(),
            data_dir: PathBuf::from("data"),
            log_file: Some(PathBuf::from("quake-map.log")),
        }
    }
}

impl Config {
    /// Load from the file named by `QUAKE_MAP_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
