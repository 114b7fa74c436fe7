//! Terminal map of recent earthquakes over tectonic plate boundaries.
//!
//! The map view is built once by [`app::App::initialize`]: base layers are
//! registered with the layer switcher, both overlay groups are attached
//! empty, and the two GeoJSON feeds are fetched in the background. Overlays
//! fill in as each response arrives.

pub mod app;
pub mod braille;
pub mod config;
pub mod control;
pub mod data;
pub mod error;
pub mod feeds;
pub mod map;
pub mod style;
pub mod tiles;
pub mod ui;

pub use error::{Error, Result};
