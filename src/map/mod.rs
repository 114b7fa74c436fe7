mod geometry;
pub mod overlay;
mod projection;
mod renderer;
mod spatial;

pub use overlay::{OverlayGroup, Overlays, PlateLine, QuakeMarker};
pub use projection::Viewport;
pub use renderer::{Lod, MapLayers, MapRenderer};
pub use spatial::SpatialIndex;
