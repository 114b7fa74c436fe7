use crate::tiles::{self, TileLayer};

/// Base-layer / overlay switcher state.
/// Exactly one base layer is active at any time.
pub struct LayerControl {
    base_layers: Vec<TileLayer>,
    active: usize,
    /// Collapsed panels show only the active layer name
    pub expanded: bool,
}

impl LayerControl {
    /// Register `layers`, activating the one named `default`
    /// (or the first one if no name matches). `layers` must not be empty.
    pub fn new(layers: Vec<TileLayer>, default: &str) -> Self {
        let active = layers.iter().position(|l| l.name == default).unwrap_or(0);
        Self {
            base_layers: layers,
            active,
            expanded: true,
        }
    }

    pub fn base_layers(&self) -> &[TileLayer] {
        &self.base_layers
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_layer(&self) -> &TileLayer {
        &self.base_layers[self.active]
    }

    /// Activate base layer `index`; out-of-range requests are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.base_layers.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }
}

impl Default for LayerControl {
    fn default() -> Self {
        Self::new(tiles::base_layers(), tiles::DEFAULT_BASE_LAYER)
    }
}
