use crate::config::Config;
use crate::control::LayerControl;
use crate::data;
use crate::error::Result;
use crate::feeds::{FeedEvent, FeedKind, FeedLoader};
use crate::map::{Lod, MapRenderer, OverlayGroup, Overlays, Viewport};
use crate::ui;
use crossbeam_channel::{unbounded, Receiver};
use ratatui::layout::{Position, Rect};

/// An open marker popup, anchored at a terminal cell
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub col: u16,
    pub row: u16,
    pub lines: Vec<String>,
}

/// Application state
pub struct App {
    pub config: Config,
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub control: LayerControl,
    pub overlays: Overlays,
    pub popup: Option<Popup>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    feed_rx: Option<Receiver<FeedEvent>>,
}

impl App {
    /// Map view with its base layers registered and both overlay groups
    /// attached empty. Nothing is fetched.
    pub fn new(config: Config, width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = canvas_pixels(width, height);
        let (lat, lon) = config.center;

        let mut app = Self {
            viewport: Viewport::from_level(lon, lat, config.zoom, pixel_width, pixel_height),
            config,
            map_renderer: MapRenderer::new(),
            control: LayerControl::default(),
            overlays: Overlays::new(),
            popup: None,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            feed_rx: None,
        };
        app.clamp_to_layer();
        app
    }

    /// Build the map view, load the outline backdrop and issue both feed
    /// fetches. Returns immediately; overlays fill in as responses arrive.
    pub fn initialize(config: Config, width: usize, height: usize) -> Result<Self> {
        let mut app = Self::new(config, width, height);

        data::load_outlines(&mut app.map_renderer, &app.config.data_dir);
        if !app.map_renderer.has_data() {
            data::generate_simple_world(&mut app.map_renderer);
        }

        let (tx, rx) = unbounded();
        FeedLoader::new(tx)?.start_all(&app.config);
        app.feed_rx = Some(rx);

        Ok(app)
    }

    /// Apply any feed results that arrived since the last frame
    pub fn poll_feeds(&mut self) -> usize {
        let events: Vec<FeedEvent> = match &self.feed_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return 0,
        };
        let count = events.len();
        for event in events {
            self.apply_feed(event);
        }
        count
    }

    /// Populate the overlay group matching the event. A failed fetch leaves
    /// the group empty for the rest of the session.
    pub fn apply_feed(&mut self, event: FeedEvent) {
        match (event.kind, event.result) {
            (FeedKind::TectonicPlates, Ok(geojson)) => {
                let n = self.overlays.populate_plates(&geojson);
                log::debug!("plate overlay populated with {} lines", n);
            }
            (FeedKind::Earthquakes, Ok(geojson)) => {
                let n = self.overlays.populate_quakes(&geojson);
                log::debug!("earthquake overlay populated with {} markers", n);
            }
            (FeedKind::TectonicPlates, Err(_)) => self.overlays.plates.abandon(),
            (FeedKind::Earthquakes, Err(_)) => self.overlays.quakes.abandon(),
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = canvas_pixels(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
    }

    /// Return to the startup center and zoom
    pub fn reset_view(&mut self) {
        let (lat, lon) = self.config.center;
        self.viewport = Viewport::from_level(lon, lat, self.config.zoom, self.viewport.width, self.viewport.height);
        self.popup = None;
        self.clamp_to_layer();
    }

    /// Activate base layer `index` (registration order)
    pub fn select_base_layer(&mut self, index: usize) {
        if self.control.select(index) {
            log::debug!("base layer: {}", self.control.active_layer().name);
            self.clamp_to_layer();
        }
    }

    pub fn toggle_plates(&mut self) {
        self.overlays.plates.toggle();
    }

    pub fn toggle_quakes(&mut self) {
        self.overlays.quakes.toggle();
        self.popup = None;
    }

    fn clamp_to_layer(&mut self) {
        let layer = self.control.active_layer();
        self.viewport.clamp_level(layer.min_zoom as f64, layer.max_zoom as f64);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.clamp_to_layer();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.clamp_to_layer();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.clamp_to_layer();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.clamp_to_layer();
    }

    /// Map area inside the border, in terminal cells
    pub fn map_area(&self) -> Rect {
        Rect::new(1, 1, (self.viewport.width / 2) as u16, (self.viewport.height / 4) as u16)
    }

    /// Open the popup of the quake marker under a screen position.
    /// Clicking empty map closes any open popup; clicks on the layer panel
    /// or the legend are ignored.
    pub fn inspect(&mut self, col: u16, row: u16) {
        let cell = Position::new(col, row);
        if ui::panel_rects(self, self.map_area()).iter().any(|rect| rect.contains(cell)) {
            return;
        }

        let (px, py) = cell_to_pixel(col, row);
        self.popup = self
            .overlays
            .quake_at(&self.viewport, px, py)
            .map(|marker| Popup {
                col,
                row,
                lines: marker.popup_lines(),
            });
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.take().is_some()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.level())
    }

    /// Current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Current outline LOD as a string
    pub fn lod_level(&self) -> &'static str {
        match Lod::from_zoom(self.viewport.zoom) {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in Braille pixel coordinates (for the cursor marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }
}

/// Short overlay state for the status bar: pending, or the item count
pub fn overlay_status<T>(group: &OverlayGroup<T>) -> String {
    if group.is_pending() {
        "…".to_string()
    } else {
        group.len().to_string()
    }
}

/// Braille canvas size for a terminal of `width` x `height` cells.
/// Accounts for the map border and the status bar.
fn canvas_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(3);
    (inner_width * 2, inner_height * 4)
}

/// Terminal cell to Braille pixel, skipping the 1-cell border
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col.saturating_sub(1) as i32) * 2;
    let py = (row.saturating_sub(1) as i32) * 4;
    (px, py)
}
