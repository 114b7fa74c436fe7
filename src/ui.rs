use crate::app::{overlay_status, App, Popup};
use crate::braille::BrailleCanvas;
use crate::map::{MapLayers, PlateLine};
use crate::style::{legend_rows, to_terminal_color, DEPTH_COLORS};
use crate::tiles::Basemap;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Terminal colors standing in for a base layer's imagery
struct Palette {
    background: Option<Color>,
    coastline: Color,
    border: Color,
}

fn palette(basemap: Basemap) -> Palette {
    match basemap {
        Basemap::Street => Palette {
            background: None,
            coastline: Color::Cyan,
            border: Color::Gray,
        },
        Basemap::Satellite => Palette {
            background: Some(Color::Rgb(8, 24, 48)),
            coastline: Color::Rgb(120, 170, 90),
            border: Color::Rgb(90, 120, 70),
        },
        Basemap::Dark => Palette {
            background: Some(Color::Black),
            coastline: Color::DarkGray,
            border: Color::Rgb(60, 60, 60),
        },
        Basemap::Night => Palette {
            background: Some(Color::Rgb(4, 4, 16)),
            coastline: Color::Rgb(200, 170, 80),
            border: Color::Rgb(90, 80, 40),
        },
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let inner = render_map(frame, app, chunks[0]);
    let [control, legend] = panel_rects(app, inner);
    render_layer_control(frame, app, control);
    render_legend(frame, legend);
    if let Some(popup) = &app.popup {
        render_popup(frame, popup, inner);
    }
    render_status_bar(frame, app, chunks[1]);
}

/// Draws the bordered map and returns the inner area
fn render_map(frame: &mut Frame, app: &App, area: Rect) -> Rect {
    let layer = app.control.active_layer();
    let colors = palette(layer.basemap);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" Earthquakes · {} ", layer.name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    if let Some(bg) = colors.background {
        block = block.style(Style::default().bg(bg));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport, &app.overlays);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(
        MapWidget {
            layers,
            palette: colors,
            cursor_pos,
        },
        inner,
    );

    inner
}

/// Braille map layers drawn back to front, each in its own color
struct MapWidget {
    layers: MapLayers,
    palette: Palette,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(ch) = canvas.glyph(col as usize, row as usize) {
                    buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.coastlines, self.palette.coastline, area, buf);
        Self::render_layer(&self.layers.borders, self.palette.border, area, buf);
        Self::render_layer(&self.layers.plates, to_terminal_color(PlateLine::COLOR), area, buf);

        // Shallow bands first so deeper quakes end up on top
        for (canvas, css) in self.layers.quakes.iter().zip(DEPTH_COLORS) {
            Self::render_layer(canvas, to_terminal_color(css), area, buf);
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

/// Screen rects of the layer panel and the depth legend inside `map`
pub fn panel_rects(app: &App, map: Rect) -> [Rect; 2] {
    let control_rows = if app.control.expanded {
        // Two headings, the base layers and both overlays
        2 + app.control.base_layers().len() + 2
    } else {
        1
    };
    [
        top_right(map, 22, control_rows),
        bottom_right(map, 19, legend_rows().len()),
    ]
}

/// Bordered panel of `rows` text lines in the top right corner
fn top_right(map: Rect, width: u16, rows: usize) -> Rect {
    let width = width.min(map.width);
    let height = (rows as u16 + 2).min(map.height);
    Rect {
        x: map.x + map.width - width,
        y: map.y,
        width,
        height,
    }
}

/// Bordered panel of `rows` text lines in the bottom right corner
fn bottom_right(map: Rect, width: u16, rows: usize) -> Rect {
    let width = width.min(map.width);
    let height = (rows as u16 + 2).min(map.height);
    Rect {
        x: map.x + map.width - width,
        y: map.y + map.height - height,
        width,
        height,
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
}

/// Base layer / overlay switcher, top right of the map
fn render_layer_control(frame: &mut Frame, app: &App, rect: Rect) {
    let label = Style::default().fg(Color::White);
    let key = Style::default().fg(Color::DarkGray);

    let lines: Vec<Line> = if app.control.expanded {
        let mut lines = vec![Line::from(Span::styled(
            "Base layers",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, layer) in app.control.base_layers().iter().enumerate() {
            let mark = if i == app.control.active_index() { "◉ " } else { "○ " };
            lines.push(Line::from(vec![
                Span::styled(format!("{}", i + 1), key),
                Span::raw(" "),
                Span::styled(mark, Style::default().fg(Color::Green)),
                Span::styled(layer.name, label),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "Overlays",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        let overlays = [
            ("t", app.overlays.plates.name, app.overlays.plates.visible),
            ("e", app.overlays.quakes.name, app.overlays.quakes.visible),
        ];
        for (k, name, visible) in overlays {
            lines.push(Line::from(vec![
                Span::styled(k, key),
                Span::raw(" "),
                Span::styled(if visible { "☑ " } else { "☐ " }, Style::default().fg(Color::Green)),
                Span::styled(name, label),
            ]));
        }
        lines
    } else {
        vec![Line::from(vec![
            Span::styled("p", key),
            Span::raw(" ≡ "),
            Span::styled(app.control.active_layer().name, label),
        ])]
    };

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(panel(" Layers ")), rect);
}

/// Depth legend, bottom right of the map
fn render_legend(frame: &mut Frame, rect: Rect) {
    let lines: Vec<Line> = legend_rows()
        .into_iter()
        .map(|row| {
            Line::from(vec![
                Span::styled("██", Style::default().fg(to_terminal_color(row.color))),
                Span::raw(" "),
                Span::raw(row.label),
            ])
        })
        .collect();

    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines).block(panel(" Depth ")), rect);
}

/// Marker popup next to where it was opened, kept inside the map
fn render_popup(frame: &mut Frame, popup: &Popup, map: Rect) {
    let text_width = popup.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let width = (text_width + 2).min(map.width);
    let height = (popup.lines.len() as u16 + 2).min(map.height);

    let x = (popup.col + 2).clamp(map.x, map.x + map.width - width);
    let y = popup.row.clamp(map.y, map.y + map.height - height);
    let rect = Rect { x, y, width, height };

    let lines: Vec<Line> = popup.lines.iter().map(|l| Line::from(l.as_str())).collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        ),
        rect,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let layer = app.control.active_layer();
    let tiles = layer.tile_range(&app.viewport);
    let dim = Style::default().fg(Color::DarkGray);

    let status = Line::from(vec![
        Span::styled(" ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", dim),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", dim),
        Span::styled("plates ", dim),
        Span::styled(overlay_status(&app.overlays.plates), Style::default().fg(Color::Green)),
        Span::styled(" quakes ", dim),
        Span::styled(overlay_status(&app.overlays.quakes), Style::default().fg(Color::Green)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!(
                " | tiles z{} x{}-{} y{}-{} | ",
                tiles.z, tiles.x.0, tiles.x.1, tiles.y.0, tiles.y.1
            ),
            dim,
        ),
        Span::styled(layer.plain_attribution(), dim),
        Span::styled(" | 1-4 t e p r q", dim),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_panels_are_drawn() {
        let app = App::new(Config::default(), 100, 30);
        let screen = draw(&app);
        assert!(screen.contains("Street Map"));
        assert!(screen.contains("Satellite View"));
        assert!(screen.contains("Tectonic Plates"));
        assert!(screen.contains("-10km to 10km"));
        assert!(screen.contains("90+"));
    }

    #[test]
    fn test_panel_rects_match_drawn_panels() {
        let app = App::new(Config::default(), 100, 30);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        let buffer = terminal.backend().buffer().clone();

        let [control, legend] = panel_rects(&app, app.map_area());
        assert_eq!(control, Rect::new(77, 1, 22, 10));
        assert_eq!(legend, Rect::new(80, 20, 19, 8));
        assert_eq!(buffer[(control.x, control.y)].symbol(), "┌");
        assert_eq!(buffer[(legend.x, legend.y)].symbol(), "┌");
        assert_eq!(buffer[(legend.x + legend.width - 1, legend.y + legend.height - 1)].symbol(), "┘");
    }

    #[test]
    fn test_collapsed_control() {
        let mut app = App::new(Config::default(), 100, 30);
        app.control.toggle_expanded();
        let screen = draw(&app);
        assert!(!screen.contains("Satellite View"));
        assert!(screen.contains("Street Map"));
    }

    #[test]
    fn test_popup_is_drawn() {
        let mut app = App::new(Config::default(), 100, 30);
        app.popup = Some(Popup {
            col: 10,
            row: 5,
            lines: vec!["Magnitude: 5.2".into(), "Depth: 45".into(), "Location: X".into()],
        });
        let screen = draw(&app);
        assert!(screen.contains("Magnitude: 5.2"));
    }
}
