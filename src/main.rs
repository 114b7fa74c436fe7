use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use quake_map::app::App;
use quake_map::config::Config;
use quake_map::ui;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::time::Duration;

fn main() -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_logging(&config)?;

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, config);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Send log output to the configured file; the terminal belongs to the UI.
/// Without a log file, records are dropped.
fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Handle mouse events for panning, zooming and marker popups
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => {
            app.close_popup();
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        MouseEventKind::Down(MouseButton::Right) => app.inspect(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: Config) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::initialize(config, size.width as usize, size.height as usize)?;
    log::info!("map view initialized");

    loop {
        app.poll_feeds();

        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Esc => {
                        if !app.close_popup() {
                            app.quit();
                        }
                    }
                    KeyCode::Char('q') => app.quit(),

                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    KeyCode::Char(c @ '1'..='4') => app.select_base_layer(c as usize - '1' as usize),
                    KeyCode::Char('t') | KeyCode::Char('T') => app.toggle_plates(),
                    KeyCode::Char('e') | KeyCode::Char('E') => app.toggle_quakes(),
                    KeyCode::Char('p') | KeyCode::Char('P') => app.control.toggle_expanded(),

                    KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width as usize, height as usize),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
