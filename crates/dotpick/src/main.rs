mod editor;
mod logging;
mod sequencer;
mod surface;

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dotpick_config::{Config, NameStore};
use dotpick_core::Surface;
use dotpick_field::{Field, Fireworks};
use dotpick_shapes::{ImageTicket, ShapeBuilder};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Stylize},
    text::Line,
    widgets::Paragraph,
};
use tracing::{debug, info, warn};

use crate::editor::NameEditor;
use crate::sequencer::{Cue, Sequencer};
use crate::surface::TerminalSurface;

const READY_TEXT: &str = "Ready!";
const EMPTY_TEAM_TEXT: &str = "Click ? to add team";

/// Share of the grid covered by the `o` and `r` shapes.
const CIRCLE_FRACTION: f64 = 0.8;
const RECTANGLE_WIDTH_FRACTION: f64 = 0.5;
const RECTANGLE_HEIGHT_FRACTION: f64 = 0.4;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::load();
    let log_path = logging::init(&config.log_level).ok();
    info!(log = ?log_path, "starting dotpick");

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Config changed since startup and should be written back.
    config_dirty: bool,
    /// Where names are persisted, if a home directory exists.
    store: Option<NameStore>,
    team: Vec<String>,
    field: Field,
    shapes: ShapeBuilder,
    sequencer: Sequencer,
    fireworks: Fireworks,
    surface: TerminalSurface,
    /// Open name editor, if any.
    editor: Option<NameEditor>,
    /// Last reported condition, shown above the help bar.
    status: Option<String>,
    /// Image shape the field is waiting for.
    pending_image: Option<ImageTicket>,
    rng: StdRng,
    started: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let store = match NameStore::open_default() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "names will not be persisted");
                None
            }
        };
        let team = store.as_ref().map(NameStore::load).unwrap_or_default();
        let surface = TerminalSurface::new(config.cell_width_px, config.cell_height_px);
        let area = surface.area();

        let mut field = Field::new(area);
        field.set_color(config.dot_theme.color());

        Self {
            running: false,
            config_dirty: false,
            store,
            team,
            field,
            shapes: ShapeBuilder::new(config.gap, area),
            sequencer: Sequencer::new(config.settle_timeout_ms),
            fireworks: Fireworks::new(),
            surface,
            editor: None,
            status: None,
            pending_image: None,
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            config,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let size = terminal.size()?;
        self.resize(size.width, size.height);
        self.show_initial_shape();

        let frame_interval = self.config.frame_interval();
        while self.running {
            let frame_start = Instant::now();
            self.step(self.elapsed_ms());
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(frame_interval.saturating_sub(frame_start.elapsed()))?;
        }

        if self.config_dirty {
            if let Err(e) = self.config.save() {
                warn!(error = %e, "failed to save config");
            }
        }
        info!("exiting");
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Fit the drawing surface to a terminal of `width x height` cells.
    fn resize(&mut self, width: u16, height: u16) {
        // Two rows are taken by the status and help lines.
        self.surface.resize(width, height.saturating_sub(2));
        let area = self.surface.area();
        debug!(width = area.width, height = area.height, "resized");
        self.field.set_area(area);
        self.shapes.fit(area);
    }

    fn show_initial_shape(&mut self) {
        let text = if self.team.is_empty() {
            EMPTY_TEAM_TEXT
        } else {
            READY_TEXT
        };
        self.show_text(text, false);
    }

    fn show_text(&mut self, text: &str, fast: bool) {
        let shape = self.shapes.letter(text);
        self.field.switch_shape(&shape, fast);
    }

    /// Advance one frame: images, particles, fireworks, then the sequencer.
    fn step(&mut self, now_ms: u64) {
        for (ticket, shape) in self.shapes.poll_images() {
            if self.pending_image == Some(ticket) {
                self.pending_image = None;
                self.status = None;
                self.field.switch_shape(&shape, false);
            }
        }

        self.surface.clear();
        self.field.render_frame(&mut self.surface);
        self.fireworks.update(now_ms);
        self.fireworks.draw(&mut self.surface, now_ms);

        let settled = self.field.is_settled(self.config.settle_threshold);
        for cue in self.sequencer.tick(now_ms, settled) {
            self.apply(cue, now_ms);
        }
    }

    fn apply(&mut self, cue: Cue, now_ms: u64) {
        match cue {
            Cue::Show { text, fast } => self.show_text(&text, fast),
            Cue::Fireworks => {
                let area = self.surface.area();
                self.fireworks.launch(area, now_ms, &mut self.rng);
            }
            Cue::Finished => self.status = None,
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let color = self.theme_color();
        let chunks = Layout::vertical([
            Constraint::Fill(1),   // Dots
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(frame.area());

        frame.render_widget(Paragraph::new(self.surface.lines()), chunks[0]);

        if let Some(status) = &self.status {
            frame.render_widget(Line::from(status.as_str().fg(color)).centered(), chunks[1]);
        }

        let help = Line::from(vec![
            "q".bold().fg(color),
            " quit  ".dark_gray(),
            "p".bold().fg(color),
            " pick  ".dark_gray(),
            "?".bold().fg(color),
            " team  ".dark_gray(),
            "o r i".bold().fg(color),
            " shapes  ".dark_gray(),
            "s".bold().fg(color),
            " shuffle  ".dark_gray(),
            "t".bold().fg(color),
            " theme".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[2]);

        if let Some(editor) = &self.editor {
            editor.render(frame, chunks[0], color);
        }
    }

    fn theme_color(&self) -> Color {
        let (r, g, b) = self.config.dot_theme.color().over_black();
        Color::Rgb(r, g, b)
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        if self.editor.is_some() {
            self.on_editor_key(key);
            return;
        }
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('p') | KeyCode::Char(' ') | KeyCode::Enter) => self.pick(),
            (_, KeyCode::Char('?')) => self.open_editor(),
            (_, KeyCode::Char('o')) => self.show_circle(),
            (_, KeyCode::Char('r')) => self.show_rectangle(),
            (_, KeyCode::Char('i')) => self.show_image(),
            (_, KeyCode::Char('s')) => self.field.shuffle_idle(),
            (_, KeyCode::Char('t')) => self.cycle_theme(),
            _ => {}
        }
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (KeyModifiers::CONTROL, KeyCode::Char('s') | KeyCode::Char('S')) => self.save_names(),
            (_, KeyCode::Esc) => self.editor = None,
            (_, code) => {
                if let Some(editor) = self.editor.as_mut() {
                    match code {
                        KeyCode::Enter => editor.newline(),
                        KeyCode::Backspace => editor.backspace(),
                        KeyCode::Char(ch) => editor.insert(ch),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Start a selection unless one is already running.
    fn pick(&mut self) {
        if self.sequencer.is_active() {
            debug!("selection already running");
            return;
        }
        let now = self.elapsed_ms();
        match self.sequencer.start(&self.team, now, &mut self.rng) {
            Ok(cues) => {
                self.status = None;
                self.pending_image = None;
                for cue in cues {
                    self.apply(cue, now);
                }
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Open the team editor, abandoning any selection in progress.
    fn open_editor(&mut self) {
        self.sequencer.cancel();
        self.fireworks.clear();
        self.pending_image = None;
        self.show_text("", false);

        let raw = self
            .store
            .as_ref()
            .and_then(NameStore::load_raw)
            .unwrap_or_else(|| self.team.join("\n"));
        self.editor = Some(NameEditor::new(raw));
    }

    fn save_names(&mut self) {
        let Some(editor) = &self.editor else {
            return;
        };
        let raw = editor.text().to_string();

        let result = match &self.store {
            Some(store) => store.save(&raw),
            None => {
                let names = dotpick_config::parse_names(&raw);
                if names.is_empty() {
                    Err(dotpick_config::ConfigError::NoNames)
                } else {
                    Ok(names)
                }
            }
        };

        match result {
            Ok(names) => {
                info!(count = names.len(), "team saved");
                self.team = names;
                self.editor = None;
                self.status = None;
                self.show_text(READY_TEXT, false);
            }
            Err(e) => {
                warn!(error = %e, "failed to save team");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Stop any selection before drawing a shape by hand.
    fn interrupt(&mut self) {
        self.sequencer.cancel();
        self.pending_image = None;
        self.status = None;
    }

    fn show_circle(&mut self) {
        self.interrupt();
        let (width, height) = self.shapes.raster_size();
        let cells = (width.min(height) as f64 / f64::from(self.shapes.gap())) * CIRCLE_FRACTION;
        let shape = self.shapes.circle(cells.floor());
        self.field.switch_shape(&shape, false);
    }

    fn show_rectangle(&mut self) {
        self.interrupt();
        let (width, height) = self.shapes.raster_size();
        let gap = f64::from(self.shapes.gap());
        let columns = (width as f64 / gap * RECTANGLE_WIDTH_FRACTION) as u32;
        let rows = (height as f64 / gap * RECTANGLE_HEIGHT_FRACTION) as u32;
        let shape = self.shapes.rectangle(columns, rows);
        self.field.switch_shape(&shape, false);
    }

    fn show_image(&mut self) {
        self.interrupt();
        match self.config.image_source.clone() {
            Some(source) => {
                self.pending_image = Some(self.shapes.image(&source));
                self.status = Some(format!("Loading {source}"));
            }
            None => self.status = Some("Set image_source in config.toml".to_string()),
        }
    }

    fn cycle_theme(&mut self) {
        self.config.dot_theme = self.config.dot_theme.next();
        self.config_dirty = true;
        self.field.set_color(self.config.dot_theme.color());
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
