//! Ratatui terminal front end: control loop, grid view, and headless mode.

use std::{
    collections::VecDeque,
    fs::{self, File},
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use life_core::{Rgba, Seed};
use rand::{SeedableRng, rngs::SmallRng};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use serde::Serialize;
use supports_color::{ColorLevel, Stream, on_cached};
use tracing::{info, warn};

use crate::{
    Renderer, RendererContext,
    input::{InputAction, InputController, KeyStates},
};

const DRAW_INTERVAL_MILLIS: u64 = 50;
const EVENT_LOG_CAPACITY: usize = 8;
const DEFAULT_HEADLESS_FRAMES: usize = 12;
const MAX_HEADLESS_FRAMES: usize = 360;
const HEADLESS_COLUMNS: u16 = 80;
const HEADLESS_ROWS: u16 = 36;

pub struct TerminalRenderer {
    draw_interval: Duration,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self {
            draw_interval: Duration::from_millis(DRAW_INTERVAL_MILLIS),
        }
    }
}

impl Renderer for TerminalRenderer {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn run(&self, ctx: RendererContext) -> Result<()> {
        if std::env::var_os("LIFE_HEADLESS").is_some() {
            let report = run_headless(ctx, headless_frame_budget())?;
            info!(
                target = "life::terminal",
                frames = report.summary.frame_count,
                final_generation = report.summary.final_generation,
                final_population = report.summary.final_population,
                "Headless run completed"
            );
            return Ok(());
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to build terminal backend")?;
        terminal.hide_cursor().ok();

        let result = run_event_loop(self, &mut terminal, ctx);

        terminal.show_cursor().ok();
        if let Err(err) = disable_raw_mode() {
            tracing::error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            tracing::error!(?err, "failed to leave alternate screen");
        }

        result
    }
}

fn run_event_loop(
    renderer: &TerminalRenderer,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: RendererContext,
) -> Result<()> {
    let mut app = TerminalApp::new(renderer, ctx);

    loop {
        let now = Instant::now();
        app.maybe_step_simulation(now);

        if now.duration_since(app.last_draw) >= app.draw_interval {
            terminal.draw(|frame| app.draw(frame))?;
            app.last_draw = now;
        }

        let timeout = renderer.draw_interval;
        if event::poll(timeout).unwrap_or(false) {
            if let Event::Key(key) = event::read()?
                && app.handle_key(key)?
            {
                break;
            }
        } else {
            // No input this frame; let every edge trigger see a release.
            app.controller.release_all();
        }
    }

    Ok(())
}

/// Run `frames` simulation/draw cycles against an in-memory backend and
/// return the collected statistics. Writes a JSON report when
/// `LIFE_HEADLESS_REPORT` names a path.
pub fn run_headless(ctx: RendererContext, frames: usize) -> Result<HeadlessReport> {
    let backend = ratatui::backend::TestBackend::new(HEADLESS_COLUMNS, HEADLESS_ROWS);
    let mut terminal = Terminal::new(backend).context("failed to build test backend")?;
    let renderer = TerminalRenderer::default();
    let mut app = TerminalApp::new(&renderer, ctx);
    let mut report = HeadlessReport::new(app.frame_stats());

    for _ in 0..frames {
        app.step_once();
        report.record(app.frame_stats());
        terminal.draw(|frame| app.draw(frame))?;
    }
    report.finalize();

    if let Some(path) = report_file_path_from_env() {
        report
            .write_json(&path)
            .with_context(|| format!("failed to write headless report to {}", path.display()))?;
    }

    Ok(report)
}

fn headless_frame_budget() -> usize {
    std::env::var("LIFE_HEADLESS_FRAMES")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .map(|value| value.min(MAX_HEADLESS_FRAMES))
        .unwrap_or(DEFAULT_HEADLESS_FRAMES)
}

fn report_file_path_from_env() -> Option<PathBuf> {
    std::env::var_os("LIFE_HEADLESS_REPORT").and_then(|raw| {
        if raw.is_empty() {
            None
        } else {
            Some(PathBuf::from(raw))
        }
    })
}

struct TerminalApp {
    world: crate::SharedWorld,
    catalog: crate::SharedCatalog,
    pattern_index: usize,
    controller: InputController,
    rng: SmallRng,
    paused: bool,
    help_visible: bool,
    draw_interval: Duration,
    last_tick: Instant,
    last_draw: Instant,
    palette: Palette,
    event_log: VecDeque<EventEntry>,
    snapshot: Snapshot,
}

impl TerminalApp {
    fn new(renderer: &TerminalRenderer, ctx: RendererContext) -> Self {
        let rng = {
            let world = ctx.world.lock().expect("world mutex poisoned at startup");
            SmallRng::seed_from_u64(world.world_seed())
        };
        let mut app = Self {
            world: Arc::clone(&ctx.world),
            catalog: Arc::clone(&ctx.catalog),
            pattern_index: ctx.pattern_index,
            controller: InputController::default(),
            rng,
            paused: false,
            help_visible: false,
            draw_interval: renderer.draw_interval,
            last_tick: Instant::now(),
            last_draw: Instant::now(),
            palette: Palette::detect(),
            event_log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
            snapshot: Snapshot::default(),
        };
        app.refresh_snapshot();
        app
    }

    fn maybe_step_simulation(&mut self, now: Instant) {
        let delta = now - self.last_tick;
        self.last_tick = now;
        if self.paused {
            return;
        }
        if let Ok(mut world) = self.world.lock() {
            world.advance(delta.as_secs_f32());
        }
        self.refresh_snapshot();
    }

    fn step_once(&mut self) {
        if let Ok(mut world) = self.world.lock() {
            world.step();
        }
        self.refresh_snapshot();
    }

    /// Recompute grid dimensions from the map viewport and the current cell
    /// size; on a change, resize the grid and regenerate the active pattern
    /// at the new dimensions.
    fn ensure_layout(&mut self, inner: Rect) {
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let (current, cell_size, density) = {
            let world = match self.world.lock() {
                Ok(world) => world,
                Err(_) => return,
            };
            (
                (world.grid().width(), world.grid().height()),
                world.cell_size().max(1) as usize,
                world.config().random_fill_density,
            )
        };
        let desired = (
            (inner.width as usize / cell_size).max(1),
            (inner.height as usize / cell_size).max(1),
        );
        if desired == current {
            return;
        }

        if let Ok(mut world) = self.world.lock() {
            world.resize(desired.0, desired.1);
        }
        match self
            .catalog
            .generate(self.pattern_index, desired.0, desired.1, density, &mut self.rng)
        {
            Ok(seed) => self.install_seed(seed),
            Err(err) => {
                warn!(%err, "failed to regenerate pattern after resize");
                self.push_event(EventKind::Error, format!("Reseed failed: {err}"));
            }
        }
        self.refresh_snapshot();
    }

    fn install_seed(&mut self, seed: Seed) {
        let outcome = self.world.lock().ok().map(|mut world| world.apply_seed(seed));
        if let Some(Err(err)) = outcome {
            warn!(%err, "seed rejected");
            self.push_event(EventKind::Error, format!("Seed rejected: {err}"));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            self.controller.release_all();
            return Ok(false);
        }

        if let (KeyCode::Char('?') | KeyCode::Char('h'), _) = (key.code, key.modifiers) {
            self.help_visible = !self.help_visible;
            return Ok(false);
        }

        let mut states = KeyStates::default();
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _)
            | (KeyCode::Char('q'), _)
            | (KeyCode::Char('c'), KeyModifiers::CONTROL) => states.quit = true,
            (KeyCode::Char(' '), _) => states.next_pattern = true,
            (KeyCode::Char('+') | KeyCode::Char('='), _) => states.cell_size_up = true,
            (KeyCode::Char('-') | KeyCode::Char('_'), _) => states.cell_size_down = true,
            (KeyCode::Up, _) => states.speed_up = true,
            (KeyCode::Down, _) => states.speed_down = true,
            (KeyCode::Char('p'), _) => states.toggle_pause = true,
            (KeyCode::Char('s'), _) => states.step_once = true,
            _ => {}
        }

        let mut quit = false;
        for action in self.controller.actions(&states) {
            if self.apply_action(action) {
                quit = true;
            }
        }
        Ok(quit)
    }

    fn apply_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::NextPattern => {
                self.switch_pattern();
            }
            InputAction::CellSizeUp => {
                let size = self.world.lock().ok().map(|mut world| world.adjust_cell_size(1));
                if let Some(size) = size {
                    self.push_event(EventKind::Info, format!("Cell size {size}"));
                }
            }
            InputAction::CellSizeDown => {
                let size = self.world.lock().ok().map(|mut world| world.adjust_cell_size(-1));
                if let Some(size) = size {
                    self.push_event(EventKind::Info, format!("Cell size {size}"));
                }
            }
            InputAction::SpeedUp => {
                let rate = self
                    .world
                    .lock()
                    .ok()
                    .map(|mut world| world.adjust_ticks_per_second(1.0));
                if let Some(rate) = rate {
                    self.push_event(EventKind::Info, format!("Speed {rate:.1} TPS"));
                }
            }
            InputAction::SpeedDown => {
                let rate = self
                    .world
                    .lock()
                    .ok()
                    .map(|mut world| world.adjust_ticks_per_second(-1.0));
                if let Some(rate) = rate {
                    self.push_event(EventKind::Info, format!("Speed {rate:.1} TPS"));
                }
            }
            InputAction::TogglePause => {
                self.paused = !self.paused;
                self.push_event(
                    EventKind::Info,
                    if self.paused { "Paused" } else { "Running" },
                );
            }
            InputAction::StepOnce => {
                self.step_once();
                self.paused = true;
                self.push_event(EventKind::Info, "Single step");
            }
            InputAction::Quit => return true,
        }
        self.refresh_snapshot();
        false
    }

    /// Advance the catalog index and reseed. On failure the index and the
    /// running grid are left untouched.
    fn switch_pattern(&mut self) {
        let next = (self.pattern_index + 1) % self.catalog.len().max(1);
        let (width, height, density) = {
            let world = match self.world.lock() {
                Ok(world) => world,
                Err(_) => return,
            };
            (
                world.grid().width(),
                world.grid().height(),
                world.config().random_fill_density,
            )
        };
        match self.catalog.generate(next, width, height, density, &mut self.rng) {
            Ok(seed) => {
                let name = seed.name().to_owned();
                self.install_seed(seed);
                self.pattern_index = next;
                self.push_event(EventKind::Pattern, format!("Pattern {name}"));
            }
            Err(err) => {
                warn!(%err, index = next, "pattern switch failed; keeping previous pattern");
                self.push_event(EventKind::Error, format!("Switch failed: {err}"));
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(EVENT_LOG_CAPACITY as u16 / 2 + 2),
            ])
            .split(frame.area());

        let map_block = Block::default()
            .title(self.palette.title("Game of Life"))
            .borders(Borders::ALL);
        let inner = map_block.inner(outer[1]);
        self.ensure_layout(inner);
        self.refresh_snapshot();

        self.draw_header(frame, outer[0]);
        frame.render_widget(map_block, outer[1]);
        self.draw_map(frame, inner);
        self.draw_events(frame, outer[2]);

        if self.help_visible {
            self.draw_help(frame);
        }
    }

    fn draw_header(&self, frame: &mut Frame<'_>, area: Rect) {
        let snapshot = &self.snapshot;
        let status = format!(
            "Gen {:>6}  Pattern {:<16}  Pop {:>6}  Cell {:>2}  {:>4.1} TPS",
            snapshot.generation,
            snapshot.pattern_name,
            snapshot.population,
            snapshot.cell_size,
            snapshot.ticks_per_second,
        );
        let state_flag = if self.paused {
            Span::styled(" PAUSED ", self.palette.paused_style())
        } else {
            Span::styled(" RUNNING ", self.palette.running_style())
        };
        let mut line = Line::from(vec![Span::styled(status, self.palette.header_style())]);
        line.spans.push(Span::raw("  "));
        line.spans.push(state_flag);
        line.spans.push(Span::raw("  press ? or h for help"));

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .title(self.palette.title("Life Terminal"))
                .borders(Borders::ALL),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_map(&self, frame: &mut Frame<'_>, inner: Rect) {
        if inner.width == 0 || inner.height == 0 {
            return;
        }
        let snapshot = &self.snapshot;
        if snapshot.width == 0 || snapshot.height == 0 {
            return;
        }
        let cell_size = snapshot.cell_size.max(1) as usize;

        let mut lines = Vec::with_capacity(inner.height as usize);
        for ty in 0..inner.height as usize {
            let gy = ty / cell_size;
            let mut spans = Vec::with_capacity(inner.width as usize);
            for tx in 0..inner.width as usize {
                let gx = tx / cell_size;
                let alive = gx < snapshot.width
                    && gy < snapshot.height
                    && snapshot.cells[gy * snapshot.width + gx];
                if alive {
                    let color = snapshot.colors[gy * snapshot.width + gx];
                    spans.push(Span::styled("█", self.palette.cell_style(color)));
                } else {
                    spans.push(Span::raw(" "));
                }
            }
            lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_events(&self, frame: &mut Frame<'_>, area: Rect) {
        let events: Vec<ListItem> = self
            .event_log
            .iter()
            .rev()
            .map(|entry| {
                let style = self.palette.event_style(entry.kind);
                let text = format!("[g{:>6}] {}", entry.generation, entry.message);
                ListItem::new(Span::styled(text, style))
            })
            .collect();
        let block = Block::default()
            .title(self.palette.title("Events"))
            .borders(Borders::ALL);
        frame.render_widget(List::new(events).block(block), area);
    }

    fn draw_help(&self, frame: &mut Frame<'_>) {
        let size = frame.area();
        let width = (size.width / 2).max(30).min(size.width);
        let height = 11.min(size.height);
        let area = Rect::new(
            size.x + (size.width.saturating_sub(width)) / 2,
            size.y + (size.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        let help_lines = vec![
            Line::from(vec![Span::styled(
                "Controls",
                self.palette.header_style().add_modifier(Modifier::BOLD),
            )]),
            Line::raw(" q / Esc  Quit"),
            Line::raw(" space    Next pattern"),
            Line::raw(" + / -    Cell size"),
            Line::raw(" Up/Down  Tick speed"),
            Line::raw(" p        Toggle pause"),
            Line::raw(" s        Single step"),
            Line::raw(" ? / h    Toggle this help"),
        ];
        let paragraph = Paragraph::new(help_lines).block(
            Block::default()
                .title(self.palette.title("Help"))
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Black).fg(Color::White)),
        );
        frame.render_widget(paragraph, area);
    }

    fn push_event(&mut self, kind: EventKind, message: impl Into<String>) {
        if self.event_log.len() >= EVENT_LOG_CAPACITY {
            self.event_log.pop_front();
        }
        self.event_log.push_back(EventEntry {
            generation: self.snapshot.generation,
            kind,
            message: message.into(),
        });
    }

    fn refresh_snapshot(&mut self) {
        if let Ok(world) = self.world.lock() {
            self.snapshot = Snapshot::from_world(&world);
        }
    }

    fn frame_stats(&self) -> FrameStats {
        FrameStats {
            generation: self.snapshot.generation,
            population: self.snapshot.population,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Snapshot {
    generation: u64,
    population: usize,
    pattern_name: String,
    cell_size: u32,
    ticks_per_second: f32,
    width: usize,
    height: usize,
    cells: Vec<bool>,
    colors: Vec<Rgba>,
}

impl Snapshot {
    fn from_world(world: &life_core::LifeWorld) -> Self {
        let grid = world.grid();
        Self {
            generation: world.generation().0,
            population: grid.population(),
            pattern_name: world.pattern_name().to_owned(),
            cell_size: world.cell_size(),
            ticks_per_second: world.ticks_per_second(),
            width: grid.width(),
            height: grid.height(),
            cells: grid.cells().to_vec(),
            colors: grid.colors().to_vec(),
        }
    }
}

#[derive(Clone, Debug)]
struct EventEntry {
    generation: u64,
    message: String,
    kind: EventKind,
}

#[derive(Clone, Copy, Debug)]
enum EventKind {
    Pattern,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    pub initial: FrameStats,
    pub frames: Vec<FrameStats>,
    pub summary: ReportSummary,
}

impl HeadlessReport {
    fn new(initial: FrameStats) -> Self {
        Self {
            initial,
            frames: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    fn record(&mut self, stats: FrameStats) {
        self.frames.push(stats);
    }

    fn finalize(&mut self) {
        self.summary = ReportSummary::from(&self.initial, &self.frames);
    }

    fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self).context("failed to serialize headless report")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FrameStats {
    pub generation: u64,
    pub population: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportSummary {
    pub frame_count: usize,
    pub final_generation: u64,
    pub final_population: usize,
    pub population_min: usize,
    pub population_max: usize,
}

impl ReportSummary {
    fn from(initial: &FrameStats, frames: &[FrameStats]) -> Self {
        let Some(last) = frames.last() else {
            return Self {
                frame_count: 0,
                final_generation: initial.generation,
                final_population: initial.population,
                population_min: initial.population,
                population_max: initial.population,
            };
        };
        let population_min = frames.iter().map(|f| f.population).min().unwrap_or(0);
        let population_max = frames.iter().map(|f| f.population).max().unwrap_or(0);
        Self {
            frame_count: frames.len(),
            final_generation: last.generation,
            final_population: last.population,
            population_min,
            population_max,
        }
    }
}

struct Palette {
    level: Option<ColorLevel>,
}

impl Palette {
    fn detect() -> Self {
        Self {
            level: on_cached(Stream::Stdout),
        }
    }

    fn header_style(&self) -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    fn paused_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    fn running_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    fn title<T: Into<String>>(&self, title: T) -> Span<'static> {
        Span::styled(title.into(), self.header_style())
    }

    fn event_style(&self, kind: EventKind) -> Style {
        let color = match kind {
            EventKind::Pattern => Color::Green,
            EventKind::Info => Color::Cyan,
            EventKind::Error => Color::Red,
        };
        Style::default().fg(color)
    }

    /// Map a cell color to the best representation the terminal supports.
    fn cell_style(&self, color: Rgba) -> Style {
        let fg = match self.level {
            Some(level) if level.has_16m => Color::Rgb(color.r, color.g, color.b),
            Some(level) if level.has_256 => Color::Indexed(ansi256_from_rgb(color)),
            _ => Color::White,
        };
        Style::default().fg(fg)
    }
}

/// Nearest entry in the 6x6x6 color cube of the 256-color palette.
fn ansi256_from_rgb(color: Rgba) -> u8 {
    let scale = |channel: u8| (channel as u16 * 5 / 255) as u8;
    16 + 36 * scale(color.r) + 6 * scale(color.g) + scale(color.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{LifeConfig, LifeWorld};
    use life_patterns::{PatternCatalog, PatternEntry};
    use std::sync::Mutex;

    fn context(catalog: PatternCatalog) -> RendererContext {
        let config = LifeConfig {
            grid_width: 16,
            grid_height: 12,
            rng_seed: Some(42),
            ..LifeConfig::default()
        };
        let mut world = LifeWorld::new(config);
        let mut rng = SmallRng::seed_from_u64(42);
        let seed = catalog
            .generate(1, 16, 12, 0.2, &mut rng)
            .expect("builtin preset");
        world.apply_seed(seed).expect("seed");
        RendererContext {
            world: Arc::new(Mutex::new(world)),
            catalog: Arc::new(catalog),
            pattern_index: 1,
        }
    }

    #[test]
    fn snapshot_reflects_world_state() {
        let renderer = TerminalRenderer::default();
        let app = TerminalApp::new(&renderer, context(PatternCatalog::builtin()));
        assert_eq!(app.snapshot.width, 16);
        assert_eq!(app.snapshot.height, 12);
        assert_eq!(app.snapshot.pattern_name, "glider");
        assert_eq!(app.snapshot.population, 5);
    }

    #[test]
    fn pattern_switch_failure_keeps_previous_state() {
        // A catalog whose next entry points at a missing file: switching
        // must leave the index and the running grid untouched.
        let missing = std::path::PathBuf::from("/nonexistent/pattern.rle");
        let catalog =
            PatternCatalog::from_entries(vec![PatternEntry::Random, PatternEntry::File(missing)]);

        let renderer = TerminalRenderer::default();
        let ctx = {
            let config = LifeConfig {
                grid_width: 10,
                grid_height: 10,
                rng_seed: Some(7),
                ..LifeConfig::default()
            };
            let mut world = LifeWorld::new(config);
            let mut rng = SmallRng::seed_from_u64(7);
            let seed = life_patterns::random_seed(10, 10, 0.3, &mut rng);
            world.apply_seed(seed).expect("seed");
            RendererContext {
                world: Arc::new(Mutex::new(world)),
                catalog: Arc::new(catalog),
                pattern_index: 0,
            }
        };
        let mut app = TerminalApp::new(&renderer, ctx);
        let cells_before = app.snapshot.cells.clone();

        app.switch_pattern();

        assert_eq!(app.pattern_index, 0);
        assert_eq!(app.snapshot.cells, cells_before);
        assert!(matches!(
            app.event_log.back().map(|e| e.kind),
            Some(EventKind::Error)
        ));
    }

    #[test]
    fn headless_run_advances_generations() {
        let report =
            run_headless(context(PatternCatalog::builtin()), 6).expect("headless run");
        assert_eq!(report.summary.frame_count, 6);
        assert_eq!(report.summary.final_generation, 6);
    }

    #[test]
    fn both_help_keys_toggle_the_overlay() {
        let renderer = TerminalRenderer::default();
        let mut app = TerminalApp::new(&renderer, context(PatternCatalog::builtin()));
        assert!(!app.help_visible);

        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        app.handle_key(press(KeyCode::Char('?'))).expect("key");
        assert!(app.help_visible);
        app.handle_key(press(KeyCode::Char('h'))).expect("key");
        assert!(!app.help_visible);
    }

    #[test]
    fn headless_report_serializes_to_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("report.json");
        let report = run_headless(context(PatternCatalog::builtin()), 3).expect("headless run");
        report.write_json(&path).expect("write report");

        let raw = std::fs::read_to_string(&path).expect("read report");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed["summary"]["frame_count"], 3);
    }

    #[test]
    fn ansi_cube_mapping_hits_extremes() {
        assert_eq!(ansi256_from_rgb(Rgba::opaque(0, 0, 0)), 16);
        assert_eq!(ansi256_from_rgb(Rgba::opaque(255, 255, 255)), 231);
    }
}
