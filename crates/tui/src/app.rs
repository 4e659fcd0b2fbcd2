use crate::input::{InputEvent, InputHandler};
use crate::ui::{ColorScheme, Footer, HelpOverlay, Layout, SensorTable, TopBar};
use crate::view::{self, Row};
use log::debug;
use sensmon_core::{Config, MetricsCollector, MonitorSnapshot, SamplingLoop, TemperatureUnit, Theme};
use std::time::{Duration, Instant};

/// Application state
pub struct App {
    sampler: SamplingLoop,
    input_handler: InputHandler,

    // UI state
    colors: ColorScheme,
    layout: Layout,
    theme: Theme,
    no_color: bool,
    unit: TemperatureUnit,

    // Data
    snapshot: Option<MonitorSnapshot>,
    rows: Vec<Row>,
    refresh_interval: Duration,

    scroll: usize,
    show_help: bool,
    quit_requested: bool,
    clear_pending: bool,
}

impl App {
    pub fn new(config: &Config, collector: MetricsCollector) -> anyhow::Result<Self> {
        let layout = Layout::new()?;
        Ok(Self::with_layout(config, collector, layout))
    }

    pub fn with_layout(config: &Config, collector: MetricsCollector, layout: Layout) -> Self {
        let refresh_interval = config.refresh_interval();

        Self {
            sampler: SamplingLoop::new(collector, refresh_interval),
            input_handler: InputHandler::new(),
            colors: ColorScheme::new(&config.theme, config.no_color),
            layout,
            theme: config.theme,
            no_color: config.no_color,
            unit: config.temperature_unit,
            snapshot: None,
            rows: Vec::new(),
            refresh_interval,
            scroll: 0,
            show_help: false,
            quit_requested: false,
            clear_pending: true,
        }
    }

    /// Main application loop; the sampling thread is stopped before returning
    pub fn run<W: std::io::Write>(&mut self, writer: &mut W) -> anyhow::Result<()> {
        self.setup_terminal()?;
        let _terminal_guard = TerminalGuard;

        self.sampler.start()?;
        let result = self.event_loop(writer);
        self.sampler.stop();
        result
    }

    fn event_loop<W: std::io::Write>(&mut self, writer: &mut W) -> anyhow::Result<()> {
        self.update_data();
        self.render(writer)?;

        let mut last_refresh = Instant::now();

        while !self.quit_requested {
            let timeout = self
                .refresh_interval
                .checked_sub(last_refresh.elapsed())
                .unwrap_or(Duration::from_millis(10));

            let event = self.input_handler.poll_event(timeout)?;
            let needs_redraw = !matches!(event, InputEvent::Tick | InputEvent::Unknown | InputEvent::Quit);
            self.handle_event(event);
            if needs_redraw {
                self.render(writer)?;
            }

            if last_refresh.elapsed() >= self.refresh_interval {
                self.update_data();
                self.render(writer)?;
                last_refresh = Instant::now();
            }
        }

        Ok(())
    }

    /// Pull a fresh snapshot from the sampling loop
    fn update_data(&mut self) {
        let snapshot = self.sampler.snapshot();
        self.rows = view::build_rows(&snapshot, self.unit);
        self.snapshot = Some(snapshot);
        self.clamp_scroll();
    }

    pub(crate) fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Quit => self.quit_requested = true,
            InputEvent::ShowHelp => {
                self.show_help = !self.show_help;
                self.clear_pending = true;
            }
            InputEvent::Resize => {
                if let Err(e) = self.layout.update_terminal_size() {
                    debug!("Terminal size unavailable: {}", e);
                }
                self.clear_pending = true;
            }
            InputEvent::Tick | InputEvent::Unknown => {}

            // Everything else is ignored while help is open
            _ if self.show_help => {}

            InputEvent::MoveUp => self.scroll_by(-1),
            InputEvent::MoveDown => self.scroll_by(1),
            InputEvent::PageUp => self.scroll_by(-(self.visible_rows() as isize)),
            InputEvent::PageDown => self.scroll_by(self.visible_rows() as isize),
            InputEvent::Home => self.scroll = 0,
            InputEvent::End => self.scroll = self.max_scroll(),

            InputEvent::ResetBaselines => {
                let report = self.sampler.reset_all();
                debug!("Baselines reset, {} sensors resampled", report.sensors_read);
                self.update_data();
            }
            InputEvent::ToggleUnit => {
                self.unit = self.unit.toggle();
                if let Some(snapshot) = &self.snapshot {
                    self.rows = view::build_rows(snapshot, self.unit);
                }
            }
            InputEvent::ToggleTheme => {
                self.theme = self.theme.toggle();
                self.colors = ColorScheme::new(&self.theme, self.no_color);
                self.clear_pending = true;
            }
        }
    }

    fn render<W: std::io::Write>(&mut self, writer: &mut W) -> anyhow::Result<()> {
        use crossterm::{
            queue,
            style::SetBackgroundColor,
            terminal::{Clear, ClearType},
        };

        if self.clear_pending {
            queue!(writer, SetBackgroundColor(self.colors.background), Clear(ClearType::All))?;
            self.clear_pending = false;
        }

        let main_layout = self.layout.main_layout();

        TopBar.render(writer, main_layout.top_bar, self.snapshot.as_ref(), self.unit, &self.colors)?;

        let columns = self.layout.table_columns(main_layout.table);
        SensorTable.render(writer, main_layout.table, columns, &self.rows, self.scroll, &self.colors)?;

        let gpu_status = self.snapshot.as_ref().map(|s| &s.gpu_status);
        Footer.render(writer, main_layout.footer, gpu_status, &self.colors)?;

        if self.show_help {
            HelpOverlay.render(writer, self.layout.terminal_rect(), &self.colors)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn visible_rows(&self) -> usize {
        SensorTable::visible_rows(self.layout.main_layout().table).max(1)
    }

    fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(self.visible_rows())
    }

    fn scroll_by(&mut self, delta: isize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn setup_terminal(&self) -> anyhow::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;
        Ok(())
    }
}

/// RAII guard to restore terminal state on drop
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::style::ResetColor,
            crossterm::cursor::Show,
            crossterm::terminal::LeaveAlternateScreen
        );
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
