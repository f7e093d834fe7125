use std::{
    sync::mpsc::{self, Receiver, Sender},
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::{
    bounce::Ball,
    command::{CaretStyle, Command, HELP},
    config::Config,
    console::{Console, Tone},
    constants::{BANNER, SUMMARY_TYPING_DELAY_MS, WELCOME},
    cps::ClickRateEstimator,
    fps::FrameRateEstimator,
    maintenance::{self, Action},
    metrics::{DeviceSpecs, MetricsSampler, MetricsSource, Usage},
    pointer::{self, PointerSpeed},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    Command,
}

// Main application state
pub struct App {
    config: Config,
    pub fps: FrameRateEstimator,
    pub cps: ClickRateEstimator,
    pub ball: Ball,
    pub console: Console,
    metrics: MetricsSampler,
    pub usage: Option<Usage>,
    pub specs: DeviceSpecs,

    // slider value shown in the pointer panel, applied on demand
    pub pointer_preview: PointerSpeed,

    pub mode: InputMode,
    pub input: String,
    pub caret: CaretStyle,
    caret_changed: bool,

    // From maintenance workers to UI thread
    reports_tx: Sender<String>,
    reports_rx: Receiver<String>,

    pub last_tick: Instant,
    pub should_quit: bool,
}

impl App {
    pub fn new<S>(config: Config, source: S) -> std::io::Result<App>
    where
        S: MetricsSource + Send + 'static,
    {
        let metrics = MetricsSampler::spawn(source, config.metrics_interval)?;
        let (reports_tx, reports_rx) = mpsc::channel();

        let mut console = Console::new(config.typing_delay);
        console.type_text(BANNER, Tone::Info);
        console.type_text(WELCOME, Tone::Normal);

        Ok(App {
            fps: FrameRateEstimator::new(),
            cps: ClickRateEstimator::new(config.cps_interval),
            ball: Ball::new(),
            console,
            specs: metrics.specs(),
            usage: None,
            metrics,
            pointer_preview: PointerSpeed::default(),
            mode: InputMode::Normal,
            input: String::new(),
            caret: CaretStyle::Default,
            caret_changed: false,
            reports_tx,
            reports_rx,
            last_tick: Instant::now(),
            should_quit: false,
            config,
        })
    }

    /// one animation frame.
    pub fn on_tick(&mut self, elapsed: Duration) {
        self.ball.step();
        self.fps.tick();

        while let Ok(summary) = self.reports_rx.try_recv() {
            self.console.type_text(summary, Tone::Normal);
        }
        self.console.advance(elapsed);

        self.usage = self.metrics.usage();
        self.specs = self.metrics.specs();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match self.mode {
            InputMode::Normal => self.on_normal_key(key.code),
            InputMode::Command => self.on_command_key(key.code),
        }
    }

    fn on_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('c') => self.toggle_cps(),
            KeyCode::Char(' ') => self.cps.record_click(),
            KeyCode::Char('t') => self.boost(Action::ClearTemp),
            KeyCode::Char('d') => self.boost(Action::FlushDns),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                self.pointer_preview = self.pointer_preview.faster()
            }
            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => {
                self.pointer_preview = self.pointer_preview.slower()
            }
            KeyCode::Char('a') => self.apply_pointer_speed(self.pointer_preview),
            KeyCode::Char('r') => self.reset_pointer_speed(),
            KeyCode::Char('s') => self.type_summary(),
            KeyCode::Char('x') => self.console.clear(),
            KeyCode::Char('/') | KeyCode::Char(':') => {
                self.mode = InputMode::Command;
                self.input = "/".to_string();
            }
            _ => {}
        }
    }

    fn on_command_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.leave_command_mode(),
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.leave_command_mode();
                self.submit(&line);
            }
            KeyCode::Backspace => {
                self.input.pop();
                if self.input.is_empty() {
                    self.leave_command_mode();
                }
            }
            KeyCode::Char(ch) => self.input.push(ch),
            _ => {}
        }
    }

    fn leave_command_mode(&mut self) {
        self.mode = InputMode::Normal;
        self.input.clear();
    }

    /// any pointer press counts towards the cps test.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(_) = mouse.kind {
            self.cps.record_click();
        }
    }

    pub fn submit(&mut self, line: &str) {
        let Some(command) = Command::parse(line) else {
            return;
        };
        log::debug!("command {command:?}");
        self.console.type_text(format!("> {}", line.trim()), Tone::Info);

        match command {
            Command::Spec => self.type_summary(),
            Command::Cls => self.console.clear(),
            Command::Help => self.console.type_text(HELP, Tone::Normal),
            Command::ClearTemp => self.boost(Action::ClearTemp),
            Command::FlushDns => self.boost(Action::FlushDns),
            Command::Speed(n) => {
                self.pointer_preview = PointerSpeed::new(n);
                self.apply_pointer_speed(self.pointer_preview);
            }
            Command::ToggleCps => self.toggle_cps(),
            Command::Cursor(style) => {
                self.caret = style;
                self.caret_changed = true;
                self.console
                    .type_text(format!("Caret set to {}.", style.name()), Tone::Success);
            }
            Command::Unknown(cmd) => self
                .console
                .type_text(format!("Unknown command: {cmd}"), Tone::Warning),
        }
    }

    /// the caret style to push to the terminal, once per change.
    pub fn take_caret_change(&mut self) -> Option<CaretStyle> {
        std::mem::take(&mut self.caret_changed).then_some(self.caret)
    }

    pub fn toggle_cps(&mut self) {
        if self.cps.is_running() {
            self.cps.stop_session();
            self.console.type_text("CPS test stopped.", Tone::Info);
            return;
        }

        match self.cps.start_session() {
            Ok(()) => self
                .console
                .type_text("CPS test started. Click anywhere.", Tone::Info),
            Err(err) => {
                log::error!("cannot start cps sampler: {err}");
                self.console.type_text(format!("Failed: {err}"), Tone::Warning);
            }
        }
    }

    pub fn boost(&mut self, action: Action) {
        self.console
            .type_text(format!("Running speed boost: {action}..."), Tone::Info);
        let temp_dir = self.config.temp_dir.clone();
        if let Err(err) = maintenance::spawn(action, temp_dir, self.reports_tx.clone()) {
            log::error!("cannot spawn {action} worker: {err}");
            self.console.type_text(format!("Error: {err}"), Tone::Warning);
        }
    }

    pub fn apply_pointer_speed(&mut self, speed: PointerSpeed) {
        match pointer::apply(speed) {
            Ok(()) => self
                .console
                .type_text(format!("Mouse speed applied: {speed}"), Tone::Success),
            Err(err) => self.console.type_text(format!("Failed: {err}"), Tone::Warning),
        }
    }

    pub fn reset_pointer_speed(&mut self) {
        self.pointer_preview = PointerSpeed::default();
        match pointer::apply(self.pointer_preview) {
            Ok(()) => self.console.type_text(
                format!("Mouse speed reset to default ({}).", self.pointer_preview),
                Tone::Success,
            ),
            Err(err) => self.console.type_text(format!("Failed: {err}"), Tone::Warning),
        }
    }

    pub fn type_summary(&mut self) {
        let header = format!(
            "System summary @ {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let body = self.metrics.specs().lines().join("\n");
        self.console.type_text_with_delay(
            format!("{header}\n{body}"),
            Tone::Success,
            Duration::from_millis(SUMMARY_TYPING_DELAY_MS).min(self.config.typing_delay),
        );
    }

    pub fn quit(&mut self) {
        self.cps.stop_session();
        self.should_quit = true;
    }
}
