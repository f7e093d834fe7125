use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::{
    cursor::{self, SetCursorStyle},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Block, BorderType, Borders, Gauge, Paragraph,
    },
    Frame, Terminal,
};

use crate::{
    app::{App, InputMode},
    console::Tone,
    constants::{BALL_DIAMETER, BANNER},
    util::format_percent,
};

// neon green, for the retro feel
const ACCENT: Color = Color::Rgb(0, 255, 153);
const DIM: Color = Color::DarkGray;

pub fn run(app: App, frame: Duration, quit: Arc<AtomicBool>) -> io::Result<()> {
    enable_raw_mode()?;

    let mut mouse_captured = false;
    let res = run_in_alternate_screen(app, frame, &quit, &mut mouse_captured);

    // restore even when the loop failed; the loop's error wins.
    let restored = restore_terminal(&mut io::stdout(), mouse_captured);
    res.and(restored)
}

fn run_in_alternate_screen(
    app: App,
    frame: Duration,
    quit: &AtomicBool,
    mouse_captured: &mut bool,
) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app_loop(&mut terminal, app, frame, quit, mouse_captured)
}

/// undoes every terminal mode the dashboard may have switched on.
///
/// every step is attempted even if an earlier one fails; the first failure is
/// returned.
fn restore_terminal<W: io::Write>(out: &mut W, mouse_captured: bool) -> io::Result<()> {
    let steps = [
        if mouse_captured {
            execute!(out, DisableMouseCapture)
        } else {
            Ok(())
        },
        execute!(out, SetCursorStyle::DefaultUserShape),
        disable_raw_mode(),
        execute!(out, LeaveAlternateScreen),
        execute!(out, cursor::Show),
    ];

    let mut first_err = None;
    for err in steps.into_iter().filter_map(Result::err) {
        log::warn!("terminal restore step failed: {err}");
        first_err.get_or_insert(err);
    }
    first_err.map_or(Ok(()), Err)
}

fn run_app_loop<B: ratatui::backend::Backend + io::Write>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
    quit: &AtomicBool,
    mouse_captured: &mut bool,
) -> io::Result<()> {
    loop {
        if app.should_quit || quit.load(Ordering::SeqCst) {
            app.quit();
            return Ok(());
        }

        // the pointer is only ours while a cps session runs.
        if app.cps.is_running() != *mouse_captured {
            if app.cps.is_running() {
                execute!(terminal.backend_mut(), EnableMouseCapture)?;
            } else {
                execute!(terminal.backend_mut(), DisableMouseCapture)?;
            }
            *mouse_captured = app.cps.is_running();
            log::debug!("mouse capture {}", if *mouse_captured { "on" } else { "off" });
        }

        if let Some(style) = app.take_caret_change() {
            execute!(terminal.backend_mut(), style.to_crossterm())?;
        }

        terminal.draw(|f| draw(f, &app))?;

        // Handle input
        let timeout = tick_rate
            .checked_sub(app.last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        let elapsed = app.last_tick.elapsed();
        if elapsed >= tick_rate {
            app.on_tick(elapsed);
            app.last_tick = Instant::now();
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    // ============= whole screen layout ============
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(12),   // Body
            Constraint::Length(1), // Bottom Status Bar
        ])
        .split(f.size());

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" DELTA DOS ", Style::default().bg(ACCENT).fg(Color::Black).add_modifier(Modifier::BOLD)),
        Span::styled("  DEVICE DASHBOARD", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    ]))
    .block(panel(BANNER));
    f.render_widget(title, main_chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(main_chunks[1]);

    draw_left(f, app, body[0]);
    draw_right(f, app, body[1]);
    draw_status(f, app, main_chunks[2]);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Normal => ACCENT,
        Tone::Info => Color::Cyan,
        Tone::Success => Color::LightGreen,
        Tone::Warning => Color::Yellow,
    }
}

// ============= Left: console, prompt, demos ============
fn draw_left(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Console
            Constraint::Length(3), // Prompt
            Constraint::Length(8), // FPS / CPS
        ])
        .split(area);

    // Console, pinned to the bottom
    let console_block = panel("Console");
    let height = console_block.inner(chunks[0]).height as usize;
    let lines: Vec<_> = app.console.visible_lines().collect();
    let skip = lines.len().saturating_sub(height);
    let text: Vec<Line> = lines
        .into_iter()
        .skip(skip)
        .map(|l| Line::from(Span::styled(l.text.clone(), Style::default().fg(tone_color(l.tone)))))
        .collect();
    f.render_widget(
        Paragraph::new(text).block(console_block).style(Style::default().bg(Color::Black)),
        chunks[0],
    );

    // Prompt
    let prompt_block = panel("Command");
    let prompt_inner = prompt_block.inner(chunks[1]);
    let prompt = match app.mode {
        InputMode::Command => Line::from(vec![
            Span::styled("> ", Style::default().fg(ACCENT)),
            Span::styled(app.input.clone(), Style::default().fg(Color::White)),
        ]),
        InputMode::Normal => Line::from(Span::styled(
            "press / to type a command (/help)",
            Style::default().fg(DIM),
        )),
    };
    f.render_widget(Paragraph::new(prompt).block(prompt_block), chunks[1]);
    if app.mode == InputMode::Command {
        let x = prompt_inner.x + 2 + app.input.chars().count() as u16;
        f.set_cursor(x.min(prompt_inner.right().saturating_sub(1)), prompt_inner.y);
    }

    let demos = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    // FPS demo
    let track = app.ball.track_width();
    let center = app.ball.center();
    let ball = Canvas::default()
        .block(panel(&format!("FPS: {:.1}", app.fps.current_fps())))
        .marker(Marker::Braille)
        .background_color(Color::Black)
        .x_bounds([0.0, track])
        .y_bounds([0.0, 80.0])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: center,
                y: 40.0,
                radius: BALL_DIAMETER / 2.0,
                color: ACCENT,
            });
        });
    f.render_widget(ball, demos[0]);

    // CPS tester
    let (cps_text, hint) = match app.cps.current_cps() {
        Some(cps) => (format!("CPS: {}", cps), "click anywhere / space · c to stop"),
        None => ("CPS: --".to_string(), "press c to start the test"),
    };
    let cps_lines = vec![
        Line::from(""),
        Line::from(Span::styled(cps_text, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(DIM))),
    ];
    let cps_title = if app.cps.is_running() { "CPS Test [running]" } else { "CPS Test" };
    f.render_widget(Paragraph::new(cps_lines).block(panel(cps_title)), demos[1]);
}

// ============= Right: specs, gauges, boost, pointer ============
fn draw_right(f: &mut Frame, app: &App, area: Rect) {
    let spec_lines = app.specs.lines();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(spec_lines.len() as u16 + 2), // Specs
            Constraint::Length(3),                           // CPU
            Constraint::Length(3),                           // RAM
            Constraint::Length(4),                           // Boost
            Constraint::Min(4),                              // Pointer
        ])
        .split(area);

    let specs: Vec<Line> = app
        .specs
        .entries
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(DIM)),
                Span::styled(value.clone(), Style::default().fg(ACCENT)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(specs).block(panel("Device")), chunks[0]);

    let cpu = app.usage.map(|u| u.cpu_percent);
    let ram = app.usage.map(|u| u.memory_percent);
    f.render_widget(gauge("CPU", cpu), chunks[1]);
    f.render_widget(gauge("RAM", ram), chunks[2]);

    let boost = vec![
        Line::from(vec![key_span("t"), Span::raw(" Clear Temp Files")]),
        Line::from(vec![key_span("d"), Span::raw(" Flush DNS")]),
    ];
    f.render_widget(Paragraph::new(boost).block(panel("Run Speed Boost")), chunks[3]);

    let pointer = vec![
        Line::from(format!("Pointer speed (preview): {}", app.pointer_preview)),
        Line::from(vec![key_span("+/-"), Span::raw(" adjust  "), key_span("a"), Span::raw(" apply  "), key_span("r"), Span::raw(" reset (10)")]),
    ];
    f.render_widget(Paragraph::new(pointer).block(panel("Mouse Pointer")), chunks[4]);
}

fn gauge(label: &str, percent: Option<f32>) -> Gauge<'static> {
    let ratio = percent.map(|p| (p as f64 / 100.0).clamp(0.0, 1.0)).unwrap_or(0.0);
    let color = match percent {
        Some(p) if p > 90.0 => Color::Red,
        Some(p) if p > 70.0 => Color::LightYellow,
        _ => ACCENT,
    };
    Gauge::default()
        .block(panel(label))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(ratio)
        .label(format!("{}: {}", label, format_percent(percent)))
}

fn key_span(key: &str) -> Span<'static> {
    Span::styled(format!("[{}]", key), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

// ============ Bottom Status Bar ============
fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let mode = match app.mode {
        InputMode::Normal => " READY ",
        InputMode::Command => " INPUT ",
    };
    let status = Line::from(vec![
        Span::styled(mode, Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::styled(Local::now().format("%Y-%m-%d %H:%M:%S").to_string(), Style::default().fg(ACCENT)),
        Span::raw(" | c cps · s summary · x clear · / command · q quit"),
    ]);
    f.render_widget(Paragraph::new(status).style(Style::default().bg(Color::Rgb(20, 20, 20))), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        metrics::{DeviceSpecs, MetricsSource, Usage},
    };
    use ratatui::backend::TestBackend;

    struct StubSource;

    impl MetricsSource for StubSource {
        fn usage(&mut self) -> Usage {
            Usage::default()
        }

        fn specs(&self) -> DeviceSpecs {
            DeviceSpecs {
                entries: vec![("Node", "stub-host".to_string())],
            }
        }
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app() -> App {
        let config = Config {
            typing_delay: Duration::ZERO,
            ..Config::default()
        };
        let mut app = App::new(config, StubSource).unwrap();
        app.on_tick(Duration::ZERO);
        app
    }

    #[test]
    fn dashboard_shows_every_panel() {
        let app = app();
        let screen = screen(&app);
        for needle in [
            "DELTA DOS",
            "Console",
            "FPS: ",
            "CPS: --",
            "Node: stub-host",
            "CPU: ",
            "Run Speed Boost",
            "Pointer speed (preview): 10",
            "q quit",
        ] {
            assert!(screen.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn console_text_is_drawn() {
        let mut app = app();
        app.submit("/nope");
        app.on_tick(Duration::ZERO);
        assert!(screen(&app).contains("Unknown command: /nope"));
    }

    #[test]
    fn running_cps_test_shows_a_count() {
        let mut app = app();
        app.toggle_cps();
        app.cps.record_click();
        app.cps.sample();
        assert!(screen(&app).contains("CPS: 1"));
        app.toggle_cps();
    }

    /// a writer that refuses every write, counting the attempts.
    #[cfg(unix)]
    #[derive(Default)]
    struct BrokenPipe {
        attempts: usize,
    }

    #[cfg(unix)]
    impl io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempts += 1;
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[cfg(unix)]
    #[test]
    fn restore_keeps_going_after_a_failed_step() {
        let mut out = BrokenPipe::default();
        let err = restore_terminal(&mut out, true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        // mouse, caret, alternate screen and cursor were all tried.
        assert!(out.attempts >= 4, "only {} writes attempted", out.attempts);
    }

    #[cfg(unix)]
    #[test]
    fn restore_leaves_the_alternate_screen_and_shows_the_cursor() {
        let mut out = Vec::new();
        restore_terminal(&mut out, false).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1049l"), "{written:?}");
        assert!(written.contains("\x1b[?25h"), "{written:?}");
        assert!(!written.contains("\x1b[?1000l"), "{written:?}");
    }
}
