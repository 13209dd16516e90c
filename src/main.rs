// Copyright (c) 2026 rezky_nightky

mod canvas;
mod charset;
mod column;
mod config;
mod error;
mod field;
mod frame;
mod messages;
mod palette;
mod rng;
mod runtime;
mod scheduler;
mod surface;
mod terminal;

use std::env;
use std::fmt::Display;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{info, warn, LevelFilter};
use simplelog::{Config as LogConfig, WriteLogger};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::canvas::Canvas;
use crate::charset::{charset_from_str, parse_user_ranges, Alphabet};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_list_charsets,
    print_list_messages, require_range, Args, RainConfig,
};
use crate::error::ConfigError;
use crate::field::RainField;
use crate::frame::Frame;
use crate::palette::background;
use crate::rng::SeededRandom;
use crate::runtime::ColorMode;
use crate::scheduler::Ticker;
use crate::surface::DrawingSurface;
use crate::terminal::{restore_terminal_best_effort, Screen};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn exit_with(e: impl Display) -> ! {
    eprintln!("{}", e);
    std::process::exit(1);
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }
    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    ColorMode::Color16
}

fn detect_color_mode(forced: Option<u16>) -> Result<ColorMode, ConfigError> {
    match forced {
        None => Ok(detect_color_mode_auto()),
        Some(0) => Ok(ColorMode::Mono),
        Some(16) => Ok(ColorMode::Color16),
        Some(8) | Some(256) => Ok(ColorMode::Color256),
        Some(24) | Some(32) => Ok(ColorMode::TrueColor),
        Some(m) => Err(ConfigError::UnknownColorMode(m)),
    }
}

fn build_alphabet(args: &Args) -> Result<Alphabet, ConfigError> {
    if let Some(spec) = &args.chars {
        return Ok(Alphabet::from_ranges(&parse_user_ranges(spec)?));
    }
    let charset = charset_from_str(&args.charset, default_to_ascii())?;
    Ok(Alphabet::build(charset, &args.phrase))
}

fn init_logging(path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, LogConfig::default(), file);
        }
        Err(e) => eprintln!("failed to open log file {}: {}", path.display(), e),
    }
}

fn is_quit_key(k: &KeyEvent) -> bool {
    match k.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => k.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[derive(Default)]
struct FrameStats {
    frames: u64,
    drawn: u64,
    work_sum_s: f64,
    work_max_s: f64,
    late: u64,
}

impl FrameStats {
    fn record(&mut self, work: Duration, drew: bool, budget: Duration) {
        self.frames += 1;
        if drew {
            self.drawn += 1;
        }
        let s = work.as_secs_f64();
        self.work_sum_s += s;
        self.work_max_s = self.work_max_s.max(s);
        if work > budget {
            self.late += 1;
        }
    }

    fn avg_work_ms(&self) -> f64 {
        self.work_sum_s / self.frames.max(1) as f64 * 1000.0
    }
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(default_params_usage_for_help())
        .help_template(if color_enabled_stdout() {
            HELP_TEMPLATE_COLOR
        } else {
            HELP_TEMPLATE_PLAIN
        });
    cmd.build();
    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("GLYPHRAIN_BUILD"));
        let sha = env!("GLYPHRAIN_GIT_SHA");
        if !sha.is_empty() {
            println!("Commit: {}", sha);
        }
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let messages = args.message_set().unwrap_or_else(|e| exit_with(e));
    if args.list_messages {
        print_list_messages(&messages);
        return Ok(());
    }

    let config = RainConfig::from_args(&args).unwrap_or_else(|e| exit_with(e));
    let color_mode = detect_color_mode(args.colormode).unwrap_or_else(|e| exit_with(e));
    let alphabet = build_alphabet(&args).unwrap_or_else(|e| exit_with(e));

    let end_after = match args.duration {
        Some(s) if s.is_finite() && s <= 0.0 => None,
        Some(s) => Some(
            require_range("--duration", s, 0.1, 86400.0).unwrap_or_else(|e| exit_with(e)),
        ),
        None => None,
    };

    init_logging(args.log_file.as_deref());
    info!(
        "starting {:?} rain: {:?}, {} glyphs, {} messages, {:?}",
        args.variant,
        config,
        alphabet.len(),
        messages.len(),
        color_mode
    );

    let mut screen = Screen::enter()?;
    let (cols, rows) = screen.size()?;
    let bg = background(color_mode);

    let mut rng = SeededRandom::new(args.seed);
    let mut canvas = Canvas::new(cols, rows, args.cell_size);
    let mut field = RainField::new(
        config.clone(),
        alphabet,
        messages,
        canvas.width(),
        canvas.height(),
        &mut rng,
    );
    let mut frame = Frame::new(cols, rows, bg);
    info!(
        "terminal {}x{} cells, {} columns every {}px",
        cols,
        rows,
        field.column_count(),
        field.column_spacing()
    );
    if field.column_count() == 0 {
        warn!("surface narrower than one column spacing; nothing will fall");
    }

    let start_time = Instant::now();
    let end_time = end_after.map(|s| start_time + Duration::from_secs_f64(s));
    let mut ticker = Ticker::every(config.tick_interval(), start_time);
    let mut stats = FrameStats::default();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Screen::poll_event(Duration::ZERO)? {
                match Screen::read_event()? {
                    Event::Resize(w, h) => pending_resize = Some((w, h)),
                    Event::Key(k) if k.kind == KeyEventKind::Press && is_quit_key(&k) => {
                        running = false;
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if ticker.is_due(now) {
                break;
            }
            let mut timeout = ticker.time_until_due(now);
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Screen::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((w, h)) = pending_resize {
            info!("terminal resized to {}x{}; reinitialising rain", w, h);
            canvas.resize(w, h);
            field.resize(canvas.width(), canvas.height(), &mut rng);
            frame = Frame::new(w, h, bg);
        }

        if !ticker.is_due(Instant::now()) {
            continue;
        }

        let work_start = Instant::now();
        field.tick(&mut canvas, &mut rng);
        canvas.compose(&mut frame, color_mode);
        let drew = frame.has_changes();
        if drew {
            screen.draw(&mut frame)?;
        }
        stats.record(work_start.elapsed(), drew, ticker.interval());
        ticker.fire(Instant::now());
    }

    drop(screen);

    let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
    info!(
        "stopped after {} frames ({} ticks of the field, {} messages in flight), avg work {:.3}ms",
        stats.frames,
        field.frames(),
        field.reserved().count(),
        stats.avg_work_ms()
    );

    if args.perf_stats {
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  interval_ms: {}", config.tick_interval_ms);
        println!("  avg_fps: {:.3}", stats.frames as f64 / elapsed_s);
        println!("  frames: {}", stats.frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            stats.drawn,
            stats.drawn as f64 / stats.frames.max(1) as f64 * 100.0
        );
        println!("  avg_work_ms: {:.3}", stats.avg_work_ms());
        println!("  max_work_ms: {:.3}", stats.work_max_s * 1000.0);
        println!("  late_frames: {}", stats.late);
    }

    Ok(())
}
