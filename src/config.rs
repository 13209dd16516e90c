// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::charset::DEFAULT_PHRASE;
use crate::error::ConfigError;
use crate::messages::MessageSet;
use crate::runtime::Variant;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphrain --variant classic --charset auto --cell-size 8,16\n  glyphrain --variant guarded --message \"wake up\" --message \"follow the white rabbit\"";

/// Everything that distinguishes one flavour of the rain from another.
#[derive(Clone, Debug, PartialEq)]
pub struct RainConfig {
    pub tick_interval_ms: u64,
    pub glyph_size: f32,
    pub spacing_multiplier: f32,
    /// Vertical pixels per unit of column position, in glyph sizes.
    pub row_scale: f32,
    pub fade_alpha: f32,
    pub reset_probability: f64,
    pub message_probability: f64,
    pub use_reservation_guard: bool,
    pub guard_radius: usize,
    pub per_column_fixed_speed: bool,
    /// `[low, high)` sampled once per reset when speed is fixed per column.
    pub fixed_speed: (f32, f32),
    /// `[low, high)` sampled every frame otherwise.
    pub drift_speed: (f32, f32),
    /// Inclusive green channel range for ordinary glyphs.
    pub green: (u8, u8),
}

impl RainConfig {
    pub fn preset(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self {
                tick_interval_ms: 50,
                glyph_size: 15.0,
                spacing_multiplier: 1.0,
                row_scale: 4.2,
                fade_alpha: 0.05,
                reset_probability: 0.005,
                message_probability: 0.005,
                use_reservation_guard: false,
                guard_radius: 5,
                per_column_fixed_speed: false,
                fixed_speed: (0.3, 0.8),
                drift_speed: (0.2, 0.6),
                green: (155, 255),
            },
            Variant::Guarded => Self {
                tick_interval_ms: 30,
                spacing_multiplier: 3.0,
                row_scale: 1.0,
                reset_probability: 0.025,
                use_reservation_guard: true,
                per_column_fixed_speed: true,
                ..Self::preset(Variant::Classic)
            },
        }
    }

    pub fn column_spacing(&self) -> f32 {
        self.glyph_size * self.spacing_multiplier
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Layers the command line on top of the variant preset.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let mut cfg = Self::preset(args.variant);

        if let Some(ms) = args.interval {
            cfg.tick_interval_ms = require_range("--interval", ms as f64, 1.0, 10_000.0)? as u64;
        }
        if let Some(v) = args.glyph_size {
            cfg.glyph_size = require_range("--glyph-size", v as f64, 1.0, 512.0)? as f32;
        }
        if let Some(v) = args.spacing {
            cfg.spacing_multiplier = require_range("--spacing", v as f64, 0.1, 64.0)? as f32;
        }
        if let Some(v) = args.row_scale {
            cfg.row_scale = require_range("--row-scale", v as f64, 0.1, 64.0)? as f32;
        }
        if let Some(v) = args.fade {
            cfg.fade_alpha = require_range("--fade", v as f64, 0.0, 1.0)? as f32;
        }
        if let Some(pct) = args.reset_pct {
            cfg.reset_probability = require_range("--reset-pct", pct, 0.0, 100.0)? / 100.0;
        }
        if let Some(pct) = args.message_pct {
            cfg.message_probability = require_range("--message-pct", pct, 0.0, 100.0)? / 100.0;
        }
        if let Some(r) = args.guard_radius {
            cfg.guard_radius = require_range("--guard-radius", r as f64, 0.0, 1000.0)? as usize;
        }
        if args.guard {
            cfg.use_reservation_guard = true;
        }
        if args.no_guard {
            cfg.use_reservation_guard = false;
        }
        if args.fixed_speed {
            cfg.per_column_fixed_speed = true;
        }
        if args.no_fixed_speed {
            cfg.per_column_fixed_speed = false;
        }
        if let Some(r) = args.fixed_speed_range {
            cfg.fixed_speed = (r.low, r.high);
        }
        if let Some(r) = args.drift_speed_range {
            cfg.drift_speed = (r.low, r.high);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_range("--interval", self.tick_interval_ms as f64, 1.0, 10_000.0)?;
        require_range("--glyph-size", self.glyph_size as f64, 1.0, 512.0)?;
        require_range("--spacing", self.spacing_multiplier as f64, 0.1, 64.0)?;
        require_range("--row-scale", self.row_scale as f64, 0.1, 64.0)?;
        require_range("--fade", self.fade_alpha as f64, 0.0, 1.0)?;
        require_range("reset probability", self.reset_probability, 0.0, 1.0)?;
        require_range("message probability", self.message_probability, 0.0, 1.0)?;
        require_speed_range("--fixed-speed-range", self.fixed_speed)?;
        require_speed_range("--drift-speed-range", self.drift_speed)?;
        if self.green.0 > self.green.1 {
            return Err(ConfigError::EmptyRange {
                name: "green",
                low: self.green.0 as f64,
                high: self.green.1 as f64,
            });
        }
        Ok(())
    }
}

pub fn require_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() {
        return Err(ConfigError::NotFinite { name, value: v });
    }
    if v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

fn require_speed_range(name: &'static str, (low, high): (f32, f32)) -> Result<(), ConfigError> {
    require_range(name, low as f64, 0.0, 100.0)?;
    require_range(name, high as f64, 0.0, 100.0)?;
    if low >= high {
        return Err(ConfigError::EmptyRange {
            name,
            low: low as f64,
            high: high as f64,
        });
    }
    Ok(())
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Paints headings cyan and example command lines blue.
fn colorize_usage(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.ends_with(':') && !line.starts_with(' ') {
                format!("\x1b[1;36m{line}\x1b[0m")
            } else if let Some(rest) = line.strip_prefix("  glyphrain") {
                format!("  \x1b[1;34mglyphrain\x1b[0m{rest}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_usage(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

/// Terminal cell footprint in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl FromStr for CellSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(',')
            .ok_or_else(|| "expected: WIDTH,HEIGHT".to_string())?;
        let width: u16 = w.trim().parse().map_err(|_| "invalid width".to_string())?;
        let height: u16 = h.trim().parse().map_err(|_| "invalid height".to_string())?;
        if width == 0 || height == 0 {
            return Err("cell size must be > 0".to_string());
        }
        Ok(Self {
            width: width as f32,
            height: height as f32,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedRange {
    pub low: f32,
    pub high: f32,
}

impl FromStr for SpeedRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(',')
            .ok_or_else(|| "expected: LOW,HIGH".to_string())?;
        let low: f32 = a.trim().parse().map_err(|_| "invalid low value".to_string())?;
        let high: f32 = b.trim().parse().map_err(|_| "invalid high value".to_string())?;
        if !(low.is_finite() && high.is_finite()) || low < 0.0 || low >= high {
            return Err("range must be >=0 and low < high".to_string());
        }
        Ok(Self { low, high })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphrain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'V',
        long = "variant",
        default_value_t = Variant::Classic,
        value_enum,
        help_heading = "GENERAL",
        help = "Rain variant preset (classic, guarded)"
    )]
    pub variant: Variant,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "seed",
        help_heading = "GENERAL",
        help = "Seed the random source for a reproducible rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write a debug log to this file"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 'i',
        long = "interval",
        help_heading = "TIMING",
        help = "Frame interval in ms (min 1 max 10000; classic 50, guarded 30)"
    )]
    pub interval: Option<u64>,

    #[arg(
        long = "fade",
        help_heading = "TIMING",
        help = "Opacity of the per-frame fade (min 0 max 1; default 0.05)"
    )]
    pub fade: Option<f32>,

    #[arg(
        long = "reset-pct",
        help_heading = "TIMING",
        help = "Chance per frame that a column past the bottom restarts, in percent"
    )]
    pub reset_pct: Option<f64>,

    #[arg(
        long = "fixed-speed",
        conflicts_with = "no_fixed_speed",
        help_heading = "TIMING",
        help = "Give every column a speed fixed until its next reset"
    )]
    pub fixed_speed: bool,

    #[arg(
        long = "no-fixed-speed",
        help_heading = "TIMING",
        help = "Resample every column's speed each frame"
    )]
    pub no_fixed_speed: bool,

    #[arg(
        long = "fixed-speed-range",
        help_heading = "TIMING",
        help = "Per-column speed range in rows per frame: LOW,HIGH (default 0.3,0.8)"
    )]
    pub fixed_speed_range: Option<SpeedRange>,

    #[arg(
        long = "drift-speed-range",
        help_heading = "TIMING",
        help = "Per-frame speed range in rows per frame: LOW,HIGH (default 0.2,0.6)"
    )]
    pub drift_speed_range: Option<SpeedRange>,

    #[arg(
        short = 'g',
        long = "glyph-size",
        help_heading = "GEOMETRY",
        help = "Glyph size in surface pixels (min 1 max 512; default 15)"
    )]
    pub glyph_size: Option<f32>,

    #[arg(
        long = "spacing",
        help_heading = "GEOMETRY",
        help = "Column spacing as a multiple of the glyph size (classic 1.0, guarded 3.0)"
    )]
    pub spacing: Option<f32>,

    #[arg(
        long = "row-scale",
        help_heading = "GEOMETRY",
        help = "Row height as a multiple of the glyph size (classic 4.2, guarded 1.0)"
    )]
    pub row_scale: Option<f32>,

    #[arg(
        long = "cell-size",
        default_value = "8,16",
        help_heading = "GEOMETRY",
        help = "Pixel size of one terminal cell: WIDTH,HEIGHT"
    )]
    pub cell_size: CellSize,

    #[arg(
        short = 'm',
        long = "message",
        help_heading = "MESSAGES",
        help = "Scripted message (repeatable; replaces the built-in set)"
    )]
    pub message: Vec<String>,

    #[arg(
        long = "no-messages",
        conflicts_with = "message",
        help_heading = "MESSAGES",
        help = "Never interleave scripted messages"
    )]
    pub no_messages: bool,

    #[arg(
        long = "message-pct",
        help_heading = "MESSAGES",
        help = "Chance per frame that an idle column starts a message, in percent (default 0.5)"
    )]
    pub message_pct: Option<f64>,

    #[arg(
        long = "guard",
        conflicts_with = "no_guard",
        help_heading = "MESSAGES",
        help = "Keep simultaneous messages apart"
    )]
    pub guard: bool,

    #[arg(
        long = "no-guard",
        help_heading = "MESSAGES",
        help = "Allow messages in neighbouring columns"
    )]
    pub no_guard: bool,

    #[arg(
        long = "guard-radius",
        help_heading = "MESSAGES",
        help = "Columns on each side kept free of other messages (default 5)"
    )]
    pub guard_radius: Option<usize>,

    #[arg(
        long = "charset",
        default_value = "auto",
        help_heading = "CHARSET",
        help = "Glyph ranges (see --list-charsets), joined with '+'"
    )]
    pub charset: String,

    #[arg(
        long = "phrase",
        default_value = DEFAULT_PHRASE,
        help_heading = "CHARSET",
        help = "Phrase woven into the latin letters"
    )]
    pub phrase: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Custom alphabet as hex code point pairs: LOW,HIGH[,LOW,HIGH...]"
    )]
    pub chars: Option<String>,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: auto-detect"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "perf-stats",
        help_heading = "APPEARANCE",
        help = "Print frame timing summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset names and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-messages",
        help_heading = "HELP",
        help = "List the messages that would be used and exit"
    )]
    pub list_messages: bool,

    #[arg(long = "info", help_heading = "HELP", help = "Print build info and exit")]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    pub fn message_set(&self) -> Result<MessageSet, ConfigError> {
        if self.no_messages {
            Ok(MessageSet::empty())
        } else if self.message.is_empty() {
            Ok(MessageSet::defaults())
        } else {
            MessageSet::from_texts(&self.message)
        }
    }
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSETS:\x1b[0m");
        println!("\x1b[2mNOTE: Combine names with '+', e.g. latin+digits.\x1b[0m");
    } else {
        println!("AVAILABLE CHARSETS:");
        println!("NOTE: Combine names with '+', e.g. latin+digits.");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    println!("auto         full, or ascii when the locale is not UTF-8");
    println!("full         katakana + latin + digits + symbols (alias: all)");
    println!("ascii        latin + digits + symbols");
    println!("katakana     Katakana syllabary (alias: kana)");
    println!("latin        A-Z with the phrase after O, then a-z (alias: letters)");
    println!("digits       0-9 (alias: nums)");
    println!("symbols      ASCII punctuation (alias: punc)");
}

pub fn print_list_messages(set: &MessageSet) {
    if set.is_empty() {
        println!("(no messages)");
        return;
    }
    for (i, m) in set.iter().enumerate() {
        println!("{:>2}  {}", i + 1, m.text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["glyphrain"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn guarded_preset_differs_only_where_variants_differ() {
        let c = RainConfig::preset(Variant::Classic);
        let g = RainConfig::preset(Variant::Guarded);
        assert_eq!(c.column_spacing(), 15.0);
        assert_eq!(g.column_spacing(), 45.0);
        assert_eq!((c.tick_interval_ms, g.tick_interval_ms), (50, 30));
        assert_eq!((c.reset_probability, g.reset_probability), (0.005, 0.025));
        assert!(!c.use_reservation_guard && g.use_reservation_guard);
        assert!(!c.per_column_fixed_speed && g.per_column_fixed_speed);
        assert_eq!(c.fade_alpha, g.fade_alpha);
        assert_eq!(c.guard_radius, g.guard_radius);
        assert!(c.validate().is_ok() && g.validate().is_ok());
    }

    #[test]
    fn args_override_the_preset() {
        let args = parse(&[
            "--variant",
            "guarded",
            "--no-guard",
            "--reset-pct",
            "10",
            "--interval",
            "20",
            "--drift-speed-range",
            "0.1,0.2",
        ]);
        let cfg = RainConfig::from_args(&args).unwrap();
        assert!(!cfg.use_reservation_guard);
        assert!(cfg.per_column_fixed_speed);
        assert!((cfg.reset_probability - 0.1).abs() < 1e-12);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(20));
        assert_eq!(cfg.drift_speed, (0.1, 0.2));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let args = parse(&["--message-pct", "150"]);
        assert_eq!(
            RainConfig::from_args(&args).unwrap_err(),
            ConfigError::OutOfRange {
                name: "--message-pct",
                value: 150.0,
                min: 0.0,
                max: 100.0
            }
        );
        let args = parse(&["--fade", "NaN"]);
        assert!(matches!(
            RainConfig::from_args(&args),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn inverted_green_range_fails_validation() {
        let mut cfg = RainConfig::preset(Variant::Classic);
        cfg.green = (200, 100);
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyRange { .. })));
    }

    #[test]
    fn cell_size_and_speed_ranges_parse() {
        assert_eq!(
            "10, 20".parse::<CellSize>(),
            Ok(CellSize {
                width: 10.0,
                height: 20.0
            })
        );
        assert!("0,20".parse::<CellSize>().is_err());
        assert!("0.5,0.2".parse::<SpeedRange>().is_err());
    }

    #[test]
    fn message_flags_pick_the_message_set() {
        assert_eq!(parse(&[]).message_set().unwrap().len(), 6);
        assert!(parse(&["--no-messages"]).message_set().unwrap().is_empty());
        let custom = parse(&["-m", "wake up", "-m", "neo"]).message_set().unwrap();
        assert_eq!(custom.get(1).unwrap().text(), "neo");
        assert!(Args::try_parse_from(["glyphrain", "--no-messages", "-m", "x"]).is_err());
    }
}
