// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply {name} {value} (must be a finite number)")]
    NotFinite { name: &'static str, value: f64 },

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid {name} range {low},{high} (low must be below high)")]
    EmptyRange {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("message {index} is empty")]
    EmptyMessage { index: usize },

    #[error("invalid hex char at index {0}")]
    InvalidHex(usize),

    #[error("invalid unicode scalar at index {0}")]
    InvalidScalar(usize),

    #[error("--chars: odd number of unicode chars given (must be even)")]
    OddCharRanges,

    #[error("unsupported charset: {0} (see --list-charsets)")]
    UnknownCharset(String),

    #[error("invalid --colormode: {0} (allowed: 0,16,8,24)")]
    UnknownColorMode(u16),
}
