// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;
use crate::surface::Rgb;

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const BASIC_16: [(Color, Rgb); 16] = [
    (Color::Black, Rgb::new(0, 0, 0)),
    (Color::DarkGrey, Rgb::new(128, 128, 128)),
    (Color::Grey, Rgb::new(192, 192, 192)),
    (Color::White, Rgb::new(255, 255, 255)),
    (Color::DarkRed, Rgb::new(128, 0, 0)),
    (Color::Red, Rgb::new(255, 0, 0)),
    (Color::DarkGreen, Rgb::new(0, 128, 0)),
    (Color::Green, Rgb::new(0, 255, 0)),
    (Color::DarkBlue, Rgb::new(0, 0, 128)),
    (Color::Blue, Rgb::new(0, 0, 255)),
    (Color::DarkCyan, Rgb::new(0, 128, 128)),
    (Color::Cyan, Rgb::new(0, 255, 255)),
    (Color::DarkMagenta, Rgb::new(128, 0, 128)),
    (Color::Magenta, Rgb::new(255, 0, 255)),
    (Color::DarkYellow, Rgb::new(128, 128, 0)),
    (Color::Yellow, Rgb::new(255, 255, 0)),
];

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let d = |x: u8, y: u8| (x as i32 - y as i32).pow(2);
    d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b)
}

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the gray ramp.
pub fn rgb_to_ansi256(c: Rgb) -> u8 {
    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let cube = Rgb::new(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, Rgb::BLACK),
        239..=255 => (231, Rgb::LEAD),
        _ => {
            let step = (avg - 8) / 10;
            let v = 8 + 10 * step;
            (232 + step, Rgb::new(v, v, v))
        }
    };

    if dist2(c, gray) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

pub fn rgb_to_color16(c: Rgb) -> Color {
    BASIC_16
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Terminal foreground for a canvas color; `None` leaves the default.
pub fn terminal_color(c: Rgb, mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(c))),
        ColorMode::Color16 => Some(rgb_to_color16(c)),
    }
}

pub fn background(mode: ColorMode) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::Color16 => Some(Color::Black),
        ColorMode::Color256 => Some(Color::AnsiValue(16)),
        ColorMode::TrueColor => Some(Color::Rgb { r: 0, g: 0, b: 0 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_colors_map_to_their_cube_corners() {
        assert_eq!(rgb_to_ansi256(Rgb::new(0, 255, 0)), 46);
        assert_eq!(rgb_to_ansi256(Rgb::LEAD), 231);
        assert_eq!(rgb_to_ansi256(Rgb::BLACK), 16);
    }

    #[test]
    fn grays_prefer_the_gray_ramp() {
        assert_eq!(rgb_to_ansi256(Rgb::new(128, 128, 128)), 244);
    }

    #[test]
    fn sixteen_color_mode_picks_nearest_basic_color() {
        assert_eq!(rgb_to_color16(Rgb::green(250)), Color::Green);
        assert_eq!(rgb_to_color16(Rgb::green(120)), Color::DarkGreen);
        assert_eq!(terminal_color(Rgb::LEAD, ColorMode::Mono), None);
    }
}
