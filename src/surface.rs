// Copyright (c) 2026 rezky_nightky

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const LEAD: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn green(g: u8) -> Self {
        Self { r: 0, g, b: 0 }
    }
}

/// Glyphs are always set in a monospace face; only the size varies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f32,
}

impl FontSpec {
    pub fn monospace(size: f32) -> Self {
        Self { size }
    }
}

/// Paint operations the rain needs from whatever it is drawn on.
/// Coordinates are in surface pixels, origin top-left.
pub trait DrawingSurface {
    /// Blend a black rectangle of opacity `alpha` over the whole surface.
    fn fade(&mut self, alpha: f32);

    fn draw_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgb, font: FontSpec);

    fn width(&self) -> f32;

    fn height(&self) -> f32;
}

/// Records paint calls; used to assert exactly what a tick drew.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub fades: Vec<f32>,
    pub glyphs: Vec<(char, f32, f32, Rgb)>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn take(&mut self) -> Vec<(char, f32, f32, Rgb)> {
        std::mem::take(&mut self.glyphs)
    }
}

#[cfg(test)]
impl DrawingSurface for RecordingSurface {
    fn fade(&mut self, alpha: f32) {
        self.fades.push(alpha);
    }

    fn draw_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgb, _font: FontSpec) {
        self.glyphs.push((ch, x, y, color));
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }
}
