// Copyright (c) 2026 rezky_nightky

use unicode_width::UnicodeWidthChar;

use crate::{
    config::CellSize,
    frame::{Cell, Frame},
    palette::{background, terminal_color},
    runtime::ColorMode,
    surface::{DrawingSurface, FontSpec, Rgb},
};

/// Brightest channel below which a fading glyph is erased.
const VISIBLE_FLOOR: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Ink {
    ch: char,
    r: f32,
    g: f32,
    b: f32,
    lead: bool,
    /// Covers this cell and the one to its right.
    wide: bool,
}

impl Ink {
    fn rgb(&self) -> Rgb {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Rgb::new(q(self.r), q(self.g), q(self.b))
    }

    fn brightest(&self) -> f32 {
        self.r.max(self.g).max(self.b)
    }
}

/// A pixel-addressed drawing surface laid over the terminal grid. Each cell
/// keeps the last glyph drawn into it and that glyph's decaying color, which
/// is how repeated translucent fills are approximated without real alpha.
pub struct Canvas {
    cols: u16,
    rows: u16,
    cell: CellSize,
    ink: Vec<Option<Ink>>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, cell: CellSize) -> Self {
        Self {
            cols,
            rows,
            cell,
            ink: vec![None; cols as usize * rows as usize],
        }
    }

    /// Drops everything drawn so far and adopts the new grid.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.ink.clear();
        self.ink.resize(cols as usize * rows as usize, None);
    }

    /// Column and row of the cell a glyph with baseline `y` is drawn into.
    /// A glyph that straddles the top or bottom edge still shows, in the
    /// edge row; one entirely outside the canvas is clipped.
    fn glyph_cell(&self, x: f32, y: f32, size: f32) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || self.rows == 0 {
            return None;
        }
        let height = self.rows as f32 * self.cell.height;
        if y <= 0.0 || y - size >= height {
            return None;
        }
        let col = (x / self.cell.width).floor() as usize;
        let middle = (y - size * 0.5).max(0.0);
        let row = ((middle / self.cell.height).floor() as usize).min(self.rows as usize - 1);
        if col >= self.cols as usize {
            return None;
        }
        Some((col, row))
    }

    pub fn compose(&self, frame: &mut Frame, mode: ColorMode) {
        let bg = background(mode);
        let cols = self.cols.min(frame.width);
        for row in 0..self.rows.min(frame.height) {
            let mut col = 0;
            while col < cols {
                let i = row as usize * self.cols as usize + col as usize;
                let ink = self.ink[i].filter(|ink| !ink.wide || col + 1 < cols);
                let cell = match ink {
                    Some(ink) => Cell {
                        ch: ink.ch,
                        fg: terminal_color(ink.rgb(), mode),
                        bg,
                        bold: ink.lead,
                        width: if ink.wide { 2 } else { 1 },
                    },
                    None => Cell::blank(bg),
                };
                frame.set(col, row, cell);
                if cell.width == 2 {
                    frame.set(col + 1, row, Cell::continuation(bg));
                    col += 2;
                } else {
                    col += 1;
                }
            }
        }
    }

    #[cfg(test)]
    fn ink_at(&self, col: u16, row: u16) -> Option<(char, Rgb)> {
        let i = row as usize * self.cols as usize + col as usize;
        self.ink.get(i).copied().flatten().map(|ink| (ink.ch, ink.rgb()))
    }
}

impl DrawingSurface for Canvas {
    fn fade(&mut self, alpha: f32) {
        let keep = (1.0 - alpha).clamp(0.0, 1.0);
        for slot in &mut self.ink {
            let Some(ink) = slot else {
                continue;
            };
            ink.r *= keep;
            ink.g *= keep;
            ink.b *= keep;
            ink.lead = false;
            if ink.brightest() < VISIBLE_FLOOR {
                *slot = None;
            }
        }
    }

    /// `y` is the text baseline; the glyph goes in the cell holding its
    /// vertical middle. Double-width glyphs snap to an even column and take
    /// the cell to their right as well.
    fn draw_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgb, font: FontSpec) {
        let wide = match ch.width() {
            Some(1) => false,
            Some(2) => true,
            _ => return,
        };
        let Some((col, row)) = self.glyph_cell(x, y, font.size) else {
            return;
        };
        let col = if wide { col & !1 } else { col };
        if wide && col + 1 >= self.cols as usize {
            return;
        }
        let i = row * self.cols as usize + col;
        // landing on the right half of a wide glyph evicts it
        if col > 0 && self.ink[i - 1].is_some_and(|ink| ink.wide) {
            self.ink[i - 1] = None;
        }
        if wide {
            self.ink[i + 1] = None;
        }
        self.ink[i] = Some(Ink {
            ch,
            r: color.r as f32,
            g: color.g as f32,
            b: color.b as f32,
            lead: color == Rgb::LEAD,
            wide,
        });
    }

    fn width(&self) -> f32 {
        self.cols as f32 * self.cell.width
    }

    fn height(&self) -> f32 {
        self.rows as f32 * self.cell.height
    }
}

#[cfg(test)]
mod tests {
    use crossterm::style::Color;
    use rstest::rstest;

    use super::*;
    use crate::charset::{Alphabet, Charset, DEFAULT_PHRASE};
    use crate::config::RainConfig;
    use crate::field::RainField;
    use crate::messages::MessageSet;
    use crate::rng::{ScriptedRandom, SeededRandom};
    use crate::runtime::Variant;

    fn canvas() -> Canvas {
        Canvas::new(10, 5, CellSize::default())
    }

    #[test]
    fn pixel_size_follows_cell_metrics() {
        let c = canvas();
        assert_eq!(c.width(), 80.0);
        assert_eq!(c.height(), 80.0);
    }

    #[test]
    fn glyph_lands_in_the_cell_under_its_middle() {
        let mut c = canvas();
        c.draw_glyph('ア', 17.0, 40.0, Rgb::green(200), FontSpec::monospace(15.0));
        assert_eq!(c.ink_at(2, 2), Some(('ア', Rgb::green(200))));
    }

    #[test]
    fn off_canvas_glyphs_are_clipped() {
        let mut c = canvas();
        let font = FontSpec::monospace(15.0);
        c.draw_glyph('a', 0.0, 0.0, Rgb::LEAD, font);
        c.draw_glyph('b', 80.0, 40.0, Rgb::LEAD, font);
        c.draw_glyph('c', 0.0, 500.0, Rgb::LEAD, font);
        assert!(c.ink.iter().all(Option::is_none));
    }

    #[test]
    fn fade_blends_toward_black_then_erases() {
        let mut c = canvas();
        c.draw_glyph('x', 0.0, 16.0, Rgb::green(200), FontSpec::monospace(15.0));
        c.fade(0.5);
        assert_eq!(c.ink_at(0, 0), Some(('x', Rgb::green(100))));
        for _ in 0..4 {
            c.fade(0.5);
        }
        assert_eq!(c.ink_at(0, 0), None);
    }

    #[test]
    fn compose_bolds_only_fresh_lead_glyphs() {
        let mut c = canvas();
        let mut frame = Frame::new(10, 5, None);
        c.draw_glyph('L', 0.0, 16.0, Rgb::LEAD, FontSpec::monospace(15.0));
        c.compose(&mut frame, ColorMode::TrueColor);
        let cell = *frame.get(0, 0).unwrap();
        assert_eq!(cell.ch, 'L');
        assert!(cell.bold);
        assert_eq!(cell.fg, Some(Color::Rgb { r: 255, g: 255, b: 255 }));

        c.fade(0.05);
        c.compose(&mut frame, ColorMode::TrueColor);
        assert!(!frame.get(0, 0).unwrap().bold);
        assert_eq!(frame.get(1, 0).unwrap().ch, ' ');
    }

    #[test]
    fn wide_glyph_snaps_to_even_column_and_claims_its_partner() {
        let mut c = canvas();
        c.draw_glyph('x', 8.0, 16.0, Rgb::green(200), FontSpec::monospace(15.0));
        c.draw_glyph('ア', 8.0, 16.0, Rgb::green(200), FontSpec::monospace(15.0));
        assert_eq!(c.ink_at(0, 0), Some(('ア', Rgb::green(200))));
        assert_eq!(c.ink_at(1, 0), None);

        c.draw_glyph('y', 8.0, 16.0, Rgb::green(180), FontSpec::monospace(15.0));
        assert_eq!(c.ink_at(0, 0), None);
        assert_eq!(c.ink_at(1, 0), Some(('y', Rgb::green(180))));
    }

    #[test]
    fn wide_glyph_without_room_for_its_partner_is_clipped() {
        let mut c = Canvas::new(9, 5, CellSize::default());
        c.draw_glyph('ア', 64.0, 16.0, Rgb::LEAD, FontSpec::monospace(15.0));
        assert!(c.ink.iter().all(Option::is_none));
    }

    #[test]
    fn glyph_straddling_the_top_edge_shows_in_the_first_row() {
        let mut c = canvas();
        // a column restarted at row 0 and advanced by 0.3 rows of 15px
        c.draw_glyph('L', 0.0, 4.5, Rgb::LEAD, FontSpec::monospace(15.0));
        assert_eq!(c.ink_at(0, 0), Some(('L', Rgb::LEAD)));
    }

    #[test]
    fn compose_writes_wide_glyph_and_its_continuation() {
        let mut c = canvas();
        let mut frame = Frame::new(10, 5, None);
        c.draw_glyph('ア', 16.0, 16.0, Rgb::green(200), FontSpec::monospace(15.0));
        c.compose(&mut frame, ColorMode::TrueColor);
        assert_eq!(frame.get(2, 0).unwrap().width, 2);
        assert_eq!(frame.get(3, 0).unwrap().width, 0);
        assert_eq!(frame.get(4, 0).unwrap().width, 1);
    }

    fn run_rain(variant: Variant, ticks: usize) -> (Canvas, RainField) {
        let mut rng = SeededRandom::new(Some(1));
        let mut canvas = Canvas::new(80, 24, CellSize::default());
        let mut field = RainField::new(
            RainConfig::preset(variant),
            Alphabet::build(Charset::FULL, DEFAULT_PHRASE),
            MessageSet::defaults(),
            canvas.width(),
            canvas.height(),
            &mut rng,
        );
        for _ in 0..ticks {
            field.tick(&mut canvas, &mut rng);
        }
        (canvas, field)
    }

    #[rstest]
    #[case(Variant::Classic)]
    #[case(Variant::Guarded)]
    fn rendered_rain_rows_fit_the_terminal(#[case] variant: Variant) {
        let (canvas, _) = run_rain(variant, 40);
        let mut frame = Frame::new(80, 24, None);
        canvas.compose(&mut frame, ColorMode::TrueColor);

        let mut glyphs = 0;
        for row in 0..24 {
            let mut printed = 0;
            for col in 0..80 {
                let cell = *frame.get(col, row).unwrap();
                match cell.width {
                    0 => assert_eq!(frame.get(col - 1, row).unwrap().width, 2),
                    2 => assert_eq!(frame.get(col + 1, row).unwrap().width, 0),
                    _ => {}
                }
                if cell.width > 0 {
                    assert_eq!(cell.ch.width(), Some(cell.width as usize));
                    printed += cell.width as usize;
                }
                if cell.ch != ' ' {
                    glyphs += 1;
                }
            }
            assert_eq!(printed, 80, "row {row}");
        }
        assert!(glyphs > 0);
    }

    #[rstest]
    #[case(Variant::Classic)]
    #[case(Variant::Guarded)]
    fn rain_lands_only_under_its_columns(#[case] variant: Variant) {
        let (canvas, field) = run_rain(variant, 40);
        let mut expected = vec![false; 80];
        for i in 0..field.column_count() {
            let col = (i as f32 * field.column_spacing() / 8.0).floor() as usize;
            expected[col] = true;
            expected[col & !1] = true;
        }

        let mut bold = 0;
        for row in 0..24 {
            for col in 0..80 {
                let i = row * 80 + col;
                if let Some(ink) = canvas.ink[i] {
                    assert!(expected[col], "stray glyph at {col},{row}");
                    if ink.lead {
                        bold += 1;
                    }
                }
            }
        }
        assert!(bold <= field.column_count());
    }

    #[rstest]
    #[case(Variant::Classic)]
    #[case(Variant::Guarded)]
    fn trails_fade_out_once_drawing_stops(#[case] variant: Variant) {
        let (mut canvas, field) = run_rain(variant, 40);
        let alpha = field.config().fade_alpha;
        assert!(canvas.ink.iter().any(Option::is_some));

        let before: Vec<f32> = canvas.ink.iter().map(|k| k.map_or(0.0, |k| k.brightest())).collect();
        canvas.fade(alpha);
        for (ink, was) in canvas.ink.iter().zip(before) {
            let now = ink.map_or(0.0, |k| k.brightest());
            assert!(now <= was);
        }

        for _ in 0..80 {
            canvas.fade(alpha);
        }
        assert!(canvas.ink.iter().all(Option::is_none));
    }

    #[test]
    fn restarted_guarded_column_shows_its_lead_glyph() {
        // every roll succeeds: the column resets as soon as it passes the
        // bottom and comes back at 0.3 rows
        let mut rng = ScriptedRandom::new(&[]).idle_at(0.0);
        let mut canvas = Canvas::new(6, 4, CellSize::default());
        let mut field = RainField::new(
            RainConfig::preset(Variant::Guarded),
            Alphabet::build(Charset::FULL, DEFAULT_PHRASE),
            MessageSet::empty(),
            canvas.width(),
            canvas.height(),
            &mut rng,
        );
        assert_eq!(field.column_count(), 1);

        field.tick(&mut canvas, &mut rng);
        let mut heads_after_restart = 0;
        for _ in 0..20 {
            field.tick(&mut canvas, &mut rng);
            if canvas.ink[0].is_some_and(|ink| ink.lead) {
                heads_after_restart += 1;
            }
        }
        assert!(heads_after_restart > 0);
    }
}
