// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeSet;

use log::debug;

use crate::{
    charset::Alphabet,
    column::Column,
    config::RainConfig,
    messages::MessageSet,
    rng::RandomSource,
    surface::{DrawingSurface, FontSpec, Rgb},
};

/// All column state for one session of the rain. Geometry is fixed when the
/// field is (re)initialised and never recomputed inside `tick`.
pub struct RainField {
    config: RainConfig,
    alphabet: Alphabet,
    messages: MessageSet,
    font: FontSpec,

    column_spacing: f32,
    columns: Vec<Column>,
    reserved: BTreeSet<usize>,

    surface_width: f32,
    surface_height: f32,
    frames: u64,
}

impl RainField {
    pub fn new<R: RandomSource + ?Sized>(
        config: RainConfig,
        alphabet: Alphabet,
        messages: MessageSet,
        surface_width: f32,
        surface_height: f32,
        rng: &mut R,
    ) -> Self {
        let font = FontSpec::monospace(config.glyph_size);
        let mut field = Self {
            config,
            alphabet,
            messages,
            font,
            column_spacing: 0.0,
            columns: Vec::new(),
            reserved: BTreeSet::new(),
            surface_width: 0.0,
            surface_height: 0.0,
            frames: 0,
        };
        field.init(surface_width, surface_height, rng);
        field
    }

    pub fn init<R: RandomSource + ?Sized>(
        &mut self,
        surface_width: f32,
        surface_height: f32,
        rng: &mut R,
    ) {
        self.surface_width = surface_width.max(0.0);
        self.surface_height = surface_height.max(0.0);
        self.column_spacing = self.config.column_spacing();

        let count = if self.column_spacing > 0.0 {
            (self.surface_width / self.column_spacing).floor() as usize
        } else {
            0
        };

        self.columns.clear();
        self.columns.reserve(count);
        for _ in 0..count {
            let speed = self.sample_fixed_speed(rng);
            self.columns.push(Column::new(speed));
        }
        self.reserved.clear();
    }

    /// Explicit re-init for a resized surface; nothing carries over.
    pub fn resize<R: RandomSource + ?Sized>(&mut self, width: f32, height: f32, rng: &mut R) {
        debug!(
            "rain field resize {}x{} -> {}x{}",
            self.surface_width, self.surface_height, width, height
        );
        self.init(width, height, rng);
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_spacing(&self) -> f32 {
        self.column_spacing
    }

    #[cfg(test)]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn reserved(&self) -> impl Iterator<Item = usize> + '_ {
        self.reserved.iter().copied()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    /// Whether column `i` may start a message right now. With the guard off
    /// every column qualifies; with it on, neither `i` nor any column within
    /// `guard_radius` of it may hold a reservation.
    pub fn can_start_message(&self, i: usize) -> bool {
        if !self.config.use_reservation_guard {
            return true;
        }
        let r = self.config.guard_radius;
        self.reserved
            .range(i.saturating_sub(r)..=i.saturating_add(r))
            .next()
            .is_none()
    }

    pub fn tick<S, R>(&mut self, surface: &mut S, rng: &mut R)
    where
        S: DrawingSurface + ?Sized,
        R: RandomSource + ?Sized,
    {
        surface.fade(self.config.fade_alpha);
        let height = surface.height();
        let row_px = self.config.glyph_size * self.config.row_scale;

        for i in 0..self.columns.len() {
            let (ch, color) = self.next_glyph(i, rng);

            let x = i as f32 * self.column_spacing;
            let y = self.columns[i].position * row_px;
            surface.draw_glyph(ch, x, y, color, self.font);
            self.columns[i].fresh = false;

            if y > height && rng.chance(self.config.reset_probability) {
                let speed = self
                    .config
                    .per_column_fixed_speed
                    .then(|| self.sample_fixed_speed(rng));
                let col = &mut self.columns[i];
                if let Some(m) = col.active_message() {
                    debug!(
                        "column {} reset mid-message at {}/{}",
                        i,
                        col.message_cursor(),
                        m.len()
                    );
                }
                col.restart(speed);
                self.reserved.remove(&i);
            }

            let step = if self.config.per_column_fixed_speed {
                self.columns[i].speed
            } else {
                let (lo, hi) = self.config.drift_speed;
                rng.between(lo, hi)
            };
            self.columns[i].position += step;
        }

        self.frames = self.frames.wrapping_add(1);
    }

    fn next_glyph<R: RandomSource + ?Sized>(&mut self, i: usize, rng: &mut R) -> (char, Rgb) {
        if let Some((ch, finished)) = self.columns[i].reveal_next() {
            if finished {
                self.reserved.remove(&i);
                debug!("column {} finished its message", i);
            }
            return (ch, Rgb::LEAD);
        }

        // A failed guard check falls through to an ordinary glyph; the roll
        // is not retried.
        if !self.messages.is_empty()
            && rng.chance(self.config.message_probability)
            && self.can_start_message(i)
        {
            let pick = rng.below(self.messages.len());
            if let Some(message) = self.messages.get(pick).cloned() {
                debug!("column {} starts message {}", i, pick);
                if let Some((ch, finished)) = self.columns[i].start_message(message) {
                    if !finished && self.config.use_reservation_guard {
                        self.reserved.insert(i);
                    }
                    return (ch, Rgb::LEAD);
                }
            }
        }

        let ch = self.alphabet.get(rng.below(self.alphabet.len()));
        let color = if self.columns[i].fresh {
            Rgb::LEAD
        } else {
            let (lo, hi) = self.config.green;
            let span = (hi - lo) as usize + 1;
            Rgb::green(lo + rng.below(span) as u8)
        };
        (ch, color)
    }

    fn sample_fixed_speed<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.config.per_column_fixed_speed {
            let (lo, hi) = self.config.fixed_speed;
            rng.between(lo, hi)
        } else {
            0.0
        }
    }
}
