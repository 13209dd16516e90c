// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::frame::{Cell, Frame};

/// Style currently active on the terminal, so unchanged attributes are not
/// re-sent for every cell.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    at: Option<(u16, u16)>,
}

impl Pen {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn move_to(&mut self, out: &mut Stdout, x: u16, y: u16) -> Result<()> {
        if self.at != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }
}

pub struct Screen {
    stdout: Stdout,
    size: Option<(u16, u16)>,
}

impl Screen {
    pub fn enter() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let setup: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = setup {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            size: None,
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    /// Flushes the frame's pending changes. A size change or a frame marked
    /// fully dirty repaints every cell; otherwise only dirty cells are
    /// written, merging horizontal neighbours into a single print.
    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self.size != Some((frame.width, frame.height));
        if resized {
            self.stdout.queue(terminal::Clear(terminal::ClearType::All))?;
            self.size = Some((frame.width, frame.height));
        }

        let mut pen = Pen::default();
        if resized || frame.is_dirty_all() {
            self.repaint(frame, &mut pen)?;
        } else {
            self.patch(frame, &mut pen)?;
        }

        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn repaint(&mut self, frame: &Frame, pen: &mut Pen) -> Result<()> {
        let width = frame.width as usize;
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let cell = frame.cell_at_index(y as usize * width + x as usize);
                if cell.width == 0 {
                    continue;
                }
                pen.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
            }
        }
        pen.at = None;
        Ok(())
    }

    fn patch(&mut self, frame: &Frame, pen: &mut Pen) -> Result<()> {
        for run in plan_runs(frame) {
            pen.move_to(&mut self.stdout, run.x, run.y)?;
            pen.apply(&mut self.stdout, &run.style)?;
            self.stdout.queue(Print(run.text.as_str()))?;
            pen.at = (run.end_x < frame.width).then_some((run.end_x, run.y));
        }
        Ok(())
    }
}

/// Dirty cells on one row, sharing a style, printed with a single write.
#[derive(Debug, PartialEq)]
struct Run {
    x: u16,
    y: u16,
    text: String,
    style: Cell,
    /// Column the cursor rests on once `text` is printed.
    end_x: u16,
}

/// Groups the frame's dirty cells into runs. A double-width glyph moves the
/// cursor two columns, so the run continues at the cell after its partner.
fn plan_runs(frame: &Frame) -> Vec<Run> {
    let width = frame.width as usize;
    if width == 0 {
        return Vec::new();
    }
    let mut dirty: Vec<usize> = frame
        .dirty_indices()
        .iter()
        .copied()
        .filter(|&i| frame.cell_at_index(i).width > 0)
        .collect();
    dirty.sort_unstable();

    let mut runs: Vec<Run> = Vec::new();
    for i in dirty {
        let cell = frame.cell_at_index(i);
        let x = (i % width) as u16;
        let y = (i / width) as u16;
        if let Some(run) = runs.last_mut() {
            let same_style =
                cell.fg == run.style.fg && cell.bg == run.style.bg && cell.bold == run.style.bold;
            if run.y == y && run.end_x == x && same_style {
                run.text.push(cell.ch);
                run.end_x = run.end_x.saturating_add(cell.width as u16);
                continue;
            }
        }
        runs.push(Run {
            x,
            y,
            text: cell.ch.to_string(),
            style: cell,
            end_x: x.saturating_add(cell.width as u16),
        });
    }
    runs
}

impl Drop for Screen {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
