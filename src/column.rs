// Copyright (c) 2026 rezky_nightky

use crate::messages::Message;

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnState {
    Idle,
    /// `cursor` is the index of the next character to reveal and always
    /// stays below `message.len()`.
    InMessage { message: Message, cursor: usize },
}

/// One vertical lane of the rain.
#[derive(Clone, Debug)]
pub struct Column {
    pub position: f32,
    pub speed: f32,
    pub state: ColumnState,
    /// Set on init and on every reset; the next glyph drawn is a lead glyph.
    pub fresh: bool,
}

impl Column {
    pub fn new(speed: f32) -> Self {
        Self {
            position: 1.0,
            speed,
            state: ColumnState::Idle,
            fresh: true,
        }
    }

    pub fn active_message(&self) -> Option<&Message> {
        match &self.state {
            ColumnState::InMessage { message, .. } => Some(message),
            ColumnState::Idle => None,
        }
    }

    pub fn message_cursor(&self) -> usize {
        match self.state {
            ColumnState::InMessage { cursor, .. } => cursor,
            ColumnState::Idle => 0,
        }
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, ColumnState::Idle)
    }

    /// Reveals the character under the cursor and moves past it. Returns the
    /// character and whether the message just finished.
    pub fn reveal_next(&mut self) -> Option<(char, bool)> {
        let ColumnState::InMessage { message, cursor } = &mut self.state else {
            return None;
        };
        let ch = message.char_at(*cursor)?;
        *cursor += 1;
        let finished = *cursor >= message.len();
        if finished {
            self.state = ColumnState::Idle;
        }
        Some((ch, finished))
    }

    /// Takes ownership of `message` and consumes its first character.
    pub fn start_message(&mut self, message: Message) -> Option<(char, bool)> {
        self.state = ColumnState::InMessage { message, cursor: 0 };
        self.reveal_next()
    }

    pub fn clear_message(&mut self) {
        self.state = ColumnState::Idle;
    }

    pub fn restart(&mut self, speed: Option<f32>) {
        self.position = 0.0;
        self.fresh = true;
        if let Some(s) = speed {
            self.speed = s;
        }
        self.clear_message();
    }
}
