// Copyright (c) 2026 rezky_nightky

use crate::error::ConfigError;

pub const DEFAULT_MESSAGES: [&str; 6] = [
    "<script>alert('Hacked!');</script>",
    "<img src=x onerror=alert(1)>",
    "<iframe src='javascript:alert(1)'></iframe>",
    "<marquee>Hack the World!</marquee>",
    "<script>console.log('Pwned');</script>",
    "<input type='text' onfocus=alert('Gotcha')>",
];

/// A scripted string revealed one character per frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    chars: Vec<char>,
}

impl Message {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MessageSet {
    messages: Vec<Message>,
}

impl MessageSet {
    pub fn defaults() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|s| Message {
                    chars: s.chars().collect(),
                })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Result<Self, ConfigError> {
        let mut messages = Vec::with_capacity(texts.len());
        for (i, t) in texts.iter().enumerate() {
            let chars: Vec<char> = t.as_ref().chars().filter(|c| !c.is_control()).collect();
            if chars.is_empty() {
                return Err(ConfigError::EmptyMessage { index: i + 1 });
            }
            messages.push(Message { chars });
        }
        Ok(Self { messages })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Message> {
        self.messages.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_order() {
        let set = MessageSet::defaults();
        assert_eq!(set.len(), 6);
        assert_eq!(set.get(3).unwrap().text(), "<marquee>Hack the World!</marquee>");
        assert_eq!(set.get(0).unwrap().char_at(1), Some('s'));
    }

    #[test]
    fn custom_messages_reject_empty_text() {
        let set = MessageSet::from_texts(&["wake up", "neo"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            MessageSet::from_texts(&["ok", "\n"]).unwrap_err(),
            ConfigError::EmptyMessage { index: 2 }
        );
    }
}
