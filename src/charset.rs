// Copyright (c) 2026 rezky_nightky

use unicode_width::UnicodeWidthChar;

use crate::error::ConfigError;

pub const KATAKANA_GLYPHS: &str = "アァィイゥウェエォオカガキギクグケゲコゴサザシジスズセゼソゾタダチヂツヅテデトドナニヌネノハバパヒビピフブプヘベペホボポマミムメモヤャユュヨョラリルレロワヲンヴヵヶ";
pub const DIGIT_GLYPHS: &str = "0123456789";
pub const SYMBOL_GLYPHS: &str = "!@#$%^&*()_+-={}[]|:;\"'<>,.?/~`";

pub const DEFAULT_PHRASE: &str = "hacktheworld";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset(u8);

impl Charset {
    pub const NONE: Charset = Charset(0);
    pub const KATAKANA: Charset = Charset(0x1);
    pub const LATIN: Charset = Charset(0x2);
    pub const DIGITS: Charset = Charset(0x4);
    pub const SYMBOLS: Charset = Charset(0x8);

    pub const FULL: Charset = Charset(0xF);
    pub const ASCII_SAFE: Charset = Charset(0xE);

    pub fn contains(self, other: Charset) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn union(self, other: Charset) -> Charset {
        Charset(self.0 | other.0)
    }
}

/// Parses `auto`, a single range name, or a `+`-joined list such as
/// `latin+digits`.
pub fn charset_from_str(spec: &str, default_to_ascii: bool) -> Result<Charset, ConfigError> {
    let spec = spec.trim().to_ascii_lowercase();
    let mut out = Charset::NONE;
    for part in spec.split('+').map(str::trim) {
        let cs = match part {
            "auto" => {
                if default_to_ascii {
                    Charset::ASCII_SAFE
                } else {
                    Charset::FULL
                }
            }
            "full" | "all" => Charset::FULL,
            "ascii" => Charset::ASCII_SAFE,
            "katakana" | "kana" => Charset::KATAKANA,
            "latin" | "letters" => Charset::LATIN,
            "digits" | "nums" => Charset::DIGITS,
            "symbols" | "punc" => Charset::SYMBOLS,
            _ => return Err(ConfigError::UnknownCharset(spec.clone())),
        };
        out = out.union(cs);
    }
    Ok(out)
}

/// Comma separated hex code points, taken pairwise as inclusive ranges.
pub fn parse_user_ranges(s: &str) -> Result<Vec<(char, char)>, ConfigError> {
    let mut points = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16).map_err(|_| ConfigError::InvalidHex(i + 1))?;
        let ch = char::from_u32(v).ok_or(ConfigError::InvalidScalar(i + 1))?;
        points.push(ch);
    }
    if points.len() % 2 != 0 {
        return Err(ConfigError::OddCharRanges);
    }
    Ok(points.chunks(2).map(|p| (p[0], p[1])).collect())
}

/// The ordered glyph sequence sampled for ordinary rain.
#[derive(Clone, Debug)]
pub struct Alphabet {
    glyphs: Vec<char>,
}

impl Alphabet {
    pub fn build(charset: Charset, phrase: &str) -> Self {
        let mut glyphs: Vec<char> = Vec::new();
        if charset.contains(Charset::KATAKANA) {
            glyphs.extend(KATAKANA_GLYPHS.chars());
        }
        if charset.contains(Charset::LATIN) {
            // The phrase sits between O and P, lowering the odds of any
            // single capital and making its letters turn up more often.
            glyphs.extend('A'..='O');
            glyphs.extend(phrase.chars().filter(|c| !c.is_control()));
            glyphs.extend('P'..='Z');
            glyphs.extend('a'..='z');
        }
        if charset.contains(Charset::DIGITS) {
            glyphs.extend(DIGIT_GLYPHS.chars());
        }
        if charset.contains(Charset::SYMBOLS) {
            glyphs.extend(SYMBOL_GLYPHS.chars());
        }
        Self::from_glyphs(glyphs)
    }

    pub fn from_ranges(ranges: &[(char, char)]) -> Self {
        let mut glyphs = Vec::new();
        for &(a, b) in ranges {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            glyphs.extend((lo as u32..=hi as u32).filter_map(char::from_u32));
        }
        Self::from_glyphs(glyphs)
    }

    /// Keeps only glyphs that occupy one or two terminal columns.
    fn from_glyphs(mut glyphs: Vec<char>) -> Self {
        glyphs.retain(|c| matches!(c.width(), Some(1 | 2)));
        if glyphs.is_empty() {
            glyphs.extend(['0', '1']);
        }
        Self { glyphs }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn get(&self, idx: usize) -> char {
        self.glyphs.get(idx).copied().unwrap_or('0')
    }

    #[cfg(test)]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_alphabet_embeds_phrase_between_o_and_p() {
        let a = Alphabet::build(Charset::FULL, DEFAULT_PHRASE);
        let s: String = a.glyphs().iter().collect();
        assert!(s.contains("NOhacktheworldPQ"));
        assert!(s.starts_with('ア'));
        assert!(s.ends_with('`'));
        assert_eq!(
            a.len(),
            KATAKANA_GLYPHS.chars().count() + 26 + 12 + 26 + 10 + SYMBOL_GLYPHS.chars().count()
        );
    }

    #[test]
    fn auto_charset_drops_katakana_when_locale_is_not_utf() {
        assert_eq!(charset_from_str("auto", true).unwrap(), Charset::ASCII_SAFE);
        assert_eq!(charset_from_str("auto", false).unwrap(), Charset::FULL);
        let a = Alphabet::build(Charset::ASCII_SAFE, "");
        assert!(a.glyphs().iter().all(|c| c.is_ascii()));
    }

    #[test]
    fn combined_charset_names_are_unioned() {
        let cs = charset_from_str("Latin + digits", false).unwrap();
        assert!(cs.contains(Charset::LATIN) && cs.contains(Charset::DIGITS));
        assert!(!cs.contains(Charset::KATAKANA));
        assert!(charset_from_str("latin+greek", false).is_err());
    }

    #[test]
    fn user_ranges_replace_the_alphabet() {
        let ranges = parse_user_ranges("30,31, 41,43").unwrap();
        assert_eq!(ranges, vec![('0', '1'), ('A', 'C')]);
        let a = Alphabet::from_ranges(&ranges);
        assert_eq!(a.glyphs(), &['0', '1', 'A', 'B', 'C']);
        assert_eq!(parse_user_ranges("30"), Err(ConfigError::OddCharRanges));
        assert_eq!(parse_user_ranges("zz,31"), Err(ConfigError::InvalidHex(1)));
    }

    #[test]
    fn empty_alphabet_falls_back_to_binary() {
        let a = Alphabet::build(Charset::NONE, "");
        assert_eq!(a.glyphs(), &['0', '1']);
    }

    #[test]
    fn glyphs_without_a_terminal_width_are_dropped() {
        let a = Alphabet::from_ranges(&[('\u{0}', '\u{1f}'), ('\u{300}', '\u{301}'), ('A', 'A')]);
        assert_eq!(a.glyphs(), &['A']);
        let full = Alphabet::build(Charset::FULL, DEFAULT_PHRASE);
        assert!(full.glyphs().iter().all(|c| c.width().is_some_and(|w| w > 0)));
    }
}
