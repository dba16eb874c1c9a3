//! Builtin font faces and text measurement.
//!
//! Only the two standard Helvetica faces are used, so no font program is
//! embedded: the PDF viewer supplies the glyphs and we measure with the
//! Adobe AFM advance widths (1000 units per em, WinAnsi encoding).

use serde::{Deserialize, Serialize};

/// Unit scale of the AFM width tables.
const UNITS_PER_EM: f32 = 1000.0;

/// Helvetica advances for WinAnsi 0x20..=0xFF; undefined codes use 350.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 224] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //  !"#$%&'()*+,-./
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0-9 :;<=>?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @A-O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P-Z [\]^_
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `a-o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350, // p-z {|}~ (7F unused)
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80 Euro...
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667, // 0x90 quotes, dashes
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0 nbsp...
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0 Agrave...
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0 agrave...
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Helvetica-Bold advances for WinAnsi 0x20..=0xFF.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 224] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, 350,
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// The closed set of faces the engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    fn widths(self) -> &'static [u16; 224] {
        match self {
            FontFace::Regular => &HELVETICA_WIDTHS,
            FontFace::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Ascender height in 1000-unit space (identical for both faces).
    fn ascender_units(self) -> f32 {
        718.0
    }

    /// Advance of one character as drawn, in 1000-units.
    ///
    /// Characters outside WinAnsi are drawn as `?` and measured as such.
    pub fn char_units(self, ch: char) -> u32 {
        let code = char_to_winansi(ch).max(b' ');
        self.widths()[usize::from(code - b' ')] as u32
    }

    /// Advance of a whole string, in 1000-units.
    pub fn text_units(self, text: &str) -> u32 {
        text.chars().map(|ch| self.char_units(ch)).sum()
    }

    /// Width of `text` set at `font_size` points.
    pub fn measure(self, text: &str, font_size: f32) -> f32 {
        units_to_pt(self.text_units(text), font_size)
    }

    /// Distance from the top of a line box to the baseline.
    pub fn ascent(self, font_size: f32) -> f32 {
        self.ascender_units() * font_size / UNITS_PER_EM
    }
}

fn units_to_pt(units: u32, font_size: f32) -> f32 {
    units as f32 * font_size / UNITS_PER_EM
}

/// Map a character to its WinAnsi (Windows-1252) code. Unmappable
/// characters become `?`.
pub fn char_to_winansi(ch: char) -> u8 {
    match ch as u32 {
        0x0020..=0x007E => ch as u8,
        0x00A0 => b' ',
        0x00A1..=0x00FF => ch as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => b'?',
    }
}

/// Greedy word-wrap of `text` into lines no wider than `max_width` points.
///
/// Words are whitespace-separated and rejoined with single spaces. A word
/// that alone exceeds `max_width` is emitted on its own line unmodified.
/// The returned iterator is lazy and can be restarted by cloning it.
pub fn wrap_text(text: &str, face: FontFace, font_size: f32, max_width: f32) -> WrappedLines<'_> {
    WrappedLines {
        words: text.split_whitespace(),
        pending: None,
        face,
        font_size,
        max_width,
    }
}

/// Lines produced by [`wrap_text`].
#[derive(Debug, Clone)]
pub struct WrappedLines<'a> {
    words: std::str::SplitWhitespace<'a>,
    /// Word that overflowed the previous line and starts the next one.
    pending: Option<&'a str>,
    face: FontFace,
    font_size: f32,
    max_width: f32,
}

impl<'a> Iterator for WrappedLines<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let first = self.pending.take().or_else(|| self.words.next())?;
        let mut line = first.to_string();
        // Integer units so the running total equals a re-measure of `line`.
        let mut units = self.face.text_units(first);
        let space = self.face.char_units(' ');

        for word in self.words.by_ref() {
            let candidate = units + space + self.face.text_units(word);
            if units_to_pt(candidate, self.font_size) > self.max_width {
                self.pending = Some(word);
                break;
            }
            line.push(' ');
            line.push_str(word);
            units = candidate;
        }
        Some(line)
    }
}
