// Metrics of the standard PDF fonts, used to center and fit the text of the pages.
// The widths are those of the Adobe font metrics files, in 1/1000 of the font size.

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// The name of the font in the resources of the page.
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "F1",
            StandardFont::HelveticaBold => "F2",
        }
    }

    fn glyph_width(&self, code: u8) -> u16 {
        let table = match self {
            StandardFont::Helvetica => &HELVETICA_WIDTHS,
            StandardFont::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match code {
            32..=126 => table[(code - 32) as usize],
            0x91 | 0x92 => match self {
                StandardFont::Helvetica => 222,
                StandardFont::HelveticaBold => 278,
            },
            0x93 | 0x94 => match self {
                StandardFont::Helvetica => 333,
                StandardFont::HelveticaBold => 500,
            },
            0x85 | 0x97 => 1000,
            _ => 556,
        }
    }

    /// The width of the encoded text, in points.
    pub fn text_width(&self, encoded: &[u8], size: f32) -> f32 {
        let units: u32 = encoded.iter().map(|c| self.glyph_width(*c) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Encodes the text for a font using the WinAnsi encoding.
/// Characters that cannot be encoded are replaced by '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Splits the text into lines that fit in the given width.
/// A single word longer than the width gets its own line.
pub fn wrap_text(text: &str, font: StandardFont, size: f32, max_width: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if current.is_empty() || font.text_width(&encode_win_ansi(&candidate), size) <= max_width {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The largest size, up to `max_size`, at which the text fits in the width.
pub fn fit_size(text: &str, font: StandardFont, max_size: f32, max_width: f32) -> f32 {
    let width_at_one = font.text_width(&encode_win_ansi(text), 1.0);
    if width_at_one <= 0.0 {
        max_size
    } else {
        max_size.min(max_width / width_at_one)
    }
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0 - 9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A - Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a - z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        let f = StandardFont::Helvetica;
        assert_eq!(f.text_width(b"0", 10.0), 5.56);
        assert_eq!(StandardFont::HelveticaBold.text_width(b"W", 1000.0), 944.0);
        assert_eq!(f.text_width(b"", 12.0), 0.0);
    }

    #[test]
    fn encoding() {
        assert_eq!(encode_win_ansi("Caf\u{e9}"), b"Caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("it\u{2019}s"), b"it\x92s".to_vec());
        assert_eq!(encode_win_ansi("\u{65e5}"), b"?".to_vec());
    }

    #[test]
    fn wrapping() {
        let lines = wrap_text(
            "How many beans are in the jar on the table",
            StandardFont::HelveticaBold,
            20.0,
            200.0,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "How many beans are in the jar on the table");
        for l in lines.iter() {
            assert!(StandardFont::HelveticaBold.text_width(&encode_win_ansi(l), 20.0) <= 200.0);
        }
        assert!(wrap_text("   ", StandardFont::Helvetica, 20.0, 200.0).is_empty());
    }

    #[test]
    fn fitting() {
        assert_eq!(fit_size("1", StandardFont::HelveticaBold, 48.0, 500.0), 48.0);
        let s = fit_size("123,456,789,012", StandardFont::HelveticaBold, 48.0, 200.0);
        assert!(s < 48.0);
        assert!(StandardFont::HelveticaBold.text_width(&encode_win_ansi("123,456,789,012"), s) <= 200.001);
        assert_eq!(fit_size("", StandardFont::Helvetica, 30.0, 10.0), 30.0);
    }
}
