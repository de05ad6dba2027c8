//! Text measurement for the standard Helvetica faces, so layout can size
//! columns, right-align and wrap without embedding font programs.

/// The two standard faces registered in every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }
}

// Helvetica advance widths for U+0020..=U+007E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

const DEFAULT_WIDTH: u16 = 556;

// Helvetica-Bold runs wider than the regular face.
const BOLD_FACTOR: f32 = 1.08;

// Absorbs rounding when a column is sized exactly to its content.
const WRAP_TOLERANCE: f32 = 0.01;

fn fold_latin1(c: char) -> char {
    match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'º' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ª' => 'a',
        other => other,
    }
}

fn glyph_width(c: char) -> u16 {
    let c = fold_latin1(c);
    match c as u32 {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
    let width = units as f32 * size / 1000.0;
    match font {
        Font::Regular => width,
        Font::Bold => width * BOLD_FACTOR,
    }
}

/// Width of the widest whitespace-separated word.
pub fn longest_word_width(text: &str, font: Font, size: f32) -> f32 {
    text.split_whitespace()
        .map(|word| text_width(word, font, size))
        .fold(0.0, f32::max)
}

/// Greedy word wrap. Words wider than `max_width` are broken between
/// characters. Always returns at least one line.
pub fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let fits = |s: &str| text_width(s, font, size) <= max_width + WRAP_TOLERANCE;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if fits(word) {
                line = word.to_string();
                continue;
            }

            for c in word.chars() {
                let mut next = line.clone();
                next.push(c);
                if !line.is_empty() && !fits(&next) {
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                } else {
                    line = next;
                }
            }
        }

        lines.push(line);
    }

    lines
}

/// Encodes text for a WinAnsi-encoded standard font.
pub fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) <= 255 { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hi" = 722 + 222
        assert!((text_width("Hi", Font::Regular, 10.0) - 9.44).abs() < 1e-4);
        assert_eq!(text_width("", Font::Regular, 10.0), 0.0);
        assert!(text_width("Hi", Font::Bold, 10.0) > text_width("Hi", Font::Regular, 10.0));
    }

    #[test]
    fn test_accented_letters_measure_like_base_letters() {
        assert_eq!(
            text_width("Página", Font::Regular, 10.0),
            text_width("Pagina", Font::Regular, 10.0)
        );
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        let lines = wrap("aaa bbb ccc", Font::Regular, 10.0, text_width("aaa bbb", Font::Regular, 10.0));
        assert_eq!(lines, ["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_breaks_long_words() {
        let width = text_width("0000", Font::Regular, 10.0);
        let lines = wrap("0000000000", Font::Regular, 10.0, width);
        assert_eq!(lines, ["0000", "0000", "00"]);
    }

    #[test]
    fn test_wrap_empty_text_keeps_one_line() {
        assert_eq!(wrap("", Font::Regular, 8.0, 50.0), [""]);
    }

    #[test]
    fn test_win_ansi_keeps_latin1() {
        assert_eq!(to_win_ansi("Página"), b"P\xe1gina".to_vec());
        assert_eq!(to_win_ansi("→"), b"?".to_vec());
    }
}
