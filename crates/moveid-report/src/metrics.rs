// ABOUTME: Standard Helvetica width metrics and greedy width-based word wrapping
// ABOUTME: Widths are summed in font units so a line's measured width is exact and additive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 MoveID

//! Text measurement for the two standard fonts the renderer uses.

/// Standard PDF font used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    /// Helvetica
    Regular,
    /// Helvetica-Bold
    Bold,
}

impl Font {
    /// Resource name of the font inside each page
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }

    /// PostScript base font name
    #[must_use]
    pub const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
        }
    }

    const fn widths(self) -> &'static [u16; 95] {
        match self {
            Self::Regular => &HELVETICA_WIDTHS,
            Self::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }
}

/// Width used for characters outside printable ASCII
const FALLBACK_WIDTH: u16 = 556;

// Advance widths for ' ' (0x20) through '~' (0x7E), in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

fn char_units(font: Font, c: char) -> u32 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        u32::from(font.widths()[(code - 0x20) as usize])
    } else {
        u32::from(FALLBACK_WIDTH)
    }
}

/// Width of `text` in points at `size`
#[must_use]
pub fn text_width(text: &str, font: Font, size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| char_units(font, c)).sum();
    f64::from(units) * size / 1000.0
}

/// Greedy word wrap.
///
/// Words are appended to the current line until adding the next one would
/// exceed `max_width`; the line is then flushed and the word starts a new one.
/// A single word wider than `max_width` is shortened with an ellipsis, so no
/// line is ever wider than the column.
#[must_use]
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word = truncate_to_width(word, font, size, max_width);
        if current.is_empty() {
            current = word;
            continue;
        }
        let candidate = format!("{current} {word}");
        if text_width(&candidate, font, size) > max_width {
            lines.push(std::mem::replace(&mut current, word));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Shorten `text` with an ellipsis so it fits `max_width`
#[must_use]
pub fn truncate_to_width(text: &str, font: Font, size: f64, max_width: f64) -> String {
    if text_width(text, font, size) <= max_width {
        return text.to_owned();
    }
    let mut truncated = String::new();
    for c in text.chars() {
        let candidate = format!("{truncated}{c}...");
        if text_width(&candidate, font, size) > max_width {
            break;
        }
        truncated.push(c);
    }
    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hello" = 722 + 556 + 222 + 222 + 556 = 2278 units
        assert!((text_width("Hello", Font::Regular, 10.0) - 22.78).abs() < 1e-9);
        assert!(text_width("Hello", Font::Bold, 10.0) > text_width("Hello", Font::Regular, 10.0));
    }

    #[test]
    fn test_wrap_breaks_before_overflow() {
        let lines = wrap_text("alpha beta gamma delta", Font::Regular, 10.0, 60.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 60.0);
        }
        assert_eq!(lines.join(" "), "alpha beta gamma delta");
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert!(wrap_text("", Font::Regular, 10.0, 100.0).is_empty());
        assert!(wrap_text("   \n\t ", Font::Regular, 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_overlong_word_is_shortened_to_the_column() {
        let lines = wrap_text("a supercalifragilistic b", Font::Regular, 10.0, 30.0);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "a");
        assert!(lines[1].starts_with("su") && lines[1].ends_with("..."), "{lines:?}");
        assert_eq!(lines[2], "b");
        for line in &lines {
            assert!(text_width(line, Font::Regular, 10.0) <= 30.0, "{line}");
        }
    }

    #[test]
    fn test_truncate_to_width() {
        let text = "Extremely long joint name that cannot fit";
        let truncated = truncate_to_width(text, Font::Regular, 9.0, 80.0);
        assert!(truncated.ends_with("..."));
        assert!(text_width(&truncated, Font::Regular, 9.0) <= 80.0);
        assert_eq!(truncate_to_width("Knee", Font::Regular, 9.0, 80.0), "Knee");
    }
}
