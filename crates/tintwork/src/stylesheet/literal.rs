//! Color literal scanning within declaration values.
//!
//! Recognizes `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
//! Anything that looks like a literal but does not fit (8-digit hex, channel
//! values above 255, percent channels) is not reported, so rewriting code
//! leaves it untouched.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tintwork_color::{format_alpha, Color};

static HEX_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{6}|[0-9a-fA-F]{3})\b").expect("hex literal pattern is valid")
});

static RGB_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(rgba?)\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d*\.?\d+)\s*)?\)",
    )
    .expect("rgb literal pattern is valid")
});

/// How a literal was written, so a replacement can be written the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralFormat {
    Hex,
    Rgb,
    Rgba,
}

/// A color literal found in a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLiteral {
    /// Byte range relative to the scanned text.
    pub range: Range<usize>,
    pub color: Color,
    pub format: LiteralFormat,
}

impl ColorLiteral {
    /// Renders `color` in this literal's format.
    ///
    /// Hex literals drop alpha; function literals keep the alpha of `color`,
    /// falling back to the original literal's alpha.
    pub fn render(&self, color: Color) -> String {
        match self.format {
            LiteralFormat::Hex => color.to_hex(),
            LiteralFormat::Rgb | LiteralFormat::Rgba => {
                let name = if self.format == LiteralFormat::Rgb {
                    "rgb"
                } else {
                    "rgba"
                };
                let channels = format!("{}, {}, {}", color.r, color.g, color.b);
                match color.alpha.or(self.color.alpha) {
                    Some(alpha) => format!("{}({}, {})", name, channels, format_alpha(alpha)),
                    None => format!("{}({})", name, channels),
                }
            }
        }
    }
}

/// Finds every well-formed color literal in `text`, ordered by position.
pub fn find_color_literals(text: &str) -> Vec<ColorLiteral> {
    let mut literals: Vec<ColorLiteral> = HEX_LITERAL
        .find_iter(text)
        .filter_map(|m| {
            Color::parse_hex(m.as_str()).ok().map(|color| ColorLiteral {
                range: m.range(),
                color,
                format: LiteralFormat::Hex,
            })
        })
        .collect();

    for caps in RGB_LITERAL.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let channel = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u8>().ok());
        let (Some(r), Some(g), Some(b)) = (channel(2), channel(3), channel(4)) else {
            continue;
        };

        let alpha = match caps.get(5) {
            Some(m) => match m.as_str().parse::<f64>() {
                Ok(a) if (0.0..=1.0).contains(&a) => Some(a),
                _ => continue,
            },
            None => None,
        };

        let format = if caps[1].eq_ignore_ascii_case("rgba") {
            LiteralFormat::Rgba
        } else {
            LiteralFormat::Rgb
        };

        let color = match alpha {
            Some(a) => Color::rgba(r, g, b, a),
            None => Color::rgb(r, g, b),
        };

        literals.push(ColorLiteral {
            range: whole.range(),
            color,
            format,
        });
    }

    literals.sort_by_key(|l| l.range.start);
    literals
}
