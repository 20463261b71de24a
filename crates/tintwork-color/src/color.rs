//! The [`Color`] type and its textual forms.
//!
//! Supported formats:
//!
//! - RGB hex: `#3584e4` or `#38e` (3 or 6 digit), `#3584e480` (8 digit, with alpha)
//! - Color functions: `rgb(53, 132, 228)`, `rgba(53, 132, 228, 0.5)`
//! - Percent channels inside functions: `rgb(100%, 50%, 0%)`
//! - Channel arrays: `[53, 132, 228]`
//!
//! Hex, array and function forms round-trip losslessly for colors without alpha.
//! Colors with alpha always render as `rgba(...)` so the alpha survives a round trip.
//!
//! # Example
//!
//! ```rust
//! use tintwork_color::Color;
//!
//! let blue: Color = "#3584e4".parse().unwrap();
//! assert_eq!(blue.to_array(), [53, 132, 228]);
//! assert_eq!(blue.to_hex(), "#3584e4");
//!
//! let veil = Color::parse("rgba(0, 0, 0, 0.35)").unwrap();
//! assert_eq!(veil.to_css_string(), "rgba(0, 0, 0, 0.35)");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorParseError;

/// An sRGB color with an optional alpha channel.
///
/// Channels are `u8` so they are always within 0–255; alpha is clamped to
/// 0.0–1.0 by every constructor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: Option<f64>,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Creates an opaque color with no alpha component.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            alpha: None,
        }
    }

    /// Creates a color with an explicit alpha, clamped to 0.0–1.0.
    pub fn rgba(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r,
            g,
            b,
            alpha: Some(clamp_alpha(alpha)),
        }
    }

    /// A neutral grey where all three channels equal `level`.
    pub const fn grey(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Builds a color from floating point channels, rounding and clamping each.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        Self::rgb(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    pub const fn from_array([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r, g, b)
    }

    pub const fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Returns a copy with the given alpha (clamped).
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: Some(clamp_alpha(alpha)),
            ..self
        }
    }

    /// Returns a copy with the alpha component dropped.
    pub fn without_alpha(self) -> Self {
        Self {
            alpha: None,
            ..self
        }
    }

    /// Difference between the largest and smallest channel.
    pub fn channel_spread(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }

    /// Parses any supported textual color form.
    pub fn parse(s: &str) -> Result<Self, ColorParseError> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }

        let lower = s.to_ascii_lowercase();
        if (lower.starts_with("rgb(") || lower.starts_with("rgba(")) && lower.ends_with(')') {
            return Self::parse_function(&lower);
        }

        if s.starts_with('[') && s.ends_with(']') {
            return Self::parse_array(s);
        }

        Err(ColorParseError::Unrecognized(s.to_string()))
    }

    /// Parses hex digits, with or without the leading `#`.
    pub fn parse_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim().trim_start_matches('#');
        let invalid = || ColorParseError::InvalidHex(hex.to_string());

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let single = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            // #rgb -> #rrggbb
            3 => Ok(Self::rgb(single(0)?, single(1)?, single(2)?)),
            6 => Ok(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            // #rrggbbaa
            8 => {
                let alpha = pair(6)? as f64 / 255.0;
                Ok(Self::rgba(pair(0)?, pair(2)?, pair(4)?, alpha))
            }
            _ => Err(invalid()),
        }
    }

    /// Parses `rgb(...)` or `rgba(...)`. Either name accepts 3 or 4 arguments.
    fn parse_function(s: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidFunction(s.to_string());

        let open = s.find('(').ok_or_else(invalid)?;
        let inner = &s[open + 1..s.len() - 1];
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid());
        }

        let mut channels = [0u8; 3];
        for (i, part) in parts.iter().take(3).enumerate() {
            channels[i] = parse_channel(part).ok_or_else(invalid)?;
        }

        let [r, g, b] = channels;
        match parts.get(3) {
            None => Ok(Self::rgb(r, g, b)),
            Some(raw) => {
                let alpha = parse_alpha(raw).ok_or_else(|| ColorParseError::InvalidAlpha {
                    input: s.to_string(),
                    value: raw.to_string(),
                })?;
                Ok(Self::rgba(r, g, b, alpha))
            }
        }
    }

    /// Parses an `[r, g, b]` array.
    fn parse_array(s: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::Unrecognized(s.to_string());
        let parts: Vec<&str> = s[1..s.len() - 1].split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut channels = [0u8; 3];
        for (i, part) in parts.iter().enumerate() {
            channels[i] = part.parse::<u8>().map_err(|_| invalid())?;
        }
        Ok(Self::from_array(channels))
    }

    /// Formats as `#rrggbb`. Alpha is not represented.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Formats as `#rrggbb` when opaque, `rgba(r, g, b, a)` when alpha is present.
    pub fn to_css_string(&self) -> String {
        match self.alpha {
            None => self.to_hex(),
            Some(alpha) => format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_alpha(alpha)
            ),
        }
    }
}

/// Formats an alpha value for CSS, rounded to three decimals.
pub fn format_alpha(alpha: f64) -> String {
    let rounded = (alpha * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        1.0
    } else {
        alpha.clamp(0.0, 1.0)
    }
}

pub(crate) fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

fn parse_channel(raw: &str) -> Option<u8> {
    if let Some(pct) = raw.strip_suffix('%') {
        let pct = pct.trim().parse::<f64>().ok()?;
        return Some(clamp_channel(pct / 100.0 * 255.0));
    }
    let value = raw.parse::<f64>().ok()?;
    value.is_finite().then(|| clamp_channel(value))
}

fn parse_alpha(raw: &str) -> Option<f64> {
    if let Some(pct) = raw.strip_suffix('%') {
        let pct = pct.trim().parse::<f64>().ok()?;
        return pct.is_finite().then(|| clamp_alpha(pct / 100.0));
    }
    let value = raw.parse::<f64>().ok()?;
    value.is_finite().then(|| clamp_alpha(value))
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_string())
    }
}

impl From<[u8; 3]> for Color {
    fn from(channels: [u8; 3]) -> Self {
        Self::from_array(channels)
    }
}

impl From<Color> for [u8; 3] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Hex
    // =========================================================================

    #[test]
    fn test_parse_hex_6_digit() {
        assert_eq!(Color::parse("#3584e4").unwrap(), Color::rgb(53, 132, 228));
        assert_eq!(Color::parse("#000000").unwrap(), Color::BLACK);
        assert_eq!(Color::parse("#FFFFFF").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_parse_hex_3_digit() {
        assert_eq!(Color::parse("#fff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("#f80").unwrap(), Color::rgb(255, 136, 0));
    }

    #[test]
    fn test_parse_hex_8_digit_carries_alpha() {
        let c = Color::parse("#00000080").unwrap();
        assert_eq!(c.to_array(), [0, 0, 0]);
        let alpha = c.alpha.unwrap();
        assert!((alpha - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(Color::parse("#ff").is_err());
        assert!(Color::parse("#ffff").is_err());
        assert!(Color::parse("#gggggg").is_err());
        assert!(Color::parse("#ffé").is_err());
    }

    #[test]
    fn test_parse_hex_without_prefix() {
        assert_eq!(Color::parse_hex("3584e4").unwrap(), Color::rgb(53, 132, 228));
    }

    // =========================================================================
    // Functions
    // =========================================================================

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!(
            Color::parse("rgb(53, 132, 228)").unwrap(),
            Color::rgb(53, 132, 228)
        );
        assert_eq!(
            Color::parse("RGB(53,132,228)").unwrap(),
            Color::rgb(53, 132, 228)
        );
    }

    #[test]
    fn test_parse_rgba_function() {
        let c = Color::parse("rgba(10, 20, 30, 0.5)").unwrap();
        assert_eq!(c, Color::rgba(10, 20, 30, 0.5));
    }

    #[test]
    fn test_parse_rgba_without_alpha_is_opaque() {
        assert_eq!(
            Color::parse("rgba(10, 20, 30)").unwrap(),
            Color::rgb(10, 20, 30)
        );
    }

    #[test]
    fn test_parse_percent_channels() {
        assert_eq!(
            Color::parse("rgb(100%, 0%, 50%)").unwrap(),
            Color::rgb(255, 0, 128)
        );
    }

    #[test]
    fn test_parse_function_clamps_channels() {
        assert_eq!(
            Color::parse("rgb(300, -4, 12)").unwrap(),
            Color::rgb(255, 0, 12)
        );
    }

    #[test]
    fn test_parse_function_invalid() {
        assert!(Color::parse("rgb(1, 2)").is_err());
        assert!(Color::parse("rgb(a, b, c)").is_err());
        assert!(matches!(
            Color::parse("rgba(1, 2, 3, x)"),
            Err(ColorParseError::InvalidAlpha { .. })
        ));
    }

    #[test]
    fn test_parse_array() {
        assert_eq!(
            Color::parse("[53, 132, 228]").unwrap(),
            Color::rgb(53, 132, 228)
        );
        assert!(Color::parse("[53, 132]").is_err());
        assert!(Color::parse("[53, 132, 256]").is_err());
    }

    #[test]
    fn test_parse_unrecognized() {
        assert!(matches!(
            Color::parse("purple"),
            Err(ColorParseError::Unrecognized(_))
        ));
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    #[test]
    fn test_to_css_string_opaque_is_hex() {
        assert_eq!(Color::rgb(53, 132, 228).to_css_string(), "#3584e4");
    }

    #[test]
    fn test_to_css_string_rounds_alpha_noise() {
        let c = Color::rgba(0, 0, 0, 0.1 + 0.2);
        assert_eq!(c.to_css_string(), "rgba(0, 0, 0, 0.3)");
    }

    #[test]
    fn test_alpha_is_clamped() {
        assert_eq!(Color::rgba(0, 0, 0, 4.0).alpha, Some(1.0));
        assert_eq!(Color::rgba(0, 0, 0, -1.0).alpha, Some(0.0));
    }

    #[test]
    fn test_from_f64_rounds_and_clamps() {
        assert_eq!(Color::from_f64(12.5, 300.0, -2.0), Color::rgb(13, 255, 0));
    }

    #[test]
    fn test_channel_spread() {
        assert_eq!(Color::rgb(53, 132, 228).channel_spread(), 175);
        assert_eq!(Color::grey(80).channel_spread(), 0);
    }

    #[test]
    fn test_serde_as_string() {
        let c = Color::rgba(1, 2, 3, 0.25);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"rgba(1, 2, 3, 0.25)\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
