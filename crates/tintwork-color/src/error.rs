//! Error types for color parsing.

use thiserror::Error;

/// Errors that can occur when parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// Hex notation with the wrong number of digits or a non-hex digit.
    #[error("invalid hex color '{0}' (must be 3, 6 or 8 digits)")]
    InvalidHex(String),

    /// `rgb()` / `rgba()` notation that could not be parsed.
    #[error("invalid color function '{0}'")]
    InvalidFunction(String),

    /// An alpha component outside 0.0..=1.0 or not a number.
    #[error("invalid alpha '{value}' in '{input}'")]
    InvalidAlpha { input: String, value: String },

    /// Anything that is neither hex nor a color function.
    #[error("unrecognized color '{0}'")]
    Unrecognized(String),
}
