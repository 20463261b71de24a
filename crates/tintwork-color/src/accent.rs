//! Accent color validation and the depastelize transform.
//!
//! An accent has to read as a color: greys, near-black and near-white values
//! are rejected. Low-but-present saturation is accepted and flagged as
//! [`AccentVerdict::Weak`] so callers can report it.
//!
//! ```rust
//! use tintwork_color::{is_valid_accent, AccentVerdict, Color};
//!
//! assert_eq!(is_valid_accent(Color::rgb(59, 130, 246)), AccentVerdict::Valid);
//! assert!(!is_valid_accent(Color::grey(128)).is_usable());
//! ```

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::hsl::Hsl;

/// Below this saturation a color is grey.
pub const MIN_ACCENT_SATURATION: f64 = 15.0;
/// Below this saturation an accent is usable but weak.
pub const WEAK_ACCENT_SATURATION: f64 = 30.0;
/// Below this lightness a color is near-black.
pub const MIN_ACCENT_LIGHTNESS: f64 = 25.0;
/// Above this lightness a color is near-white.
pub const MAX_ACCENT_LIGHTNESS: f64 = 90.0;
/// Depastelize only touches colors lighter than this.
pub const PASTEL_LIGHTNESS: f64 = 75.0;

const DEPASTEL_MIN_LIGHTNESS: f64 = 50.0;
const DEPASTEL_MAX_LIGHTNESS: f64 = 65.0;
const DEPASTEL_SATURATION_BOOST: f64 = 10.0;

/// Why a candidate accent was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    Grey,
    TooDark,
    TooLight,
}

/// Result of [`is_valid_accent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccentVerdict {
    Valid,
    /// Usable, but saturation is between 15% and 30%.
    Weak,
    Rejected(RejectReason),
}

impl AccentVerdict {
    /// `Valid` or `Weak`.
    pub fn is_usable(&self) -> bool {
        !matches!(self, AccentVerdict::Rejected(_))
    }
}

/// Decides whether `color` can serve as an accent.
pub fn is_valid_accent(color: Color) -> AccentVerdict {
    let hsl = color.to_hsl();

    if hsl.s < MIN_ACCENT_SATURATION {
        return AccentVerdict::Rejected(RejectReason::Grey);
    }
    if hsl.l < MIN_ACCENT_LIGHTNESS {
        return AccentVerdict::Rejected(RejectReason::TooDark);
    }
    if hsl.l > MAX_ACCENT_LIGHTNESS {
        return AccentVerdict::Rejected(RejectReason::TooLight);
    }
    if hsl.s < WEAK_ACCENT_SATURATION {
        return AccentVerdict::Weak;
    }
    AccentVerdict::Valid
}

/// Turns a pale accent into an assertive one.
///
/// Colors with lightness above 75% get their lightness remapped from 75–100
/// onto 50–65 and their saturation raised by 10 points (capped at 100). Hue
/// and alpha are preserved. Other colors are returned unchanged.
pub fn depastelize(color: Color) -> Color {
    let hsl = color.to_hsl();
    if hsl.l <= PASTEL_LIGHTNESS {
        return color;
    }

    let position = (hsl.l - PASTEL_LIGHTNESS) / (100.0 - PASTEL_LIGHTNESS);
    let lightness =
        DEPASTEL_MIN_LIGHTNESS + position * (DEPASTEL_MAX_LIGHTNESS - DEPASTEL_MIN_LIGHTNESS);
    let saturation = (hsl.s + DEPASTEL_SATURATION_BOOST).min(100.0);

    Color {
        alpha: color.alpha,
        ..Color::from_hsl(Hsl::new(hsl.h, saturation, lightness))
    }
}
