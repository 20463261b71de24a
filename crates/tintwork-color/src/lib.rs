//! # tintwork-color
//!
//! Color math used by the `tintwork` stylesheet engine, kept in its own crate
//! so it can be reused (and tested) without any stylesheet machinery.
//!
//! - [`Color`]: RGB with optional alpha; hex, `rgb()`/`rgba()` and array forms
//! - [`Hsl`]: hue/saturation/lightness conversion
//! - [`hsp_brightness`], [`blend`], [`shade`], [`contrast_ratio`]: perceptual helpers
//! - [`is_valid_accent`], [`depastelize`]: accent validation and adjustment
//!
//! ```rust
//! use tintwork_color::{blend, equal_brightness_grey, Color};
//!
//! let tint = Color::rgb(53, 132, 228);
//! let neutral = blend(tint, equal_brightness_grey(tint), 100);
//! assert_eq!(neutral, Color::grey(138));
//! ```

mod accent;
mod color;
mod error;
mod hsl;
mod ops;

pub use accent::{
    depastelize, is_valid_accent, AccentVerdict, RejectReason, MAX_ACCENT_LIGHTNESS,
    MIN_ACCENT_LIGHTNESS, MIN_ACCENT_SATURATION, PASTEL_LIGHTNESS, WEAK_ACCENT_SATURATION,
};
pub use color::{format_alpha, Color};
pub use error::ColorParseError;
pub use hsl::Hsl;
pub use ops::{
    average_brightness, blend, contrast_ratio, equal_brightness_grey, hsp_brightness, is_light,
    readable_foreground, relative_luminance, shade, HSP_LIGHT_THRESHOLD,
};
