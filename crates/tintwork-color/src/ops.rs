//! Perceptual brightness, blending, shading and contrast.

use crate::color::{clamp_channel, Color};
use crate::hsl::Hsl;

/// HSP brightness threshold separating light from dark colors.
pub const HSP_LIGHT_THRESHOLD: f64 = 127.5;

/// Perceived brightness using the HSP model, 0.0–255.0.
///
/// `sqrt(0.299 r² + 0.587 g² + 0.114 b²)`
pub fn hsp_brightness(color: Color) -> f64 {
    let r = color.r as f64;
    let g = color.g as f64;
    let b = color.b as f64;
    (0.299 * r * r + 0.587 * g * g + 0.114 * b * b).sqrt()
}

/// True when the color reads as light under the HSP model.
pub fn is_light(color: Color) -> bool {
    hsp_brightness(color) > HSP_LIGHT_THRESHOLD
}

/// Arithmetic mean of the three channels, rounded.
pub fn average_brightness(color: Color) -> u8 {
    let sum = color.r as u16 + color.g as u16 + color.b as u16;
    clamp_channel(sum as f64 / 3.0)
}

/// The grey with the same average brightness as `color`.
pub fn equal_brightness_grey(color: Color) -> Color {
    Color::grey(average_brightness(color))
}

/// Moves `from` toward `to` by `percent` (0–100). The alpha of `from` is kept.
///
/// `blend(a, b, 0) == a`, `blend(a, b, 100)` has the channels of `b`.
pub fn blend(from: Color, to: Color, percent: u8) -> Color {
    let t = percent.min(100) as f64 / 100.0;
    let mix = |a: u8, b: u8| a as f64 + (b as f64 - a as f64) * t;
    Color {
        alpha: from.alpha,
        ..Color::from_f64(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
    }
}

/// GTK-style `shade()`: scales lightness and saturation by `factor`.
///
/// Factors above 1.0 lighten, below 1.0 darken. Alpha is kept.
pub fn shade(color: Color, factor: f64) -> Color {
    let hsl = color.to_hsl();
    let shaded = Hsl::new(hsl.h, hsl.s * factor, hsl.l * factor);
    Color {
        alpha: color.alpha,
        ..Color::from_hsl(shaded)
    }
}

/// WCAG relative luminance, 0.0 (black) to 1.0 (white).
pub fn relative_luminance(color: Color) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(color.r) + 0.7152 * channel(color.g) + 0.0722 * channel(color.b)
}

/// WCAG contrast ratio between two colors, 1.0–21.0.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (hi, lo) = if la >= lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

/// Picks black or white, whichever contrasts more with `background`.
pub fn readable_foreground(background: Color) -> Color {
    if contrast_ratio(background, Color::BLACK) >= contrast_ratio(background, Color::WHITE) {
        Color::BLACK
    } else {
        Color::WHITE
    }
}
