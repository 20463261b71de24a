//! RGB ↔ HSL conversion.
//!
//! Hue is expressed in degrees (0–360), saturation and lightness in percent
//! (0–100). Percent scale keeps the accent thresholds readable
//! (`saturation < 15.0` rather than `< 0.15`).

use crate::color::Color;

/// A color in HSL space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, 0.0 ≤ h < 360.0.
    pub h: f64,
    /// Saturation in percent, 0.0–100.0.
    pub s: f64,
    /// Lightness in percent, 0.0–100.0.
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(360.0),
            s: s.clamp(0.0, 100.0),
            l: l.clamp(0.0, 100.0),
        }
    }
}

impl Color {
    /// Converts to HSL. Alpha is ignored.
    pub fn to_hsl(&self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;

        if d == 0.0 {
            return Hsl::new(0.0, 0.0, l * 100.0);
        }

        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * (((g - b) / d).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / d + 2.0)
        } else {
            60.0 * ((r - g) / d + 4.0)
        };

        Hsl::new(h, s * 100.0, l * 100.0)
    }

    /// Converts from HSL to an opaque color.
    pub fn from_hsl(hsl: Hsl) -> Self {
        let s = hsl.s / 100.0;
        let l = hsl.l / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = hsl.h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Color::from_f64((r + m) * 255.0, (g + m) * 255.0, (b + m) * 255.0)
    }

    /// Saturation in percent.
    pub fn saturation(&self) -> f64 {
        self.to_hsl().s
    }

    /// Lightness in percent.
    pub fn lightness(&self) -> f64 {
        self.to_hsl().l
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_primary_hues() {
        assert!(approx(Color::rgb(255, 0, 0).to_hsl().h, 0.0, 0.01));
        assert!(approx(Color::rgb(0, 255, 0).to_hsl().h, 120.0, 0.01));
        assert!(approx(Color::rgb(0, 0, 255).to_hsl().h, 240.0, 0.01));
    }

    #[test]
    fn test_grey_has_no_saturation() {
        let hsl = Color::grey(128).to_hsl();
        assert_eq!(hsl.s, 0.0);
        assert!(approx(hsl.l, 50.2, 0.1));
    }

    #[test]
    fn test_reference_blue() {
        let hsl = Color::rgb(59, 130, 246).to_hsl();
        assert!(approx(hsl.s, 91.2, 0.5));
        assert!(approx(hsl.l, 59.8, 0.5));
        assert!(approx(hsl.h, 217.2, 0.5));
    }

    #[test]
    fn test_from_hsl_round_trip() {
        for color in [
            Color::rgb(53, 132, 228),
            Color::rgb(224, 27, 36),
            Color::rgb(246, 211, 45),
            Color::rgb(38, 162, 105),
            Color::grey(37),
        ] {
            let back = Color::from_hsl(color.to_hsl());
            for (a, b) in color.to_array().iter().zip(back.to_array().iter()) {
                assert!((*a as i16 - *b as i16).abs() <= 1, "{color:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_hsl_new_normalizes() {
        let hsl = Hsl::new(-30.0, 140.0, -5.0);
        assert!(approx(hsl.h, 330.0, 1e-9));
        assert_eq!(hsl.s, 100.0);
        assert_eq!(hsl.l, 0.0);
    }
}
