//! Theme tint detection.
//!
//! A *tint* is a deliberate color bias on surfaces that would otherwise be
//! neutral: a blue-grey window background instead of a plain grey one. The
//! detector looks for the theme's whole-window foreground and background
//! colors, and the analysis step turns the reference color into an adaptive
//! threshold and a dominant channel for the neutralizer.
//!
//! Detection is opt-in per theme family; see [`is_target_theme_family`].

use serde::Serialize;
use tintwork_color::Color;

use crate::stylesheet::{scan, ScannedStylesheet};

/// Selectors that style the whole window surface.
pub const WINDOW_SELECTORS: &[&str] = &["window", "window.background", ".background"];

/// `@define-color` names consulted when no window block declares a color.
pub const FOREGROUND_VARIABLES: &[&str] = &["window_fg_color", "theme_fg_color"];
pub const BACKGROUND_VARIABLES: &[&str] = &["window_bg_color", "theme_bg_color"];

/// Theme families whose tint is worth neutralizing by default.
pub const DEFAULT_THEME_FAMILIES: &[&str] = &[
    "Nordic", "Orchis", "Colloid", "Graphite", "Fluent", "WhiteSur", "Yaru",
];

/// Minimum adaptive threshold.
pub const MIN_THRESHOLD: u8 = 2;

/// The tint colors found in one stylesheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TintDescriptor {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl TintDescriptor {
    pub fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }

    pub fn foreground_hex(&self) -> Option<String> {
        self.foreground.map(|c| c.to_hex())
    }

    pub fn foreground_rgb(&self) -> Option<[u8; 3]> {
        self.foreground.map(|c| c.to_array())
    }

    pub fn background_hex(&self) -> Option<String> {
        self.background.map(|c| c.to_hex())
    }

    pub fn background_rgb(&self) -> Option<[u8; 3]> {
        self.background.map(|c| c.to_array())
    }

    /// The color the tint is measured on: the background when known, since
    /// that is what the neutralizer rewrites, else the foreground.
    pub fn reference(&self) -> Option<Color> {
        self.background.or(self.foreground)
    }
}

/// Which RGB channel dominates a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantChannel {
    Red,
    Green,
    Blue,
    /// No single channel stands out.
    None,
}

impl DominantChannel {
    /// Whether `color` is dominated by this channel by more than `threshold`.
    ///
    /// Always false for [`DominantChannel::None`].
    pub fn matches(self, color: Color, threshold: u8) -> bool {
        let (r, g, b) = (color.r as i32, color.g as i32, color.b as i32);
        let t = threshold as i32;
        match self {
            DominantChannel::Red => r > g + t && r > b + t,
            DominantChannel::Green => g > r + t && g > b + t,
            DominantChannel::Blue => b > r + t && b > g + t,
            DominantChannel::None => false,
        }
    }
}

/// `max(2, floor(0.08 * (max - min)))` over the reference color's channels.
pub fn calculate_adaptive_threshold(reference: Color) -> u8 {
    let spread = reference.channel_spread() as u32;
    // 8% of spread, in integer arithmetic to keep the floor exact.
    let scaled = (spread * 8 / 100) as u8;
    scaled.max(MIN_THRESHOLD)
}

/// The channel exceeding both others by more than `threshold`, if any.
pub fn determine_dominant_channel(color: Color, threshold: u8) -> DominantChannel {
    [
        DominantChannel::Red,
        DominantChannel::Green,
        DominantChannel::Blue,
    ]
    .into_iter()
    .find(|channel| channel.matches(color, threshold))
    .unwrap_or(DominantChannel::None)
}

/// Case-insensitive prefix match of `theme_name` against `families`.
///
/// `Nordic-darker` belongs to the `Nordic` family.
pub fn is_target_theme_family<S: AsRef<str>>(theme_name: &str, families: &[S]) -> bool {
    let name = theme_name.to_lowercase();
    families.iter().any(|family| {
        let family = family.as_ref().trim().to_lowercase();
        !family.is_empty() && name.starts_with(&family)
    })
}

/// Finds the tint of `css`. Returns an empty descriptor when
/// `is_target_family` is false.
pub fn detect_tint(css: &str, is_target_family: bool) -> TintDescriptor {
    if !is_target_family {
        return TintDescriptor::default();
    }
    detect_tint_in(&scan(css))
}

/// Tint detection on an already scanned stylesheet.
pub fn detect_tint_in(sheet: &ScannedStylesheet) -> TintDescriptor {
    let foreground = window_color(sheet, &["color"])
        .or_else(|| first_definition(sheet, FOREGROUND_VARIABLES));
    let background = window_color(sheet, &["background-color", "background"])
        .or_else(|| first_definition(sheet, BACKGROUND_VARIABLES));

    tracing::debug!(
        foreground = ?foreground.map(|c| c.to_hex()),
        background = ?background.map(|c| c.to_hex()),
        "tint detected"
    );

    TintDescriptor {
        foreground,
        background,
    }
}

fn window_color(sheet: &ScannedStylesheet, properties: &[&str]) -> Option<Color> {
    sheet
        .blocks
        .iter()
        .filter(|block| block.selectors().any(|s| WINDOW_SELECTORS.contains(&s)))
        .find_map(|block| {
            properties
                .iter()
                .filter_map(|p| block.declaration(p))
                .find_map(|decl| sheet.resolve(&decl.value))
        })
}

fn first_definition(sheet: &ScannedStylesheet, names: &[&str]) -> Option<Color> {
    names
        .iter()
        .find_map(|name| sheet.resolve_definition(name))
}

/// Threshold and dominant channel derived from a [`TintDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TintAnalysis {
    pub descriptor: TintDescriptor,
    pub reference: Option<Color>,
    pub threshold: u8,
    pub channel: DominantChannel,
}

impl TintAnalysis {
    pub fn new(descriptor: TintDescriptor) -> Self {
        let reference = descriptor.reference();
        let (threshold, channel) = match reference {
            Some(color) => {
                let threshold = calculate_adaptive_threshold(color);
                (threshold, determine_dominant_channel(color, threshold))
            }
            None => (MIN_THRESHOLD, DominantChannel::None),
        };

        Self {
            descriptor,
            reference,
            threshold,
            channel,
        }
    }

    /// True when there is a channel worth neutralizing.
    pub fn is_tinted(&self) -> bool {
        self.channel != DominantChannel::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_floor() {
        assert_eq!(calculate_adaptive_threshold(Color::grey(128)), 2);
        // spread 20 -> 1.6 -> floor 1 -> clamped to 2
        assert_eq!(calculate_adaptive_threshold(Color::rgb(100, 110, 120)), 2);
    }

    #[test]
    fn test_threshold_scales_with_spread() {
        // #3584e4: spread 175 -> 14
        assert_eq!(calculate_adaptive_threshold(Color::rgb(53, 132, 228)), 14);
        assert_eq!(calculate_adaptive_threshold(Color::rgb(0, 0, 255)), 20);
    }

    #[test]
    fn test_dominant_channel() {
        let blue = Color::rgb(53, 132, 228);
        assert_eq!(determine_dominant_channel(blue, 14), DominantChannel::Blue);
        assert_eq!(
            determine_dominant_channel(Color::rgb(200, 40, 40), 2),
            DominantChannel::Red
        );
        assert_eq!(
            determine_dominant_channel(Color::rgb(40, 200, 40), 2),
            DominantChannel::Green
        );
    }

    #[test]
    fn test_dominant_channel_requires_both_margins() {
        // Blue beats red by a lot but green by only 2.
        assert_eq!(
            determine_dominant_channel(Color::rgb(40, 100, 102), 2),
            DominantChannel::None
        );
        assert_eq!(
            determine_dominant_channel(Color::grey(50), 2),
            DominantChannel::None
        );
    }

    #[test]
    fn test_detect_primary_window_block() {
        let css = "window.background { color: #d8dee9; background-color: #2e3440; }";
        let tint = detect_tint(css, true);
        assert_eq!(tint.foreground_hex().as_deref(), Some("#d8dee9"));
        assert_eq!(tint.background_rgb(), Some([0x2e, 0x34, 0x40]));
    }

    #[test]
    fn test_detect_primary_wins_over_variable() {
        let css = "@define-color window_bg_color #111111;\n.background { background: #2e3440; }";
        let tint = detect_tint(css, true);
        assert_eq!(tint.background_hex().as_deref(), Some("#2e3440"));
    }

    #[test]
    fn test_detect_fallback_variables() {
        let css = "@define-color theme_fg_color #eceff4;\n@define-color window_bg_color @theme_base;\n@define-color theme_base #3b4252;";
        let tint = detect_tint(css, true);
        assert_eq!(tint.foreground_hex().as_deref(), Some("#eceff4"));
        assert_eq!(tint.background_hex().as_deref(), Some("#3b4252"));
    }

    #[test]
    fn test_detect_respects_family_flag() {
        let css = "window { background-color: #3584e4; }";
        assert!(detect_tint(css, false).is_empty());
    }

    #[test]
    fn test_detect_missing_sides_stay_empty() {
        let tint = detect_tint(".button { color: #fff; }", true);
        assert!(tint.is_empty());
        assert_eq!(tint.reference(), None);
    }

    #[test]
    fn test_theme_family_matching() {
        assert!(is_target_theme_family("Nordic-darker", DEFAULT_THEME_FAMILIES));
        assert!(is_target_theme_family("yaru-blue-dark", DEFAULT_THEME_FAMILIES));
        assert!(!is_target_theme_family("Adwaita", DEFAULT_THEME_FAMILIES));
        assert!(!is_target_theme_family("Nordic", &[""]));
    }

    #[test]
    fn test_analysis() {
        let analysis = TintAnalysis::new(TintDescriptor {
            foreground: None,
            background: Some(Color::rgb(53, 132, 228)),
        });
        assert_eq!(analysis.threshold, 14);
        assert_eq!(analysis.channel, DominantChannel::Blue);
        assert!(analysis.is_tinted());

        let empty = TintAnalysis::new(TintDescriptor::default());
        assert!(!empty.is_tinted());
    }
}
