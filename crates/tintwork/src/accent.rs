//! Accent color detection.
//!
//! A theme declares its accent in one of several ways depending on its age.
//! Sources are tried in a fixed priority order and the first candidate that
//! passes [`is_valid_accent`] wins:
//!
//! 1. `@define-color accent_bg_color` or the `--accent-bg-color` custom
//!    property (the dark stylesheet first in dark mode, the light one first
//!    otherwise);
//! 2. the background of a plain `switch:checked` rule;
//! 3. `theme_selected_bg_color` / `selected_bg_color`;
//! 4. the shell's `stage { color }`, only when strongly saturated.
//!
//! A theme with no match has no accent. Neutral themes are never given one.

use serde::{Deserialize, Serialize};
use tintwork_color::{depastelize, is_valid_accent, AccentVerdict, Color};

use crate::settings::ColorMode;
use crate::source::ThemeStylesheets;
use crate::stylesheet::{scan, ScannedStylesheet};

pub const MODERN_ACCENT_VARIABLE: &str = "accent_bg_color";
pub const MODERN_ACCENT_PROPERTY: &str = "--accent-bg-color";
pub const SELECTED_BACKGROUND_VARIABLES: &[&str] = &["theme_selected_bg_color", "selected_bg_color"];

/// Pseudo-classes that disqualify a `switch:checked` rule.
pub const EXCLUDED_SWITCH_STATES: &[&str] = &[":hover", ":active", ":disabled", ":backdrop"];

/// The shell stage color is accepted only at or above this HSL saturation.
pub const MIN_STAGE_SATURATION: f64 = 40.0;

/// Where an accent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccentSource {
    ModernVariable,
    CheckedSwitch,
    SelectedBackground,
    StageText,
    /// Set by the user; detection was skipped.
    Override,
}

/// An accent plus its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedAccent {
    pub color: Color,
    pub source: AccentSource,
    pub verdict: AccentVerdict,
}

impl DetectedAccent {
    /// A user-chosen accent. Validated for reporting but always used.
    pub fn from_override(color: Color) -> Self {
        Self {
            color,
            source: AccentSource::Override,
            verdict: is_valid_accent(color),
        }
    }

    pub fn is_weak(&self) -> bool {
        self.verdict == AccentVerdict::Weak
    }

    /// The color to render, depastelized on request. Overrides are kept as is.
    pub fn effective_color(&self, depastelize_pale: bool) -> Color {
        if depastelize_pale && self.source != AccentSource::Override {
            depastelize(self.color)
        } else {
            self.color
        }
    }
}

/// Runs the priority search over every stylesheet of `theme`.
pub fn detect_accent(theme: &ThemeStylesheets, mode: ColorMode) -> Option<DetectedAccent> {
    let light = theme.gtk.as_deref().map(scan);
    let dark = theme.gtk_dark.as_deref().map(scan);
    let shell = theme.shell.as_deref().map(scan);

    let gtk_sheets: Vec<&ScannedStylesheet> = match mode {
        ColorMode::Dark => [dark.as_ref(), light.as_ref()],
        ColorMode::Light => [light.as_ref(), dark.as_ref()],
    }
    .into_iter()
    .flatten()
    .collect();

    let detected = gtk_sheets
        .iter()
        .find_map(|sheet| modern_accent(sheet))
        .or_else(|| gtk_sheets.iter().find_map(|sheet| checked_switch_accent(sheet)))
        .or_else(|| gtk_sheets.iter().find_map(|sheet| selected_background_accent(sheet)))
        .or_else(|| shell.as_ref().and_then(stage_accent));

    match &detected {
        Some(accent) => tracing::debug!(
            theme = %theme.id.name,
            %mode,
            color = %accent.color.to_hex(),
            source = ?accent.source,
            verdict = ?accent.verdict,
            "accent detected"
        ),
        None => tracing::debug!(theme = %theme.id.name, %mode, "no accent detected"),
    }
    detected
}

fn accept(color: Color, source: AccentSource) -> Option<DetectedAccent> {
    let color = color.without_alpha();
    let verdict = is_valid_accent(color);
    if !verdict.is_usable() {
        tracing::trace!(color = %color.to_hex(), ?source, ?verdict, "accent candidate rejected");
        return None;
    }
    Some(DetectedAccent {
        color,
        source,
        verdict,
    })
}

fn modern_accent(sheet: &ScannedStylesheet) -> Option<DetectedAccent> {
    let from_variable = sheet.resolve_definition(MODERN_ACCENT_VARIABLE);
    let from_property = || {
        sheet
            .last_declaration(MODERN_ACCENT_PROPERTY)
            .and_then(|decl| sheet.resolve(&decl.value))
    };
    [from_variable, from_property()]
        .into_iter()
        .flatten()
        .find_map(|color| accept(color, AccentSource::ModernVariable))
}

/// `switch:checked` with no interaction or window state attached.
pub fn is_plain_checked_switch(selector: &str) -> bool {
    let selector = selector.trim();
    if EXCLUDED_SWITCH_STATES.iter().any(|state| selector.contains(state)) {
        return false;
    }
    let last = selector
        .rsplit(|c: char| c.is_whitespace() || c == '>' || c == '+' || c == '~')
        .next()
        .unwrap_or(selector);
    last.starts_with("switch") && last.contains(":checked")
}

fn checked_switch_accent(sheet: &ScannedStylesheet) -> Option<DetectedAccent> {
    sheet
        .blocks
        .iter()
        .filter(|block| block.selectors().any(is_plain_checked_switch))
        .flat_map(|block| {
            ["background-color", "background"]
                .into_iter()
                .filter_map(|property| block.declaration(property))
        })
        .filter_map(|decl| sheet.resolve(&decl.value))
        .find_map(|color| accept(color, AccentSource::CheckedSwitch))
}

fn selected_background_accent(sheet: &ScannedStylesheet) -> Option<DetectedAccent> {
    SELECTED_BACKGROUND_VARIABLES
        .iter()
        .filter_map(|name| sheet.resolve_definition(name))
        .find_map(|color| accept(color, AccentSource::SelectedBackground))
}

fn stage_accent(sheet: &ScannedStylesheet) -> Option<DetectedAccent> {
    sheet
        .blocks
        .iter()
        .filter(|block| block.selectors().any(|s| s == "stage"))
        .filter_map(|block| block.declaration("color"))
        .filter_map(|decl| sheet.resolve(&decl.value))
        .filter(|color| color.saturation() >= MIN_STAGE_SATURATION)
        .find_map(|color| accept(color, AccentSource::StageText))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceFile, ThemeId};

    fn theme() -> ThemeStylesheets {
        ThemeStylesheets::new(ThemeId::new("Test", "/themes/Test"))
    }

    #[test]
    fn test_modern_variable_wins() {
        let sheets = theme().with(
            SourceFile::Gtk,
            "@define-color accent_bg_color #3584e4;\nswitch:checked { background-color: #e01b24; }",
        );
        let accent = detect_accent(&sheets, ColorMode::Light).unwrap();
        assert_eq!(accent.color, Color::rgb(53, 132, 228));
        assert_eq!(accent.source, AccentSource::ModernVariable);
        assert_eq!(accent.verdict, AccentVerdict::Valid);
    }

    #[test]
    fn test_custom_property() {
        let sheets = theme().with(SourceFile::Gtk, ":root { --accent-bg-color: #9141ac; }");
        let accent = detect_accent(&sheets, ColorMode::Light).unwrap();
        assert_eq!(accent.color.to_hex(), "#9141ac");
        assert_eq!(accent.source, AccentSource::ModernVariable);
    }

    #[test]
    fn test_dark_file_first_in_dark_mode() {
        let sheets = theme()
            .with(SourceFile::Gtk, "@define-color accent_bg_color #1c71d8;")
            .with(SourceFile::GtkDark, "@define-color accent_bg_color #78aeed;");
        let dark = detect_accent(&sheets, ColorMode::Dark).unwrap();
        assert_eq!(dark.color.to_hex(), "#78aeed");
        let light = detect_accent(&sheets, ColorMode::Light).unwrap();
        assert_eq!(light.color.to_hex(), "#1c71d8");
    }

    #[test]
    fn test_hover_only_switch_yields_none() {
        let sheets = theme().with(
            SourceFile::Gtk,
            "switch:checked:hover { background-color: #3584e4; }",
        );
        assert_eq!(detect_accent(&sheets, ColorMode::Dark), None);
    }

    #[test]
    fn test_plain_checked_switch() {
        let sheets = theme().with(
            SourceFile::Gtk,
            "switch:checked:backdrop { background-color: #888a85; }\nswitch:checked { background-color: #2a76c6; }",
        );
        let accent = detect_accent(&sheets, ColorMode::Light).unwrap();
        assert_eq!(accent.source, AccentSource::CheckedSwitch);
        assert_eq!(accent.color.to_hex(), "#2a76c6");
    }

    #[test]
    fn test_invalid_candidate_falls_through() {
        let sheets = theme().with(
            SourceFile::Gtk,
            "@define-color accent_bg_color #808080;\n@define-color theme_selected_bg_color #e95420;",
        );
        let accent = detect_accent(&sheets, ColorMode::Light).unwrap();
        assert_eq!(accent.source, AccentSource::SelectedBackground);
        assert_eq!(accent.color.to_hex(), "#e95420");
    }

    #[test]
    fn test_stage_requires_strong_saturation() {
        let weak = theme().with(SourceFile::Shell, "stage { color: #8c9cb0; }");
        assert_eq!(detect_accent(&weak, ColorMode::Dark), None);

        let strong = theme().with(SourceFile::Shell, "stage { color: #3584e4; }");
        let accent = detect_accent(&strong, ColorMode::Dark).unwrap();
        assert_eq!(accent.source, AccentSource::StageText);
    }

    #[test]
    fn test_neutral_theme_has_no_accent() {
        let sheets = theme()
            .with(SourceFile::Gtk, "@define-color accent_bg_color #ffffff;\nwindow { background: #242424; }")
            .with(SourceFile::Shell, "stage { color: #eeeeee; }");
        assert_eq!(detect_accent(&sheets, ColorMode::Light), None);
    }

    #[test]
    fn test_is_plain_checked_switch() {
        assert!(is_plain_checked_switch("switch:checked"));
        assert!(is_plain_checked_switch("row switch:checked"));
        assert!(!is_plain_checked_switch("switch:checked:hover"));
        assert!(!is_plain_checked_switch("switch:checked:disabled"));
        assert!(!is_plain_checked_switch("switch:checked slider"));
        assert!(!is_plain_checked_switch("switch"));
    }

    #[test]
    fn test_effective_color() {
        let pale = Color::rgb(200, 220, 250);
        let detected = DetectedAccent {
            color: pale,
            source: AccentSource::ModernVariable,
            verdict: AccentVerdict::Valid,
        };
        assert!(detected.effective_color(true).lightness() <= 65.5);
        assert_eq!(detected.effective_color(false), pale);
        assert_eq!(DetectedAccent::from_override(pale).effective_color(true), pale);
    }
}
