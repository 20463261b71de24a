//! Preference input for a generation pass.
//!
//! Hosts keep preferences in some key-value store. The engine talks to that
//! store through [`SettingsAccessor`] and converts it once per call into the
//! typed [`OverlaySettings`]; nothing downstream looks keys up by name.
//!
//! Missing keys and values of the wrong type fall back to defaults. Values out
//! of range are clamped and logged at `warn`.
//!
//! Settings can also come from YAML, which is convenient for tests and for
//! hosts that keep a config file:
//!
//! ```rust
//! use tintwork::{ColorMode, OverlaySettings};
//!
//! let settings = OverlaySettings::from_yaml("tint-strength: 40\ncolor-mode: dark\n").unwrap();
//! assert_eq!(settings.tint_strength, 40);
//! assert_eq!(settings.color_mode, ColorMode::Dark);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tintwork_color::Color;

use crate::error::Result;
use crate::tint::DEFAULT_THEME_FAMILIES;

/// Setting key names understood by [`OverlaySettings::from_accessor`] and
/// written by [`DerivedColors::persist`](crate::DerivedColors::persist).
pub mod keys {
    pub const TINT_STRENGTH: &str = "tint-strength";
    pub const PANEL_OPACITY: &str = "panel-opacity";
    pub const POPUP_OPACITY: &str = "popup-opacity";
    pub const BORDER_RADIUS: &str = "border-radius";
    pub const BORDER_WIDTH: &str = "border-width";
    pub const SHADOW_STRENGTH: &str = "shadow-strength";
    pub const PANEL_COLOR: &str = "panel-color";
    pub const ACCENT_OVERRIDE: &str = "accent-color-override";
    pub const DEPASTELIZE_ACCENT: &str = "depastelize-accent";
    pub const COLOR_SCHEME: &str = "color-scheme";
    pub const GTK_VERSION: &str = "gtk-version";
    pub const THEME_FAMILIES: &str = "tint-theme-families";

    pub const ACCENT_COLOR: &str = "accent-color";
    pub const BORDER_COLOR: &str = "border-color";
    pub const SHADOW_COLOR: &str = "shadow-color";
}

/// A value stored under a setting key.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

/// Typed access to the host's preference store.
///
/// Only [`get`](Self::get) and [`set`](Self::set) are required; the typed
/// getters return `None` for missing keys and for values of another type.
pub trait SettingsAccessor {
    fn get(&self, key: &str) -> Option<SettingValue>;

    fn set(&mut self, key: &str, value: SettingValue);

    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            SettingValue::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Integers are accepted as doubles.
    fn get_double(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            SettingValue::Double(d) => Some(d),
            SettingValue::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            SettingValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set(key, SettingValue::String(value.to_string()));
    }
}

/// In-memory [`SettingsAccessor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: SettingValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SettingsAccessor for MemorySettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_string(), value);
    }
}

/// Light or dark preference supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Light,
    Dark,
}

impl ColorMode {
    pub fn is_dark(self) -> bool {
        self == ColorMode::Dark
    }

    /// Reads a desktop color-scheme value (`prefer-dark`, `default`, `dark`, ...).
    pub fn from_scheme(scheme: &str) -> Self {
        match scheme.trim().to_ascii_lowercase().as_str() {
            "prefer-dark" | "dark" => ColorMode::Dark,
            _ => ColorMode::Light,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Light => write!(f, "light"),
            ColorMode::Dark => write!(f, "dark"),
        }
    }
}

/// The toolkit generation the GTK document targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GtkVersion {
    #[serde(rename = "gtk-3.0")]
    Gtk3,
    #[default]
    #[serde(rename = "gtk-4.0")]
    Gtk4,
}

impl GtkVersion {
    /// Theme subdirectory name.
    pub fn dir_name(self) -> &'static str {
        match self {
            GtkVersion::Gtk3 => "gtk-3.0",
            GtkVersion::Gtk4 => "gtk-4.0",
        }
    }
}

impl fmt::Display for GtkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for GtkVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gtk-3.0" | "gtk3" | "3" => Ok(GtkVersion::Gtk3),
            "gtk-4.0" | "gtk4" | "4" => Ok(GtkVersion::Gtk4),
            other => Err(format!("unknown GTK version '{}'", other)),
        }
    }
}

/// Every preference a generation pass reads, typed and range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OverlaySettings {
    /// How much of the theme's tint to keep, 0–100.
    pub tint_strength: u8,
    /// 0.0–1.0
    pub panel_opacity: f64,
    /// 0.0–1.0
    pub popup_opacity: f64,
    /// Pixels, 0–32.
    pub border_radius: u32,
    /// Pixels, 0–4.
    pub border_width: u32,
    /// Shadow alpha, 0.0–1.0.
    pub shadow_strength: f64,
    /// Replaces the detected panel color.
    pub panel_color: Option<Color>,
    /// Replaces the detected accent.
    pub accent_override: Option<Color>,
    pub depastelize_accent: bool,
    pub color_mode: ColorMode,
    pub gtk_version: GtkVersion,
    /// Theme name prefixes eligible for tint neutralization.
    pub theme_families: Vec<String>,
}

pub const MAX_BORDER_RADIUS: u32 = 32;
pub const MAX_BORDER_WIDTH: u32 = 4;

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            tint_strength: 30,
            panel_opacity: 0.85,
            popup_opacity: 0.95,
            border_radius: 12,
            border_width: 1,
            shadow_strength: 0.4,
            panel_color: None,
            accent_override: None,
            depastelize_accent: true,
            color_mode: ColorMode::Light,
            gtk_version: GtkVersion::Gtk4,
            theme_families: DEFAULT_THEME_FAMILIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl OverlaySettings {
    /// Parses YAML; omitted fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: OverlaySettings = serde_yaml::from_str(yaml)?;
        Ok(settings.clamped())
    }

    /// Reads every known key from `store`.
    pub fn from_accessor<A: SettingsAccessor + ?Sized>(store: &A) -> Self {
        let mut settings = Self::default();

        if let Some(v) = store.get_int(keys::TINT_STRENGTH) {
            settings.tint_strength = clamp_int(keys::TINT_STRENGTH, v, 0, 100) as u8;
        }
        if let Some(v) = store.get_double(keys::PANEL_OPACITY) {
            settings.panel_opacity = v;
        }
        if let Some(v) = store.get_double(keys::POPUP_OPACITY) {
            settings.popup_opacity = v;
        }
        if let Some(v) = store.get_int(keys::BORDER_RADIUS) {
            settings.border_radius = clamp_int(keys::BORDER_RADIUS, v, 0, MAX_BORDER_RADIUS as i64) as u32;
        }
        if let Some(v) = store.get_int(keys::BORDER_WIDTH) {
            settings.border_width = clamp_int(keys::BORDER_WIDTH, v, 0, MAX_BORDER_WIDTH as i64) as u32;
        }
        if let Some(v) = store.get_double(keys::SHADOW_STRENGTH) {
            settings.shadow_strength = v;
        }
        settings.panel_color = color_setting(store, keys::PANEL_COLOR);
        settings.accent_override = color_setting(store, keys::ACCENT_OVERRIDE);
        if let Some(v) = store.get_bool(keys::DEPASTELIZE_ACCENT) {
            settings.depastelize_accent = v;
        }
        if let Some(scheme) = store.get_string(keys::COLOR_SCHEME) {
            settings.color_mode = ColorMode::from_scheme(&scheme);
        }
        if let Some(version) = store.get_string(keys::GTK_VERSION) {
            match version.parse() {
                Ok(v) => settings.gtk_version = v,
                Err(err) => tracing::warn!(key = keys::GTK_VERSION, %err, "ignoring setting"),
            }
        }
        if let Some(families) = store.get_string(keys::THEME_FAMILIES) {
            settings.theme_families = families
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        settings.clamped()
    }

    /// Pulls every field into its valid range.
    pub fn clamped(mut self) -> Self {
        self.tint_strength = clamp_int(keys::TINT_STRENGTH, self.tint_strength as i64, 0, 100) as u8;
        self.panel_opacity = clamp_unit(keys::PANEL_OPACITY, self.panel_opacity);
        self.popup_opacity = clamp_unit(keys::POPUP_OPACITY, self.popup_opacity);
        self.shadow_strength = clamp_unit(keys::SHADOW_STRENGTH, self.shadow_strength);
        self.border_radius =
            clamp_int(keys::BORDER_RADIUS, self.border_radius as i64, 0, MAX_BORDER_RADIUS as i64) as u32;
        self.border_width =
            clamp_int(keys::BORDER_WIDTH, self.border_width as i64, 0, MAX_BORDER_WIDTH as i64) as u32;
        self
    }
}

fn clamp_int(key: &str, value: i64, min: i64, max: i64) -> i64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!(key, value, clamped, "setting out of range");
    }
    clamped
}

fn clamp_unit(key: &str, value: f64) -> f64 {
    if value.is_nan() {
        tracing::warn!(key, "setting is NaN, using 1.0");
        return 1.0;
    }
    let clamped = value.clamp(0.0, 1.0);
    if clamped != value {
        tracing::warn!(key, value, clamped, "setting out of range");
    }
    clamped
}

/// Empty strings mean "unset"; unparsable ones are logged and ignored.
fn color_setting<A: SettingsAccessor + ?Sized>(store: &A, key: &str) -> Option<Color> {
    let raw = store.get_string(key)?;
    if raw.trim().is_empty() {
        return None;
    }
    match Color::parse(&raw) {
        Ok(color) => Some(color),
        Err(err) => {
            tracing::warn!(key, %err, "ignoring color setting");
            None
        }
    }
}
