//! Tintwork - theme overlay stylesheet engine.
//!
//! Tintwork derives an overlay stylesheet set from a desktop theme and keeps
//! it current as preferences, wallpaper-derived colors and the light/dark
//! mode change. It:
//!
//! - detects a theme's deliberate color tint and blends it toward neutral
//!   grey, leaving error, warning and destructive-action styling alone
//! - finds the theme's accent color through a fixed priority search
//! - renders panel, popup and accent fragments and assembles the final GTK
//!   and shell documents
//! - memoizes every stage in a three-tier cache owned by [`OverlayEngine`]
//!
//! The engine never touches disk or the preference store on its own. Hosts
//! supply stylesheet text through [`StylesheetSource`] and preferences through
//! [`SettingsAccessor`], then persist what [`GeneratedOverlay`] hands back.
//!
//! # Quick Start
//!
//! ```rust
//! use tintwork::{
//!     ColorMode, OverlayEngine, OverlaySettings, SourceFile, ThemeId, ThemeStylesheets,
//! };
//!
//! let theme = ThemeStylesheets::new(ThemeId::new("Nordic", "/usr/share/themes/Nordic"))
//!     .with(SourceFile::Gtk, "window { background-color: #2e3440; }\n.error { background: #3584e4; }")
//!     .with(SourceFile::Shell, "#panel { background-color: #2e3440; }");
//!
//! let settings = OverlaySettings {
//!     color_mode: ColorMode::Dark,
//!     tint_strength: 0,
//!     ..OverlaySettings::default()
//! };
//!
//! let mut engine = OverlayEngine::default();
//! let overlay = engine.generate(&theme, &settings).unwrap();
//! assert!(overlay.shell_css.contains("#panel"));
//! assert!(overlay.gtk_css.contains(".error { background: #3584e4; }"));
//!
//! // Same inputs again: everything is served from cache.
//! let again = engine.generate(&theme, &settings).unwrap();
//! assert_eq!(overlay.gtk_css, again.gtk_css);
//! assert!(again.stats.base.hits > 0);
//! ```
//!
//! # Cache tiers
//!
//! | Tier | Key | Invalidated |
//! |------|-----|-------------|
//! | base | theme, GTK version, mode, tint strength, file | theme change, teardown |
//! | component | SHA-256 of the component's projected inputs | never (FIFO eviction only) |
//! | accent | theme path, mode | theme change, teardown |
//!
//! Logging goes through `tracing`; the crate never installs a subscriber.

pub mod accent;
pub mod assemble;
pub mod cache;
pub mod component;
mod engine;
mod error;
pub mod neutralize;
pub mod settings;
mod source;
pub mod stylesheet;
pub mod tint;

pub use accent::{detect_accent, AccentSource, DetectedAccent};
pub use cache::{CacheLimits, CacheManager, CacheReport, CacheStats, CacheTier};
pub use component::{Component, RenderVar, RenderVars};
pub use engine::{DerivedColors, GeneratedOverlay, OverlayEngine};
pub use error::{Error, Result};
pub use neutralize::{neutralize, Neutralized};
pub use settings::{
    ColorMode, GtkVersion, MemorySettings, OverlaySettings, SettingValue, SettingsAccessor,
};
pub use source::{
    DirectorySource, MemorySource, SourceFile, StylesheetSource, ThemeId, ThemeStylesheets,
};
pub use tint::{
    calculate_adaptive_threshold, detect_tint, determine_dominant_channel, is_target_theme_family,
    DominantChannel, TintAnalysis, TintDescriptor,
};

pub use tintwork_color::{AccentVerdict, Color};
