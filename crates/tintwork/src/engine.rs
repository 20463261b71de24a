//! The long-lived owner of all cached state.
//!
//! One [`OverlayEngine`] lives for the whole session. Each call to
//! [`OverlayEngine::generate`] runs a full, synchronous generation pass:
//!
//! 1. note the source theme; a new identity clears the base and accent tiers;
//! 2. detect and analyze the tint of the mode-appropriate GTK stylesheet;
//! 3. neutralize the GTK and shell stylesheets (base tier);
//! 4. detect the accent, unless the user overrides it (accent tier);
//! 5. derive panel, border and shadow colors;
//! 6. render every component from its projection (component tier);
//! 7. assemble the GTK and shell documents.
//!
//! The engine takes `&mut self` everywhere and holds no interior mutability.
//! Share it across threads behind a `Mutex`.

use serde::Serialize;
use tintwork_color::{blend, equal_brightness_grey, is_light, shade, Color};

use crate::accent::{detect_accent, DetectedAccent};
use crate::assemble::{
    assemble_document, header, render_component, DocumentKind, HeaderInfo, FALLBACK_PANEL_DARK,
    FALLBACK_PANEL_LIGHT,
};
use crate::cache::{fingerprint, CacheLimits, CacheManager, CacheReport, CacheTier};
use crate::component::{Component, RenderVars};
use crate::error::{Error, Result};
use crate::neutralize::{blend_strength, neutralize};
use crate::settings::{keys, ColorMode, GtkVersion, OverlaySettings, SettingValue, SettingsAccessor};
use crate::source::{SourceFile, ThemeId, ThemeStylesheets};
use crate::tint::{detect_tint, is_target_theme_family, TintAnalysis};

/// Colors computed during a pass that the host persists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedColors {
    pub panel: Color,
    pub accent: Option<Color>,
    pub border: Color,
    pub shadow: Color,
}

impl DerivedColors {
    /// Derives border and shadow colors from the panel color.
    ///
    /// Borders are a lighter shade of a dark panel and a darker shade of a
    /// light one. Shadows are black in dark mode and a deep shade of the
    /// panel in light mode, with `shadow_strength` as alpha.
    pub fn derive(panel: Color, accent: Option<Color>, mode: ColorMode, shadow_strength: f64) -> Self {
        let panel = panel.without_alpha();
        let border = if is_light(panel) {
            shade(panel, 0.8)
        } else {
            shade(panel, 1.4)
        };
        let shadow = match mode {
            ColorMode::Dark => Color::BLACK.with_alpha(shadow_strength),
            ColorMode::Light => shade(panel, 0.3).with_alpha(shadow_strength * 0.5),
        };
        Self {
            panel,
            accent,
            border,
            shadow,
        }
    }

    /// Writes accent, border and shadow to the host's store. A missing accent
    /// is written as an empty string.
    pub fn persist<A: SettingsAccessor + ?Sized>(&self, store: &mut A) {
        let accent = self.accent.map(|c| c.to_css_string()).unwrap_or_default();
        store.set(keys::ACCENT_COLOR, SettingValue::String(accent));
        store.set(keys::BORDER_COLOR, SettingValue::String(self.border.to_css_string()));
        store.set(keys::SHADOW_COLOR, SettingValue::String(self.shadow.to_css_string()));
    }
}

/// Everything one generation pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedOverlay {
    pub gtk_css: String,
    pub shell_css: String,
    pub colors: DerivedColors,
    pub accent: Option<DetectedAccent>,
    pub tint: TintAnalysis,
    pub stats: CacheReport,
}

/// Inputs that select a base-tier entry. Border radius does not affect base
/// processing and is not part of it.
#[derive(Serialize)]
struct BaseKey<'a> {
    theme: &'a str,
    gtk_version: GtkVersion,
    mode: ColorMode,
    tint_strength: u8,
    neutralize: bool,
    file: SourceFile,
}

#[derive(Serialize)]
struct AccentKey<'a> {
    theme_path: &'a str,
    mode: ColorMode,
}

/// Session-wide generator state.
#[derive(Debug, Default)]
pub struct OverlayEngine {
    cache: CacheManager,
    current_theme: Option<ThemeId>,
}

impl OverlayEngine {
    pub fn new(limits: CacheLimits) -> Self {
        Self {
            cache: CacheManager::new(limits),
            current_theme: None,
        }
    }

    /// Theme seen by the last pass.
    pub fn current_theme(&self) -> Option<&ThemeId> {
        self.current_theme.as_ref()
    }

    /// Runs one generation pass over `theme`.
    pub fn generate(&mut self, theme: &ThemeStylesheets, settings: &OverlaySettings) -> Result<GeneratedOverlay> {
        self.observe_theme(&theme.id);

        let mode = settings.color_mode;
        let targeted = is_target_theme_family(&theme.id.name, &settings.theme_families);

        let (gtk_file, gtk_source) = gtk_source_for(theme, mode);
        let tint_source = gtk_source.or(theme.shell.as_deref()).unwrap_or("");
        let tint = TintAnalysis::new(detect_tint(tint_source, targeted));
        tracing::debug!(
            theme = %theme.id.name,
            targeted,
            channel = ?tint.channel,
            threshold = tint.threshold,
            "tint analysis"
        );

        let gtk_base = match gtk_source {
            Some(css) => Some(self.base_stylesheet(&theme.id, gtk_file, css, &tint, targeted, settings)?),
            None => None,
        };
        let shell_base = match theme.shell.as_deref() {
            Some(css) => Some(self.base_stylesheet(&theme.id, SourceFile::Shell, css, &tint, targeted, settings)?),
            None => None,
        };

        let accent = self.accent(theme, settings)?;
        let accent_color = accent.map(|a| a.effective_color(settings.depastelize_accent));

        let panel = resolve_panel_color(settings, &tint);
        let colors = DerivedColors::derive(panel, accent_color, mode, settings.shadow_strength);
        let vars = RenderVars {
            panel_color: colors.panel,
            panel_opacity: settings.panel_opacity,
            popup_opacity: settings.popup_opacity,
            border_radius: settings.border_radius,
            border_width: settings.border_width,
            border_color: colors.border,
            shadow_color: colors.shadow,
            accent: colors.accent,
            color_mode: mode,
        };

        let shell_fragments = self.render_components(&vars, &Component::SHELL)?;
        let gtk_fragments = self.render_components(&vars, &Component::GTK)?;

        let info = HeaderInfo {
            theme: &theme.id,
            mode,
            tint_strength: settings.tint_strength,
        };
        let gtk_css = assemble_document(
            &header(DocumentKind::Gtk(settings.gtk_version), &info),
            gtk_base.as_deref(),
            gtk_fragments.iter().map(String::as_str),
        );
        let shell_css = assemble_document(
            &header(DocumentKind::Shell, &info),
            shell_base.as_deref(),
            shell_fragments.iter().map(String::as_str),
        );

        Ok(GeneratedOverlay {
            gtk_css,
            shell_css,
            colors,
            accent,
            tint,
            stats: self.cache.report(),
        })
    }

    /// Drops detected accents and processed base stylesheets and forgets the
    /// current theme. Component fragments stay cached.
    pub fn teardown(&mut self) {
        self.cache.invalidate(CacheTier::Accent);
        self.cache.invalidate(CacheTier::Base);
        self.current_theme = None;
        tracing::debug!("overlay engine torn down");
    }

    /// Per-tier cache statistics.
    pub fn stats(&self) -> CacheReport {
        self.cache.report()
    }

    fn observe_theme(&mut self, id: &ThemeId) {
        match &self.current_theme {
            Some(current) if current == id => {}
            Some(current) => {
                tracing::info!(from = %current.name, to = %id.name, "source theme changed");
                self.cache.invalidate(CacheTier::Base);
                self.cache.invalidate(CacheTier::Accent);
                self.current_theme = Some(id.clone());
            }
            None => {
                tracing::info!(theme = %id.name, "source theme set");
                self.current_theme = Some(id.clone());
            }
        }
    }

    fn base_stylesheet(
        &mut self,
        id: &ThemeId,
        file: SourceFile,
        css: &str,
        tint: &TintAnalysis,
        targeted: bool,
        settings: &OverlaySettings,
    ) -> Result<String> {
        let key = fingerprint(&BaseKey {
            theme: &id.name,
            gtk_version: settings.gtk_version,
            mode: settings.color_mode,
            tint_strength: settings.tint_strength,
            neutralize: targeted,
            file,
        })?;

        self.cache.get_or_compute(CacheTier::Base, &key, || {
            if !targeted {
                return Ok::<_, Error>(css.to_string());
            }
            let out = neutralize(
                css,
                tint.channel,
                tint.threshold,
                blend_strength(settings.tint_strength),
                blend,
            );
            Ok(out.css)
        })
    }

    fn accent(&mut self, theme: &ThemeStylesheets, settings: &OverlaySettings) -> Result<Option<DetectedAccent>> {
        if let Some(color) = settings.accent_override {
            return Ok(Some(DetectedAccent::from_override(color)));
        }

        let path = theme.id.path.to_string_lossy();
        let key = fingerprint(&AccentKey {
            theme_path: &path,
            mode: settings.color_mode,
        })?;

        let json = self.cache.get_or_compute(CacheTier::Accent, &key, || {
            let detected = detect_accent(theme, settings.color_mode);
            serde_json::to_string(&detected).map_err(Error::from)
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn render_components(&mut self, vars: &RenderVars, components: &[Component]) -> Result<Vec<String>> {
        components
            .iter()
            .map(|&component| {
                let projection = vars.project(component);
                let key = projection.key()?;
                self.cache.get_or_compute(CacheTier::Component, &key, || {
                    Ok::<_, Error>(render_component(&projection))
                })
            })
            .collect()
    }
}

/// The GTK file matching `mode`: the dark variant in dark mode when the theme
/// ships one, the main file otherwise.
fn gtk_source_for(theme: &ThemeStylesheets, mode: ColorMode) -> (SourceFile, Option<&str>) {
    match (mode, theme.gtk_dark.as_deref()) {
        (ColorMode::Dark, Some(dark)) => (SourceFile::GtkDark, Some(dark)),
        _ => (SourceFile::Gtk, theme.gtk.as_deref()),
    }
}

/// User override, then the theme's tinted background neutralized like the
/// rest of the stylesheet, then the fallback palette.
fn resolve_panel_color(settings: &OverlaySettings, tint: &TintAnalysis) -> Color {
    if let Some(color) = settings.panel_color {
        return color;
    }
    if let Some(background) = tint.descriptor.background {
        if tint.is_tinted() {
            let grey = equal_brightness_grey(background);
            return blend(background, grey, blend_strength(settings.tint_strength));
        }
        return background;
    }
    match settings.color_mode {
        ColorMode::Dark => FALLBACK_PANEL_DARK,
        ColorMode::Light => FALLBACK_PANEL_LIGHT,
    }
}
