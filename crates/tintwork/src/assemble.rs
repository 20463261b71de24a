//! Fragment rendering and document assembly.

use std::fmt::Write as _;

use tintwork_color::{readable_foreground, shade, Color};

use crate::component::{Component, Projection, RenderVar};
use crate::settings::{ColorMode, GtkVersion};
use crate::source::ThemeId;

/// Panel color used when neither the user nor the theme provides one.
pub const FALLBACK_PANEL_DARK: Color = Color::rgb(0x24, 0x24, 0x24);
pub const FALLBACK_PANEL_LIGHT: Color = Color::rgb(0xfa, 0xfa, 0xfa);

/// Which output document is being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Gtk(GtkVersion),
    Shell,
}

/// Values printed in a document header.
#[derive(Debug, Clone, Copy)]
pub struct HeaderInfo<'a> {
    pub theme: &'a ThemeId,
    pub mode: ColorMode,
    pub tint_strength: u8,
}

/// The comment block at the top of every generated document.
///
/// Contains nothing time- or machine-dependent, so identical inputs produce
/// identical documents.
pub fn header(kind: DocumentKind, info: &HeaderInfo<'_>) -> String {
    let target = match kind {
        DocumentKind::Gtk(version) => version.dir_name().to_string(),
        DocumentKind::Shell => "gnome-shell".to_string(),
    };
    format!(
        "/* Generated by tintwork. Changes will be overwritten. */\n\
         /* source: {} | target: {} | mode: {} | tint: {}% */\n",
        info.theme.name, target, info.mode, info.tint_strength
    )
}

/// Renders one component from its projection.
pub fn render_component(projection: &Projection) -> String {
    match projection.component() {
        Component::Panel => render_panel(projection),
        Component::Popup => render_popup(projection),
        Component::AccentRegion => render_accent_region(projection),
        Component::GtkAccent => render_gtk_accent(projection),
    }
}

fn px(projection: &Projection, var: RenderVar) -> u32 {
    projection.number(var).unwrap_or(0.0).round().max(0.0) as u32
}

fn css(color: Color) -> String {
    color.to_css_string()
}

fn render_panel(p: &Projection) -> String {
    let panel = p.color(RenderVar::PanelColor).unwrap_or(FALLBACK_PANEL_DARK);
    let opacity = p.number(RenderVar::PanelOpacity).unwrap_or(1.0);
    let border = p.color(RenderVar::BorderColor).unwrap_or(panel);
    let shadow = p.color(RenderVar::ShadowColor).unwrap_or(Color::BLACK);
    let width = px(p, RenderVar::BorderWidth);

    let mut out = String::new();
    let _ = writeln!(out, "#panel {{");
    let _ = writeln!(out, "  background-color: {};", css(panel.with_alpha(opacity)));
    let _ = writeln!(out, "  border-bottom: {}px solid {};", width, css(border));
    let _ = writeln!(out, "  box-shadow: 0 2px 6px {};", css(shadow));
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, "#panel .panel-button {{");
    let _ = writeln!(out, "  color: {};", css(readable_foreground(panel)));
    let _ = writeln!(out, "}}");
    out
}

fn render_popup(p: &Projection) -> String {
    let panel = p.color(RenderVar::PanelColor).unwrap_or(FALLBACK_PANEL_DARK);
    let opacity = p.number(RenderVar::PopupOpacity).unwrap_or(1.0);
    let border = p.color(RenderVar::BorderColor).unwrap_or(panel);
    let shadow = p.color(RenderVar::ShadowColor).unwrap_or(Color::BLACK);
    let radius = px(p, RenderVar::BorderRadius);
    let width = px(p, RenderVar::BorderWidth);

    let mut out = String::new();
    let _ = writeln!(out, ".popup-menu-content,\n.candidate-popup-content {{");
    let _ = writeln!(out, "  background-color: {};", css(panel.with_alpha(opacity)));
    let _ = writeln!(out, "  color: {};", css(readable_foreground(panel)));
    let _ = writeln!(out, "  border: {}px solid {};", width, css(border));
    let _ = writeln!(out, "  border-radius: {}px;", radius);
    let _ = writeln!(out, "  box-shadow: 0 4px 12px {};", css(shadow));
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, ".popup-menu-item {{");
    let _ = writeln!(out, "  border-radius: {}px;", radius.saturating_sub(width + 3));
    let _ = writeln!(out, "}}");
    out
}

/// Empty without an accent: the theme's own colors stay in charge.
fn render_accent_region(p: &Projection) -> String {
    let Some(accent) = p.color(RenderVar::AccentColor) else {
        return String::new();
    };
    let radius = px(p, RenderVar::BorderRadius);
    let foreground = readable_foreground(accent);

    let mut out = String::new();
    let _ = writeln!(out, ".toggle-switch:checked {{");
    let _ = writeln!(out, "  background-color: {};", css(accent));
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, ".popup-menu-item:checked {{");
    let _ = writeln!(out, "  background-color: {};", css(accent));
    let _ = writeln!(out, "  color: {};", css(foreground));
    let _ = writeln!(out, "  border-radius: {}px;", radius);
    let _ = writeln!(out, "}}");
    let _ = writeln!(out, ".slider {{");
    let _ = writeln!(out, "  -barlevel-active-background-color: {};", css(accent));
    let _ = writeln!(out, "}}");
    out
}

fn render_gtk_accent(p: &Projection) -> String {
    let Some(accent) = p.color(RenderVar::AccentColor) else {
        return String::new();
    };
    let mode = p.mode(RenderVar::ColorMode).unwrap_or_default();
    // Accent-colored text needs more lightness on dark surfaces.
    let text = if mode.is_dark() { shade(accent, 1.25) } else { accent };

    let mut out = String::new();
    let _ = writeln!(out, "@define-color accent_bg_color {};", css(accent));
    let _ = writeln!(out, "@define-color accent_fg_color {};", css(readable_foreground(accent)));
    let _ = writeln!(out, "@define-color accent_color {};", css(text));
    out
}

/// Joins a header, an optional base stylesheet and component fragments.
///
/// Sections are separated by one blank line; empty fragments are skipped.
pub fn assemble_document<'a, I>(header: &str, base: Option<&'a str>, fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::from(header);
    let sections = base
        .into_iter()
        .chain(fragments)
        .map(str::trim_end)
        .filter(|s| !s.is_empty());
    for section in sections {
        out.push('\n');
        out.push_str(section);
        out.push('\n');
    }
    out
}
