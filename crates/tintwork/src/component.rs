//! Component fragments and their cache keys.
//!
//! Each [`Component`] declares, through an exhaustive `match`, which
//! [`RenderVar`]s its output depends on. [`RenderVars::project`] copies exactly
//! those values into a [`Projection`]; the projection is both what gets hashed
//! into the cache key and the only input the renderer receives. A component
//! therefore cannot read a value that is missing from its key.

use serde::Serialize;
use tintwork_color::Color;

use crate::cache::fingerprint;
use crate::error::Result;
use crate::settings::ColorMode;

/// A separately cached fragment of generated CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    /// Shell top bar.
    Panel,
    /// Shell popup menus.
    Popup,
    /// Shell widgets drawn in the accent color.
    AccentRegion,
    /// `@define-color` accent overrides for the GTK document.
    GtkAccent,
}

/// Every value a component may render from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderVar {
    PanelColor,
    PanelOpacity,
    PopupOpacity,
    BorderRadius,
    BorderWidth,
    BorderColor,
    ShadowColor,
    AccentColor,
    ColorMode,
}

impl Component {
    pub const SHELL: [Component; 3] = [Component::Panel, Component::Popup, Component::AccentRegion];
    pub const GTK: [Component; 1] = [Component::GtkAccent];

    /// The ordered inputs this component's output depends on.
    pub fn relevant_vars(self) -> &'static [RenderVar] {
        match self {
            Component::Panel => &[
                RenderVar::PanelColor,
                RenderVar::PanelOpacity,
                RenderVar::BorderWidth,
                RenderVar::BorderColor,
                RenderVar::ShadowColor,
            ],
            Component::Popup => &[
                RenderVar::PanelColor,
                RenderVar::PopupOpacity,
                RenderVar::BorderRadius,
                RenderVar::BorderWidth,
                RenderVar::BorderColor,
                RenderVar::ShadowColor,
            ],
            Component::AccentRegion => &[RenderVar::AccentColor, RenderVar::BorderRadius],
            Component::GtkAccent => &[RenderVar::AccentColor, RenderVar::ColorMode],
        }
    }
}

/// A single projected value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    Color(Option<Color>),
    Number(f64),
    Mode(ColorMode),
}

/// The full set of resolved inputs for one generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderVars {
    pub panel_color: Color,
    pub panel_opacity: f64,
    pub popup_opacity: f64,
    pub border_radius: u32,
    pub border_width: u32,
    pub border_color: Color,
    pub shadow_color: Color,
    pub accent: Option<Color>,
    pub color_mode: ColorMode,
}

impl RenderVars {
    pub fn value(&self, var: RenderVar) -> VarValue {
        match var {
            RenderVar::PanelColor => VarValue::Color(Some(self.panel_color)),
            RenderVar::PanelOpacity => VarValue::Number(self.panel_opacity),
            RenderVar::PopupOpacity => VarValue::Number(self.popup_opacity),
            RenderVar::BorderRadius => VarValue::Number(self.border_radius as f64),
            RenderVar::BorderWidth => VarValue::Number(self.border_width as f64),
            RenderVar::BorderColor => VarValue::Color(Some(self.border_color)),
            RenderVar::ShadowColor => VarValue::Color(Some(self.shadow_color)),
            RenderVar::AccentColor => VarValue::Color(self.accent),
            RenderVar::ColorMode => VarValue::Mode(self.color_mode),
        }
    }

    /// Copies the values `component` depends on.
    pub fn project(&self, component: Component) -> Projection {
        Projection {
            component,
            values: component
                .relevant_vars()
                .iter()
                .map(|&var| (var, self.value(var)))
                .collect(),
        }
    }
}

/// The inputs of one component, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    component: Component,
    values: Vec<(RenderVar, VarValue)>,
}

impl Projection {
    pub fn component(&self) -> Component {
        self.component
    }

    /// Component-tier cache key.
    pub fn key(&self) -> Result<String> {
        fingerprint(self)
    }

    fn get(&self, var: RenderVar) -> Option<VarValue> {
        let found = self
            .values
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, value)| *value);
        if found.is_none() {
            tracing::warn!(component = ?self.component, ?var, "render input outside the cache key");
        }
        found
    }

    pub fn color(&self, var: RenderVar) -> Option<Color> {
        match self.get(var)? {
            VarValue::Color(color) => color,
            _ => None,
        }
    }

    pub fn number(&self, var: RenderVar) -> Option<f64> {
        match self.get(var)? {
            VarValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn mode(&self, var: RenderVar) -> Option<ColorMode> {
        match self.get(var)? {
            VarValue::Mode(mode) => Some(mode),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> RenderVars {
        RenderVars {
            panel_color: Color::grey(0x24),
            panel_opacity: 0.85,
            popup_opacity: 0.95,
            border_radius: 12,
            border_width: 1,
            border_color: Color::grey(0x3a),
            shadow_color: Color::rgba(0, 0, 0, 0.4),
            accent: Some(Color::rgb(53, 132, 228)),
            color_mode: ColorMode::Dark,
        }
    }

    #[test]
    fn test_projection_follows_relevant_vars() {
        let projection = vars().project(Component::AccentRegion);
        assert_eq!(projection.color(RenderVar::AccentColor), Some(Color::rgb(53, 132, 228)));
        assert_eq!(projection.number(RenderVar::BorderRadius), Some(12.0));
        assert_eq!(projection.color(RenderVar::PanelColor), None);
    }

    #[test]
    fn test_irrelevant_change_keeps_key() {
        let base = vars();
        let changed = RenderVars {
            border_radius: 4,
            ..base
        };
        assert_eq!(
            base.project(Component::Panel).key().unwrap(),
            changed.project(Component::Panel).key().unwrap()
        );
        assert_ne!(
            base.project(Component::Popup).key().unwrap(),
            changed.project(Component::Popup).key().unwrap()
        );
    }

    #[test]
    fn test_keys_differ_between_components() {
        let vars = vars();
        let panel = vars.project(Component::Panel).key().unwrap();
        let popup = vars.project(Component::Popup).key().unwrap();
        assert_ne!(panel, popup);
    }

    #[test]
    fn test_every_relevant_var_changes_key() {
        let base = vars();
        let tweaked = RenderVars {
            panel_color: Color::grey(0x30),
            panel_opacity: 0.5,
            popup_opacity: 0.5,
            border_radius: 3,
            border_width: 2,
            border_color: Color::grey(0x50),
            shadow_color: Color::rgba(0, 0, 0, 0.1),
            accent: None,
            color_mode: ColorMode::Light,
        };
        for component in Component::SHELL.into_iter().chain(Component::GTK) {
            for &var in component.relevant_vars() {
                let mut mixed = base.project(component);
                for entry in mixed.values.iter_mut() {
                    if entry.0 == var {
                        entry.1 = tweaked.value(var);
                    }
                }
                assert_ne!(
                    mixed.key().unwrap(),
                    base.project(component).key().unwrap(),
                    "{component:?} / {var:?}"
                );
            }
        }
    }
}
