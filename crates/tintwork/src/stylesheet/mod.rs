//! Stylesheet scanning shared by the tint, neutralize and accent passes.
//!
//! [`scan`] turns raw CSS into a flat list of rule blocks and `@define-color`
//! statements, with byte offsets back into the source so rewriting code can
//! splice replacements in place. [`find_color_literals`] finds the color
//! literals inside a single value.

mod literal;
mod scan;

pub use literal::{find_color_literals, ColorLiteral, LiteralFormat};
pub use scan::{scan, ColorDefinition, Declaration, RuleBlock, ScannedStylesheet};

use tintwork_color::Color;

/// How many `@name` hops [`ScannedStylesheet::resolve`] follows before giving up.
pub const MAX_REFERENCE_DEPTH: usize = 8;

impl ScannedStylesheet {
    /// The last `@define-color` for `name`.
    pub fn definition(&self, name: &str) -> Option<&ColorDefinition> {
        self.definitions.iter().rev().find(|d| d.name == name)
    }

    /// The last declaration of `property` in any block, in source order.
    pub fn last_declaration(&self, property: &str) -> Option<&Declaration> {
        self.blocks
            .iter()
            .rev()
            .find_map(|block| block.declaration(property))
    }

    /// Resolves a declaration or definition value to a color.
    ///
    /// Handles plain color text, `@name` references into this stylesheet's
    /// definitions, and values that merely contain a literal (the first one
    /// wins, e.g. `linear-gradient(#111, #222)` resolves to `#111`).
    pub fn resolve(&self, value: &str) -> Option<Color> {
        self.resolve_depth(value, 0)
    }

    /// Resolves the named `@define-color` variable.
    pub fn resolve_definition(&self, name: &str) -> Option<Color> {
        self.definition(name)
            .and_then(|def| self.resolve_depth(&def.value, 1))
    }

    fn resolve_depth(&self, value: &str, depth: usize) -> Option<Color> {
        let value = strip_important(value);

        if let Some(name) = value.strip_prefix('@') {
            if depth >= MAX_REFERENCE_DEPTH {
                tracing::debug!(name, "color reference chain too deep");
                return None;
            }
            let def = self.definition(name)?;
            return self.resolve_depth(&def.value, depth + 1);
        }

        Color::parse(value)
            .ok()
            .or_else(|| find_color_literals(value).first().map(|l| l.color))
    }
}

/// Trims a value and drops a trailing `!important`.
pub fn strip_important(value: &str) -> &str {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    match lower.rfind("!important") {
        Some(idx) if lower[idx..].trim_end() == "!important" => trimmed[..idx].trim_end(),
        _ => trimmed,
    }
}
