//! Tint neutralization for a single stylesheet.
//!
//! Background colors that lean toward the theme's dominant channel are pulled
//! toward a grey of the same average brightness. Blocks styling semantic
//! states (errors, warnings, destructive actions, progress) are never touched.
//! `@define-color` variables are theme-wide aliases and are blended whenever
//! their color is tinted, whatever their name.
//!
//! The rewrite is a splice: every replacement lands on the exact byte range of
//! the literal it replaces, so everything else in the stylesheet (comments,
//! formatting, unknown rules) survives verbatim.

use std::ops::Range;

use tintwork_color::{equal_brightness_grey, Color};

use crate::stylesheet::{find_color_literals, scan};
use crate::tint::DominantChannel;

/// Selector classes whose blocks are never rewritten.
pub const PRESERVED_SELECTORS: &[&str] = &[
    "destructive-action",
    "error",
    "warning",
    "suggested-action",
    "progressbar",
    "progress-bar",
    "progress",
];

/// Declarations whose color literals are candidates for rewriting.
pub const BACKGROUND_PROPERTIES: &[&str] = &["background", "background-color", "background-image"];

/// Result of [`neutralize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neutralized {
    pub css: String,
    pub replacement_count: usize,
    /// Blocks skipped because their selector is on the preserve-list.
    pub preserved_block_count: usize,
}

impl Neutralized {
    fn unchanged(css: &str) -> Self {
        Self {
            css: css.to_string(),
            replacement_count: 0,
            preserved_block_count: 0,
        }
    }
}

/// Blend strength toward grey for a user-facing tint strength.
///
/// Tint strength 100 keeps the theme's tint (blend 0); tint strength 0
/// removes it entirely (blend 100).
pub fn blend_strength(tint_strength: u8) -> u8 {
    100 - tint_strength.min(100)
}

/// Whether any selector in `selector` names a preserve-listed class or element.
///
/// An identifier matches a listed name exactly or as a dash-separated prefix,
/// so `.error`, `label.error:hover` and `.error-label` match but `.errorless`
/// does not.
pub fn is_preserved_selector(selector: &str) -> bool {
    selector
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .any(|token| PRESERVED_SELECTORS.iter().any(|name| is_name_or_prefix(token, name)))
}

fn is_name_or_prefix(token: &str, name: &str) -> bool {
    match token.strip_prefix(name) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}

/// Rewrites tinted background colors in `css`.
///
/// Every literal whose `channel` exceeds both other channels by more than
/// `threshold` becomes `blend_fn(original, grey, blend_strength)`, written back
/// in the literal's own format. Nothing happens when `channel` is
/// [`DominantChannel::None`].
pub fn neutralize<F>(
    css: &str,
    channel: DominantChannel,
    threshold: u8,
    blend_strength: u8,
    blend_fn: F,
) -> Neutralized
where
    F: Fn(Color, Color, u8) -> Color,
{
    if channel == DominantChannel::None {
        return Neutralized::unchanged(css);
    }

    let sheet = scan(css);
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    let mut preserved_block_count = 0;

    let rewrite_value = |value: &str, offset: usize, edits: &mut Vec<(Range<usize>, String)>| {
        for literal in find_color_literals(value) {
            if !channel.matches(literal.color, threshold) {
                continue;
            }
            let grey = equal_brightness_grey(literal.color);
            let rendered = literal.render(blend_fn(literal.color, grey, blend_strength));
            let original = &value[literal.range.clone()];
            if rendered == original {
                continue;
            }
            tracing::trace!(original, replacement = %rendered, "neutralized literal");
            let start = offset + literal.range.start;
            edits.push((start..offset + literal.range.end, rendered));
        }
    };

    for block in &sheet.blocks {
        if is_preserved_selector(&block.selector) {
            preserved_block_count += 1;
            continue;
        }
        for decl in &block.declarations {
            if BACKGROUND_PROPERTIES.contains(&decl.property.as_str()) {
                rewrite_value(&decl.value, decl.value_range.start, &mut edits);
            }
        }
    }

    for def in &sheet.definitions {
        rewrite_value(&def.value, def.value_range.start, &mut edits);
    }

    let replacement_count = edits.len();
    tracing::debug!(
        ?channel,
        threshold,
        blend_strength,
        replacement_count,
        preserved_block_count,
        "neutralized stylesheet"
    );

    Neutralized {
        css: splice(css, edits),
        replacement_count,
        preserved_block_count,
    }
}

/// Applies non-overlapping edits to `source`.
fn splice(source: &str, mut edits: Vec<(Range<usize>, String)>) -> String {
    edits.sort_by_key(|(range, _)| range.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for (range, replacement) in edits {
        if range.start < cursor {
            continue;
        }
        out.push_str(&source[cursor..range.start]);
        out.push_str(&replacement);
        cursor = range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintwork_color::blend;

    const BLUE: &str = "#3584e4";

    #[test]
    fn test_no_channel_is_noop() {
        let css = ".a { background: #3584e4; }";
        let out = neutralize(css, DominantChannel::None, 2, 100, blend);
        assert_eq!(out.css, css);
        assert_eq!(out.replacement_count, 0);
    }

    #[test]
    fn test_full_neutralization_to_grey() {
        let css = format!(".a {{ background-color: {BLUE}; color: {BLUE}; }}");
        let out = neutralize(&css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(out.css, ".a { background-color: #8a8a8a; color: #3584e4; }");
        assert_eq!(out.replacement_count, 1);
    }

    #[test]
    fn test_zero_blend_leaves_css_unchanged() {
        let css = format!(".a {{ background: {BLUE}; }}");
        let out = neutralize(&css, DominantChannel::Blue, 14, 0, blend);
        assert_eq!(out.css, css);
        assert_eq!(out.replacement_count, 0);
    }

    #[test]
    fn test_preserved_blocks_untouched() {
        let css = format!(
            ".a {{ background: {BLUE}; }}\nbutton.destructive-action {{ background: {BLUE}; }}"
        );
        let out = neutralize(&css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(out.replacement_count, 1);
        assert_eq!(out.preserved_block_count, 1);
        assert!(out.css.ends_with("button.destructive-action { background: #3584e4; }"));
    }

    #[test]
    fn test_rgba_keeps_format_and_alpha() {
        let css = ".a { background-image: linear-gradient(rgba(53, 132, 228, 0.5), #3584e4); }";
        let out = neutralize(css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(
            out.css,
            ".a { background-image: linear-gradient(rgba(138, 138, 138, 0.5), #8a8a8a); }"
        );
        assert_eq!(out.replacement_count, 2);
    }

    #[test]
    fn test_every_tinted_define_color_is_rewritten() {
        let css = "@define-color selected_bg_color #3584e4;\n\
                   @define-color accent_bg_color #3584e4;\n\
                   @define-color headerbar_bg_color #3584e4;";
        let out = neutralize(css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(
            out.css,
            "@define-color selected_bg_color #8a8a8a;\n\
             @define-color accent_bg_color #8a8a8a;\n\
             @define-color headerbar_bg_color #8a8a8a;"
        );
        assert_eq!(out.replacement_count, 3);
    }

    #[test]
    fn test_non_matching_literals_untouched() {
        let css = ".a { background: #e01b24; }";
        let out = neutralize(css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(out.css, css);
    }

    #[test]
    fn test_is_preserved_selector() {
        assert!(is_preserved_selector(".error"));
        assert!(is_preserved_selector("label.warning:hover"));
        assert!(is_preserved_selector("progressbar > trough > progress"));
        assert!(is_preserved_selector(".a, .suggested-action"));
        assert!(is_preserved_selector(".warning-box"));
        assert!(is_preserved_selector(".osd .error-label"));
        assert!(is_preserved_selector("button.destructive-action-primary"));
        assert!(!is_preserved_selector(".errorless"));
        assert!(!is_preserved_selector(".no-error"));
        assert!(!is_preserved_selector(".progression"));
    }

    #[test]
    fn test_compound_status_classes_untouched() {
        let css = format!(
            ".warning-box {{ background: {BLUE}; }}\n.osd .error-label {{ background-color: {BLUE}; }}"
        );
        let out = neutralize(&css, DominantChannel::Blue, 14, 100, blend);
        assert_eq!(out.css, css);
        assert_eq!(out.replacement_count, 0);
        assert_eq!(out.preserved_block_count, 2);
    }

    #[test]
    fn test_blend_strength() {
        assert_eq!(blend_strength(0), 100);
        assert_eq!(blend_strength(100), 0);
        assert_eq!(blend_strength(250), 0);
    }
}
