//! Flat selector-block extraction on top of `cssparser`.
//!
//! The scanner records, with absolute byte offsets into the source text:
//!
//! - every qualified rule (`selector { declarations }`), including rules found
//!   inside `@media` / `@supports` blocks, which are flattened;
//! - every declaration inside those rules (property name and raw value text);
//! - every `@define-color name value;` statement.
//!
//! It does not interpret selectors or values. Using the `cssparser` tokenizer
//! instead of a block regex means comments, strings and bracketed values
//! containing `{`, `}` or `;` never split a block.

use std::ops::Range;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

/// One `property: value` pair inside a rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Raw value text, trailing whitespace trimmed, `!important` kept.
    pub value: String,
    /// Byte range of `value` in the scanned source.
    pub value_range: Range<usize>,
}

/// A `selector { ... }` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleBlock {
    /// Raw selector text, trimmed.
    pub selector: String,
    /// Byte range from the first selector character through the closing brace.
    pub range: Range<usize>,
    /// Byte range of the text between the braces.
    pub body_range: Range<usize>,
    pub declarations: Vec<Declaration>,
}

impl RuleBlock {
    /// The comma-separated selectors of this rule, trimmed.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The last declaration of `property` (later declarations win in CSS).
    pub fn declaration(&self, property: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.property == property)
    }
}

/// An `@define-color name value;` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDefinition {
    pub name: String,
    pub value: String,
    /// Byte range of `value` in the scanned source.
    pub value_range: Range<usize>,
}

/// Everything [`scan`] found in one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedStylesheet {
    pub blocks: Vec<RuleBlock>,
    pub definitions: Vec<ColorDefinition>,
}

/// Scans `css` into rule blocks and color definitions.
///
/// Rules the tokenizer cannot make sense of are skipped; scanning itself never
/// fails.
pub fn scan(css: &str) -> ScannedStylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    let mut collector = BlockCollector {
        source_len: css.len(),
        sheet: ScannedStylesheet::default(),
    };

    let rules = cssparser::StyleSheetParser::new(&mut parser, &mut collector);
    for result in rules {
        if let Err((err, rule)) = result {
            tracing::trace!(?err, rule, "skipping rule");
        }
    }

    collector.sheet
}

struct BlockCollector {
    source_len: usize,
    sheet: ScannedStylesheet,
}

enum AtPrelude {
    DefineColor {
        name: String,
        value: String,
        value_start: usize,
    },
    /// `@media` and `@supports`: rules inside are collected as if top-level.
    Nested,
}

impl<'i> QualifiedRuleParser<'i> for BlockCollector {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let selector = input.slice_from(start).trim();
        if selector.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(selector.to_string())
    }

    fn parse_block<'t>(
        &mut self,
        selector: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let body_position = input.position();

        let mut decl_parser = DeclarationCollector;
        let declarations: Vec<Declaration> =
            RuleBodyParser::new(input, &mut decl_parser).flatten().collect();

        let body = input.slice_from(body_position);
        let body_start = body_position.byte_index();
        let body_end = body_start + body.len();

        self.sheet.blocks.push(RuleBlock {
            selector,
            range: start.position().byte_index()..(body_end + 1).min(self.source_len),
            body_range: body_start..body_end,
            declarations,
        });
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for BlockCollector {
    type Prelude = AtPrelude;
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        if name.eq_ignore_ascii_case("define-color") {
            let color_name = input.expect_ident()?.as_ref().to_string();
            input.skip_whitespace();
            let start = input.position();
            while input.next_including_whitespace_and_comments().is_ok() {}
            let value = input.slice_from(start).trim_end();
            if value.is_empty() {
                return Err(input.new_custom_error::<(), ()>(()));
            }
            return Ok(AtPrelude::DefineColor {
                name: color_name,
                value: value.to_string(),
                value_start: start.byte_index(),
            });
        }

        if name.eq_ignore_ascii_case("media") || name.eq_ignore_ascii_case("supports") {
            while input.next().is_ok() {}
            return Ok(AtPrelude::Nested);
        }

        Err(input.new_custom_error::<(), ()>(()))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        match prelude {
            AtPrelude::DefineColor {
                name,
                value,
                value_start,
            } => {
                let value_range = value_start..value_start + value.len();
                self.sheet.definitions.push(ColorDefinition {
                    name,
                    value,
                    value_range,
                });
                Ok(())
            }
            AtPrelude::Nested => Err(()),
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        match prelude {
            AtPrelude::Nested => {
                let rules = cssparser::StyleSheetParser::new(input, self);
                for _ in rules {}
                Ok(())
            }
            AtPrelude::DefineColor { .. } => Err(input.new_custom_error::<(), ()>(())),
        }
    }
}

struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        input.skip_whitespace();
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let value = input.slice_from(start).trim_end();
        let value_start = start.byte_index();

        Ok(Declaration {
            property: name.to_ascii_lowercase(),
            value: value.to_string(),
            value_range: value_start..value_start + value.len(),
        })
    }
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_block() {
        let css = ".panel { background-color: #242424; color: white; }";
        let sheet = scan(css);
        assert_eq!(sheet.blocks.len(), 1);

        let block = &sheet.blocks[0];
        assert_eq!(block.selector, ".panel");
        assert_eq!(block.declarations.len(), 2);

        let bg = block.declaration("background-color").unwrap();
        assert_eq!(bg.value, "#242424");
        assert_eq!(&css[bg.value_range.clone()], "#242424");
        assert_eq!(&css[block.range.clone()], css);
    }

    #[test]
    fn test_scan_define_color() {
        let css = "@define-color accent_bg_color #3584e4;\n@define-color window_bg_color @theme_bg_color;";
        let sheet = scan(css);
        assert_eq!(sheet.definitions.len(), 2);
        assert_eq!(sheet.definitions[0].name, "accent_bg_color");
        assert_eq!(sheet.definitions[0].value, "#3584e4");
        assert_eq!(&css[sheet.definitions[0].value_range.clone()], "#3584e4");
        assert_eq!(sheet.definitions[1].value, "@theme_bg_color");
    }

    #[test]
    fn test_scan_multiple_selectors() {
        let sheet = scan("window.background, .background { color: #eee; }");
        let selectors: Vec<&str> = sheet.blocks[0].selectors().collect();
        assert_eq!(selectors, vec!["window.background", ".background"]);
    }

    #[test]
    fn test_scan_ignores_braces_in_comments_and_strings() {
        let css = "/* a { b } */ .a { content: \"}\"; background: #111; } .b { color: #222; }";
        let sheet = scan(css);
        assert_eq!(sheet.blocks.len(), 2);
        assert_eq!(sheet.blocks[0].selector, ".a");
        assert_eq!(
            sheet.blocks[0].declaration("background").unwrap().value,
            "#111"
        );
        assert_eq!(sheet.blocks[1].selector, ".b");
    }

    #[test]
    fn test_scan_flattens_media_blocks() {
        let css = "@media (prefers-color-scheme: dark) { .a { color: #fff; } } .b { color: #000; }";
        let sheet = scan(css);
        let selectors: Vec<&str> = sheet.blocks.iter().map(|b| b.selector.as_str()).collect();
        assert_eq!(selectors, vec![".a", ".b"]);
    }

    #[test]
    fn test_scan_skips_unknown_at_rules() {
        let css = "@import url(\"base.css\"); @keyframes spin { from { color: red; } } .a { color: #fff; }";
        let sheet = scan(css);
        assert_eq!(sheet.blocks.len(), 1);
        assert_eq!(sheet.blocks[0].selector, ".a");
    }

    #[test]
    fn test_scan_value_with_function_and_important() {
        let css = ".a { background-image: linear-gradient(to bottom, #112233, rgba(1, 2, 3, 0.5)) !important; }";
        let sheet = scan(css);
        let decl = sheet.blocks[0].declaration("background-image").unwrap();
        assert!(decl.value.starts_with("linear-gradient("));
        assert!(decl.value.ends_with("!important"));
        assert_eq!(&css[decl.value_range.clone()], decl.value);
    }

    #[test]
    fn test_last_declaration_wins() {
        let sheet = scan(".a { color: #111; color: #222; }");
        assert_eq!(sheet.blocks[0].declaration("color").unwrap().value, "#222");
    }

    #[test]
    fn test_scan_empty_input() {
        assert_eq!(scan(""), ScannedStylesheet::default());
    }
}
