//! Tag parsers recognizing helper calls
//!
//! Each parser only claims a tag whose name is registered; any other tag is
//! left for the stock parsers, so `{{Unregistered}}` stays an ordinary
//! interpolation.

use log::trace;

use super::{
    arguments::{Argument, parse_arguments},
    registry::HelperRegistry,
};
use crate::{
    error::ParseError,
    parser::{
        OpenBlock, Parsed, Processor, TagParser,
        token::{BlockKind, HelperCall, Span, Token},
    },
};

pub const HELPER: &str = "helper";
pub const HELPER_SECTION: &str = "helper_section";
pub const HELPER_INVERTED_SECTION: &str = "helper_inverted_section";

/// A recognized helper tag
struct Call {
    name: String,
    args: Vec<Argument>,
    tag: Span,
    content: Span,
}

/// Parses `name args...}}` starting at `start`
///
/// Returns `None` without consuming anything when the name is not registered.
/// Arguments are only read for helpers that take any; otherwise the rest of the
/// tag is skipped.
fn parse_call(
    processor: &mut Processor<'_>,
    registry: &HelperRegistry,
    start: usize,
) -> Result<Option<Call>, ParseError> {
    let name_start = processor.skip_whitespace(start);
    let name_end = processor.scan_name(name_start);
    let name = &processor.source()[name_start..name_end];
    let Some(helper) = registry.get(name) else {
        return Ok(None);
    };
    let args_start = processor.skip_whitespace(name_end);
    let end = processor.expect_end_tag(args_start)?;

    let (args, content_end) = if helper.arity() > 0 {
        let text = processor.source()[args_start..end].trim_end();
        (parse_arguments(text, args_start)?, args_start + text.len())
    } else {
        (Vec::new(), end)
    };

    let tag_end = end + processor.tags().end.len();
    processor.set_cursor(tag_end);
    trace!("helper tag {} at {}", name, processor.tag_start());
    Ok(Some(Call {
        name: name.to_string(),
        args,
        tag: Span::new(processor.tag_start(), tag_end),
        content: Span::new(name_start, content_end),
    }))
}

/// `{{name args...}}`
pub struct HelperTagParser {
    registry: HelperRegistry,
}

impl HelperTagParser {
    pub fn new(registry: HelperRegistry) -> Self {
        Self { registry }
    }
}

impl TagParser for HelperTagParser {
    fn name(&self) -> &'static str {
        HELPER
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        let start = processor.cursor();
        Ok(parse_call(processor, &self.registry, start)?.map(|call| {
            Parsed::Token(Token::HelperCall(HelperCall {
                name: call.name,
                args: call.args,
                tag: call.tag,
                content: call.content,
            }))
        }))
    }
}

/// `{{#name args...}}` or `{{^name args...}}`
pub struct HelperSectionParser {
    registry: HelperRegistry,
    inverted: bool,
}

impl HelperSectionParser {
    pub fn new(registry: HelperRegistry) -> Self {
        Self {
            registry,
            inverted: false,
        }
    }

    pub fn inverted(registry: HelperRegistry) -> Self {
        Self {
            registry,
            inverted: true,
        }
    }
}

impl TagParser for HelperSectionParser {
    fn name(&self) -> &'static str {
        if self.inverted {
            HELPER_INVERTED_SECTION
        } else {
            HELPER_SECTION
        }
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        let (sigil, kind) = if self.inverted {
            ('^', BlockKind::InvertedHelperSection)
        } else {
            ('#', BlockKind::HelperSection)
        };
        if !processor.rest().starts_with(sigil) {
            return Ok(None);
        }
        let start = processor.cursor() + 1;
        Ok(parse_call(processor, &self.registry, start)?.map(|call| {
            Parsed::Open(OpenBlock {
                kind,
                name: call.name,
                args: call.args,
                open_tag: call.tag,
                content_start: call.tag.end,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        helpers::{arguments::Argument, registry::{HelperRef, ParamType}},
        parser::{
            Parser, ParserPipelineBuilder, stock,
            token::{Block, Tags},
        },
        value::Value,
    };

    fn registry() -> HelperRegistry {
        HelperRegistry::builder()
            .register("Now", HelperRef::new([], |_, _| Value::Null))
            .register(
                "Replace",
                HelperRef::new([ParamType::Str, ParamType::Str], |_, _| Value::Null),
            )
            .build()
            .unwrap()
    }

    fn parser() -> Parser {
        let mut builder = ParserPipelineBuilder::new();
        builder
            .add_before(stock::INTERPOLATION, HelperTagParser::new(registry()))
            .add_before(stock::SECTION, HelperSectionParser::new(registry()))
            .add_before(stock::INVERTED_SECTION, HelperSectionParser::inverted(registry()));
        builder.build()
    }

    fn parse(src: &str) -> Result<Vec<Token>, ParseError> {
        parser().parse(src, &Tags::default())
    }

    #[test]
    fn inline_helper_with_arguments() {
        let tokens = parse("x{{ Replace Name 'a b' }}y").unwrap();
        assert_eq!(
            tokens[1],
            Token::HelperCall(HelperCall {
                name: "Replace".to_string(),
                args: vec![Argument::lookup("Name"), Argument::literal("a b")],
                tag: Span::new(1, 25),
                content: Span::new(4, 22),
            })
        );
    }

    #[test]
    fn zero_argument_helper_ignores_trailing_text() {
        let tokens = parse("{{Now whatever 'unclosed}}").unwrap();
        let Token::HelperCall(call) = &tokens[0] else {
            panic!("expected helper call, got {:?}", tokens[0]);
        };
        assert!(call.args.is_empty());
        assert_eq!(call.tag, Span::new(0, 26));
    }

    #[test]
    fn unregistered_names_fall_through() {
        let tokens = parse("{{Unregistered}}").unwrap();
        assert!(matches!(tokens[0], Token::Interpolation(_)));
    }

    #[test]
    fn helper_names_match_any_case() {
        let tokens = parse("{{now}}").unwrap();
        assert!(matches!(tokens[0], Token::HelperCall(_)));
    }

    #[test]
    fn unclosed_helper_tag() {
        assert!(matches!(
            parse("ab{{Replace x y"),
            Err(ParseError::UnclosedTag { position: 2, .. })
        ));
    }

    #[test]
    fn unclosed_string_argument() {
        assert!(matches!(
            parse("{{Replace 'abc}}"),
            Err(ParseError::UnclosedString { position: 10, .. })
        ));
    }

    #[test]
    fn helper_sections_keep_body() {
        let tokens = parse("{{#Replace a b}}[{{.}}]{{/Replace}}").unwrap();
        let Token::Block(Block {
            kind,
            args,
            raw_body,
            content,
            ..
        }) = &tokens[0]
        else {
            panic!("expected block");
        };
        assert_eq!(*kind, BlockKind::HelperSection);
        assert_eq!(args.len(), 2);
        assert_eq!(raw_body, "[{{.}}]");
        assert_eq!(*content, Span::new(16, 23));
    }

    #[test]
    fn inverted_helper_sections() {
        let tokens = parse("{{^Now}}none{{/Now}}").unwrap();
        let Token::Block(block) = &tokens[0] else {
            panic!("expected block");
        };
        assert_eq!(block.kind, BlockKind::InvertedHelperSection);
    }

    #[test]
    fn mismatched_helper_section_close() {
        assert!(matches!(
            parse("{{#Replace a b}}{{/Now}}"),
            Err(ParseError::MismatchedClose { ref open, .. }) if open == "Replace"
        ));
    }
}
