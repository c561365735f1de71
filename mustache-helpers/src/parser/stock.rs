// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Stock Mustache tags: comments, delimiter changes, sections, inverted
//! sections, close tags and interpolations.

use super::{
    OpenBlock, Parsed, ParserPipelineBuilder, Processor, TagParser,
    token::{BlockKind, Interpolation, Span, Tags, Token},
};
use crate::error::{ParseError, near};

pub const COMMENT: &str = "comment";
pub const DELIMITERS: &str = "delimiters";
pub const SECTION: &str = "section";
pub const INVERTED_SECTION: &str = "inverted_section";
pub const SECTION_END: &str = "section_end";
pub const UNESCAPED: &str = "unescaped";
pub const INTERPOLATION: &str = "interpolation";

/// Reads the trimmed content of a tag after an optional sigil
///
/// Leaves the cursor past the end delimiter and returns the content and the
/// span of the whole tag.
fn read_tag(processor: &mut Processor<'_>, sigil: &str) -> Result<Option<(String, Span)>, ParseError> {
    if !processor.rest().starts_with(sigil) {
        return Ok(None);
    }
    let start = processor.cursor() + sigil.len();
    let end = processor.expect_end_tag(start)?;
    let content = processor.source()[start..end].trim().to_string();
    let tag_end = end + processor.tags().end.len();
    processor.set_cursor(tag_end);
    if content.is_empty() {
        return Err(processor.empty_tag());
    }
    Ok(Some((content, Span::new(processor.tag_start(), tag_end))))
}

struct Comment;

impl TagParser for Comment {
    fn name(&self) -> &'static str {
        COMMENT
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        if !processor.rest().starts_with('!') {
            return Ok(None);
        }
        let end = processor.expect_end_tag(processor.cursor())?;
        processor.set_cursor(end + processor.tags().end.len());
        Ok(Some(Parsed::Skip))
    }
}

/// `{{=<% %>=}}`
struct Delimiters;

impl TagParser for Delimiters {
    fn name(&self) -> &'static str {
        DELIMITERS
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        if !processor.rest().starts_with('=') {
            return Ok(None);
        }
        let start = processor.cursor() + 1;
        let closing = format!("={}", processor.tags().end);
        let end = match processor.source()[start..].find(closing.as_str()) {
            Some(offset) => start + offset,
            None => return Err(processor.unclosed_tag()),
        };
        let invalid = || ParseError::InvalidDelimiters {
            position: processor.tag_start(),
            near: near(processor.source(), end),
        };
        let mut parts = processor.source()[start..end].split_whitespace();
        let tags = match (parts.next(), parts.next(), parts.next()) {
            (Some(open), Some(close), None) if !open.contains('=') && !close.contains('=') => {
                Tags::new(open, close)
            }
            _ => return Err(invalid()),
        };
        processor.set_cursor(end + closing.len());
        Ok(Some(Parsed::Delimiters(tags)))
    }
}

/// `{{#name}}` and `{{^name}}`
struct Section {
    name: &'static str,
    sigil: &'static str,
    kind: BlockKind,
}

impl TagParser for Section {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        Ok(read_tag(processor, self.sigil)?.map(|(name, tag)| {
            Parsed::Open(OpenBlock {
                kind: self.kind,
                name,
                args: Vec::new(),
                open_tag: tag,
                content_start: tag.end,
            })
        }))
    }
}

struct SectionEnd;

impl TagParser for SectionEnd {
    fn name(&self) -> &'static str {
        SECTION_END
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        Ok(read_tag(processor, "/")?.map(|(name, tag)| Parsed::Close { name, tag }))
    }
}

/// `{{{name}}}` and `{{&name}}`
struct Unescaped;

impl TagParser for Unescaped {
    fn name(&self) -> &'static str {
        UNESCAPED
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        let rest = processor.rest();
        let (start, closing) = if rest.starts_with('{') {
            (processor.cursor() + 1, format!("}}{}", processor.tags().end))
        } else if rest.starts_with('&') {
            (processor.cursor() + 1, processor.tags().end.clone())
        } else {
            return Ok(None);
        };
        let end = match processor.source()[start..].find(closing.as_str()) {
            Some(offset) => start + offset,
            None => return Err(processor.unclosed_tag()),
        };
        let path = processor.source()[start..end].trim().to_string();
        let tag_end = end + closing.len();
        processor.set_cursor(tag_end);
        if path.is_empty() {
            return Err(processor.empty_tag());
        }
        Ok(Some(Parsed::Token(Token::Interpolation(Interpolation {
            path,
            escaped: false,
            tag: Span::new(processor.tag_start(), tag_end),
        }))))
    }
}

struct Escaped;

impl TagParser for Escaped {
    fn name(&self) -> &'static str {
        INTERPOLATION
    }

    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
        Ok(read_tag(processor, "")?.map(|(path, tag)| {
            Parsed::Token(Token::Interpolation(Interpolation {
                path,
                escaped: true,
                tag,
            }))
        }))
    }
}

/// Adds the stock tag parsers in their standard order
pub fn add_builtins(builder: &mut ParserPipelineBuilder) {
    builder
        .add(Comment)
        .add(Delimiters)
        .add(Section {
            name: SECTION,
            sigil: "#",
            kind: BlockKind::Section,
        })
        .add(Section {
            name: INVERTED_SECTION,
            sigil: "^",
            kind: BlockKind::InvertedSection,
        })
        .add(SectionEnd)
        .add(Unescaped)
        .add(Escaped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse(src: &str) -> Result<Vec<Token>, ParseError> {
        Parser::default().parse(src, &Tags::default())
    }

    fn interpolation(path: &str, escaped: bool, start: usize, end: usize) -> Token {
        Token::Interpolation(Interpolation {
            path: path.to_string(),
            escaped,
            tag: Span::new(start, end),
        })
    }

    #[test]
    fn triple_mustache_is_unescaped() {
        assert_eq!(parse("{{{ html }}}").unwrap(), vec![interpolation("html", false, 0, 12)]);
        assert_eq!(parse("{{& html}}").unwrap(), vec![interpolation("html", false, 0, 10)]);
    }

    #[test]
    fn empty_tags_are_rejected() {
        assert!(matches!(parse("a{{ }}"), Err(ParseError::EmptyTag { position: 1, .. })));
        assert!(matches!(parse("{{#}}{{/}}"), Err(ParseError::EmptyTag { .. })));
    }

    #[test]
    fn bad_delimiters_are_rejected() {
        assert!(matches!(
            parse("{{=<%=}}"),
            Err(ParseError::InvalidDelimiters { position: 0, .. })
        ));
    }

    #[test]
    fn inverted_section_kind() {
        let tokens = parse("{{^empty}}none{{/empty}}").unwrap();
        let Token::Block(block) = &tokens[0] else {
            panic!("expected block");
        };
        assert_eq!(block.kind, BlockKind::InvertedSection);
        assert_eq!(block.raw_body, "none");
    }
}
