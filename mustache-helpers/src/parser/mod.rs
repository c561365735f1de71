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

//! Template parsing
//!
//! The parser scans the template for start delimiters and, at each one, offers
//! the tag to an ordered pipeline of [`TagParser`]s. The first parser that
//! recognizes the tag consumes it; the others never see it. Parsers that
//! decline must leave the cursor where they found it.
//!
//! # Stock pipeline
//!
//! | name               | syntax                      |
//! |--------------------|-----------------------------|
//! | `comment`          | `{{! text }}`               |
//! | `delimiters`       | `{{=<% %>=}}`               |
//! | `section`          | `{{#name}}`                 |
//! | `inverted_section` | `{{^name}}`                 |
//! | `section_end`      | `{{/name}}`                 |
//! | `unescaped`        | `{{{name}}}` / `{{&name}}`  |
//! | `interpolation`    | `{{name}}`                  |
//!
//! Extensions insert their own parsers in front of a stock one with
//! [`ParserPipelineBuilder::add_before`].
//!
//! # Block matching
//!
//! Opened blocks form a stack. A close tag must name the innermost open block
//! exactly; anything else aborts the parse.

pub mod stock;
pub mod token;

use log::warn;

use crate::error::{ParseError, near};
use crate::helpers::arguments::Argument;
use token::{Block, BlockKind, Span, Tags, Token};

/// What a [`TagParser`] recognized
#[derive(Debug)]
pub enum Parsed {
    /// A complete token
    Token(Token),
    /// The open tag of a block
    Open(OpenBlock),
    /// A close tag
    Close { name: String, tag: Span },
    /// A delimiter change taking effect after this tag
    Delimiters(Tags),
    /// A tag producing no output, such as a comment
    Skip,
}

/// A block whose close tag has not been seen yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenBlock {
    pub kind: BlockKind,
    pub name: String,
    pub args: Vec<Argument>,
    pub open_tag: Span,
    /// Just past the open tag's end delimiter
    pub content_start: usize,
}

/// Cursor over the template source handed to each [`TagParser`]
pub struct Processor<'a> {
    source: &'a str,
    tag_start: usize,
    cursor: usize,
    tags: Tags,
}

impl<'a> Processor<'a> {
    fn new(source: &'a str, tags: Tags) -> Self {
        Self {
            source,
            tag_start: 0,
            cursor: 0,
            tags,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Offset of the current tag's start delimiter
    pub fn tag_start(&self) -> usize {
        self.tag_start
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The source from the cursor onwards
    pub fn rest(&self) -> &'a str {
        &self.source[self.cursor..]
    }

    /// True when the end delimiter starts at `pos`
    pub fn at_end_tag(&self, pos: usize) -> bool {
        self.source[pos..].starts_with(self.tags.end.as_str())
    }

    /// First offset at or after `pos` that is not whitespace
    pub fn skip_whitespace(&self, pos: usize) -> usize {
        self.source[pos..]
            .char_indices()
            .find(|(_, c)| !c.is_whitespace())
            .map(|(i, _)| pos + i)
            .unwrap_or(self.source.len())
    }

    /// End of a name starting at `pos`: the first whitespace or end delimiter
    pub fn scan_name(&self, pos: usize) -> usize {
        self.source[pos..]
            .char_indices()
            .find(|(i, c)| c.is_whitespace() || self.at_end_tag(pos + i))
            .map(|(i, _)| pos + i)
            .unwrap_or(self.source.len())
    }

    /// Offset of the next end delimiter at or after `pos`
    pub fn find_end_tag(&self, pos: usize) -> Option<usize> {
        self.source[pos..].find(self.tags.end.as_str()).map(|i| pos + i)
    }

    /// Like [`Processor::find_end_tag`] but failing with an unclosed tag error
    pub fn expect_end_tag(&self, pos: usize) -> Result<usize, ParseError> {
        self.find_end_tag(pos)
            .ok_or_else(|| self.unclosed_tag())
    }

    pub fn unclosed_tag(&self) -> ParseError {
        ParseError::UnclosedTag {
            position: self.tag_start,
            near: near(self.source, self.source.len()),
        }
    }

    pub fn empty_tag(&self) -> ParseError {
        ParseError::EmptyTag {
            position: self.tag_start,
            near: near(self.source, self.cursor),
        }
    }
}

/// Recognizes one kind of tag
pub trait TagParser: Send + Sync {
    /// Stable name used to position other parsers relative to this one
    fn name(&self) -> &'static str;

    /// Tries to parse the tag whose start delimiter ends at the cursor
    ///
    /// On success the cursor must be left just past the tag's end delimiter.
    /// Returning `Ok(None)` hands the tag to the next parser.
    fn try_parse(&self, processor: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError>;
}

/// Ordered set of tag parsers under construction
pub struct ParserPipelineBuilder {
    parsers: Vec<Box<dyn TagParser>>,
}

impl ParserPipelineBuilder {
    /// An empty pipeline
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// The stock pipeline
    pub fn new() -> Self {
        let mut builder = Self::empty();
        stock::add_builtins(&mut builder);
        builder
    }

    /// Appends a parser to the end of the pipeline
    pub fn add(&mut self, parser: impl TagParser + 'static) -> &mut Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Inserts a parser immediately before the parser called `name`
    ///
    /// Falls back to appending when no such parser exists.
    pub fn add_before(&mut self, name: &str, parser: impl TagParser + 'static) -> &mut Self {
        match self.parsers.iter().position(|p| p.name() == name) {
            Some(index) => self.parsers.insert(index, Box::new(parser)),
            None => {
                warn!(
                    "no parser named {} in pipeline, appending {}",
                    name,
                    parser.name()
                );
                self.parsers.push(Box::new(parser));
            }
        }
        self
    }

    /// Removes every parser called `name`
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.parsers.retain(|p| p.name() != name);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    pub fn build(self) -> Parser {
        Parser {
            parsers: self.parsers,
        }
    }
}

impl Default for ParserPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope of a block while its children are being collected
struct Frame {
    open: OpenBlock,
    children: Vec<Token>,
}

/// Parses templates through a fixed pipeline of tag parsers
pub struct Parser {
    parsers: Vec<Box<dyn TagParser>>,
}

impl Parser {
    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    fn push(stack: &mut [Frame], root: &mut Vec<Token>, token: Token) {
        match stack.last_mut() {
            Some(frame) => frame.children.push(token),
            None => root.push(token),
        }
    }

    fn push_text(stack: &mut [Frame], root: &mut Vec<Token>, text: &str) {
        if !text.is_empty() {
            Self::push(stack, root, Token::Text(text.to_string()));
        }
    }

    fn dispatch(&self, processor: &mut Processor<'_>) -> Result<Parsed, ParseError> {
        let start = processor.cursor();
        for parser in &self.parsers {
            if let Some(parsed) = parser.try_parse(processor)? {
                return Ok(parsed);
            }
            processor.set_cursor(start);
        }
        Err(processor.unclosed_tag())
    }

    fn close(
        source: &str,
        stack: &mut Vec<Frame>,
        name: String,
        tag: Span,
        tags: &Tags,
    ) -> Result<Block, ParseError> {
        let frame = stack.pop().ok_or_else(|| ParseError::UnopenedClose {
            name: name.clone(),
            position: tag.start,
        })?;
        if frame.open.name != name {
            return Err(ParseError::MismatchedClose {
                found: name,
                position: tag.start,
                open: frame.open.name,
                open_position: frame.open.open_tag.start,
            });
        }
        let content = Span::new(frame.open.content_start, tag.start);
        Ok(Block {
            kind: frame.open.kind,
            name: frame.open.name,
            args: frame.open.args,
            open_tag: frame.open.open_tag,
            close_tag: tag,
            content,
            raw_body: source[content.start..content.end].to_string(),
            tags: tags.clone(),
            children: frame.children,
        })
    }

    /// Parses a template starting with the given delimiters
    pub fn parse(&self, source: &str, tags: &Tags) -> Result<Vec<Token>, ParseError> {
        let mut processor = Processor::new(source, tags.clone());
        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut text_start = 0;

        while let Some(offset) = source[processor.cursor..].find(processor.tags.start.as_str()) {
            let tag_start = processor.cursor + offset;
            Self::push_text(&mut stack, &mut root, &source[text_start..tag_start]);
            processor.tag_start = tag_start;
            processor.cursor = tag_start + processor.tags.start.len();

            match self.dispatch(&mut processor)? {
                Parsed::Token(token) => Self::push(&mut stack, &mut root, token),
                Parsed::Open(open) => stack.push(Frame {
                    open,
                    children: Vec::new(),
                }),
                Parsed::Close { name, tag } => {
                    let block = Self::close(source, &mut stack, name, tag, &processor.tags)?;
                    Self::push(&mut stack, &mut root, Token::Block(block));
                }
                Parsed::Delimiters(tags) => processor.tags = tags,
                Parsed::Skip => (),
            }
            text_start = processor.cursor;
        }
        Self::push_text(&mut stack, &mut root, &source[text_start..]);

        match stack.pop() {
            Some(frame) => Err(ParseError::UnclosedBlock {
                name: frame.open.name,
                position: frame.open.open_tag.start,
            }),
            None => Ok(root),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        ParserPipelineBuilder::new().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token::Interpolation;

    fn parse(src: &str) -> Result<Vec<Token>, ParseError> {
        Parser::default().parse(src, &Tags::default())
    }

    #[test]
    fn stock_pipeline_order() {
        assert_eq!(
            ParserPipelineBuilder::new().names(),
            vec![
                "comment",
                "delimiters",
                "section",
                "inverted_section",
                "section_end",
                "unescaped",
                "interpolation"
            ]
        );
    }

    #[test]
    fn text_and_interpolation() {
        let tokens = parse("Hello {{ name }}!").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("Hello ".to_string()),
                Token::Interpolation(Interpolation {
                    path: "name".to_string(),
                    escaped: true,
                    tag: Span::new(6, 16),
                }),
                Token::Text("!".to_string()),
            ]
        );
    }

    #[test]
    fn section_records_body_and_spans() {
        let tokens = parse("a{{#list}}<{{.}}>{{/list}}b").unwrap();
        let Token::Block(block) = &tokens[1] else {
            panic!("expected block, got {:?}", tokens[1]);
        };
        assert_eq!(block.kind, BlockKind::Section);
        assert_eq!(block.raw_body, "<{{.}}>");
        assert_eq!(block.open_tag, Span::new(1, 10));
        assert_eq!(block.close_tag, Span::new(17, 26));
        assert_eq!(block.children.len(), 3);
    }

    #[test]
    fn mismatched_close_is_fatal() {
        let err = parse("{{#A}}x{{/B}}").unwrap_err();
        assert_eq!(
            err,
            ParseError::MismatchedClose {
                found: "B".to_string(),
                position: 7,
                open: "A".to_string(),
                open_position: 0,
            }
        );
    }

    #[test]
    fn close_names_are_case_sensitive() {
        assert!(matches!(
            parse("{{#A}}x{{/a}}"),
            Err(ParseError::MismatchedClose { .. })
        ));
    }

    #[test]
    fn unclosed_block_is_fatal() {
        assert!(matches!(
            parse("{{#A}}x"),
            Err(ParseError::UnclosedBlock { position: 0, .. })
        ));
    }

    #[test]
    fn unopened_close_is_fatal() {
        assert!(matches!(
            parse("x{{/A}}"),
            Err(ParseError::UnopenedClose { position: 1, .. })
        ));
    }

    #[test]
    fn unclosed_tag_is_fatal() {
        assert!(matches!(
            parse("x {{name"),
            Err(ParseError::UnclosedTag { position: 2, .. })
        ));
    }

    #[test]
    fn comments_produce_nothing() {
        assert_eq!(
            parse("a{{! note }}b").unwrap(),
            vec![Token::Text("a".to_string()), Token::Text("b".to_string())]
        );
    }

    #[test]
    fn delimiter_change_applies_to_rest() {
        let tokens = parse("{{=<% %>=}}<%#s%>{{x}}<%/s%>").unwrap();
        let Token::Block(block) = &tokens[0] else {
            panic!("expected block");
        };
        assert_eq!(block.tags, Tags::new("<%", "%>"));
        assert_eq!(block.children, vec![Token::Text("{{x}}".to_string())]);
    }

    #[test]
    fn add_before_positions_parser() {
        struct Noop;
        impl TagParser for Noop {
            fn name(&self) -> &'static str {
                "noop"
            }
            fn try_parse(&self, _: &mut Processor<'_>) -> Result<Option<Parsed>, ParseError> {
                Ok(None)
            }
        }
        let mut builder = ParserPipelineBuilder::new();
        builder.add_before("interpolation", Noop);
        let names = builder.names();
        assert_eq!(names[names.len() - 2], "noop");
        assert_eq!(names[names.len() - 1], "interpolation");
    }

    #[test]
    fn remove_drops_parser_by_name() {
        let mut builder = ParserPipelineBuilder::new();
        builder.remove("comment").remove("unknown");
        let names = builder.names();
        assert_eq!(names.len(), 6);
        assert!(!names.contains(&"comment"));
        assert_eq!(names[0], "delimiters");
    }
}
