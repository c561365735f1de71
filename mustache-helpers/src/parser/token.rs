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

//! Template tokens
//!
//! Parsing produces a tree of [`Token`]s. Blocks keep their children, the spans of
//! their open and close tags, and the verbatim source between them, so helpers can
//! inspect or re-render the unparsed section body.

use crate::helpers::arguments::Argument;

/// A byte range in the template source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Start and end delimiters of a tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tags {
    pub start: String,
    pub end: String,
}

impl Tags {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for Tags {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

/// A node of the parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text copied to the output
    Text(String),
    /// `{{name}}`, `{{{name}}}` or `{{&name}}`
    Interpolation(Interpolation),
    /// `{{helper args}}`
    HelperCall(HelperCall),
    /// Any paired open/close tag
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolation {
    pub path: String,
    /// HTML-escape the value when written
    pub escaped: bool,
    pub tag: Span,
}

/// A call to an inline helper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCall {
    pub name: String,
    pub args: Vec<Argument>,
    /// The whole tag including delimiters
    pub tag: Span,
    /// From the start of the name to the end of the trimmed arguments
    pub content: Span,
}

/// The kinds of block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Section,
    InvertedSection,
    HelperSection,
    InvertedHelperSection,
}

/// A closed block: `{{#name args}}...{{/name}}` or `{{^name args}}...{{/name}}`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    /// Always empty for plain sections
    pub args: Vec<Argument>,
    pub open_tag: Span,
    pub close_tag: Span,
    /// Between the end of the open tag and the start of the close tag
    pub content: Span,
    /// The source text covered by `content`
    pub raw_body: String,
    /// Delimiters in effect when the block was closed
    pub tags: Tags,
    pub children: Vec<Token>,
}

/// A tag that names something to call, together with its arguments
pub trait CallToken {
    fn identifier(&self) -> &str;
    fn arguments(&self) -> &[Argument];
}

/// The view shared by every block kind
pub trait BlockToken: CallToken {
    fn kind(&self) -> BlockKind;
    fn children(&self) -> &[Token];
    /// The unparsed source between the open and close tags
    fn raw_body(&self) -> &str;
    /// Delimiters to use when re-parsing [`BlockToken::raw_body`]
    fn tags(&self) -> &Tags;
}

impl CallToken for HelperCall {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[Argument] {
        &self.args
    }
}

impl CallToken for Block {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn arguments(&self) -> &[Argument] {
        &self.args
    }
}

impl BlockToken for Block {
    fn kind(&self) -> BlockKind {
        self.kind
    }

    fn children(&self) -> &[Token] {
        &self.children
    }

    fn raw_body(&self) -> &str {
        &self.raw_body
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }
}
