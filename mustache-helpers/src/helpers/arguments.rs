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

//! Helper argument lexing
//!
//! Splits the text following a helper name into positional arguments.
//! Two kinds of argument exist:
//!
//! ## Literals
//! Wrapped in matching single or double quotes. Backslash escapes are removed,
//! so `'it\'s'` becomes `it's`. Literals are passed to the helper as-is:
//! ```text
//! 'I\'m Defaulted'
//! "Count"
//! ```
//!
//! ## Lookups
//! Any other run of non-whitespace characters, resolved against the render
//! scope when the helper is invoked:
//! ```text
//! Count
//! person.name
//! .
//! ```
//!
//! # Examples
//!
//! ```rust
//! use mustache_helpers::Argument;
//! use mustache_helpers::helpers::arguments::parse_arguments;
//!
//! let args = parse_arguments("Name 'XXX' \" \"", 0).unwrap();
//! assert_eq!(args, vec![
//!     Argument::lookup("Name"),
//!     Argument::literal("XXX"),
//!     Argument::literal(" "),
//! ]);
//! ```

use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use crate::error::{ParseError, rcap};

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\\(.)").unwrap());

/// A positional helper argument
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    /// Unescaped text for literals, the raw path for lookups
    pub value: String,
    /// Resolve `value` against the scope rather than using it directly
    pub is_lookup: bool,
}

impl Argument {
    pub fn lookup(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_lookup: true,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_lookup: false,
        }
    }
}

/// Removes backslash escapes from a quoted literal
fn unescape(src: &str) -> Cow<'_, str> {
    ESCAPE.replace_all(src, |captures: &Captures| match &captures[1] {
        "n" => "\n".to_string(),
        "r" => "\r".to_string(),
        "t" => "\t".to_string(),
        "0" => "\0".to_string(),
        other => other.to_string(),
    })
}

/// Finds the byte offset just past the closing quote
///
/// A quote preceded by an odd run of backslashes does not terminate. `\\` is
/// an escaped backslash, so in `'a\\'` the final quote closes the literal.
fn find_end_of_string(src: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in src.char_indices().skip(1) {
        match c {
            '\\' => escaped = !escaped,
            c if c == quote && !escaped => return Some(i + c.len_utf8()),
            _ => escaped = false,
        }
    }
    None
}

/// Finds the end of a bareword
fn find_end(src: &str) -> usize {
    src.char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(i, _)| i)
        .unwrap_or(src.len())
}

/// A single lexed argument and the text after it
struct Lexeme<'a> {
    argument: Argument,
    tail: &'a str,
}

/// Lexes the first argument of `src`, which must not start with whitespace
fn parse<'a>(src: &'a str, position: usize) -> Result<Option<Lexeme<'a>>, ParseError> {
    Ok(match src.chars().next() {
        None => None,
        Some(quote @ ('\'' | '"')) => {
            let end = find_end_of_string(src, quote).ok_or_else(|| ParseError::UnclosedString {
                position,
                near: rcap(src).to_string(),
            })?;
            let inner = &src[quote.len_utf8()..end - quote.len_utf8()];
            Some(Lexeme {
                argument: Argument::literal(unescape(inner)),
                tail: src[end..].trim_start(),
            })
        }
        Some(_) => {
            let end = find_end(src);
            Some(Lexeme {
                argument: Argument::lookup(&src[..end]),
                tail: src[end..].trim_start(),
            })
        }
    })
}

/// Lexes a helper call body into ordered arguments
///
/// `position` is the byte offset of `src` in the template, used to report
/// unclosed strings.
pub fn parse_arguments(src: &str, position: usize) -> Result<Vec<Argument>, ParseError> {
    let mut args = Vec::new();
    let trimmed = src.trim_start();
    let mut rest = trimmed;
    let base = position + (src.len() - trimmed.len());
    while let Some(lexeme) = parse(rest, base + (trimmed.len() - rest.len()))? {
        args.push(lexeme.argument);
        rest = lexeme.tail;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaped_quote_is_part_of_literal() {
        let args = parse_arguments(r"'it\'s'", 0).unwrap();
        assert_eq!(args, vec![Argument::literal("it's")]);
    }

    #[test]
    fn barewords_are_lookups_verbatim() {
        let args = parse_arguments("Count", 0).unwrap();
        assert_eq!(args, vec![Argument::lookup("Count")]);
    }

    #[test]
    fn mixed_arguments_keep_order() {
        let args = parse_arguments("  Value \"I'm Defaulted\"   'Count' 10.21 ", 0).unwrap();
        assert_eq!(
            args,
            vec![
                Argument::lookup("Value"),
                Argument::literal("I'm Defaulted"),
                Argument::literal("Count"),
                Argument::lookup("10.21"),
            ]
        );
    }

    #[test]
    fn quoted_whitespace_is_kept() {
        let args = parse_arguments("Name 'XXX' ' '", 0).unwrap();
        assert_eq!(args[2], Argument::literal(" "));
    }

    #[test]
    fn escaped_backslash_closes_string() {
        let args = parse_arguments(r"'a\\' b", 0).unwrap();
        assert_eq!(args, vec![Argument::literal(r"a\"), Argument::lookup("b")]);
    }

    #[test]
    fn escape_sequences() {
        let args = parse_arguments(r#""line\nnext\ttab""#, 0).unwrap();
        assert_eq!(args, vec![Argument::literal("line\nnext\ttab")]);
    }

    #[test]
    fn other_quote_kind_does_not_close() {
        let args = parse_arguments(r#""it's""#, 0).unwrap();
        assert_eq!(args, vec![Argument::literal("it's")]);
    }

    #[test]
    fn unclosed_string_reports_position() {
        let err = parse_arguments("x 'abc", 10).unwrap_err();
        match err {
            ParseError::UnclosedString { position, .. } => assert_eq!(position, 12),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_arguments() {
        assert!(parse_arguments("   ", 0).unwrap().is_empty());
    }
}
