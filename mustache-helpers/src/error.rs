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

//! Error types for template parsing, helper registration and rendering
//!
//! Parse errors are fatal: they abort the whole parse and carry the byte position
//! of the offending tag together with a short excerpt of the surrounding source.
//! Helper invocation problems at render time are never errors; they are logged
//! and the helper is treated as not having run.

use thiserror::Error;

/// Returns at most the last 32 bytes of a string for error context
pub(crate) fn rcap(src: &str) -> &str {
    static CAP_AT: usize = 32;

    if src.len() > CAP_AT {
        let mut start = src.len() - CAP_AT;
        while !src.is_char_boundary(start) {
            start += 1;
        }
        &src[start..]
    } else {
        src
    }
}

/// Returns the source text leading up to `position`, capped for error messages
pub(crate) fn near(src: &str, position: usize) -> String {
    let mut end = position.min(src.len());
    while !src.is_char_boundary(end) {
        end -= 1;
    }
    rcap(&src[..end]).to_string()
}

/// Fatal template parse failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A tag was opened but its close delimiter never appeared
    #[error("unclosed tag at {position} near \"{near}\"")]
    UnclosedTag { position: usize, near: String },

    /// A quoted helper argument ran to the end of the tag without a closing quote
    #[error("unclosed string at {position} near \"{near}\"")]
    UnclosedString { position: usize, near: String },

    /// A close tag named a different block than the innermost open one
    #[error(
        "cannot close block '{found}' at {position}: there is already an unclosed block '{open}' opened at {open_position}"
    )]
    MismatchedClose {
        found: String,
        position: usize,
        open: String,
        open_position: usize,
    },

    /// A close tag appeared with no block open
    #[error("unexpected close of block '{name}' at {position}")]
    UnopenedClose { name: String, position: usize },

    /// Input ended while a block was still open
    #[error("unclosed block '{name}' opened at {position}")]
    UnclosedBlock { name: String, position: usize },

    /// A set-delimiter tag that does not hold exactly two non-empty delimiters
    #[error("invalid delimiter change at {position} near \"{near}\"")]
    InvalidDelimiters { position: usize, near: String },

    /// A tag with nothing between its delimiters
    #[error("empty tag at {position} near \"{near}\"")]
    EmptyTag { position: usize, near: String },
}

/// Helper registration failures, reported when the registry is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("helper name must not be empty")]
    EmptyName,
}

/// Crate level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for parsing and rendering operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcap_keeps_short_input() {
        assert_eq!(rcap("{{name}}"), "{{name}}");
    }

    #[test]
    fn rcap_respects_char_boundaries() {
        let src = format!("{}é{}", "a".repeat(10), "b".repeat(31));
        let capped = rcap(&src);
        assert!(capped.len() <= 32);
        assert!(capped.ends_with('b'));
    }

    #[test]
    fn mismatched_close_names_open_block() {
        let err = ParseError::MismatchedClose {
            found: "B".to_string(),
            position: 11,
            open: "A".to_string(),
            open_position: 0,
        };
        assert_eq!(
            err.to_string(),
            "cannot close block 'B' at 11: there is already an unclosed block 'A' opened at 0"
        );
    }
}
