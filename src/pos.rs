// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Locations in the input buffer: [Pos](Pos) for humans, [Span](Span)
//! for slicing.

use std::cmp::Eq;
use std::ops::Range;

/// Both line and col are zero based; Emacs uses 1-based line
/// numbering, so line is incremented by 1 in Display. col counts
/// bytes, not characters, since the scanner never decodes.

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        // This, when prefixed with a Debug style path string, is
        // following the Emacs convention for location information.
        f.write_fmt(format_args!("@{}.{}", self.line + 1, self.col))
    }
}

/// Half-open byte range `start..end` into the document buffer. Spans
/// are plain values; they don't borrow the buffer, use
/// [Span::slice](Span::slice) to get at the bytes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Span {
        debug_assert!(start <= end);
        Span { start, end }
    }

    /// The empty span sitting at `at`.
    pub fn empty(at: usize) -> Span {
        Span { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Panics if the span is out of bounds for `input`, which can
    /// only happen when it is applied to a different buffer than the
    /// one it was produced from.
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_one_based_line() {
        assert_eq!(Pos { line: 0, col: 3 }.to_string(), "@1.3");
        assert_eq!(Pos { line: 9, col: 0 }.to_string(), "@10.0");
    }

    #[test]
    fn span_slicing() {
        let input = b"key: value\n";
        let s = Span::new(5, 10);
        assert_eq!(s.len(), 5);
        assert_eq!(s.slice(input), b"value");
        assert!(Span::empty(4).is_empty());
        assert_eq!(Span::empty(4).slice(input), b"");
    }
}
