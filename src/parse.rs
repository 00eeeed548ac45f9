// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The line scanner: a cursor over a borrowed byte buffer that
//! classifies one line per call to
//! [Parser::parse_next](Parser::parse_next). Nothing is copied, item
//! text is handed out as [Span](crate::pos::Span)s into the buffer.
//!
//! The protocol has two phases. When a line carries an inline value
//! (`key: value`, `- value`, `> value`), `parse_next` returns
//! `Status::NeedsValue` with a [PendingValue](PendingValue) token, and
//! the token has to be handed to [Parser::value](Parser::value) before
//! scanning can continue:
//!
//! ```
//! use nestext::parse::{Parser, Status, LineType};
//!
//! let mut p = Parser::new(b"a: 1\n");
//! let Ok(Status::NeedsValue(pending)) = p.parse_next() else { panic!() };
//! assert_eq!((p.line_type(), p.item()), (LineType::DictKey, &b"a"[..]));
//! p.value(pending);
//! assert_eq!((p.line_type(), p.item()), (LineType::DictValue, &b"1"[..]));
//! assert_eq!(p.parse_next(), Ok(Status::Done));
//! ```
//!
//! See [parse](parse) for an iterator that does this folding, which
//! is what most consumers want.

use crate::indent::Indentation;
use crate::pos::{Pos, Span};
use crate::settings::{Settings, DEFAULT_SETTINGS};
use bstr::BStr;
use memchr::{memchr2, memchr3};
use thiserror::Error;
use tracing::{debug, trace};
use std::fmt::Write;

const SPACE: u8 = b' ';
const LF: u8 = b'\n';
const CR: u8 = b'\r';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineType {
    Comment,
    StringItem,
    ListItem,
    DictKey,
    DictValue,
    /// The last line could not be classified (after an error).
    Unknown,
}

/// All of these are "unexpected input"; the parser does not recover
/// from any of them.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected ' ' or end of line after '{}', got '{}'",
            .marker.escape_ascii(), .found.escape_ascii())]
    MissingSpaceAfterMarker { marker: u8, found: u8 },
    #[error("missing ':' after dict key")]
    MissingColon,
    #[error("expected ' ' or end of line after ':', got '{}'",
            .found.escape_ascii())]
    MissingSpaceAfterColon { found: u8 },
    #[error("inline lists ('[') are not supported")]
    InlineList,
    #[error("inline dicts ('{{') are not supported")]
    InlineDict,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("{err} {pos}")]
pub struct ParseErrorWithPos {
    pub err: ParseError,
    pub pos: Pos,
    /// Byte offset of the offending byte (or of the end of input).
    pub offset: usize,
}

impl ParseError {
    fn at(self, pos: Pos, offset: usize) -> ParseErrorWithPos {
        ParseErrorWithPos {
            err: self,
            pos,
            offset,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
#[must_use = "a NeedsValue status has to be passed on to Parser::value"]
pub enum Status {
    /// An item is available via `Parser::item`.
    Ok,
    /// A key or marker was recognized and its value follows on the
    /// same line; call `Parser::value` with the token next.
    NeedsValue(PendingValue),
    /// End of input; returned again on every further call.
    Done,
}

/// Capability to read the inline value of the current line. Only
/// `Parser::parse_next` creates these, only `Parser::value` takes
/// them.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingValue {
    start: usize,
}

/// Scanner state for one document. Holds nothing but the borrow of
/// the input and a few offsets, so it can be created and dropped
/// freely; stopping to call `parse_next` is all the cleanup needed.
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    cursor: usize,
    item: Span,
    item_pos: Pos,
    line_type: LineType,
    indentation: Indentation,
    retain_comments: bool,
    // line number and start offset of the line the cursor is on
    line: u32,
    line_start: usize,
    // first non-space byte of the last scanned line
    line_pos: Pos,
    pending: bool,
    failed: Option<ParseErrorWithPos>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Parser<'a> {
        Parser::with_settings(input, &DEFAULT_SETTINGS)
    }

    pub fn with_settings(input: &'a [u8], settings: &Settings) -> Parser<'a> {
        let origin = Pos { line: 0, col: 0 };
        Parser {
            input,
            cursor: 0,
            item: Span::empty(0),
            item_pos: origin,
            line_type: LineType::Unknown,
            indentation: Indentation::new(),
            retain_comments: settings.modes.retain_comments,
            line: 0,
            line_start: 0,
            line_pos: origin,
            pending: false,
            failed: None,
        }
    }

    /// Start over from the beginning of the same input, keeping the
    /// settings.
    pub fn reset(&mut self) {
        let retain_comments = self.retain_comments;
        *self = Parser::new(self.input);
        self.retain_comments = retain_comments;
    }

    /// Scan up to and including the next line that yields something.
    ///
    /// Blank lines, and comment lines unless comments are retained,
    /// are consumed without a trace. After an `Err`, the parser stays
    /// failed and keeps returning the same error.
    ///
    /// # Panics
    ///
    /// If the previous call returned `Status::NeedsValue` and its
    /// token was not passed to `value`.
    pub fn parse_next(&mut self) -> Result<Status, ParseErrorWithPos> {
        if let Some(e) = self.failed {
            return Err(e)
        }
        assert!(!self.pending,
                "Parser::parse_next called before Parser::value consumed \
                 the pending value");
        loop {
            if self.cursor == self.input.len() {
                return Ok(Status::Done)
            }
            let indent = self.rest().iter().take_while(|b| **b == SPACE).count();
            self.cursor += indent;
            self.line_pos = self.pos_at(self.cursor);
            match self.peek() {
                None | Some(LF) | Some(CR) => {
                    // blank line, also when it's just spaces up to EOF
                    self.consume_terminator();
                }
                Some(b'#') => {
                    if let Some(status) = self.comment() {
                        return Ok(status)
                    }
                }
                Some(first) => {
                    let depth = self.indentation.step(indent);
                    let status = self.structural(first)?;
                    trace!(line = self.line_pos.line + 1, depth,
                           line_type = ?self.line_type, "line");
                    return Ok(status)
                }
            }
        }
    }

    /// Take the rest of the current line as a `DictValue` item. Any
    /// bytes are fine except line terminators, the value may be
    /// empty. Returns the item's span.
    ///
    /// # Panics
    ///
    /// If `pending` does not belong to the line the parser is on.
    pub fn value(&mut self, pending: PendingValue) -> Span {
        assert!(self.pending && pending.start == self.cursor,
                "PendingValue does not belong to the current line");
        self.pending = false;
        let start = self.cursor;
        let end = self.find_terminator(start);
        self.set_item(Span::new(start, end));
        self.cursor = end;
        self.consume_terminator();
        self.line_type = LineType::DictValue;
        self.item
    }

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    pub fn depth(&self) -> usize {
        self.indentation.depth()
    }

    pub fn item_span(&self) -> Span {
        self.item
    }

    /// The text of the last item. Only meaningful right after the
    /// call that produced it.
    pub fn item(&self) -> &'a [u8] {
        self.item.slice(self.input)
    }

    /// Where the last item starts.
    pub fn item_pos(&self) -> Pos {
        self.item_pos
    }

    /// Where the last scanned line starts, after its indentation.
    pub fn line_pos(&self) -> Pos {
        self.line_pos
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    pub fn is_done(&self) -> bool {
        self.failed.is_none() && !self.pending && self.cursor == self.input.len()
    }

    // ---- line handlers --------------------------------------------------

    fn comment(&mut self) -> Option<Status> {
        let start = self.cursor + 1;
        self.cursor = self.find_terminator(start);
        if self.retain_comments {
            self.set_item(Span::new(start, self.cursor));
            self.line_type = LineType::Comment;
            self.consume_terminator();
            Some(Status::Ok)
        } else {
            self.consume_terminator();
            None
        }
    }

    fn structural(&mut self, first: u8) -> Result<Status, ParseErrorWithPos> {
        match first {
            b'-' => self.marker(first, LineType::ListItem),
            b'>' => self.marker(first, LineType::StringItem),
            b'[' => Err(self.fail(ParseError::InlineList)),
            b'{' => Err(self.fail(ParseError::InlineDict)),
            _ => self.dict_key(),
        }
    }

    // `-` and `>`
    fn marker(&mut self, marker: u8, line_type: LineType)
              -> Result<Status, ParseErrorWithPos> {
        self.cursor += 1;
        // Never leave the previous item's span around.
        self.set_item(Span::empty(self.cursor));
        match self.peek() {
            Some(SPACE) => {
                self.cursor += 1;
                self.line_type = line_type;
                Ok(self.needs_value())
            }
            None | Some(LF) | Some(CR) => {
                self.consume_terminator();
                self.line_type = line_type;
                Ok(Status::Ok)
            }
            Some(found) => {
                Err(self.fail(ParseError::MissingSpaceAfterMarker { marker, found }))
            }
        }
    }

    fn dict_key(&mut self) -> Result<Status, ParseErrorWithPos> {
        let start = self.cursor;
        match memchr3(b':', LF, CR, self.rest()) {
            Some(i) if self.input[start + i] == b':' => {
                let colon = start + i;
                self.set_item(Span::new(start, colon));
                self.cursor = colon + 1;
                match self.peek() {
                    Some(SPACE) => {
                        self.cursor += 1;
                        self.line_type = LineType::DictKey;
                        Ok(self.needs_value())
                    }
                    None | Some(LF) | Some(CR) => {
                        self.consume_terminator();
                        self.line_type = LineType::DictKey;
                        Ok(Status::Ok)
                    }
                    Some(found) => {
                        Err(self.fail(ParseError::MissingSpaceAfterColon { found }))
                    }
                }
            }
            Some(i) => {
                self.cursor = start + i;
                Err(self.fail(ParseError::MissingColon))
            }
            None => {
                self.cursor = self.input.len();
                Err(self.fail(ParseError::MissingColon))
            }
        }
    }

    // ---- helpers --------------------------------------------------------

    fn needs_value(&mut self) -> Status {
        self.pending = true;
        Status::NeedsValue(PendingValue { start: self.cursor })
    }

    fn fail(&mut self, err: ParseError) -> ParseErrorWithPos {
        self.line_type = LineType::Unknown;
        let e = err.at(self.pos_at(self.cursor), self.cursor);
        debug!(error = %e, offset = self.cursor, "unexpected input");
        self.failed = Some(e);
        e
    }

    fn set_item(&mut self, span: Span) {
        self.item = span;
        self.item_pos = self.pos_at(span.start);
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn rest(&self) -> &'a [u8] {
        &self.input[self.cursor..]
    }

    /// Offset of the next `\n` or `\r` at or after `from`, or the end
    /// of input.
    fn find_terminator(&self, from: usize) -> usize {
        memchr2(LF, CR, &self.input[from..]).map_or(self.input.len(), |i| from + i)
    }

    /// Eats `\n`, `\r\n` or `\r` if the cursor is on one; at the end
    /// of input there is nothing to eat.
    fn consume_terminator(&mut self) {
        match self.peek() {
            Some(CR) => {
                self.cursor += 1;
                if self.peek() == Some(LF) {
                    self.cursor += 1;
                }
            }
            Some(LF) => self.cursor += 1,
            _ => return,
        }
        self.line += 1;
        self.line_start = self.cursor;
    }

    // Only valid for offsets on the current line.
    fn pos_at(&self, offset: usize) -> Pos {
        Pos {
            line: self.line,
            col: (offset - self.line_start) as u32,
        }
    }
}


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `# text`, only with `Modes::retain_comments`; holds everything
    /// after the `#`.
    Comment(&'a BStr),
    /// One line of a multi-line string; `>` alone is an empty line.
    String(&'a BStr),
    /// `- value`, or `-` alone (None) when the value is nested below
    /// or absent.
    ListItem(Option<&'a BStr>),
    /// `key: value`, or `key:` (None) when the value is nested below
    /// or absent.
    DictKey(&'a BStr, Option<&'a BStr>),
}

impl<'a> Token<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Comment(_) => "comment",
            Token::String(_) => "string",
            Token::ListItem(_) => "list item",
            Token::DictKey(_, _) => "dict key",
        }
    }
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Token::Comment(s) => f.write_fmt(format_args!("#{}", s)),
            Token::String(s) => {
                if s.is_empty() {
                    f.write_char('>')
                } else {
                    f.write_fmt(format_args!("> {}", s))
                }
            }
            Token::ListItem(None) => f.write_char('-'),
            Token::ListItem(Some(s)) => f.write_fmt(format_args!("- {}", s)),
            Token::DictKey(k, None) => f.write_fmt(format_args!("{}:", k)),
            Token::DictKey(k, Some(v)) => f.write_fmt(format_args!("{}: {}", k, v)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TokenWithPos<'a> {
    pub token: Token<'a>,
    pub depth: usize,
    pub pos: Pos,
}

/// Iterator returned by [parse](parse).
#[derive(Debug)]
pub struct Tokens<'a> {
    parser: Parser<'a>,
    finished: bool,
}

impl<'a> Tokens<'a> {
    /// The underlying scanner, e.g. to look at the cursor after an
    /// error.
    pub fn parser(&self) -> &Parser<'a> {
        &self.parser
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<TokenWithPos<'a>, ParseErrorWithPos>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None
        }
        let status = match self.parser.parse_next() {
            Err(e) => {
                self.finished = true;
                return Some(Err(e))
            }
            Ok(status) => status,
        };
        // Read these before `value` moves on to the next line.
        let line_type = self.parser.line_type();
        let depth = self.parser.depth();
        let pos = self.parser.line_pos();
        let item = BStr::new(self.parser.item());
        let inline = match status {
            Status::Done => {
                self.finished = true;
                return None
            }
            Status::Ok => None,
            Status::NeedsValue(pending) => {
                let span = self.parser.value(pending);
                Some(BStr::new(span.slice(self.parser.input())))
            }
        };
        let token = match line_type {
            LineType::Comment => Token::Comment(item),
            LineType::StringItem => Token::String(inline.unwrap_or(BStr::new(b""))),
            LineType::ListItem => Token::ListItem(inline),
            LineType::DictKey => Token::DictKey(item, inline),
            LineType::DictValue | LineType::Unknown =>
                unreachable!("parse_next never succeeds with {:?}", line_type),
        };
        Some(Ok(TokenWithPos { token, depth, pos }))
    }
}

/// Turn a document into a stream of tokens, one per line that
/// carries something. The stream ends after the first error.
pub fn parse<'a>(input: &'a [u8], settings: &Settings) -> Tokens<'a> {
    Tokens {
        parser: Parser::with_settings(input, settings),
        finished: false,
    }
}
