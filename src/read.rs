// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Loading documents into memory and building [Value](Value) trees
//! from the token stream; writing trees back out.

//! The tree follows the depths the scanner reports: the value of a
//! `key:` or `-` without inline text is the block one level deeper,
//! if any, else the empty string.

use crate::pos::Pos;
use crate::context::Context;
use crate::parse::{Token, TokenWithPos, Tokens, parse,
                   ParseError, ParseErrorWithPos};
use crate::settings::{Settings, STRUCTURE_ONLY, DEFAULT_SETTINGS};
use crate::value::{self, Unwritable, Value};
use kstring::KString;
use std::fmt::{Formatter, Display};
use std::io::{Read, Write};
use std::iter::Peekable;
use std::path::Path;
use std::fs::File;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{0}")]
    PE(ParseError),
    #[error("expected {expected}, got {got}")]
    MixedItems {
        expected: &'static str,
        got: &'static str,
    },
    #[error("unexpected indentation")]
    UnexpectedIndent,
    #[error("duplicate key {0:?}")]
    DuplicateKey(KString),
    #[error("nesting too deep")]
    NestingTooDeep,
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ReadErrorWithPos {
    pub err: ReadError,
    pub pos: Pos
}

impl ReadError {
    fn at(self, p: Pos) -> ReadErrorWithPos {
        ReadErrorWithPos {
            err: self,
            pos: p
        }
    }
}

#[derive(Error, Debug)]
pub struct ReadErrorWithPosContext {
    err_with_pos: ReadErrorWithPos,
    context: Context
}

impl ReadErrorWithPosContext {
    pub fn err_with_pos(&self) -> &ReadErrorWithPos {
        &self.err_with_pos
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Display for ReadErrorWithPosContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{} {}",
                                 self.err_with_pos.err,
                                 self.context.with_pos(self.err_with_pos.pos)))
    }
}

impl From<ParseErrorWithPos> for ReadErrorWithPos {
    fn from(ep: ParseErrorWithPos) -> ReadErrorWithPos {
        let ParseErrorWithPos { err, pos, .. } = ep;
        ReadErrorWithPos {
            err: ReadError::PE(err),
            pos
        }
    }
}

#[derive(Error, Debug)]
pub enum ReadErrorWithContext {
    #[error("{1}: {0}")]
    IO(std::io::Error, Context)
}

#[derive(Error, Debug)]
pub enum ReadErrorWithLocation {
    #[error("{0}")]
    PC(Box<ReadErrorWithPosContext>),
    #[error("{0}")]
    IO(Box<ReadErrorWithContext>)
}


fn file_context(path: &Path) -> Context {
    Context::File(path.to_path_buf())
}

fn named_context(name: &str) -> Context {
    Context::Named(name.to_string())
}

// Transform an IO error without Pos context
fn io_add_context<T>(
    r: Result<T, std::io::Error>,
    context: impl FnOnce() -> Context
) -> Result<T, ReadErrorWithLocation>
{
    r.map_err(|e| ReadErrorWithLocation::IO(Box::new(
        ReadErrorWithContext::IO(e, context()))))
}

// Transform ReadErrorWithPos adding the source
fn rewp_add_context<T>(
    r: Result<T, ReadErrorWithPos>,
    context: impl FnOnce() -> Context
) -> Result<T, ReadErrorWithLocation>
{
    r.map_err(|e| ReadErrorWithLocation::PC(Box::new(
        ReadErrorWithPosContext {
            err_with_pos: e,
            context: context()
        })))
}


type TokenStream<'a> = Peekable<Tokens<'a>>;

fn mixed(expected: &'static str, got: Token<'_>, pos: Pos) -> ReadErrorWithPos {
    ReadError::MixedItems { expected, got: got.kind_name() }.at(pos)
}

// The next token if it is at `depth`. None at the end of input or
// when the block at `depth` is over; a token deeper than `depth` is
// an error here.
fn peek_at<'a>(
    ts: &mut TokenStream<'a>,
    depth: usize,
) -> Result<Option<TokenWithPos<'a>>, ReadErrorWithPos>
{
    match ts.peek() {
        None => Ok(None),
        Some(Err(e)) => Err((*e).into()),
        Some(Ok(t)) => {
            if t.depth > depth {
                Err(ReadError::UnexpectedIndent.at(t.pos))
            } else if t.depth < depth {
                Ok(None)
            } else {
                Ok(Some(*t))
            }
        }
    }
}

// The block belonging to a `key:` or `-` at `depth` that had no
// inline value.
fn read_nested(
    ts: &mut TokenStream<'_>,
    depth: usize,
    depth_fuel: u32,
) -> Result<Value, ReadErrorWithPos>
{
    if let Some(t) = peek_at(ts, depth + 1)? {
        if depth_fuel == 0 {
            return Err(ReadError::NestingTooDeep.at(t.pos))
        }
        read_value(ts, t, depth_fuel - 1)
    } else {
        Ok(Value::empty_string())
    }
}

// `first` has been peeked, not consumed.
fn read_value(
    ts: &mut TokenStream<'_>,
    first: TokenWithPos<'_>,
    depth_fuel: u32,
) -> Result<Value, ReadErrorWithPos>
{
    match first.token {
        Token::String(_) => read_string(ts, first.depth),
        Token::ListItem(_) => read_list(ts, first.depth, depth_fuel),
        Token::DictKey(_, _) => read_dict(ts, first.depth, depth_fuel),
        Token::Comment(_) => unreachable!("comments are not retained while reading"),
    }
}

fn read_string(
    ts: &mut TokenStream<'_>,
    depth: usize,
) -> Result<Value, ReadErrorWithPos>
{
    let mut s = String::new();
    let mut first = true;
    while let Some(t) = peek_at(ts, depth)? {
        match t.token {
            Token::String(line) => {
                ts.next();
                if ! first {
                    s.push('\n');
                }
                first = false;
                s.push_str(&value::text(line));
            }
            other => return Err(mixed("string", other, t.pos)),
        }
    }
    Ok(Value::String(KString::from_string(s)))
}

fn read_list(
    ts: &mut TokenStream<'_>,
    depth: usize,
    depth_fuel: u32,
) -> Result<Value, ReadErrorWithPos>
{
    let mut v = Vec::new();
    while let Some(t) = peek_at(ts, depth)? {
        match t.token {
            Token::ListItem(inline) => {
                ts.next();
                v.push(match inline {
                    Some(s) => Value::String(value::text(s)),
                    None => read_nested(ts, depth, depth_fuel)?,
                });
            }
            other => return Err(mixed("list item", other, t.pos)),
        }
    }
    Ok(Value::List(v))
}

fn read_dict(
    ts: &mut TokenStream<'_>,
    depth: usize,
    depth_fuel: u32,
) -> Result<Value, ReadErrorWithPos>
{
    let mut entries: Vec<(KString, Value)> = Vec::new();
    while let Some(t) = peek_at(ts, depth)? {
        match t.token {
            Token::DictKey(k, inline) => {
                let key = value::text(k);
                if entries.iter().any(|(k2, _)| *k2 == key) {
                    return Err(ReadError::DuplicateKey(key).at(t.pos))
                }
                ts.next();
                let val = match inline {
                    Some(s) => Value::String(value::text(s)),
                    None => read_nested(ts, depth, depth_fuel)?,
                };
                entries.push((key, val));
            }
            other => return Err(mixed("dict key", other, t.pos)),
        }
    }
    Ok(Value::Dict(entries))
}

/// Build the tree for a whole document. `None` if the document has
/// no items (empty, blank or only comments).
pub fn read_all_with(
    input: &[u8],
    settings: &Settings,
) -> Result<Option<Value>, ReadErrorWithPos>
{
    let settings = Settings {
        modes: &STRUCTURE_ONLY,
        ..*settings
    };
    let mut ts = parse(input, &settings).peekable();
    match peek_at(&mut ts, 0)? {
        None => Ok(None),
        Some(first) => Ok(Some(read_value(&mut ts, first, settings.max_depth)?)),
    }
}

pub fn read_all(input: &[u8]) -> Result<Option<Value>, ReadErrorWithPos> {
    read_all_with(input, &DEFAULT_SETTINGS)
}

/// Like `read_all` but errors mention `name` as the source.
pub fn read_named(
    input: &[u8],
    name: &str,
) -> Result<Option<Value>, ReadErrorWithLocation>
{
    rewp_add_context(read_all(input), || named_context(name))
}

/// Read the whole file into one buffer, for use with the scanner.
pub fn load_file(path: &Path) -> Result<Vec<u8>, ReadErrorWithLocation> {
    let buf = io_add_context(std::fs::read(path), || file_context(path))?;
    debug!(?path, len = buf.len(), "loaded");
    Ok(buf)
}

/// Read everything from `fh` into one buffer; `name` is used in
/// error messages.
pub fn load(
    fh: impl Read,
    name: &str,
) -> Result<Vec<u8>, ReadErrorWithLocation>
{
    let mut fh = fh;
    let mut buf = Vec::new();
    io_add_context(fh.read_to_end(&mut buf), || named_context(name))?;
    debug!(source = name, len = buf.len(), "loaded");
    Ok(buf)
}

pub fn read_file(path: &Path) -> Result<Option<Value>, ReadErrorWithLocation> {
    let buf = load_file(path)?;
    rewp_add_context(read_all(&buf), || file_context(path))
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{0}")]
    Unwritable(#[from] Unwritable),
    #[error("{0}")]
    IO(#[from] std::io::Error),
}

/// Write `val` as a document. Trees that would read back differently
/// (see `Value::check_writable`) are refused before anything is
/// written.
pub fn write_all(
    out: impl Write,
    val: &Value,
) -> Result<(), WriteError> {
    val.check_writable()?;
    let mut out = out; // for `File`
    write!(out, "{}", val)?;
    out.flush()?;
    Ok(())
}

/// Like `write_all`; the file is only created if `val` can be
/// written.
pub fn write_file(path: &Path, val: &Value) -> Result<(), WriteError> {
    val.check_writable()?;
    write_all(File::create(path)?, val)
}
