// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Utilities for debugging the scanner: a line per item showing the
//! depth, the classification and the raw text, e.g.
//!
//! ```text
//! 00 dict key   = name
//! 00 dict value = example
//! 01 list item  =
//! ```

use crate::parse::{Parser, LineType, Status, ParseErrorWithPos};
use crate::settings::Settings;
use bstr::BStr;
use std::io::Write;
use thiserror::Error;

impl LineType {
    /// Fixed-width label; None for `Unknown`, which has nothing to
    /// show.
    pub fn label(self) -> Option<&'static str> {
        match self {
            LineType::Comment => Some("comment    = "),
            LineType::StringItem => Some("string     = "),
            LineType::ListItem => Some("list item  = "),
            LineType::DictKey => Some("dict key   = "),
            LineType::DictValue => Some("dict value = "),
            LineType::Unknown => None,
        }
    }
}

/// Displays the parser's current item.
pub struct Dump<'p, 'a>(pub &'p Parser<'a>);

impl std::fmt::Display for Dump<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        let p = self.0;
        match p.line_type().label() {
            Some(label) => f.write_fmt(format_args!("{:02} {}{}",
                                                    p.depth(),
                                                    label,
                                                    BStr::new(p.item()))),
            None => f.write_str("unknown line type."),
        }
    }
}

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("unexpected character: {0}")]
    Parse(ParseErrorWithPos),
    #[error("{0}")]
    IO(#[from] std::io::Error),
}

/// Drive the scanner over the whole input and write one line per
/// item. Keys are shown before their inline value; list and string
/// markers with an inline value only show the value. Returns the
/// number of lines written.
pub fn dump_all(
    input: &[u8],
    settings: &Settings,
    out: impl Write,
) -> Result<usize, DumpError> {
    let mut out = out;
    let mut p = Parser::with_settings(input, settings);
    let mut n = 0;
    loop {
        match p.parse_next().map_err(DumpError::Parse)? {
            Status::Done => break,
            Status::Ok => {
                writeln!(out, "{}", Dump(&p))?;
                n += 1;
            }
            Status::NeedsValue(pending) => {
                if p.line_type() == LineType::DictKey {
                    writeln!(out, "{}", Dump(&p))?;
                    n += 1;
                }
                p.value(pending);
                writeln!(out, "{}", Dump(&p))?;
                n += 1;
            }
        }
    }
    out.flush()?;
    Ok(n)
}
