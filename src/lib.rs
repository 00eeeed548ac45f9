// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This is a parser for NestedText-style documents: lists (`- `),
//! dictionaries (`key: `), multi-line strings (`> `), comments (`#`)
//! and blank lines, nested by indentation. Goals:
//!
//! * Zero copy, zero allocation at the core: `nestext::parse::Parser`
//!   is a cursor over a buffer the caller owns, handing out spans into
//!   it, one line per call.
//!
//! * Pull based: the consumer decides the pace, stopping is the only
//!   cleanup. `nestext::parse::parse` wraps the scanner as an iterator
//!   of tokens.
//!
//! * Good error reporting (precise location information and
//!   messages).
//!
//! * `nestext::read` to build an in-memory tree easily, and write it
//!   back out.
//!
//! Depth is tracked by the direction of indentation changes only: a
//! line indented further than the previous structural line is one
//! level deeper, however many spaces it adds, and a line indented less
//! is one level shallower.
//!
//! Not (yet) supported: inline `[..]` lists and `{..}` dicts (they
//! are reported as errors), multi-line keys, several documents per
//! buffer. Values are always raw text, there is no type inference.

pub mod context;
pub mod debug;
pub mod indent;
pub mod parse;
pub mod pos;
pub mod read;
pub mod settings;
pub mod value;
