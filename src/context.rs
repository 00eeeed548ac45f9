// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where a document came from, for error messages. The scanner only
//! knows positions; the buffer's origin is attached when errors
//! leave `read`.

use crate::pos::Pos;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Context {
    File(PathBuf),
    /// A buffer that didn't come from a file, e.g. stdin.
    Named(String),
}

impl Context {
    /// Location to put after an error reason and a space, e.g.
    /// `in "doc.nt"@3.4`.
    pub fn with_pos(&self, pos: Pos) -> ContextWithPos<'_> {
        ContextWithPos { context: self, pos }
    }
}

/// Displays as the source, to be followed by a colon and the error
/// reason: `"doc.nt"` or `(stdin)`.
impl Display for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Context::File(path) => f.write_fmt(format_args!("{:?}", path)),
            Context::Named(name) => f.write_fmt(format_args!("({})", name)),
        }
    }
}

pub struct ContextWithPos<'c> {
    context: &'c Context,
    pos: Pos,
}

impl Display for ContextWithPos<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("in {}{}", self.context, self.pos))
    }
}
