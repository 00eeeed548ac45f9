// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Owned tree representing a whole document, as built by
//! [read](crate::read).

//! All leaves are strings: there is no type inference. `Display`
//! writes the tree back out as a document. Not every tree has a
//! document that reads back as the same tree;
//! [Value::check_writable](Value::check_writable) tells which ones
//! don't, and `read::write_all` refuses to write those.

use std::fmt::Write;
use bstr::{BStr, ByteSlice};
use kstring::KString;
use thiserror::Error;

/// Indentation used when writing; reading accepts any amount.
pub const INDENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(KString),
    List(Vec<Value>),
    /// Keys in document order; they are unique when built by `read`.
    Dict(Vec<(KString, Value)>),
}

/// Why a tree can't be written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Unwritable {
    #[error("key {0:?} would not read back as a dict key")]
    BadKey(KString),
    #[error("duplicate key {0:?}")]
    DuplicateKey(KString),
    #[error("string contains '\\r'")]
    CarriageReturn,
    #[error("empty lists and dicts have no block syntax")]
    EmptyContainer,
    #[error("block ends {0} levels deeper than the item following it, \
             dedents only go one level per line")]
    DeepDedent(usize),
}

/// Copy scanner text into an owned string. Invalid UTF-8 is replaced
/// (U+FFFD); use the scanner directly when the exact bytes matter.
pub fn text(s: &BStr) -> KString {
    match s.to_str_lossy() {
        std::borrow::Cow::Borrowed(s) => KString::from_ref(s),
        std::borrow::Cow::Owned(s) => KString::from_string(s),
    }
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(KString::from_ref(s))
    }

    pub fn empty_string() -> Value {
        Value::String(KString::from_static(""))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Linear lookup, dicts are usually small.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(entries) =>
                entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Whether `Display` output reads back as this same tree.
    pub fn check_writable(&self) -> Result<(), Unwritable> {
        self.check_block().map(|_| ())
    }

    // Returns how many levels below its first line the last line of
    // the block ends up.
    fn check_block(&self) -> Result<usize, Unwritable> {
        match self {
            Value::String(s) => {
                if s.contains('\r') {
                    return Err(Unwritable::CarriageReturn)
                }
                Ok(0)
            }
            Value::List(items) => {
                check_entries(items.iter())
            }
            Value::Dict(entries) => {
                for (i, (k, _)) in entries.iter().enumerate() {
                    check_key(k)?;
                    if entries[..i].iter().any(|(k2, _)| k2 == k) {
                        return Err(Unwritable::DuplicateKey(k.clone()))
                    }
                }
                check_entries(entries.iter().map(|(_, v)| v))
            }
        }
    }

    // Written on the line of its `-` or `key:`, not as a block below.
    fn is_inline(&self) -> bool {
        match self {
            Value::String(s) => ! s.contains('\n'),
            Value::List(v) => v.is_empty(),
            Value::Dict(v) => v.is_empty(),
        }
    }

    fn fmt_indented(&self, f: &mut std::fmt::Formatter<'_>, indent: usize)
                    -> Result<(), std::fmt::Error> {
        match self {
            Value::String(s) => {
                for line in s.split('\n') {
                    write_indent(f, indent)?;
                    if line.is_empty() {
                        f.write_str(">\n")?
                    } else {
                        f.write_fmt(format_args!("> {}\n", line))?
                    }
                }
                Ok(())
            }
            Value::List(items) => {
                for v in items {
                    write_indent(f, indent)?;
                    f.write_char('-')?;
                    v.fmt_tail(f, indent)?;
                }
                Ok(())
            }
            Value::Dict(entries) => {
                for (k, v) in entries {
                    write_indent(f, indent)?;
                    f.write_str(k)?;
                    f.write_char(':')?;
                    v.fmt_tail(f, indent)?;
                }
                Ok(())
            }
        }
    }

    // What follows a `-` or `key:`: either the value on the same
    // line, or a newline and the value as a nested block.
    fn fmt_tail(&self, f: &mut std::fmt::Formatter<'_>, indent: usize)
                -> Result<(), std::fmt::Error> {
        match self {
            Value::String(s) if s.is_empty() => f.write_char('\n'),
            Value::String(s) if ! s.contains('\n') => {
                f.write_fmt(format_args!(" {}\n", s))
            }
            // No syntax for these without inline lists and dicts;
            // check_writable rejects them.
            Value::List(v) if v.is_empty() => f.write_char('\n'),
            Value::Dict(v) if v.is_empty() => f.write_char('\n'),
            _ => {
                f.write_char('\n')?;
                self.fmt_indented(f, indent + INDENT)
            }
        }
    }
}

fn check_entries<'v>(
    entries: impl Iterator<Item = &'v Value>,
) -> Result<usize, Unwritable> {
    let mut entries = entries.peekable();
    if entries.peek().is_none() {
        return Err(Unwritable::EmptyContainer)
    }
    let mut last = 0;
    while let Some(v) = entries.next() {
        last = if v.is_inline() {
            v.check_block()?;
            0
        } else {
            let below = 1 + v.check_block()?;
            if below > 1 && entries.peek().is_some() {
                return Err(Unwritable::DeepDedent(below))
            }
            below
        };
    }
    Ok(last)
}

fn check_key(k: &KString) -> Result<(), Unwritable> {
    let bad = k.trim().is_empty()
        || k.starts_with(&[' ', '-', '>', '#', '[', '{'][..])
        || k.contains(&[':', '\n', '\r'][..]);
    if bad {
        Err(Unwritable::BadKey(k.clone()))
    } else {
        Ok(())
    }
}

fn write_indent(f: &mut std::fmt::Formatter<'_>, indent: usize)
                -> Result<(), std::fmt::Error> {
    for _ in 0..indent {
        f.write_char(' ')?
    }
    Ok(())
}

impl std::fmt::Display for Value {
    /// Writes complete lines, each terminated by `\n`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        self.fmt_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_blocks() {
        let v = Value::Dict(vec![
            (KString::from_static("name"), Value::string("x")),
            (KString::from_static("lines"), Value::string("a\n\nb")),
            (KString::from_static("items"), Value::List(vec![
                Value::string("1"),
                Value::empty_string(),
                Value::List(vec![Value::string("deep")]),
            ])),
        ]);
        assert_eq!(v.to_string(),
                   "name: x\n\
                    lines:\n    > a\n    >\n    > b\n\
                    items:\n    - 1\n    -\n    -\n        - deep\n");
    }

    fn dict(entries: Vec<(&'static str, Value)>) -> Value {
        Value::Dict(entries.into_iter()
                    .map(|(k, v)| (KString::from_static(k), v))
                    .collect())
    }

    #[test]
    fn block_depth_before_a_sibling() {
        // a:\n    b: 1\nd: 2 is fine, one dedent
        let ok = dict(vec![("a", dict(vec![("b", Value::string("1"))])),
                           ("d", Value::string("2"))]);
        assert_eq!(ok.check_writable(), Ok(()));
        // c would end two levels below d
        let deep = dict(vec![("a", dict(vec![("b", dict(vec![("c", Value::string("1"))]))])),
                             ("d", Value::string("2"))]);
        assert_eq!(deep.check_writable(), Err(Unwritable::DeepDedent(2)));
        // same thing is fine as the last entry
        let last = dict(vec![("d", Value::string("2")),
                             ("a", dict(vec![("b", dict(vec![("c", Value::string("1"))]))]))]);
        assert_eq!(last.check_writable(), Ok(()));
        // a multi-line string below a list item counts as a block too
        let strings = Value::List(vec![
            Value::List(vec![Value::string("x\ny")]),
            Value::string("z"),
        ]);
        assert_eq!(strings.check_writable(), Err(Unwritable::DeepDedent(2)));
    }

    #[test]
    fn keys_that_would_read_back_differently() {
        for k in ["", " ", " lead", "a:b", "- x", "-", ">", "#c", "[x", "{x", "a\nb", "a\rb"] {
            let v = Value::Dict(vec![(KString::from_ref(k), Value::string("1"))]);
            assert_eq!(v.check_writable(), Err(Unwritable::BadKey(KString::from_ref(k))),
                       "{:?}", k);
        }
        for k in ["a", "a b", "trailing ", "a-b", "a#b", "\tx"] {
            let v = Value::Dict(vec![(KString::from_ref(k), Value::string("1"))]);
            assert_eq!(v.check_writable(), Ok(()), "{:?}", k);
        }
    }

    #[test]
    fn other_unwritable_trees() {
        assert_eq!(Value::string("a\rb").check_writable(), Err(Unwritable::CarriageReturn));
        assert_eq!(Value::List(vec![]).check_writable(), Err(Unwritable::EmptyContainer));
        assert_eq!(dict(vec![("k", Value::Dict(vec![]))]).check_writable(),
                   Err(Unwritable::EmptyContainer));
        assert_eq!(dict(vec![("k", Value::string("1")), ("k", Value::string("2"))])
                   .check_writable(),
                   Err(Unwritable::DuplicateKey(KString::from_static("k"))));
    }

    #[test]
    fn lossy_text() {
        assert_eq!(text(BStr::new(b"ok")).as_str(), "ok");
        assert_eq!(text(BStr::new(b"a\xffb")).as_str(), "a\u{FFFD}b");
    }
}
