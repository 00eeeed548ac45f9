// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for scanning and for building trees.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modes {
    /// Report comment lines as `LineType::Comment` items instead of
    /// skipping them. Comments never affect depth either way.
    pub retain_comments: bool,
}

pub const STRUCTURE_ONLY : Modes = Modes {
    retain_comments: false,
};

pub const WITH_COMMENTS : Modes = Modes {
    retain_comments: true,
};


#[derive(Debug, Clone, Copy)]
pub struct Settings<'t> {
    pub modes: &'t Modes,
    /// How deep `read` may recurse before giving up with
    /// `NestingTooDeep`. The scanner itself has no limit.
    pub max_depth: u32,
}

pub const DEFAULT_SETTINGS : Settings<'static> = Settings {
    modes: &STRUCTURE_ONLY,
    max_depth: 500,
    // ^ the stack limit with default settings on Linux is well above
    //   that, each level costs one read_value frame
};
