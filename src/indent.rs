// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tracking nesting depth from the indentation of structural lines.

//! Only the *direction* of an indentation change is taken into
//! account: going from 0 to 8 spaces is one level deeper, same as
//! going from 0 to 2. Going back out moves up one level per line,
//! however far the indentation retreats.

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Indentation {
    previous: usize,
    depth: usize,
}

impl Indentation {
    pub fn new() -> Indentation {
        Indentation::default()
    }

    /// Feed the space count of the next structural line, returns the
    /// depth of that line. Blank and comment lines must not be fed.
    pub fn step(&mut self, indent: usize) -> usize {
        if indent > self.previous {
            self.depth += 1;
        } else if indent < self.previous {
            // Can't go below the top, e.g. "    a:\n  b:\n c:\n"
            self.depth = self.depth.saturating_sub(1);
        }
        self.previous = indent;
        self.depth
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(indents: &[usize]) -> Vec<usize> {
        let mut ind = Indentation::new();
        indents.iter().map(|i| ind.step(*i)).collect()
    }

    #[test]
    fn one_step_per_line() {
        assert_eq!(depths(&[0, 2, 2, 4, 2, 0]), [0, 1, 1, 2, 1, 0]);
        // magnitude doesn't matter
        assert_eq!(depths(&[0, 8, 0]), [0, 1, 0]);
        // a dedent over two levels still only steps once
        assert_eq!(depths(&[0, 2, 4, 0, 0]), [0, 1, 2, 1, 1]);
    }

    #[test]
    fn saturates_at_zero() {
        assert_eq!(depths(&[4, 2, 1, 0]), [1, 0, 0, 0]);
    }

    #[test]
    fn equal_indent_keeps_depth() {
        let mut ind = Indentation::new();
        assert_eq!(ind.step(3), 1);
        assert_eq!(ind.step(3), 1);
        assert_eq!(ind.depth(), 1);
    }
}
