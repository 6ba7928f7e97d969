//! Bounded lookahead over a command stream
//!
//! The grouping decisions of the command decoders depend on at most the
//! next few commands. [`Lookahead`] buffers exactly as many items as were
//! peeked and never more than [`MAX_LOOKAHEAD`].

use std::collections::VecDeque;

/// Largest supported peek distance plus one
pub const MAX_LOOKAHEAD: usize = 3;

/// Iterator adapter with `peek(n)` for small `n`
#[derive(Debug)]
pub struct Lookahead<I: Iterator> {
    iter: I,
    buffer: VecDeque<I::Item>,
}

impl<I: Iterator> Lookahead<I> {
    /// Wrap an iterator
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            buffer: VecDeque::with_capacity(MAX_LOOKAHEAD),
        }
    }

    /// Look at the item `n` positions ahead without consuming it
    pub fn peek(&mut self, n: usize) -> Option<&I::Item> {
        debug_assert!(n < MAX_LOOKAHEAD, "lookahead of {n} exceeds window");
        while self.buffer.len() <= n {
            match self.iter.next() {
                Some(item) => self.buffer.push_back(item),
                None => break,
            }
        }
        self.buffer.get(n)
    }
}

impl<I: Iterator> Iterator for Lookahead<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.pop_front().or_else(|| self.iter.next())
    }
}
