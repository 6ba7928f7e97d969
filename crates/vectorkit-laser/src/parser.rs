//! Streaming command parser

use std::io::BufRead;

use crate::command::{parse_line, Command};
use crate::error::Result;

/// Iterator of commands read line by line from a text source
///
/// Blank and comment lines are skipped. The first error ends the stream.
pub struct CommandStream<B: BufRead> {
    source: B,
    line: usize,
    buffer: String,
    failed: bool,
}

impl<B: BufRead> CommandStream<B> {
    /// Wrap a buffered source
    pub fn new(source: B) -> Self {
        Self {
            source,
            line: 0,
            buffer: String::new(),
            failed: false,
        }
    }

    /// Number of lines read so far
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<B: BufRead> Iterator for CommandStream<B> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buffer.clear();
            match self.source.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err.into()));
                }
            }
            self.line += 1;
            match parse_line(&self.buffer, self.line) {
                Ok(Some(command)) => return Some(Ok(command)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
