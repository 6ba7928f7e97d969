//! Error types for G-code

use thiserror::Error;

/// Errors raised while decoding or writing G-code
#[derive(Error, Debug)]
pub enum GcodeError {
    /// Text that is not a `letter number` word
    #[error("Invalid word '{text}' on line {line}")]
    InvalidWord {
        /// The offending text.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// A command lacks a parameter it needs
    #[error("{command} on line {line} needs a {letter} parameter")]
    MissingParameter {
        /// Command, e.g. `G4`.
        command: &'static str,
        /// Missing parameter letter.
        letter: char,
        /// 1-based line number.
        line: usize,
    },

    /// A block variant has no G-code form
    #[error("{variant} blocks cannot be written as G-code")]
    UnsupportedBlock {
        /// Variant name.
        variant: &'static str,
    },

    /// A block references a params key missing from the job
    #[error("Block references unknown marking params key {key}")]
    MissingParams {
        /// The dangling key.
        key: i32,
    },

    /// Model failure
    #[error(transparent)]
    Core(#[from] vectorkit_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for G-code operations
pub type Result<T> = std::result::Result<T, GcodeError>;
