//! Error types for the laser command language

use thiserror::Error;

/// Errors raised while parsing, decoding or writing laser commands
#[derive(Error, Debug)]
pub enum LaserError {
    /// The line starts with a command outside the known set
    #[error("Unknown command '{command}' on line {line}")]
    UnknownCommand {
        /// The command as written.
        command: String,
        /// 1-based line number.
        line: usize,
    },

    /// Wrong number of arguments for the command
    #[error("{command} takes {expected} arguments but line {line} has {found}")]
    ArityMismatch {
        /// Command mnemonic.
        command: &'static str,
        /// Arguments the command takes.
        expected: usize,
        /// Arguments present.
        found: usize,
        /// 1-based line number.
        line: usize,
    },

    /// An argument is not a number
    #[error("Invalid number '{text}' on line {line}")]
    InvalidNumber {
        /// The offending argument.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// An argument is a number outside the command's domain
    #[error("Invalid value {value} for {command} on line {line}")]
    InvalidValue {
        /// Command mnemonic.
        command: &'static str,
        /// The value as parsed.
        value: f64,
        /// 1-based line number.
        line: usize,
    },

    /// A block variant has no command form
    #[error("{variant} blocks cannot be written as laser commands")]
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

/// Result type for laser command operations
pub type Result<T> = std::result::Result<T, LaserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_display() {
        let err = LaserError::ArityMismatch {
            command: "JP",
            expected: 3,
            found: 2,
            line: 12,
        };
        assert_eq!(err.to_string(), "JP takes 3 arguments but line 12 has 2");
    }
}
