//! Error types for the CLI layer format

use thiserror::Error;

/// Errors raised while reading or writing CLI documents
///
/// Every variant carries the byte offset or line number of the offending
/// input so a broken file can be inspected with a hex viewer or editor.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Binary geometry contains an op-code outside the known set
    #[error("Unknown op-code {code} at byte offset {offset}")]
    UnknownOpCode {
        /// The op-code value as read.
        code: u16,
        /// Byte offset of the op-code.
        offset: u64,
    },

    /// A header line could not be parsed
    #[error("Malformed header line {line}: {text}")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// The stream ended before `$$HEADEREND`
    #[error("Header is not terminated by $$HEADEREND")]
    MissingHeaderEnd,

    /// An ASCII geometry line starts with an unknown keyword
    #[error("Unknown geometry keyword '{keyword}' on line {line}")]
    UnknownKeyword {
        /// The keyword as written.
        keyword: String,
        /// 1-based line number.
        line: usize,
    },

    /// Coordinate count disagrees with the declared element count
    #[error("{keyword} on line {line} declares {expected} coordinates but holds {found}")]
    CoordinateCount {
        /// Primitive keyword.
        keyword: &'static str,
        /// 1-based line number.
        line: usize,
        /// Coordinates implied by the declared count.
        expected: usize,
        /// Coordinates present.
        found: usize,
    },

    /// A geometry line lacks a required field
    #[error("{keyword} on line {line} is missing its {field} field")]
    MissingField {
        /// Primitive keyword.
        keyword: &'static str,
        /// Name of the missing field.
        field: &'static str,
        /// 1-based line number.
        line: usize,
    },

    /// A binary element count is negative
    #[error("Negative element count {count} at byte offset {offset}")]
    NegativeCount {
        /// The count as read.
        count: i32,
        /// Offset of the count field.
        offset: u64,
    },

    /// A numeric field could not be parsed
    #[error("Invalid number '{text}' on line {line}")]
    InvalidNumber {
        /// The offending field.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// The stream ended inside a primitive
    #[error("Truncated primitive at byte offset {offset}")]
    Truncated {
        /// Offset where the missing data was expected.
        offset: u64,
    },

    /// A block variant has no CLI representation
    #[error("{variant} blocks cannot be written as CLI")]
    UnsupportedBlock {
        /// Variant name.
        variant: &'static str,
    },

    /// A value does not fit the chosen binary encoding
    #[error("Value {value} does not fit a 16-bit {field}")]
    ValueOutOfRange {
        /// Field being encoded.
        field: &'static str,
        /// The scaled value.
        value: f64,
    },

    /// A payload descriptor was resolved against the wrong reader
    #[error("Primitive has no payload")]
    NoPayload,

    /// Model failure
    #[error(transparent)]
    Core(#[from] vectorkit_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, LayerError>;
