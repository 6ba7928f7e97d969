//! Error handling for VectorKit
//!
//! Provides the error types shared by every format crate:
//! - Model errors (canonical job invariants)
//! - Parameter file errors (unit-tagged values)
//!
//! Format crates define their own error enums and wrap [`Error`] with
//! `#[from]`, so a decoder can propagate model failures with `?`.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Canonical model error type
///
/// Represents a violation of one of the job model invariants, as reported
/// by [`crate::Job::validate`] or raised while assembling workplanes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A finished block carries no geometry
    #[error("Empty vector block {block} in work plane {work_plane}")]
    EmptyBlock {
        /// Index of the work plane.
        work_plane: usize,
        /// Index of the block inside the work plane.
        block: usize,
    },

    /// Coordinate count is not a multiple of the variant's point arity
    #[error("{variant} holds {len} coordinates, not a multiple of {arity}")]
    ArityMismatch {
        /// Variant name.
        variant: &'static str,
        /// Number of coordinates stored.
        len: usize,
        /// Required multiple.
        arity: usize,
    },

    /// A block references a marking params key that is not in the map
    #[error("Unknown marking params key {key}")]
    UnknownParamsKey {
        /// The dangling key.
        key: i32,
    },

    /// A block references a part key that is not in the map
    #[error("Unknown part key {key}")]
    UnknownPartKey {
        /// The dangling key.
        key: i32,
    },

    /// Work planes are not sorted by strictly increasing Z
    #[error("Work plane {index} at z={z} is not above the previous plane at z={previous}")]
    UnorderedWorkPlanes {
        /// Index of the offending plane.
        index: usize,
        /// Z of the offending plane.
        z: f32,
        /// Z of the plane before it.
        previous: f32,
    },

    /// A stored counter disagrees with the collection it counts
    #[error("Counter {field} is {stored} but {actual} entries exist")]
    CountMismatch {
        /// Counter name.
        field: &'static str,
        /// Stored counter value.
        stored: u32,
        /// Actual number of entries.
        actual: usize,
    },
}

/// Unit-tagged value error type
///
/// Raised while parsing `<number> <unit>` strings such as `"250 mm/s"`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The value carries a different unit than required
    #[error("Expected unit '{expected}' but found '{found}'")]
    Mismatch {
        /// The unit the key requires.
        expected: String,
        /// The unit found in the text.
        found: String,
    },

    /// The numeric part could not be parsed
    #[error("Invalid number '{text}'")]
    InvalidNumber {
        /// The offending text.
        text: String,
    },
}

/// Main error type for VectorKit
///
/// A unified error type for the shared core. Format crates embed it.
#[derive(Error, Debug)]
pub enum Error {
    /// Model invariant error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Unit-tagged value error
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a model invariant error
    pub fn is_model_error(&self) -> bool {
        matches!(self, Error::Model(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::ArityMismatch {
            variant: "Hatches",
            len: 7,
            arity: 4,
        };
        assert_eq!(
            err.to_string(),
            "Hatches holds 7 coordinates, not a multiple of 4"
        );

        let err = ModelError::EmptyBlock {
            work_plane: 2,
            block: 0,
        };
        assert_eq!(err.to_string(), "Empty vector block 0 in work plane 2");
    }

    #[test]
    fn test_unit_error_display() {
        let err = UnitError::Mismatch {
            expected: "mm/s".to_string(),
            found: "m/s".to_string(),
        };
        assert_eq!(err.to_string(), "Expected unit 'mm/s' but found 'm/s'");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ModelError::UnknownPartKey { key: 4 }.into();
        assert!(err.is_model_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
