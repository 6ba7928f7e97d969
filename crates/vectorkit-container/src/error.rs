//! Error types for the section container

use std::path::PathBuf;

use thiserror::Error;
use vectorkit_layer::LayerError;

/// Errors raised while reading or writing a container
#[derive(Error, Debug)]
pub enum ContainerError {
    /// A section filename matches none of the naming conventions
    #[error("Cannot classify section '{filename}'")]
    Unclassified {
        /// The filename as found in the directory.
        filename: String,
    },

    /// A parameter value carries the wrong unit
    #[error("Parameter {key} expects unit '{expected}' but found '{found}'")]
    UnitMismatch {
        /// Parameter key.
        key: String,
        /// Required unit.
        expected: String,
        /// Unit as written.
        found: String,
    },

    /// A parameter value is not a usable number
    #[error("Invalid value '{text}' for {key} on line {line}")]
    InvalidValue {
        /// Parameter key.
        key: String,
        /// The value as written.
        text: String,
        /// 1-based line number.
        line: usize,
    },

    /// A parameter line is not `key = value`
    #[error("Malformed parameter line {line}: {text}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// A geometry section has no parameter file next to it
    #[error("Missing parameter file {}", path.display())]
    MissingParamFile {
        /// Expected location.
        path: PathBuf,
    },

    /// The container location is not a directory
    #[error("{} is not a directory", path.display())]
    NotADirectory {
        /// The path given.
        path: PathBuf,
    },

    /// A block references a params key missing from the job
    #[error("Block references unknown marking params key {key}")]
    MissingParams {
        /// The dangling key.
        key: i32,
    },

    /// Section geometry failure
    #[error(transparent)]
    Layer(#[from] LayerError),

    /// Model failure
    #[error(transparent)]
    Core(#[from] vectorkit_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for container operations
pub type Result<T> = std::result::Result<T, ContainerError>;
