//! # VectorKit Container
//!
//! Multi-section containers: a directory of CLI sections, each with a
//! parameter file. Section filenames are classified into part, role and
//! vector class, which become block metadata.

pub mod classifier;
pub mod error;
pub mod param_file;
pub mod reader;
pub mod writer;

pub use classifier::{classify, Classification, Role, VectorClass};
pub use error::{ContainerError, Result};
pub use param_file::{parse_param_file, write_param_file};
pub use reader::{ContainerReader, Section};
pub use writer::ContainerWriter;
