//! # VectorKit G-code
//!
//! Reads and writes the laser subset of G-code: rapid and linear moves,
//! circular arcs, dwells and the unit and positioning modes. Z moves switch
//! work planes.

pub mod arc;
pub mod command;
pub mod decoder;
pub mod error;
pub mod lexer;
pub mod writer;

pub use arc::{arc_end, sweep_angle};
pub use command::{parse_words, Axes, GcodeCommand, Motion};
pub use decoder::GcodeDecoder;
pub use error::{GcodeError, Result};
pub use lexer::{tokenize, Word};
pub use writer::GcodeWriter;
