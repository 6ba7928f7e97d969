//! # VectorKit Laser
//!
//! Decoder and writer for the two-letter laser command language
//! (`LP100`, `JP0,0,0`, `GO10,0,0`, …).
//!
//! This crate provides:
//! - The static command table and a line parser
//! - A streaming command iterator
//! - A work plane decoder with bounded lookahead
//! - A job writer emitting the same language

pub mod command;
pub mod decoder;
pub mod error;
pub mod parser;
pub mod writer;

pub use command::{parse_line, Command, Mnemonic, COMMAND_TABLE};
pub use decoder::LaserDecoder;
pub use error::{LaserError, Result};
pub use parser::CommandStream;
pub use writer::LaserWriter;
