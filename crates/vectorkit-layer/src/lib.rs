//! # VectorKit Layer
//!
//! Reader, decoder and writer for the Common Layer Interface (CLI) format.
//!
//! This crate provides:
//! - Header parsing and writing
//! - A primitive reader with deferred binary payloads
//! - Fake hatch detection
//! - A work plane decoder and a job writer for ASCII and binary output

mod ascii;
pub mod decoder;
pub mod error;
pub mod fake_hatch;
pub mod header;
pub mod opcode;
pub mod primitive;
pub mod reader;
pub mod writer;

pub use decoder::{CliDecoder, DecodeOptions};
pub use error::{LayerError, Result};
pub use fake_hatch::split_fake_hatches;
pub use header::{CliHeader, FileEncoding};
pub use opcode::OpCode;
pub use primitive::{CoordEncoding, Payload, PayloadRef, PolylineDirection, Primitive};
pub use reader::CliReader;
pub use writer::{CliEncoding, CliWriter};
