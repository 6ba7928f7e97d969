//! # VectorKit Core
//!
//! Canonical job model and the plumbing shared by the format crates.
//! Provides the job aggregate, parameter deduplication, the bounded
//! lookahead used by the command decoders and the decoder/writer traits.

pub mod assembler;
pub mod codec;
pub mod error;
pub mod lookahead;
pub mod model;
pub mod param_table;
pub mod units;

pub use assembler::WorkPlaneAssembler;
pub use codec::{JobWriter, WorkPlaneDecoder};
pub use error::{Error, ModelError, Result, UnitError};
pub use lookahead::Lookahead;
pub use model::{
    ArcSequence, BlockMetaData, Bounds, Job, JobMetaData, MarkingMode, MarkingParams, ParamChange,
    Part, PartArea, PartGeometry, SkinType, StructureType, VectorBlock, VectorData, WorkPlane,
};
pub use param_table::ParamTable;
pub use units::{format_tagged, parse_tagged, PhysicalUnit};
