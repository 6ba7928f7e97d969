//! Canonical job model
//!
//! This module provides:
//! - The job aggregate with its parts and marking params maps
//! - Work planes (one per build layer)
//! - Vector blocks and their geometry variants
//! - Marking parameters and field updates

pub mod block;
pub mod job;
pub mod params;
pub mod part;
pub mod work_plane;

pub use block::{
    ArcSequence, BlockMetaData, PartArea, SkinType, StructureType, VectorBlock, VectorData,
};
pub use job::{assemble_work_planes, Bounds, Job, JobMetaData, Z_MERGE_TOLERANCE_MM};
pub use params::{MarkingMode, MarkingParams, ParamChange, ParamsSignature};
pub use part::{Part, PartGeometry};
pub use work_plane::WorkPlane;
