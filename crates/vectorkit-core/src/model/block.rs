//! Vector blocks: the geometry unit of a work plane
//!
//! A [`VectorBlock`] holds exactly one [`VectorData`] variant plus the keys
//! that tie it to the job's marking params and parts maps. Decoders build
//! geometry in an `Option<VectorData>` accumulator and only turn it into a
//! block through [`VectorBlock::from_pending`], which drops empty geometry.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Surface classification of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    /// Facing upwards, nothing above
    UpSkin,
    /// Interior
    #[default]
    InSkin,
    /// Facing downwards, powder below
    DownSkin,
}

/// Region of the part a block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartArea {
    /// Outline of the section
    Contour,
    /// Filled interior
    #[default]
    Volume,
    /// Contour between two regions of different exposure
    TransitionContour,
}

/// Whether geometry builds the part or its supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureType {
    /// Part geometry
    #[default]
    Part,
    /// Support geometry
    Support,
}

/// Classification and ownership of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockMetaData {
    /// Key into the job's parts map
    pub part_key: i32,
    /// Index of the contour ring, when known
    pub contour_index: Option<u32>,
    /// Skin classification
    pub skin_type: SkinType,
    /// Part area classification
    pub part_area: PartArea,
    /// Structure classification
    pub structure_type: StructureType,
}

/// A run of circular arcs that all sweep the same angle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSequence {
    /// Swept angle in radians, positive counter-clockwise
    pub angle: f64,
    /// Per arc: start x, start y, center x, center y
    pub arcs: Vec<f32>,
}

/// Geometry payload of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum VectorData {
    /// Point exposures, x y
    PointSequence(Vec<f32>),
    /// Point exposures, x y z
    PointSequence3D(Vec<f32>),
    /// Open polyline, x y
    LineSequence(Vec<f32>),
    /// Open polyline, x y z
    LineSequence3D(Vec<f32>),
    /// Independent segments, x1 y1 x2 y2
    Hatches(Vec<f32>),
    /// Independent segments, x1 y1 z1 x2 y2 z2
    Hatches3D(Vec<f32>),
    /// Circular arcs sharing one sweep angle
    Arcs(ArcSequence),
    /// Laser off for a fixed time
    ExposurePause {
        /// Pause duration in µs
        pause_in_us: u64,
    },
}

impl VectorData {
    /// Variant name, for messages
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::PointSequence(_) => "PointSequence",
            Self::PointSequence3D(_) => "PointSequence3D",
            Self::LineSequence(_) => "LineSequence",
            Self::LineSequence3D(_) => "LineSequence3D",
            Self::Hatches(_) => "Hatches",
            Self::Hatches3D(_) => "Hatches3D",
            Self::Arcs(_) => "Arcs",
            Self::ExposurePause { .. } => "ExposurePause",
        }
    }

    /// Number of coordinates forming one element of this variant
    pub fn arity(&self) -> usize {
        match self {
            Self::PointSequence(_) | Self::LineSequence(_) => 2,
            Self::PointSequence3D(_) | Self::LineSequence3D(_) => 3,
            Self::Hatches(_) | Self::Arcs(_) => 4,
            Self::Hatches3D(_) => 6,
            Self::ExposurePause { .. } => 1,
        }
    }

    /// Coordinate buffer, empty for exposure pauses
    pub fn coords(&self) -> &[f32] {
        match self {
            Self::PointSequence(c)
            | Self::PointSequence3D(c)
            | Self::LineSequence(c)
            | Self::LineSequence3D(c)
            | Self::Hatches(c)
            | Self::Hatches3D(c) => c,
            Self::Arcs(a) => &a.arcs,
            Self::ExposurePause { .. } => &[],
        }
    }

    /// Mutable coordinate buffer, `None` for exposure pauses
    pub fn coords_mut(&mut self) -> Option<&mut Vec<f32>> {
        match self {
            Self::PointSequence(c)
            | Self::PointSequence3D(c)
            | Self::LineSequence(c)
            | Self::LineSequence3D(c)
            | Self::Hatches(c)
            | Self::Hatches3D(c) => Some(c),
            Self::Arcs(a) => Some(&mut a.arcs),
            Self::ExposurePause { .. } => None,
        }
    }

    /// Whether the payload carries no geometry
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ExposurePause { .. } => false,
            _ => self.coords().is_empty(),
        }
    }

    /// Number of elements (points, segments or arcs)
    pub fn element_count(&self) -> usize {
        match self {
            Self::ExposurePause { .. } => 1,
            _ => self.coords().len() / self.arity(),
        }
    }

    /// Whether coordinates carry a z component
    pub fn is_3d(&self) -> bool {
        matches!(
            self,
            Self::PointSequence3D(_) | Self::LineSequence3D(_) | Self::Hatches3D(_)
        )
    }

    /// Check the coordinate count against the variant's arity
    pub fn check_arity(&self) -> Result<(), ModelError> {
        let len = self.coords().len();
        let arity = self.arity();
        if len % arity != 0 {
            return Err(ModelError::ArityMismatch {
                variant: self.variant_name(),
                len,
                arity,
            });
        }
        Ok(())
    }

    /// Iterate the x/y pairs of every point stored in the payload
    ///
    /// Arcs yield their start points and centers; pauses yield nothing.
    pub fn xy_points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let stride = if self.is_3d() { 3 } else { 2 };
        self.coords()
            .chunks_exact(stride)
            .map(|chunk| (chunk[0], chunk[1]))
    }
}

/// One block of geometry with its process and ownership keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorBlock {
    /// Geometry payload
    pub data: VectorData,
    /// Key into the job's marking params map
    pub marking_params_key: i32,
    /// Number of extra repetitions of this block
    #[serde(default)]
    pub repeats: u32,
    /// Classification and part ownership
    #[serde(default)]
    pub meta: Option<BlockMetaData>,
}

impl VectorBlock {
    /// Create a block referencing `marking_params_key`
    pub fn new(data: VectorData, marking_params_key: i32) -> Self {
        Self {
            data,
            marking_params_key,
            repeats: 0,
            meta: None,
        }
    }

    /// Attach classification metadata
    pub fn with_meta(mut self, meta: BlockMetaData) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Turn a decoder accumulator into a block
    ///
    /// Returns `None` when there is no payload or the payload is empty, so
    /// an unfinished block never reaches a work plane.
    pub fn from_pending(
        pending: Option<VectorData>,
        marking_params_key: i32,
        meta: Option<BlockMetaData>,
    ) -> Option<Self> {
        let data = pending?;
        if data.is_empty() {
            return None;
        }
        Some(Self {
            data,
            marking_params_key,
            repeats: 0,
            meta,
        })
    }

    /// Part key from the metadata, if any
    pub fn part_key(&self) -> Option<i32> {
        self.meta.map(|m| m.part_key)
    }
}
