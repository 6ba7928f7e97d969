//! Work planes: one build layer each

use serde::{Deserialize, Serialize};

use super::{Bounds, VectorBlock};

/// One build layer at a fixed Z height
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkPlane {
    /// Z position in mm
    pub z_pos_in_mm: f32,
    /// Number of extra repetitions of all blocks of this plane
    #[serde(default)]
    pub repeats: u32,
    /// Blocks in marking order
    pub vector_blocks: Vec<VectorBlock>,
    /// Always equal to `vector_blocks.len()`
    pub num_blocks: u32,
    /// Position of the plane in the job, assigned on assembly
    #[serde(default)]
    pub work_plane_number: u32,
}

impl WorkPlane {
    /// Create an empty plane at `z`
    pub fn new(z_pos_in_mm: f32) -> Self {
        Self {
            z_pos_in_mm,
            ..Self::default()
        }
    }

    /// Append a finished block
    pub fn push_block(&mut self, block: VectorBlock) {
        self.vector_blocks.push(block);
        self.num_blocks = self.vector_blocks.len() as u32;
    }

    /// Append every block of `other`, keeping their order
    pub fn absorb(&mut self, other: WorkPlane) {
        self.vector_blocks.extend(other.vector_blocks);
        self.num_blocks = self.vector_blocks.len() as u32;
        self.repeats = self.repeats.max(other.repeats);
    }

    /// Whether the plane carries no blocks
    pub fn is_empty(&self) -> bool {
        self.vector_blocks.is_empty()
    }

    /// XY bounding box of the plane's geometry, Z fixed at the plane height
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for (x, y) in self
            .vector_blocks
            .iter()
            .flat_map(|block| block.data.xy_points())
        {
            let point = [x, y, self.z_pos_in_mm];
            match bounds.as_mut() {
                Some(b) => b.include(point),
                None => bounds = Some(Bounds::at(point)),
            }
        }
        bounds
    }
}
