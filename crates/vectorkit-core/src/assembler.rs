//! Incremental work plane assembly shared by the decoders

use std::collections::VecDeque;

use crate::model::{VectorBlock, WorkPlane};

/// Collects finished blocks into work planes as layers change
///
/// Closed planes queue up until the decoder hands them out, which lets a
/// decoder return plane by plane instead of materializing the whole job.
#[derive(Debug)]
pub struct WorkPlaneAssembler {
    current: Option<WorkPlane>,
    ready: VecDeque<WorkPlane>,
    keep_empty: bool,
}

impl WorkPlaneAssembler {
    /// Create an assembler
    ///
    /// With `keep_empty`, a layer that never receives a block is still
    /// emitted as a plane; otherwise it is dropped when the next one opens.
    pub fn new(keep_empty: bool) -> Self {
        Self {
            current: None,
            ready: VecDeque::new(),
            keep_empty,
        }
    }

    /// Close the open plane and open a new one at `z`
    pub fn open(&mut self, z: f32) {
        self.close_current();
        self.current = Some(WorkPlane::new(z));
    }

    /// Z of the open plane
    pub fn current_z(&self) -> Option<f32> {
        self.current.as_ref().map(|plane| plane.z_pos_in_mm)
    }

    /// Whether the open plane already holds blocks
    pub fn has_blocks(&self) -> bool {
        self.current.as_ref().is_some_and(|plane| !plane.is_empty())
    }

    /// Append a block to the open plane, opening one at Z 0 if needed
    pub fn push_block(&mut self, block: VectorBlock) {
        self.current
            .get_or_insert_with(|| WorkPlane::new(0.0))
            .push_block(block);
    }

    /// Take the oldest closed plane
    pub fn pop_ready(&mut self) -> Option<WorkPlane> {
        self.ready.pop_front()
    }

    /// Close the open plane at end of stream
    pub fn finish(&mut self) {
        self.close_current();
    }

    fn close_current(&mut self) {
        if let Some(plane) = self.current.take() {
            if self.keep_empty || !plane.is_empty() {
                tracing::trace!(z = plane.z_pos_in_mm, blocks = plane.num_blocks, "work plane closed");
                self.ready.push_back(plane);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VectorData;

    fn block() -> VectorBlock {
        VectorBlock::new(VectorData::PointSequence(vec![1.0, 1.0]), 0)
    }

    #[test]
    fn test_drops_empty_planes_by_default() {
        let mut asm = WorkPlaneAssembler::new(false);
        asm.open(0.1);
        asm.open(0.2);
        asm.push_block(block());
        asm.finish();
        let plane = asm.pop_ready().unwrap();
        assert_eq!(plane.z_pos_in_mm, 0.2);
        assert!(asm.pop_ready().is_none());
    }

    #[test]
    fn test_keeps_empty_planes_when_asked() {
        let mut asm = WorkPlaneAssembler::new(true);
        asm.open(0.1);
        asm.open(0.2);
        asm.finish();
        assert_eq!(asm.pop_ready().unwrap().z_pos_in_mm, 0.1);
        assert_eq!(asm.pop_ready().unwrap().z_pos_in_mm, 0.2);
    }

    #[test]
    fn test_block_without_layer_opens_plane_at_zero() {
        let mut asm = WorkPlaneAssembler::new(false);
        asm.push_block(block());
        assert!(asm.has_blocks());
        assert_eq!(asm.current_z(), Some(0.0));
    }
}
