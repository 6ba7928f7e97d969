//! Laser command stream to work planes
//!
//! Grouping rules, in the order the decoder applies them:
//! - a parameter command closes the open block, then updates the table
//! - `JP` to the current position does nothing, any other `JP` closes the
//!   open block
//! - `GO` followed by `GO` starts a polyline from the current position that
//!   runs until the next non-`GO` command
//! - an isolated `GO` is a hatch segment; following `JP GO` pairs whose `GO`
//!   is isolated as well join the same hatch block
//! - `PE` commands with the same duration share one point block
//!
//! No decision looks further than two commands ahead.

use std::io::BufRead;

use vectorkit_core::{
    Job, Lookahead, ParamChange, ParamTable, VectorBlock, VectorData, WorkPlane,
    WorkPlaneAssembler, WorkPlaneDecoder,
};

use crate::command::Command;
use crate::error::{LaserError, Result};
use crate::parser::CommandStream;

/// Decodes laser commands into work planes
pub struct LaserDecoder<B: BufRead> {
    commands: Lookahead<CommandStream<B>>,
    table: ParamTable,
    assembler: WorkPlaneAssembler,
    position: [f32; 3],
    pending: Option<VectorData>,
    done: bool,
}

impl<B: BufRead> LaserDecoder<B> {
    /// Create a decoder; geometry before the first `LY` lands at Z 0
    pub fn new(source: B) -> Self {
        let mut assembler = WorkPlaneAssembler::new(false);
        assembler.open(0.0);
        Self {
            commands: Lookahead::new(CommandStream::new(source)),
            table: ParamTable::new(),
            assembler,
            position: [0.0; 3],
            pending: None,
            done: false,
        }
    }

    fn next_command(&mut self) -> Result<Option<Command>> {
        self.commands.next().transpose()
    }

    fn peek_is(&mut self, n: usize, test: fn(&Command) -> bool) -> bool {
        matches!(self.commands.peek(n), Some(Ok(command)) if test(command))
    }

    /// Close the open block, if it holds anything
    fn flush(&mut self) {
        let Some(data) = self.pending.take() else {
            return;
        };
        if data.is_empty() {
            return;
        }
        let key = self.table.insert_current();
        if let Some(block) = VectorBlock::from_pending(Some(data), key, None) {
            self.assembler.push_block(block);
        }
    }

    fn mark_run(&mut self, first: [f32; 3]) -> Result<()> {
        self.flush();
        let mut line = self.position.to_vec();
        line.extend_from_slice(&first);
        self.position = first;

        while self.peek_is(0, Command::is_mark) {
            if let Some(Command::Mark(to)) = self.next_command()? {
                line.extend_from_slice(&to);
                self.position = to;
            }
        }

        self.pending = Some(VectorData::LineSequence3D(line));
        self.flush();
        Ok(())
    }

    fn hatch_fold(&mut self, first: [f32; 3]) -> Result<()> {
        self.flush();
        let mut segments = self.position.to_vec();
        segments.extend_from_slice(&first);
        self.position = first;

        loop {
            let jump_then_isolated_mark = self.peek_is(0, Command::is_jump)
                && self.peek_is(1, Command::is_mark)
                && !self.peek_is(2, Command::is_mark);
            let jump_then_jump =
                self.peek_is(0, Command::is_jump) && self.peek_is(1, Command::is_jump);

            if jump_then_isolated_mark {
                if let Some(Command::Jump(to)) = self.next_command()? {
                    self.position = to;
                }
                if let Some(Command::Mark(to)) = self.next_command()? {
                    segments.extend_from_slice(&self.position);
                    segments.extend_from_slice(&to);
                    self.position = to;
                }
            } else if jump_then_jump {
                if let Some(Command::Jump(to)) = self.next_command()? {
                    self.position = to;
                }
            } else {
                break;
            }
        }

        self.pending = Some(VectorData::Hatches3D(segments));
        self.flush();
        Ok(())
    }

    fn point_exposure(&mut self, at: [f32; 3], duration_us: f32) {
        let continues = matches!(self.pending, Some(VectorData::PointSequence3D(_)))
            && self.table.current().point_exposure_time_in_us == duration_us;
        if !continues {
            self.flush();
            self.table
                .update(ParamChange::PointExposureTime(duration_us));
            self.pending = Some(VectorData::PointSequence3D(Vec::new()));
        }
        if let Some(VectorData::PointSequence3D(points)) = self.pending.as_mut() {
            points.extend_from_slice(&at);
        }
        self.position = at;
    }

    fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Param(change) => {
                self.flush();
                self.table.update(change);
            }
            Command::Jump(to) => {
                if to != self.position {
                    self.flush();
                    self.position = to;
                }
            }
            Command::Mark(to) => {
                if self.peek_is(0, Command::is_mark) {
                    self.mark_run(to)?;
                } else {
                    self.hatch_fold(to)?;
                }
            }
            Command::PointExposure { at, duration_us } => self.point_exposure(at, duration_us),
            Command::Wait { duration_us } => {
                self.flush();
                self.pending = Some(VectorData::ExposurePause {
                    pause_in_us: duration_us,
                });
                self.flush();
            }
            Command::Layer { z } => {
                self.flush();
                tracing::debug!(z, "laser layer");
                self.assembler.open(z);
            }
        }
        Ok(())
    }
}

impl<B: BufRead> WorkPlaneDecoder for LaserDecoder<B> {
    type Error = LaserError;

    fn next_workplane(&mut self) -> Result<Option<WorkPlane>> {
        loop {
            if let Some(plane) = self.assembler.pop_ready() {
                return Ok(Some(plane));
            }
            if self.done {
                return Ok(None);
            }
            match self.next_command()? {
                Some(command) => self.handle(command)?,
                None => {
                    self.flush();
                    self.assembler.finish();
                    self.done = true;
                }
            }
        }
    }

    fn take_shell(&mut self) -> Job {
        Job {
            marking_params_map: self.table.to_map(),
            ..Job::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(text: &str) -> Job {
        LaserDecoder::new(text.as_bytes()).read_job().unwrap()
    }

    #[test]
    fn test_polyline_run() {
        let job = decode("LP100\nVG50\nJP0,0,0\nGO10,0,0\nGO20,0,0\n");
        assert_eq!(job.num_work_planes, 1);
        let plane = &job.work_planes[0];
        assert_eq!(plane.num_blocks, 1);
        let block = &plane.vector_blocks[0];
        assert_eq!(
            block.data,
            VectorData::LineSequence3D(vec![0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 20.0, 0.0, 0.0])
        );
        assert_eq!(job.marking_params_map.len(), 1);
        let params = &job.marking_params_map[&block.marking_params_key];
        assert_eq!(params.laser_power_in_w, 100.0);
        assert_eq!(params.laser_speed_in_mm_per_s, 50.0);
    }

    #[test]
    fn test_isolated_marks_fold_into_hatches() {
        let job = decode("JP0,0,0\nGO10,0,0\nJP5,5,0\nGO15,5,0\n");
        let blocks = &job.work_planes[0].vector_blocks;
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            blocks[0].data,
            VectorData::Hatches3D(vec![
                0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 5.0, 5.0, 0.0, 15.0, 5.0, 0.0
            ])
        );
    }

    #[test]
    fn test_fold_stops_before_polyline() {
        let job = decode("GO1,0,0\nJP2,0,0\nGO3,0,0\nGO4,0,0\n");
        let blocks = &job.work_planes[0].vector_blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].data,
            VectorData::Hatches3D(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
        );
        assert_eq!(
            blocks[1].data,
            VectorData::LineSequence3D(vec![2.0, 0.0, 0.0, 3.0, 0.0, 0.0, 4.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_param_change_splits_blocks_and_keys() {
        let job = decode("LP100\nGO1,0,0\nGO2,0,0\nLP200\nGO3,0,0\nGO4,0,0\nLP100\nGO5,0,0\nGO6,0,0\n");
        let keys: Vec<i32> = job.blocks().map(|b| b.marking_params_key).collect();
        assert_eq!(keys, vec![0, 1, 0]);
        assert_eq!(job.marking_params_map.len(), 2);
    }

    #[test]
    fn test_point_exposures_group_by_duration() {
        let job = decode("PE0,0,0,20\nPE1,0,0,20\nPE2,0,0,30\n");
        let blocks: Vec<_> = job.blocks().collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].data.element_count(), 2);
        assert_eq!(
            job.marking_params_map[&blocks[1].marking_params_key].point_exposure_time_in_us,
            30.0
        );
    }

    #[test]
    fn test_layers_and_pauses() {
        let job = decode("LY0.05\nGO1,0,0\nGO2,0,0\nWT500\nLY0.1\nLY0.15\nGO1,1,0\nGO2,2,0\n");
        assert_eq!(job.num_work_planes, 2);
        assert_eq!(job.work_planes[0].z_pos_in_mm, 0.05);
        assert_eq!(
            job.work_planes[0].vector_blocks[1].data,
            VectorData::ExposurePause { pause_in_us: 500 }
        );
        assert_eq!(job.work_planes[1].z_pos_in_mm, 0.15);
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_jump_to_same_position_keeps_block_open() {
        let job = decode("PE1,1,0,10\nJP1,1,0\nPE2,2,0,10\n");
        assert_eq!(job.blocks().count(), 1);
    }

    #[test]
    fn test_errors_propagate() {
        let err = LaserDecoder::new("LP10\nJP1,2\n".as_bytes())
            .read_job()
            .unwrap_err();
        assert!(matches!(err, LaserError::ArityMismatch { line: 2, .. }));
    }
}
