//! G-code to work planes
//!
//! Marking moves (`G1`–`G3`) build blocks, rapid moves (`G0`) end them.
//! Z is the layer axis: any move that changes Z closes the open block and
//! continues on the plane at the new height, so a Z move is always travel.

use std::collections::VecDeque;
use std::io::BufRead;

use vectorkit_core::units::MeasurementSystem;
use vectorkit_core::{
    ArcSequence, Job, ParamChange, ParamTable, VectorBlock, VectorData, WorkPlane,
    WorkPlaneAssembler, WorkPlaneDecoder,
};

use crate::arc::sweep_angle;
use crate::command::{parse_words, Axes, GcodeCommand, Motion};
use crate::error::{GcodeError, Result};
use crate::lexer::tokenize;

/// Default tolerance under which arcs of equal sweep share a block
pub const ANGLE_EPSILON: f64 = 1e-5;

/// Decodes G-code into work planes
///
/// Feed rate `F` (units per minute) becomes the mark speed in mm/s and `S`
/// becomes the laser power. Unknown commands are skipped.
pub struct GcodeDecoder<B: BufRead> {
    source: B,
    line: usize,
    buffer: String,
    queued: VecDeque<GcodeCommand>,
    table: ParamTable,
    assembler: WorkPlaneAssembler,
    position: [f64; 3],
    absolute: bool,
    units: MeasurementSystem,
    motion: Motion,
    feed_mm_per_min: Option<f64>,
    power: Option<f64>,
    pending: Option<VectorData>,
    angle_tolerance: f64,
    done: bool,
}

impl<B: BufRead> GcodeDecoder<B> {
    /// Create a decoder; absolute mm positioning, starting at the origin
    pub fn new(source: B) -> Self {
        let mut assembler = WorkPlaneAssembler::new(false);
        assembler.open(0.0);
        Self {
            source,
            line: 0,
            buffer: String::new(),
            queued: VecDeque::new(),
            table: ParamTable::new(),
            assembler,
            position: [0.0; 3],
            absolute: true,
            units: MeasurementSystem::Metric,
            motion: Motion::Rapid,
            feed_mm_per_min: None,
            power: None,
            pending: None,
            angle_tolerance: ANGLE_EPSILON,
            done: false,
        }
    }

    /// Arcs whose sweeps differ by at most `tolerance` radians share a block
    pub fn with_angle_tolerance(mut self, tolerance: f64) -> Self {
        self.angle_tolerance = tolerance;
        self
    }

    fn next_command(&mut self) -> Result<Option<GcodeCommand>> {
        loop {
            if let Some(command) = self.queued.pop_front() {
                return Ok(Some(command));
            }
            self.buffer.clear();
            if self.source.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let words = tokenize(&self.buffer, self.line)?;
            self.queued.extend(parse_words(&words, self.line)?);
        }
    }

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

    fn to_mm(&self, value: f64) -> f64 {
        self.units.to_mm(value)
    }

    fn target(&self, axes: &Axes) -> [f64; 3] {
        let mut target = self.position;
        for (axis, value) in [axes.x, axes.y, axes.z].into_iter().enumerate() {
            if let Some(value) = value {
                let value = self.to_mm(value);
                target[axis] = if self.absolute {
                    value
                } else {
                    target[axis] + value
                };
            }
        }
        target
    }

    /// Bring the table in line with F and S, closing the block on a change
    fn apply_params(&mut self) {
        let mut changes = Vec::with_capacity(2);
        if let Some(feed) = self.feed_mm_per_min {
            changes.push(ParamChange::MarkSpeed((feed / 60.0) as f32));
        }
        if let Some(power) = self.power {
            changes.push(ParamChange::LaserPower(power as f32));
        }
        if changes.iter().any(|c| !self.table.current().already_has(c)) {
            self.flush();
            for change in changes {
                self.table.update(change);
            }
        }
    }

    fn change_layer(&mut self, target: [f64; 3]) {
        self.flush();
        tracing::debug!(line = self.line, z = target[2], "G-code layer change");
        self.assembler.open(target[2] as f32);
        self.position = target;
    }

    fn linear(&mut self, target: [f64; 3]) {
        if target[0] == self.position[0] && target[1] == self.position[1] {
            return;
        }
        self.apply_params();
        let point = [target[0] as f32, target[1] as f32, target[2] as f32];
        match self.pending.as_mut() {
            Some(VectorData::LineSequence3D(points)) => points.extend_from_slice(&point),
            _ => {
                self.flush();
                let mut points = self.position.map(|v| v as f32).to_vec();
                points.extend_from_slice(&point);
                self.pending = Some(VectorData::LineSequence3D(points));
            }
        }
        self.position = target;
    }

    fn arc(&mut self, target: [f64; 3], i: Option<f64>, j: Option<f64>, clockwise: bool) {
        let start = [self.position[0], self.position[1]];
        let center = [
            start[0] + self.to_mm(i.unwrap_or(0.0)),
            start[1] + self.to_mm(j.unwrap_or(0.0)),
        ];
        let Some(angle) = sweep_angle(start, [target[0], target[1]], center, clockwise) else {
            tracing::warn!(line = self.line, "arc with zero radius skipped");
            self.flush();
            self.position = target;
            return;
        };

        self.apply_params();
        let arc = [
            start[0] as f32,
            start[1] as f32,
            center[0] as f32,
            center[1] as f32,
        ];
        match self.pending.as_mut() {
            Some(VectorData::Arcs(seq)) if (seq.angle - angle).abs() <= self.angle_tolerance => {
                seq.arcs.extend_from_slice(&arc)
            }
            _ => {
                self.flush();
                self.pending = Some(VectorData::Arcs(ArcSequence {
                    angle,
                    arcs: arc.to_vec(),
                }));
            }
        }
        self.position = target;
    }

    fn motion(
        &mut self,
        motion: Option<Motion>,
        axes: Axes,
        i: Option<f64>,
        j: Option<f64>,
        feed: Option<f64>,
        power: Option<f64>,
    ) {
        if let Some(motion) = motion {
            self.motion = motion;
        }
        if let Some(feed) = feed {
            self.feed_mm_per_min = Some(self.to_mm(feed));
        }
        if let Some(power) = power {
            self.power = Some(power);
        }
        if axes.is_empty() && i.is_none() && j.is_none() {
            return;
        }

        let target = self.target(&axes);
        if target[2] != self.position[2] {
            self.change_layer(target);
            return;
        }

        match self.motion {
            Motion::Rapid => {
                self.flush();
                self.position = target;
            }
            Motion::Linear => self.linear(target),
            Motion::ArcClockwise => self.arc(target, i, j, true),
            Motion::ArcCounterClockwise => self.arc(target, i, j, false),
        }
    }

    fn handle(&mut self, command: GcodeCommand) {
        match command {
            GcodeCommand::Move {
                motion,
                axes,
                i,
                j,
                feed,
                power,
            } => self.motion(motion, axes, i, j, feed, power),
            GcodeCommand::Dwell { millis } => {
                self.flush();
                self.pending = Some(VectorData::ExposurePause {
                    pause_in_us: (millis.max(0.0) * 1000.0).round() as u64,
                });
                self.flush();
            }
            GcodeCommand::Inches(inches) => {
                self.units = if inches {
                    MeasurementSystem::Imperial
                } else {
                    MeasurementSystem::Metric
                };
            }
            GcodeCommand::Absolute(absolute) => self.absolute = absolute,
            GcodeCommand::SetPosition(axes) => {
                self.flush();
                let mut position = self.position;
                for (axis, value) in [axes.x, axes.y, axes.z].into_iter().enumerate() {
                    if let Some(value) = value {
                        position[axis] = self.to_mm(value);
                    }
                }
                if position[2] != self.position[2] {
                    self.assembler.open(position[2] as f32);
                }
                self.position = position;
            }
            GcodeCommand::Misc { letter, code } => {
                tracing::trace!(line = self.line, "{letter}{code} ignored");
            }
        }
    }
}

impl<B: BufRead> WorkPlaneDecoder for GcodeDecoder<B> {
    type Error = GcodeError;

    fn next_workplane(&mut self) -> Result<Option<WorkPlane>> {
        loop {
            if let Some(plane) = self.assembler.pop_ready() {
                return Ok(Some(plane));
            }
            if self.done {
                return Ok(None);
            }
            match self.next_command()? {
                Some(command) => self.handle(command),
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
