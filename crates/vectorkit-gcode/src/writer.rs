//! Work planes to G-code
//!
//! Output is absolute millimetres. Each plane starts with a rapid Z move,
//! blocks are reached with `G0` and marked with `G1`/`G2`/`G3`. `F` and `S`
//! are only written when they change.

use std::collections::BTreeMap;
use std::io::Write;

use vectorkit_core::{ArcSequence, Job, JobWriter, MarkingParams, VectorBlock, VectorData, WorkPlane};

use crate::arc::arc_end;
use crate::command::Motion;
use crate::error::{GcodeError, Result};

/// Writes a job as G-code
pub struct GcodeWriter<W: Write> {
    out: W,
    params: BTreeMap<i32, MarkingParams>,
    feed: Option<f32>,
    power: Option<f32>,
    position: [f32; 3],
    job_name: bool,
}

impl<W: Write> GcodeWriter<W> {
    /// Create a writer over `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            params: BTreeMap::new(),
            feed: None,
            power: None,
            position: [0.0; 3],
            job_name: true,
        }
    }

    /// Whether to start with a comment holding the job name
    pub fn with_job_name(mut self, enabled: bool) -> Self {
        self.job_name = enabled;
        self
    }

    /// Give back the output
    pub fn into_inner(self) -> W {
        self.out
    }

    fn travel(&mut self, x: f32, y: f32, force: bool) -> Result<()> {
        if force || self.position[0] != x || self.position[1] != y {
            writeln!(self.out, "G0 X{x} Y{y}")?;
            self.position[0] = x;
            self.position[1] = y;
        }
        Ok(())
    }

    /// Append ` F… S…` for whatever changed
    fn modal_words(&mut self, params: &MarkingParams) -> String {
        let mut words = String::new();
        let feed = params.laser_speed_in_mm_per_s * 60.0;
        if self.feed != Some(feed) {
            words.push_str(&format!(" F{feed}"));
            self.feed = Some(feed);
        }
        if self.power != Some(params.laser_power_in_w) {
            words.push_str(&format!(" S{}", params.laser_power_in_w));
            self.power = Some(params.laser_power_in_w);
        }
        words
    }

    fn mark(&mut self, x: f32, y: f32, params: &MarkingParams) -> Result<()> {
        let modal = self.modal_words(params);
        writeln!(self.out, "{} X{x} Y{y}{modal}", Motion::Linear)?;
        self.position[0] = x;
        self.position[1] = y;
        Ok(())
    }

    fn arcs(&mut self, seq: &ArcSequence, params: &MarkingParams) -> Result<()> {
        let motion = if seq.angle < 0.0 {
            Motion::ArcClockwise
        } else {
            Motion::ArcCounterClockwise
        };
        for arc in seq.arcs.chunks_exact(4) {
            self.travel(arc[0], arc[1], false)?;
            let start = [f64::from(arc[0]), f64::from(arc[1])];
            let center = [f64::from(arc[2]), f64::from(arc[3])];
            let [x, y] = arc_end(start, center, seq.angle).map(|v| v as f32);
            let (i, j) = (arc[2] - arc[0], arc[3] - arc[1]);
            let modal = self.modal_words(params);
            writeln!(self.out, "{motion} X{x} Y{y} I{i} J{j}{modal}")?;
            self.position[0] = x;
            self.position[1] = y;
        }
        Ok(())
    }

    fn block(&mut self, block: &VectorBlock) -> Result<()> {
        let params = self
            .params
            .get(&block.marking_params_key)
            .cloned()
            .ok_or(GcodeError::MissingParams {
                key: block.marking_params_key,
            })?;

        match &block.data {
            VectorData::LineSequence(_) | VectorData::LineSequence3D(_) => {
                let mut points = block.data.xy_points();
                if let Some((x, y)) = points.next() {
                    self.travel(x, y, false)?;
                }
                for (x, y) in points {
                    self.mark(x, y, &params)?;
                }
            }
            VectorData::Hatches(_) | VectorData::Hatches3D(_) => {
                let points: Vec<_> = block.data.xy_points().collect();
                for pair in points.chunks_exact(2) {
                    self.travel(pair[0].0, pair[0].1, true)?;
                    self.mark(pair[1].0, pair[1].1, &params)?;
                }
            }
            VectorData::Arcs(seq) => self.arcs(seq, &params)?,
            VectorData::ExposurePause { pause_in_us } => {
                writeln!(self.out, "G4 P{}", *pause_in_us as f64 / 1000.0)?;
            }
            VectorData::PointSequence(_) | VectorData::PointSequence3D(_) => {
                return Err(GcodeError::UnsupportedBlock {
                    variant: block.data.variant_name(),
                })
            }
        }
        Ok(())
    }
}

impl<W: Write> JobWriter for GcodeWriter<W> {
    type Error = GcodeError;

    fn begin(&mut self, shell: &Job) -> Result<()> {
        self.params = shell.marking_params_map.clone();
        if self.job_name && !shell.metadata.job_name.is_empty() {
            writeln!(self.out, "; {}", shell.metadata.job_name)?;
        }
        writeln!(self.out, "G21")?;
        writeln!(self.out, "G90")?;
        Ok(())
    }

    fn append_work_plane(&mut self, plane: &WorkPlane) -> Result<()> {
        if self.position[2] != plane.z_pos_in_mm {
            writeln!(self.out, "G0 Z{}", plane.z_pos_in_mm)?;
            self.position[2] = plane.z_pos_in_mm;
        }
        for block in &plane.vector_blocks {
            self.block(block)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        writeln!(self.out, "M2")?;
        self.out.flush()?;
        Ok(())
    }
}
