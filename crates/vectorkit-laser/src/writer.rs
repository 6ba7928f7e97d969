//! Work planes to laser commands

use std::collections::BTreeMap;
use std::io::Write;

use vectorkit_core::{Job, JobWriter, MarkingParams, VectorData, WorkPlane};

use crate::command::Mnemonic;
use crate::error::{LaserError, Result};

/// Writes work planes as laser commands
///
/// Parameter commands are emitted only for fields that differ from the last
/// emitted state, which starts out as the default record. Every polyline and
/// hatch segment starts with a `JP` so the decoder can tell them apart.
pub struct LaserWriter<W: Write> {
    out: W,
    params: BTreeMap<i32, MarkingParams>,
    emitted: MarkingParams,
    position: [f32; 3],
    job_name: bool,
}

fn setters(p: &MarkingParams) -> [(Mnemonic, f32); 10] {
    [
        (Mnemonic::LaserPower, p.laser_power_in_w),
        (Mnemonic::MarkSpeed, p.laser_speed_in_mm_per_s),
        (Mnemonic::JumpSpeed, p.jump_speed_in_mm_per_s),
        (Mnemonic::JumpDelay, p.jump_delay_in_us),
        (Mnemonic::MarkDelay, p.mark_delay_in_us),
        (Mnemonic::PolygonDelay, p.polygon_delay_in_us),
        (Mnemonic::LaserOnDelay, p.laser_on_delay_in_us),
        (Mnemonic::LaserOffDelay, p.laser_off_delay_in_us),
        (Mnemonic::FocusShift, p.laser_focus_shift_in_mm),
        (Mnemonic::SkyMode, f32::from(p.marking_mode.code())),
    ]
}

impl<W: Write> LaserWriter<W> {
    /// Create a writer
    pub fn new(out: W) -> Self {
        Self {
            out,
            params: BTreeMap::new(),
            emitted: MarkingParams::default(),
            position: [0.0; 3],
            job_name: true,
        }
    }

    /// Whether to start with a comment holding the job name
    pub fn with_job_name(mut self, enabled: bool) -> Self {
        self.job_name = enabled;
        self
    }

    /// Return the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_params(&mut self, key: i32) -> Result<()> {
        let params = self
            .params
            .get(&key)
            .ok_or(LaserError::MissingParams { key })?;
        if self.emitted == *params {
            return Ok(());
        }
        let previous = setters(&self.emitted);
        for ((mnemonic, value), (_, old)) in setters(params).into_iter().zip(previous) {
            if value != old {
                writeln!(self.out, "{}{}", mnemonic.code(), value)?;
            }
        }
        self.emitted = params.clone();
        Ok(())
    }

    fn point(&mut self, mnemonic: Mnemonic, p: [f32; 3]) -> Result<()> {
        writeln!(self.out, "{}{},{},{}", mnemonic.code(), p[0], p[1], p[2])?;
        self.position = p;
        Ok(())
    }

    fn polyline(&mut self, points: impl Iterator<Item = [f32; 3]>) -> Result<()> {
        for (index, p) in points.enumerate() {
            let mnemonic = if index == 0 {
                Mnemonic::Jump
            } else {
                Mnemonic::Mark
            };
            self.point(mnemonic, p)?;
        }
        Ok(())
    }

    fn hatches(&mut self, segments: impl Iterator<Item = ([f32; 3], [f32; 3])>) -> Result<()> {
        for (start, end) in segments {
            self.point(Mnemonic::Jump, start)?;
            self.point(Mnemonic::Mark, end)?;
        }
        Ok(())
    }

    fn exposures(&mut self, points: impl Iterator<Item = [f32; 3]>, duration: f32) -> Result<()> {
        for p in points {
            writeln!(
                self.out,
                "{}{},{},{},{}",
                Mnemonic::PointExposure.code(),
                p[0],
                p[1],
                p[2],
                duration
            )?;
            self.position = p;
        }
        Ok(())
    }
}

impl<W: Write> JobWriter for LaserWriter<W> {
    type Error = LaserError;

    fn begin(&mut self, shell: &Job) -> Result<()> {
        self.params = shell.marking_params_map.clone();
        self.emitted = MarkingParams::default();
        self.position = [0.0; 3];
        if self.job_name && !shell.metadata.job_name.is_empty() {
            writeln!(self.out, "# {}", shell.metadata.job_name)?;
        }
        Ok(())
    }

    fn append_work_plane(&mut self, plane: &WorkPlane) -> Result<()> {
        let z = plane.z_pos_in_mm;
        writeln!(self.out, "{}{}", Mnemonic::Layer.code(), z)?;

        for block in &plane.vector_blocks {
            self.write_params(block.marking_params_key)?;
            let exposure = self.emitted.point_exposure_time_in_us;

            match &block.data {
                VectorData::LineSequence(c) => {
                    self.polyline(c.chunks_exact(2).map(|p| [p[0], p[1], z]))?
                }
                VectorData::LineSequence3D(c) => {
                    self.polyline(c.chunks_exact(3).map(|p| [p[0], p[1], p[2]]))?
                }
                VectorData::Hatches(c) => self.hatches(
                    c.chunks_exact(4)
                        .map(|s| ([s[0], s[1], z], [s[2], s[3], z])),
                )?,
                VectorData::Hatches3D(c) => self.hatches(
                    c.chunks_exact(6)
                        .map(|s| ([s[0], s[1], s[2]], [s[3], s[4], s[5]])),
                )?,
                VectorData::PointSequence(c) => {
                    self.exposures(c.chunks_exact(2).map(|p| [p[0], p[1], z]), exposure)?
                }
                VectorData::PointSequence3D(c) => {
                    self.exposures(c.chunks_exact(3).map(|p| [p[0], p[1], p[2]]), exposure)?
                }
                VectorData::ExposurePause { pause_in_us } => {
                    writeln!(self.out, "{}{}", Mnemonic::Wait.code(), pause_in_us)?
                }
                VectorData::Arcs(_) => {
                    return Err(LaserError::UnsupportedBlock {
                        variant: block.data.variant_name(),
                    })
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
