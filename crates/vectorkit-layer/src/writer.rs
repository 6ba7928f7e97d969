//! Work planes to CLI documents

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

use vectorkit_core::{Job, JobWriter, VectorData, WorkPlane};

use crate::ascii;
use crate::error::{LayerError, Result};
use crate::header::{CliHeader, FileEncoding};
use crate::opcode::OpCode;
use crate::primitive::PolylineDirection;

/// Output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CliEncoding {
    /// Text geometry
    #[default]
    Ascii,
    /// Binary with 4-byte fields and float coordinates
    BinaryLong,
    /// Binary with 2-byte fields and integer coordinates
    BinaryShort,
}

/// Writes work planes as a CLI document
///
/// Lines and hatches are written with the block's part key as id; 3D
/// variants lose their z. Points, arcs and pauses have no CLI form and are
/// rejected.
pub struct CliWriter<W: Write> {
    out: W,
    encoding: CliEncoding,
    units: f64,
}

fn short(field: &'static str, value: f64) -> Result<u16> {
    let rounded = value.round();
    if !(0.0..=f64::from(u16::MAX)).contains(&rounded) {
        return Err(LayerError::ValueOutOfRange { field, value });
    }
    Ok(rounded as u16)
}

/// Keep the components at `keep` of every `stride`-sized element
fn project(coords: &[f32], stride: usize, keep: &[usize]) -> Vec<f32> {
    coords
        .chunks_exact(stride)
        .flat_map(|element| keep.iter().map(move |&i| element[i]))
        .collect()
}

impl<W: Write> CliWriter<W> {
    /// Create a writer with unit scale 1 (coordinates in mm)
    pub fn new(out: W, encoding: CliEncoding) -> Self {
        Self {
            out,
            encoding,
            units: 1.0,
        }
    }

    /// Set the millimetres per written coordinate unit
    pub fn with_units(mut self, units: f64) -> Self {
        self.units = units;
        self
    }

    /// Return the underlying sink
    pub fn into_inner(self) -> W {
        self.out
    }

    fn unscale(&self, value: f32) -> f32 {
        (f64::from(value) / self.units) as f32
    }

    fn join(&self, coords: &[f32]) -> String {
        coords
            .iter()
            .map(|v| self.unscale(*v).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn write_short_coords(&mut self, coords: &[f32]) -> Result<()> {
        for v in coords {
            let scaled = f64::from(*v) / self.units;
            self.out.write_u16::<LittleEndian>(short("coordinate", scaled)?)?;
        }
        Ok(())
    }

    fn write_layer(&mut self, z: f32) -> Result<()> {
        match self.encoding {
            CliEncoding::Ascii => writeln!(self.out, "{}/{}", ascii::LAYER, self.unscale(z))?,
            CliEncoding::BinaryLong => {
                self.out.write_u16::<LittleEndian>(OpCode::LayerLong.code())?;
                self.out.write_f32::<LittleEndian>(self.unscale(z))?;
            }
            CliEncoding::BinaryShort => {
                let z = short("layer height", f64::from(z) / self.units)?;
                self.out.write_u16::<LittleEndian>(OpCode::LayerShort.code())?;
                self.out.write_u16::<LittleEndian>(z)?;
            }
        }
        Ok(())
    }

    fn write_polyline(&mut self, id: i32, coords: &[f32]) -> Result<()> {
        let n = coords.len() / 2;
        let dir = PolylineDirection::Open.code();
        match self.encoding {
            CliEncoding::Ascii => writeln!(
                self.out,
                "{}/{id},{dir},{n},{}",
                ascii::POLYLINE,
                self.join(coords)
            )?,
            CliEncoding::BinaryLong => {
                self.out.write_u16::<LittleEndian>(OpCode::PolylineLong.code())?;
                self.out.write_i32::<LittleEndian>(id)?;
                self.out.write_i32::<LittleEndian>(i32::from(dir))?;
                self.out.write_i32::<LittleEndian>(n as i32)?;
                for v in coords {
                    self.out.write_f32::<LittleEndian>(self.unscale(*v))?;
                }
            }
            CliEncoding::BinaryShort => {
                let id = short("id", f64::from(id))?;
                let count = short("count", n as f64)?;
                self.out.write_u16::<LittleEndian>(OpCode::PolylineShort.code())?;
                self.out.write_u16::<LittleEndian>(id)?;
                self.out.write_u16::<LittleEndian>(dir)?;
                self.out.write_u16::<LittleEndian>(count)?;
                self.write_short_coords(coords)?;
            }
        }
        Ok(())
    }

    fn write_hatches(&mut self, id: i32, coords: &[f32]) -> Result<()> {
        let n = coords.len() / 4;
        match self.encoding {
            CliEncoding::Ascii => writeln!(
                self.out,
                "{}/{id},{n},{}",
                ascii::HATCHES,
                self.join(coords)
            )?,
            CliEncoding::BinaryLong => {
                self.out.write_u16::<LittleEndian>(OpCode::HatchesLong.code())?;
                self.out.write_i32::<LittleEndian>(id)?;
                self.out.write_i32::<LittleEndian>(n as i32)?;
                for v in coords {
                    self.out.write_f32::<LittleEndian>(self.unscale(*v))?;
                }
            }
            CliEncoding::BinaryShort => {
                let id = short("id", f64::from(id))?;
                let count = short("count", n as f64)?;
                self.out.write_u16::<LittleEndian>(OpCode::HatchesShort.code())?;
                self.out.write_u16::<LittleEndian>(id)?;
                self.out.write_u16::<LittleEndian>(count)?;
                self.write_short_coords(coords)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> JobWriter for CliWriter<W> {
    type Error = LayerError;

    fn begin(&mut self, shell: &Job) -> Result<()> {
        let header = CliHeader {
            encoding: match self.encoding {
                CliEncoding::Ascii => FileEncoding::Ascii,
                _ => FileEncoding::Binary,
            },
            units: self.units,
            version: "200".to_string(),
            date: shell.metadata.creation_time.format("%d%m%y").to_string(),
            dimension: None,
            layers: Some(shell.num_work_planes),
            labels: shell
                .parts_map
                .iter()
                .map(|(key, part)| (*key, part.name.clone()))
                .collect(),
            user_data: shell
                .metadata
                .description
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
        };
        header.write(&mut self.out)?;
        if self.encoding == CliEncoding::Ascii {
            writeln!(self.out, "{}", ascii::GEOMETRY_START)?;
        }
        Ok(())
    }

    fn append_work_plane(&mut self, plane: &WorkPlane) -> Result<()> {
        self.write_layer(plane.z_pos_in_mm)?;
        for block in &plane.vector_blocks {
            let id = block.part_key().unwrap_or(0);
            match &block.data {
                VectorData::LineSequence(coords) => self.write_polyline(id, coords)?,
                VectorData::LineSequence3D(coords) => {
                    self.write_polyline(id, &project(coords, 3, &[0, 1]))?
                }
                VectorData::Hatches(coords) => self.write_hatches(id, coords)?,
                VectorData::Hatches3D(coords) => {
                    self.write_hatches(id, &project(coords, 6, &[0, 1, 3, 4]))?
                }
                other => {
                    return Err(LayerError::UnsupportedBlock {
                        variant: other.variant_name(),
                    })
                }
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.encoding == CliEncoding::Ascii {
            writeln!(self.out, "{}", ascii::GEOMETRY_END)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
