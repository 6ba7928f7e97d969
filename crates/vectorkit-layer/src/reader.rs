//! Primitive-level CLI reader
//!
//! [`CliReader`] parses the header eagerly and then hands out one
//! [`Primitive`] per call. In binary documents only the fixed-size fields of
//! a primitive are read; its coordinates stay on disk as a [`PayloadRef`]
//! until [`CliReader::materialize`] asks for them. The reader keeps its own
//! byte offset so descriptors always point at absolute positions.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::ascii;
use crate::error::{LayerError, Result};
use crate::header::{CliHeader, FileEncoding};
use crate::opcode::OpCode;
use crate::primitive::{CoordEncoding, Payload, PayloadRef, PolylineDirection, Primitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// ASCII text between the header and `$$GEOMETRYSTART`
    Preamble,
    Geometry,
    Finished,
}

/// Streaming reader of CLI primitives
#[derive(Debug)]
pub struct CliReader<R: Read + Seek> {
    inner: BufReader<R>,
    header: CliHeader,
    offset: u64,
    len: u64,
    line: usize,
    section: Section,
}

fn truncated_at(offset: u64) -> impl FnOnce(io::Error) -> LayerError {
    move |err| match err.kind() {
        io::ErrorKind::UnexpectedEof => LayerError::Truncated { offset },
        _ => LayerError::Io(err),
    }
}

impl<R: Read + Seek> CliReader<R> {
    /// Open a document and parse its header
    pub fn open(mut source: R) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut inner = BufReader::new(source);
        let scan = CliHeader::scan(&mut inner)?;
        let section = match scan.header.encoding {
            FileEncoding::Binary => Section::Geometry,
            FileEncoding::Ascii => Section::Preamble,
        };

        let mut reader = Self {
            inner,
            header: scan.header,
            offset: scan.consumed,
            len,
            line: scan.lines,
            section,
        };
        reader.skip_line_break()?;
        Ok(reader)
    }

    /// Parsed header
    pub fn header(&self) -> &CliHeader {
        &self.header
    }

    /// Byte offset of the next unread primitive
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next primitive, `None` at end of geometry
    pub fn next_primitive(&mut self) -> Result<Option<Primitive>> {
        match self.header.encoding {
            FileEncoding::Binary => self.next_binary(),
            FileEncoding::Ascii => self.next_ascii(),
        }
    }

    /// Coordinates of a primitive, scaled to mm
    pub fn materialize(&mut self, primitive: &Primitive) -> Result<Vec<f32>> {
        match primitive.payload().ok_or(LayerError::NoPayload)? {
            Payload::Inline(coords) => Ok(coords.clone()),
            Payload::Deferred(payload) => self.read_payload(*payload),
        }
    }

    /// Read a deferred payload and return to the current position
    pub fn read_payload(&mut self, payload: PayloadRef) -> Result<Vec<f32>> {
        self.inner.seek(SeekFrom::Start(payload.offset))?;

        let mut coords = Vec::with_capacity(payload.count);
        let mut at = payload.offset;
        for _ in 0..payload.count {
            let raw = match payload.encoding {
                CoordEncoding::U16 => f32::from(
                    self.inner
                        .read_u16::<LittleEndian>()
                        .map_err(truncated_at(at))?,
                ),
                CoordEncoding::F32 => self
                    .inner
                    .read_f32::<LittleEndian>()
                    .map_err(truncated_at(at))?,
            };
            coords.push(self.scale(raw));
            at += payload.encoding.width();
        }

        self.inner.seek(SeekFrom::Start(self.offset))?;
        Ok(coords)
    }

    fn scale(&self, value: f32) -> f32 {
        (f64::from(value) * self.header.units) as f32
    }

    /// Skip the optional line break after `$$HEADEREND`
    fn skip_line_break(&mut self) -> Result<()> {
        for expected in [b'\r', b'\n'] {
            if self.inner.fill_buf()?.first() == Some(&expected) {
                self.inner.consume(1);
                self.offset += 1;
            }
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let value = self
            .inner
            .read_u16::<LittleEndian>()
            .map_err(truncated_at(self.offset))?;
        self.offset += 2;
        Ok(value)
    }

    fn read_i32(&mut self) -> Result<i32> {
        let value = self
            .inner
            .read_i32::<LittleEndian>()
            .map_err(truncated_at(self.offset))?;
        self.offset += 4;
        Ok(value)
    }

    fn read_f32(&mut self) -> Result<f32> {
        let value = self
            .inner
            .read_f32::<LittleEndian>()
            .map_err(truncated_at(self.offset))?;
        self.offset += 4;
        Ok(value)
    }

    fn read_count(&mut self) -> Result<usize> {
        let at = self.offset;
        let count = self.read_i32()?;
        usize::try_from(count).map_err(|_| LayerError::NegativeCount { count, offset: at })
    }

    /// Record the payload position and step over it
    fn defer(&mut self, count: usize, encoding: CoordEncoding) -> Result<Payload> {
        let payload = PayloadRef {
            offset: self.offset,
            count,
            encoding,
        };
        let end = self.offset + payload.byte_len();
        if end > self.len {
            return Err(LayerError::Truncated { offset: self.len });
        }
        self.inner.seek_relative(payload.byte_len() as i64)?;
        self.offset = end;
        Ok(Payload::Deferred(payload))
    }

    fn next_binary(&mut self) -> Result<Option<Primitive>> {
        if self.section == Section::Finished || self.inner.fill_buf()?.is_empty() {
            self.section = Section::Finished;
            return Ok(None);
        }

        let at = self.offset;
        let code = self.read_u16()?;
        let op = OpCode::from_code(code).ok_or(LayerError::UnknownOpCode { code, offset: at })?;

        let primitive = match op {
            OpCode::LayerLong => {
                let z = self.read_f32()?;
                Primitive::Layer { z: self.scale(z) }
            }
            OpCode::LayerShort => {
                let z = f32::from(self.read_u16()?);
                Primitive::Layer { z: self.scale(z) }
            }
            OpCode::PolylineShort => {
                let id = i32::from(self.read_u16()?);
                let direction = PolylineDirection::from_code(u32::from(self.read_u16()?));
                let n = usize::from(self.read_u16()?);
                Primitive::Polyline {
                    id,
                    direction,
                    points: self.defer(n * 2, CoordEncoding::U16)?,
                }
            }
            OpCode::PolylineLong => {
                let id = self.read_i32()?;
                let direction = PolylineDirection::from_code(self.read_i32()? as u32);
                let n = self.read_count()?;
                Primitive::Polyline {
                    id,
                    direction,
                    points: self.defer(n * 2, CoordEncoding::F32)?,
                }
            }
            OpCode::HatchesShort => {
                let id = i32::from(self.read_u16()?);
                let n = usize::from(self.read_u16()?);
                Primitive::Hatches {
                    id,
                    segments: self.defer(n * 4, CoordEncoding::U16)?,
                }
            }
            OpCode::HatchesLong => {
                let id = self.read_i32()?;
                let n = self.read_count()?;
                Primitive::Hatches {
                    id,
                    segments: self.defer(n * 4, CoordEncoding::F32)?,
                }
            }
        };
        Ok(Some(primitive))
    }

    fn next_ascii(&mut self) -> Result<Option<Primitive>> {
        let mut text = String::new();
        loop {
            if self.section == Section::Finished {
                return Ok(None);
            }

            text.clear();
            let read = self.inner.read_line(&mut text)?;
            if read == 0 {
                if self.section == Section::Geometry {
                    tracing::warn!(line = self.line, "CLI geometry ends without $$GEOMETRYEND");
                }
                self.section = Section::Finished;
                return Ok(None);
            }
            self.offset += read as u64;
            self.line += 1;

            let line = text.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            match self.section {
                Section::Preamble => {
                    if line == ascii::GEOMETRY_START {
                        self.section = Section::Geometry;
                    } else {
                        tracing::trace!(line = self.line, "skipping text before geometry");
                    }
                }
                Section::Geometry if line == ascii::GEOMETRY_END => {
                    self.section = Section::Finished;
                }
                Section::Geometry => {
                    return ascii::parse_line(line, self.line, self.header.units).map(Some);
                }
                Section::Finished => {}
            }
        }
    }
}
