//! CLI documents to work planes

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use vectorkit_core::{
    BlockMetaData, Job, ParamTable, Part, VectorBlock, VectorData, WorkPlane, WorkPlaneAssembler,
    WorkPlaneDecoder,
};

use crate::error::{LayerError, Result};
use crate::fake_hatch::split_fake_hatches;
use crate::header::CliHeader;
use crate::primitive::{Payload, Primitive};
use crate::reader::CliReader;

/// Decoder behaviour switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOptions {
    /// Re-express chained hatch segments as polylines
    pub detect_fake_hatches: bool,
    /// Endpoint distance below which two segments count as chained, in mm
    pub fake_hatch_epsilon: f32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            detect_fake_hatches: true,
            fake_hatch_epsilon: 1e-4,
        }
    }
}

/// Decodes a CLI document into work planes
///
/// Every `$$LAYER` opens a plane, empty ones included. CLI carries no
/// process parameters, so every block references the current state of the
/// parameter table, which is the default record unless the caller seeds it.
pub struct CliDecoder<R: Read + Seek> {
    reader: CliReader<R>,
    options: DecodeOptions,
    table: ParamTable,
    parts: BTreeMap<i32, Part>,
    assembler: WorkPlaneAssembler,
    block_meta: Option<BlockMetaData>,
    done: bool,
}

impl<R: Read + Seek> CliDecoder<R> {
    /// Open a document with default options
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, DecodeOptions::default())
    }

    /// Open a document
    pub fn with_options(source: R, options: DecodeOptions) -> Result<Self> {
        Ok(Self {
            reader: CliReader::open(source)?,
            options,
            table: ParamTable::new(),
            parts: BTreeMap::new(),
            assembler: WorkPlaneAssembler::new(true),
            block_meta: None,
            done: false,
        })
    }

    /// Use an existing parameter table, keeping its current state
    pub fn with_table(mut self, table: ParamTable) -> Self {
        self.table = table;
        self
    }

    /// Tag every block with fixed metadata instead of deriving parts from ids
    pub fn with_block_meta(mut self, meta: BlockMetaData) -> Self {
        self.block_meta = Some(meta);
        self
    }

    /// Parsed header of the document
    pub fn header(&self) -> &CliHeader {
        self.reader.header()
    }

    /// Give the parameter table back, e.g. to share it with the next section
    pub fn into_table(self) -> ParamTable {
        self.table
    }

    fn part_meta(&mut self, id: i32) -> BlockMetaData {
        if let Some(meta) = self.block_meta {
            return meta;
        }
        if !self.parts.contains_key(&id) {
            let name = self
                .reader
                .header()
                .labels
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("part_{id}"));
            tracing::debug!(id, name = %name, "new CLI part");
            self.parts.insert(id, Part::new(name));
        }
        BlockMetaData {
            part_key: id,
            ..BlockMetaData::default()
        }
    }

    fn emit(&mut self, id: i32, data: VectorData) {
        let meta = self.part_meta(id);
        let key = self.table.insert_current();
        if let Some(block) = VectorBlock::from_pending(Some(data), key, Some(meta)) {
            self.assembler.push_block(block);
        }
    }

    fn coords(&mut self, payload: Payload) -> Result<Vec<f32>> {
        match payload {
            Payload::Inline(coords) => Ok(coords),
            Payload::Deferred(payload) => self.reader.read_payload(payload),
        }
    }

    fn handle(&mut self, primitive: Primitive) -> Result<()> {
        match primitive {
            Primitive::Layer { z } => {
                self.assembler.open(z);
            }
            Primitive::Polyline { id, points, .. } => {
                let coords = self.coords(points)?;
                self.emit(id, VectorData::LineSequence(coords));
            }
            Primitive::Hatches { id, segments } => {
                let coords = self.coords(segments)?;
                if self.options.detect_fake_hatches {
                    for data in split_fake_hatches(&coords, self.options.fake_hatch_epsilon) {
                        self.emit(id, data);
                    }
                } else {
                    self.emit(id, VectorData::Hatches(coords));
                }
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> WorkPlaneDecoder for CliDecoder<R> {
    type Error = LayerError;

    fn next_workplane(&mut self) -> Result<Option<WorkPlane>> {
        loop {
            if let Some(plane) = self.assembler.pop_ready() {
                return Ok(Some(plane));
            }
            if self.done {
                return Ok(None);
            }
            match self.reader.next_primitive()? {
                Some(primitive) => self.handle(primitive)?,
                None => {
                    self.assembler.finish();
                    self.done = true;
                }
            }
        }
    }

    fn take_shell(&mut self) -> Job {
        let header = self.reader.header();
        let mut job = Job::default();
        job.metadata.version = header.version.clone();
        job.metadata.description = header.user_data.join("\n");
        job.parts_map = std::mem::take(&mut self.parts);
        job.marking_params_map = self.table.to_map();
        job
    }
}
