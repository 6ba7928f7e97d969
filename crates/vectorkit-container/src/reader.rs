//! Reading a directory of sections into one job
//!
//! Every `<stem>.cli` is a section; its process parameters come from
//! `<stem>.txt` next to it. Sections are decoded one after another, sorted by
//! filename, through a single parameter table so that equal parameters of
//! different sections share a key.

use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use vectorkit_core::{Job, ParamTable, Part, WorkPlane, WorkPlaneDecoder};
use vectorkit_layer::{CliDecoder, DecodeOptions};

use crate::classifier::{classify, Classification};
use crate::error::{ContainerError, Result};
use crate::param_file::parse_param_file;

/// Extension of section geometry files
pub const GEOMETRY_EXTENSION: &str = "cli";
/// Extension of section parameter files
pub const PARAMS_EXTENSION: &str = "txt";

/// One geometry file with its parameter file and classification
#[derive(Debug, Clone)]
pub struct Section {
    /// Geometry file
    pub geometry: PathBuf,
    /// Parameter file
    pub params: PathBuf,
    /// Classification from the filename
    pub class: Classification,
}

/// Streams the work planes of all sections of a container directory
pub struct ContainerReader {
    name: String,
    options: DecodeOptions,
    sections: Vec<Section>,
    pending: VecDeque<usize>,
    current: Option<CliDecoder<BufReader<File>>>,
    table: ParamTable,
    part_keys: BTreeMap<String, i32>,
}

impl ContainerReader {
    /// Scan and classify a container directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(dir, DecodeOptions::default())
    }

    /// Scan a container directory with explicit section decoding options
    ///
    /// Fails on the first section whose filename cannot be classified or
    /// that has no parameter file, before any geometry is read.
    pub fn with_options(dir: impl AsRef<Path>, options: DecodeOptions) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ContainerError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut geometry: Vec<PathBuf> = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        geometry.retain(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(GEOMETRY_EXTENSION))
        });
        geometry.sort();

        let mut sections = Vec::with_capacity(geometry.len());
        for path in geometry {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let class = classify(&filename)?;
            let params = path.with_extension(PARAMS_EXTENSION);
            if !params.is_file() {
                return Err(ContainerError::MissingParamFile { path: params });
            }
            tracing::debug!(section = %filename, class = %class, "container section");
            sections.push(Section {
                geometry: path,
                params,
                class,
            });
        }

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            options,
            pending: (0..sections.len()).collect(),
            sections,
            current: None,
            table: ParamTable::new(),
            part_keys: BTreeMap::new(),
        })
    }

    /// Sections in decoding order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    fn part_key(&mut self, name: &str) -> i32 {
        let next = self.part_keys.len() as i32;
        *self.part_keys.entry(name.to_string()).or_insert(next)
    }

    fn open_section(&mut self, index: usize) -> Result<CliDecoder<BufReader<File>>> {
        let section = self.sections[index].clone();
        let seed = parse_param_file(&fs::read_to_string(&section.params)?)?;
        let part_key = self.part_key(&section.class.part_name);

        let mut table = std::mem::take(&mut self.table);
        table.replace_current(seed);

        let file = BufReader::new(File::open(&section.geometry)?);
        let decoder = CliDecoder::with_options(file, self.options)?
            .with_table(table)
            .with_block_meta(section.class.block_meta(part_key));
        Ok(decoder)
    }
}

impl WorkPlaneDecoder for ContainerReader {
    type Error = ContainerError;

    fn next_workplane(&mut self) -> Result<Option<WorkPlane>> {
        loop {
            if let Some(decoder) = self.current.as_mut() {
                if let Some(plane) = decoder.next_workplane()? {
                    return Ok(Some(plane));
                }
                if let Some(finished) = self.current.take() {
                    self.table = finished.into_table();
                }
            }
            let Some(index) = self.pending.pop_front() else {
                return Ok(None);
            };
            self.current = Some(self.open_section(index)?);
        }
    }

    fn take_shell(&mut self) -> Job {
        let mut job = Job::new(self.name.clone());
        job.parts_map = self
            .part_keys
            .iter()
            .map(|(name, key)| (*key, Part::new(name.clone())))
            .collect();
        job.marking_params_map = self.table.to_map();
        job
    }
}
