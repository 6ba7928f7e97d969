//! Writing a job as a directory of sections
//!
//! Blocks are split by part, role, vector class and params key. Each group
//! becomes one section named in the uppercase code convention, written as a
//! CLI document with its parameter file.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use vectorkit_core::{Job, JobWriter, StructureType, VectorBlock, WorkPlane};
use vectorkit_layer::{CliEncoding, CliWriter};

use crate::classifier::{Role, VectorClass};
use crate::error::{ContainerError, Result};
use crate::param_file::write_param_file;
use crate::reader::{GEOMETRY_EXTENSION, PARAMS_EXTENSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct SectionKey {
    part_key: Option<i32>,
    role: Role,
    class: VectorClass,
    params_key: i32,
}

impl SectionKey {
    fn of(block: &VectorBlock) -> Self {
        let (part_key, role, class) = match &block.meta {
            Some(meta) => (
                Some(meta.part_key),
                if meta.structure_type == StructureType::Support {
                    Role::Support
                } else {
                    Role::Core
                },
                VectorClass::from_meta(meta),
            ),
            None => (None, Role::Core, VectorClass::VolumeHatch),
        };
        Self {
            part_key,
            role,
            class,
            params_key: block.marking_params_key,
        }
    }
}

/// Writes a job into a container directory
///
/// Sections only receive the planes they have blocks on. Part names that
/// need more than one params key per role and class get a `-<n>` suffix on
/// the extra sections, so they come back as separate parts.
pub struct ContainerWriter {
    dir: PathBuf,
    encoding: CliEncoding,
    shell: Job,
    sections: BTreeMap<SectionKey, CliWriter<BufWriter<File>>>,
    stems: HashMap<String, usize>,
}

impl ContainerWriter {
    /// Write sections into `dir`, creating it when needed
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            encoding: CliEncoding::BinaryLong,
            shell: Job::default(),
            sections: BTreeMap::new(),
            stems: HashMap::new(),
        }
    }

    /// Encoding of the section geometry files
    pub fn with_encoding(mut self, encoding: CliEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn part_name(&self, key: Option<i32>) -> String {
        match key {
            Some(key) => self
                .shell
                .parts_map
                .get(&key)
                .map(|part| part.name.clone())
                .unwrap_or_else(|| format!("part_{key}")),
            None if self.shell.metadata.job_name.is_empty() => "part".to_string(),
            None => self.shell.metadata.job_name.clone(),
        }
    }

    fn stem(&mut self, key: &SectionKey) -> String {
        let name = self.part_name(key.part_key);
        let codes = format!("{}_{}", key.role.code(), key.class.code());
        let seen = self.stems.entry(format!("{name}_{codes}")).or_insert(0);
        *seen += 1;
        match *seen {
            1 => format!("{name}_{codes}"),
            n => format!("{name}-{n}_{codes}"),
        }
    }

    fn open_section(&mut self, key: SectionKey) -> Result<CliWriter<BufWriter<File>>> {
        let params = self
            .shell
            .marking_params_map
            .get(&key.params_key)
            .cloned()
            .ok_or(ContainerError::MissingParams {
                key: key.params_key,
            })?;
        let stem = self.stem(&key);
        tracing::debug!(section = %stem, "writing container section");

        let mut params_out = BufWriter::new(File::create(
            self.dir.join(format!("{stem}.{PARAMS_EXTENSION}")),
        )?);
        write_param_file(&params, &mut params_out)?;
        params_out.flush()?;

        let geometry = File::create(self.dir.join(format!("{stem}.{GEOMETRY_EXTENSION}")))?;
        let mut writer = CliWriter::new(BufWriter::new(geometry), self.encoding);
        writer.begin(&self.shell)?;
        Ok(writer)
    }
}

impl JobWriter for ContainerWriter {
    type Error = ContainerError;

    fn begin(&mut self, shell: &Job) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        self.shell = shell.shell();
        Ok(())
    }

    fn append_work_plane(&mut self, plane: &WorkPlane) -> Result<()> {
        let mut groups: BTreeMap<SectionKey, WorkPlane> = BTreeMap::new();
        for block in &plane.vector_blocks {
            groups
                .entry(SectionKey::of(block))
                .or_insert_with(|| WorkPlane::new(plane.z_pos_in_mm))
                .push_block(block.clone());
        }

        for (key, group) in groups {
            if !self.sections.contains_key(&key) {
                let writer = self.open_section(key)?;
                self.sections.insert(key, writer);
            }
            if let Some(writer) = self.sections.get_mut(&key) {
                writer.append_work_plane(&group)?;
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for writer in self.sections.values_mut() {
            writer.close()?;
        }
        Ok(())
    }
}
