//! The job: root aggregate of the canonical model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{MarkingParams, Part, WorkPlane};
use crate::error::{ModelError, Result};
use crate::param_table::ParamTable;

/// Planes closer than this are the same layer
pub const Z_MERGE_TOLERANCE_MM: f32 = 1e-5;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner, x y z
    pub min: [f32; 3],
    /// Maximum corner, x y z
    pub max: [f32; 3],
}

impl Bounds {
    /// Degenerate box around one point
    pub fn at(point: [f32; 3]) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Grow the box to contain `point`
    pub fn include(&mut self, point: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    /// Grow the box to contain `other`
    pub fn union(&mut self, other: &Bounds) {
        self.include(other.min);
        self.include(other.max);
    }
}

/// Descriptive information about a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetaData {
    /// Job name
    pub job_name: String,
    /// Author, empty when unknown
    #[serde(default)]
    pub author: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Creation time
    pub creation_time: DateTime<Utc>,
    /// Source format version, empty when unknown
    #[serde(default)]
    pub version: String,
}

impl Default for JobMetaData {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            author: String::new(),
            description: String::new(),
            creation_time: Utc::now(),
            version: String::new(),
        }
    }
}

/// Root aggregate: metadata, parts, marking params and ordered work planes
///
/// Blocks reference parts and params by integer key, so the maps can be
/// rewritten with [`Job::remap_keys`] without touching geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    /// Descriptive metadata
    pub metadata: JobMetaData,
    /// Parts by key
    pub parts_map: BTreeMap<i32, Part>,
    /// Marking params by key, filled by [`ParamTable`]
    pub marking_params_map: BTreeMap<i32, MarkingParams>,
    /// Work planes sorted by increasing Z
    pub work_planes: Vec<WorkPlane>,
    /// Always equal to `work_planes.len()`
    pub num_work_planes: u32,
}

impl Job {
    /// Create an empty job with a name
    pub fn new(job_name: impl Into<String>) -> Self {
        Self {
            metadata: JobMetaData {
                job_name: job_name.into(),
                ..JobMetaData::default()
            },
            ..Self::default()
        }
    }

    /// Copy of this job without work planes
    ///
    /// Writers receive the shell before the planes are streamed to them.
    pub fn shell(&self) -> Job {
        Job {
            metadata: self.metadata.clone(),
            parts_map: self.parts_map.clone(),
            marking_params_map: self.marking_params_map.clone(),
            work_planes: Vec::new(),
            num_work_planes: self.num_work_planes,
        }
    }

    /// Replace the work planes, restoring ordering and counters
    ///
    /// Planes are sorted by Z (stable, so blocks keep their arrival order)
    /// and planes at the same height are merged into one.
    pub fn set_work_planes(&mut self, planes: Vec<WorkPlane>) {
        self.work_planes = assemble_work_planes(planes);
        self.num_work_planes = self.work_planes.len() as u32;
    }

    /// Iterate every block of every plane
    pub fn blocks(&self) -> impl Iterator<Item = &super::VectorBlock> {
        self.work_planes
            .iter()
            .flat_map(|plane| plane.vector_blocks.iter())
    }

    /// Bounding box over all planes
    pub fn bounds(&self) -> Option<super::Bounds> {
        self.work_planes
            .iter()
            .filter_map(WorkPlane::bounds)
            .reduce(|mut acc, b| {
                acc.union(&b);
                acc
            })
    }

    /// Smallest positive distance between consecutive planes
    ///
    /// A job with a single plane reports that plane's height.
    pub fn layer_thickness(&self) -> Option<f32> {
        match self.work_planes.as_slice() {
            [] => None,
            [only] => Some(only.z_pos_in_mm),
            planes => planes
                .windows(2)
                .map(|pair| pair[1].z_pos_in_mm - pair[0].z_pos_in_mm)
                .filter(|delta| *delta > 0.0)
                .reduce(f32::min),
        }
    }

    /// Set each part's build height from the planes its blocks occupy
    ///
    /// Height is the Z span of the part plus one layer thickness, taken from
    /// the spacing of the part's own planes. A part on a single plane uses
    /// the job's thickness. Parts without blocks keep their stored height.
    pub fn update_part_heights(&mut self) {
        let Some(job_thickness) = self.layer_thickness() else {
            return;
        };
        let mut heights: BTreeMap<i32, Vec<f32>> = BTreeMap::new();
        for plane in &self.work_planes {
            for key in plane.vector_blocks.iter().filter_map(|b| b.part_key()) {
                let zs = heights.entry(key).or_default();
                if zs.last() != Some(&plane.z_pos_in_mm) {
                    zs.push(plane.z_pos_in_mm);
                }
            }
        }
        for (key, zs) in heights {
            let (Some(low), Some(high)) = (zs.first(), zs.last()) else {
                continue;
            };
            let thickness = zs
                .windows(2)
                .map(|pair| pair[1] - pair[0])
                .reduce(f32::min)
                .unwrap_or(job_thickness);
            if let Some(part) = self.parts_map.get_mut(&key) {
                part.geometry.build_height_in_mm = high - low + thickness;
            }
        }
    }

    /// Check every model invariant
    pub fn validate(&self) -> std::result::Result<(), ModelError> {
        if self.num_work_planes as usize != self.work_planes.len() {
            return Err(ModelError::CountMismatch {
                field: "num_work_planes",
                stored: self.num_work_planes,
                actual: self.work_planes.len(),
            });
        }

        let mut previous: Option<f32> = None;
        for (index, plane) in self.work_planes.iter().enumerate() {
            if let Some(prev) = previous {
                if plane.z_pos_in_mm <= prev {
                    return Err(ModelError::UnorderedWorkPlanes {
                        index,
                        z: plane.z_pos_in_mm,
                        previous: prev,
                    });
                }
            }
            previous = Some(plane.z_pos_in_mm);

            if plane.num_blocks as usize != plane.vector_blocks.len() {
                return Err(ModelError::CountMismatch {
                    field: "num_blocks",
                    stored: plane.num_blocks,
                    actual: plane.vector_blocks.len(),
                });
            }

            for (block_index, block) in plane.vector_blocks.iter().enumerate() {
                if block.data.is_empty() {
                    return Err(ModelError::EmptyBlock {
                        work_plane: index,
                        block: block_index,
                    });
                }
                block.data.check_arity()?;
                if !self
                    .marking_params_map
                    .contains_key(&block.marking_params_key)
                {
                    return Err(ModelError::UnknownParamsKey {
                        key: block.marking_params_key,
                    });
                }
                if let Some(part_key) = block.part_key() {
                    if !self.parts_map.contains_key(&part_key) {
                        return Err(ModelError::UnknownPartKey { key: part_key });
                    }
                }
            }
        }
        Ok(())
    }

    /// Rewrite block keys and map keys through remap tables
    ///
    /// Keys missing from a table are left unchanged.
    pub fn remap_keys(&mut self, params: &HashMap<i32, i32>, parts: &HashMap<i32, i32>) {
        let remap = |table: &HashMap<i32, i32>, key: i32| table.get(&key).copied().unwrap_or(key);

        self.marking_params_map = std::mem::take(&mut self.marking_params_map)
            .into_iter()
            .map(|(k, v)| (remap(params, k), v))
            .collect();
        self.parts_map = std::mem::take(&mut self.parts_map)
            .into_iter()
            .map(|(k, v)| (remap(parts, k), v))
            .collect();

        for plane in &mut self.work_planes {
            for block in &mut plane.vector_blocks {
                block.marking_params_key = remap(params, block.marking_params_key);
                if let Some(meta) = block.meta.as_mut() {
                    meta.part_key = remap(parts, meta.part_key);
                }
            }
        }
    }

    /// Merge `other` into this job
    ///
    /// Marking params of `other` are deduplicated against this job's params,
    /// its part keys are shifted past this job's highest key, and the planes
    /// of both jobs are re-assembled by Z.
    pub fn append(&mut self, mut other: Job) -> Result<()> {
        let mut table = ParamTable::from_map(std::mem::take(&mut self.marking_params_map));
        let params_remap = table.absorb(std::mem::take(&mut other.marking_params_map));
        self.marking_params_map = table.into_map();

        let part_offset = self.parts_map.keys().next_back().map_or(0, |k| k + 1);
        let parts_remap: HashMap<i32, i32> = other
            .parts_map
            .keys()
            .map(|k| (*k, k + part_offset))
            .collect();
        let other_parts = std::mem::take(&mut other.parts_map);
        other.remap_keys(&params_remap, &parts_remap);
        for (key, part) in other_parts {
            self.parts_map.insert(key + part_offset, part);
        }

        let mut planes = std::mem::take(&mut self.work_planes);
        planes.extend(other.work_planes);
        self.set_work_planes(planes);

        tracing::debug!(
            planes = self.num_work_planes,
            params = self.marking_params_map.len(),
            parts = self.parts_map.len(),
            "merged job"
        );
        Ok(())
    }

    /// Serialize the job as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a job from JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Sort planes by Z, merge equal heights and renumber
pub fn assemble_work_planes(mut planes: Vec<WorkPlane>) -> Vec<WorkPlane> {
    planes.sort_by(|a, b| a.z_pos_in_mm.total_cmp(&b.z_pos_in_mm));

    let mut assembled: Vec<WorkPlane> = Vec::with_capacity(planes.len());
    for plane in planes {
        match assembled.last_mut() {
            Some(last) if (plane.z_pos_in_mm - last.z_pos_in_mm).abs() <= Z_MERGE_TOLERANCE_MM => {
                last.absorb(plane)
            }
            _ => assembled.push(plane),
        }
    }

    for (number, plane) in assembled.iter_mut().enumerate() {
        plane.work_plane_number = number as u32;
        plane.num_blocks = plane.vector_blocks.len() as u32;
    }
    assembled
}
