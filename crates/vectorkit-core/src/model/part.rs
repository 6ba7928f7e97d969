//! Parts: the logical objects a job builds

use serde::{Deserialize, Serialize};

/// Geometry summary of a part
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartGeometry {
    /// Height of the part in the build direction
    pub build_height_in_mm: f32,
}

/// A logical part or section of the job
///
/// Referenced by key from every block that belongs to it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part name
    pub name: String,
    /// Material name, empty when unknown
    #[serde(default)]
    pub material: String,
    /// Geometry summary
    #[serde(default)]
    pub geometry: PartGeometry,
}

impl Part {
    /// Create a part with a name and no further information
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
