//! Section filename classification
//!
//! A section's filename names its part and says what kind of geometry it
//! holds. Three naming conventions are in use. They are tried in order and
//! the first whose pattern matches extracts the classification:
//!
//! * `bracket_C_V.cli`: part, role code, class code (uppercase)
//! * `bracket_core_t1_2v.cli`: part, style, tag, optional contour ring, type
//! * `bracket (support) (contour).cli`: part, role, optional fill
//!
//! Within a matched convention unknown codes fall back to core role and
//! volume hatch class, or contour class when a ring number is present.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use vectorkit_core::{BlockMetaData, PartArea, SkinType, StructureType};

use crate::error::{ContainerError, Result};

/// What a section contributes to its part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Role {
    /// Support structure
    Support,
    /// Part core
    #[default]
    Core,
    /// Inner hull
    InnerHull,
    /// Hull between core and inner hull
    InBetweenHull,
}

impl Role {
    /// Uppercase code of the first convention
    pub fn code(self) -> &'static str {
        match self {
            Self::Support => "S",
            Self::Core => "C",
            Self::InnerHull => "IH",
            Self::InBetweenHull => "IBH",
        }
    }

    fn from_code(code: &str) -> Self {
        match code {
            "S" => Self::Support,
            "IH" => Self::InnerHull,
            "IBH" => Self::InBetweenHull,
            _ => Self::Core,
        }
    }

    fn from_style(style: &str) -> Self {
        match style {
            "s" | "sup" => Self::Support,
            "ih" => Self::InnerHull,
            "ibh" => Self::InBetweenHull,
            _ => Self::Core,
        }
    }

    fn from_word(word: &str) -> Self {
        match word.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "support" | "supports" => Self::Support,
            "inner hull" | "innerhull" => Self::InnerHull,
            "in between hull" | "inbetween hull" => Self::InBetweenHull,
            _ => Self::Core,
        }
    }
}

/// Kind of vectors in a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VectorClass {
    /// Volume hatching
    #[default]
    VolumeHatch,
    /// Contour
    Contour,
    /// Down-skin hatching
    DownSkinHatch,
    /// Down-skin contour
    DownSkinContour,
    /// Transition contour
    TransitionContour,
    /// Single-vector support
    SingleVectorSupport,
    /// Combined up-skin
    UpSkin,
}

impl VectorClass {
    /// Uppercase code of the first convention
    pub fn code(self) -> &'static str {
        match self {
            Self::VolumeHatch => "V",
            Self::Contour => "C",
            Self::DownSkinHatch => "DH",
            Self::DownSkinContour => "DC",
            Self::TransitionContour => "TC",
            Self::SingleVectorSupport => "SV",
            Self::UpSkin => "US",
        }
    }

    fn from_code(code: &str) -> Self {
        match code {
            "C" => Self::Contour,
            "DH" => Self::DownSkinHatch,
            "DC" => Self::DownSkinContour,
            "TC" => Self::TransitionContour,
            "SV" => Self::SingleVectorSupport,
            "US" => Self::UpSkin,
            _ => Self::VolumeHatch,
        }
    }

    fn from_type(kind: &str, ring: bool) -> Self {
        match (kind, ring) {
            ("v", false) => Self::VolumeHatch,
            ("d", false) => Self::DownSkinHatch,
            ("d", true) => Self::DownSkinContour,
            ("u", _) => Self::UpSkin,
            ("t", _) => Self::TransitionContour,
            ("s", _) => Self::SingleVectorSupport,
            (_, true) => Self::Contour,
            (_, false) => Self::VolumeHatch,
        }
    }

    fn from_fill(fill: &str) -> Self {
        match fill.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "contour" | "contours" => Self::Contour,
            "downskin" | "downskinhatch" => Self::DownSkinHatch,
            "downskincontour" => Self::DownSkinContour,
            "transition" | "transitioncontour" => Self::TransitionContour,
            "upskin" => Self::UpSkin,
            "singlevector" | "singlevectorsupport" => Self::SingleVectorSupport,
            _ => Self::VolumeHatch,
        }
    }

    /// Area and skin classification of the class
    pub fn area_and_skin(self) -> (PartArea, SkinType) {
        match self {
            Self::VolumeHatch | Self::SingleVectorSupport => (PartArea::Volume, SkinType::InSkin),
            Self::Contour => (PartArea::Contour, SkinType::InSkin),
            Self::DownSkinHatch => (PartArea::Volume, SkinType::DownSkin),
            Self::DownSkinContour => (PartArea::Contour, SkinType::DownSkin),
            Self::TransitionContour => (PartArea::TransitionContour, SkinType::InSkin),
            Self::UpSkin => (PartArea::Volume, SkinType::UpSkin),
        }
    }

    /// Class that carries a block's area and skin
    pub fn from_meta(meta: &BlockMetaData) -> Self {
        match (meta.part_area, meta.skin_type) {
            (PartArea::Contour, SkinType::DownSkin) => Self::DownSkinContour,
            (PartArea::Contour, _) => Self::Contour,
            (PartArea::TransitionContour, _) => Self::TransitionContour,
            (PartArea::Volume, SkinType::DownSkin) => Self::DownSkinHatch,
            (PartArea::Volume, SkinType::UpSkin) => Self::UpSkin,
            (PartArea::Volume, SkinType::InSkin) => Self::VolumeHatch,
        }
    }
}

/// Classification of one section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Logical part name
    pub part_name: String,
    /// Role of the section
    pub role: Role,
    /// Vector class of the section
    pub class: VectorClass,
    /// Contour ring, when the filename gives one
    pub contour_index: Option<u32>,
}

impl Classification {
    /// Block metadata for blocks of this section belonging to `part_key`
    pub fn block_meta(&self, part_key: i32) -> BlockMetaData {
        let (part_area, skin_type) = self.class.area_and_skin();
        let support =
            self.role == Role::Support || self.class == VectorClass::SingleVectorSupport;
        BlockMetaData {
            part_key,
            contour_index: self.contour_index,
            skin_type,
            part_area,
            structure_type: if support {
                StructureType::Support
            } else {
                StructureType::Part
            },
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?}/{:?}",
            self.part_name, self.role, self.class
        )?;
        if let Some(ring) = self.contour_index {
            write!(f, " ring {ring}")?;
        }
        Ok(())
    }
}

type Extractor = fn(&Captures<'_>) -> Classification;

fn group<'a>(caps: &'a Captures<'_>, name: &str) -> &'a str {
    caps.name(name).map_or("", |m| m.as_str())
}

fn role_and_class(caps: &Captures<'_>) -> Classification {
    Classification {
        part_name: group(caps, "name").to_string(),
        role: Role::from_code(group(caps, "role")),
        class: VectorClass::from_code(group(caps, "class")),
        contour_index: None,
    }
}

fn style_and_type(caps: &Captures<'_>) -> Classification {
    let contour_index = caps.name("ring").and_then(|m| m.as_str().parse().ok());
    Classification {
        part_name: group(caps, "name").to_string(),
        role: Role::from_style(group(caps, "style")),
        class: VectorClass::from_type(group(caps, "kind"), contour_index.is_some()),
        contour_index,
    }
}

fn parenthesized(caps: &Captures<'_>) -> Classification {
    Classification {
        part_name: group(caps, "name").trim().to_string(),
        role: Role::from_word(group(caps, "role")),
        class: VectorClass::from_fill(group(caps, "fill")),
        contour_index: None,
    }
}

/// Naming conventions in the order they are tried, matched on the stem
fn conventions() -> &'static [(Regex, Extractor)] {
    static CONVENTIONS: OnceLock<Vec<(Regex, Extractor)>> = OnceLock::new();
    CONVENTIONS.get_or_init(|| {
        let patterns: [(&str, Extractor); 3] = [
            (
                r"^(?P<name>.+)_(?P<role>[A-Z]{1,3})_(?P<class>[A-Z]{1,3})$",
                role_and_class,
            ),
            (
                r"^(?P<name>.+)_(?P<style>[a-z]+)_(?P<tag>[^_]+)_(?P<ring>\d{1,3})?(?P<kind>[a-z])$",
                style_and_type,
            ),
            (
                r"^(?P<name>.+?) \((?P<role>[^)]*)\)(?: \((?P<fill>[^)]*)\))?$",
                parenthesized,
            ),
        ];
        patterns
            .into_iter()
            .map(|(pattern, extract)| (Regex::new(pattern).expect("invalid regex pattern"), extract))
            .collect()
    })
}

/// Classify a section by its filename
pub fn classify(filename: &str) -> Result<Classification> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    conventions()
        .iter()
        .find_map(|(pattern, extract)| pattern.captures(stem).map(|caps| extract(&caps)))
        .ok_or_else(|| ContainerError::Unclassified {
            filename: filename.to_string(),
        })
}
