//! Primitives and deferred coordinate payloads

/// Element type of coordinates in a binary payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordEncoding {
    /// Unsigned 16-bit integers
    U16,
    /// 32-bit floats
    F32,
}

impl CoordEncoding {
    /// Size of one coordinate on the wire
    pub fn width(self) -> u64 {
        match self {
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Location of a coordinate payload that has not been read yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRef {
    /// Absolute byte offset of the first coordinate
    pub offset: u64,
    /// Number of coordinates
    pub count: usize,
    /// Coordinate element type
    pub encoding: CoordEncoding,
}

impl PayloadRef {
    /// Payload length in bytes
    pub fn byte_len(&self) -> u64 {
        self.count as u64 * self.encoding.width()
    }
}

/// Coordinates of a primitive, read or still on disk
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already parsed and scaled (ASCII documents)
    Inline(Vec<f32>),
    /// To be read by [`crate::CliReader::materialize`]
    Deferred(PayloadRef),
}

impl Payload {
    /// Number of coordinates
    pub fn len(&self) -> usize {
        match self {
            Self::Inline(coords) => coords.len(),
            Self::Deferred(r) => r.count,
        }
    }

    /// Whether the payload holds no coordinates
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Direction flag of a polyline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolylineDirection {
    /// Clockwise closed contour
    Clockwise,
    /// Counter-clockwise closed contour
    CounterClockwise,
    /// Open polyline
    #[default]
    Open,
}

impl PolylineDirection {
    /// Wire value
    pub fn code(self) -> u16 {
        match self {
            Self::Clockwise => 0,
            Self::CounterClockwise => 1,
            Self::Open => 2,
        }
    }

    /// Decode a wire value, treating unknown values as open
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Clockwise,
            1 => Self::CounterClockwise,
            _ => Self::Open,
        }
    }
}

/// One geometry command of a CLI document
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Start of a layer at `z` mm
    Layer {
        /// Height in mm, already scaled
        z: f32,
    },
    /// Polyline, x y pairs
    Polyline {
        /// Part identifier
        id: i32,
        /// Direction flag
        direction: PolylineDirection,
        /// Coordinates
        points: Payload,
    },
    /// Independent segments, x1 y1 x2 y2
    Hatches {
        /// Part identifier
        id: i32,
        /// Coordinates
        segments: Payload,
    },
}

impl Primitive {
    /// Coordinate payload, if the primitive has one
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Layer { .. } => None,
            Self::Polyline { points, .. } => Some(points),
            Self::Hatches { segments, .. } => Some(segments),
        }
    }
}
