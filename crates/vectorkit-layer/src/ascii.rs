//! ASCII geometry lines
//!
//! `$$LAYER/z`, `$$POLYLINE/id,dir,n,x1,y1,…` and `$$HATCHES/id,n,x1,y1,x2,y2,…`.

use std::str::FromStr;

use crate::error::{LayerError, Result};
use crate::primitive::{Payload, PolylineDirection, Primitive};

pub(crate) const LAYER: &str = "$$LAYER";
pub(crate) const POLYLINE: &str = "$$POLYLINE";
pub(crate) const HATCHES: &str = "$$HATCHES";
pub(crate) const GEOMETRY_START: &str = "$$GEOMETRYSTART";
pub(crate) const GEOMETRY_END: &str = "$$GEOMETRYEND";

struct Fields<'a> {
    keyword: &'static str,
    line: usize,
    items: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    fn new(keyword: &'static str, args: &'a str, line: usize) -> Self {
        Self {
            keyword,
            line,
            items: args.split(','),
        }
    }

    fn next<T: FromStr>(&mut self, field: &'static str) -> Result<T> {
        let text = self
            .items
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LayerError::MissingField {
                keyword: self.keyword,
                field,
                line: self.line,
            })?;
        text.parse().map_err(|_| LayerError::InvalidNumber {
            text: text.to_string(),
            line: self.line,
        })
    }

    /// Parse the remaining fields as coordinates scaled by `units`
    fn coords(self, expected: usize, units: f64) -> Result<Vec<f32>> {
        let line = self.line;
        let coords = self
            .items
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>()
                    .map(|v| (v * units) as f32)
                    .map_err(|_| LayerError::InvalidNumber {
                        text: t.to_string(),
                        line,
                    })
            })
            .collect::<Result<Vec<f32>>>()?;
        if coords.len() != expected {
            return Err(LayerError::CoordinateCount {
                keyword: self.keyword,
                line,
                expected,
                found: coords.len(),
            });
        }
        Ok(coords)
    }
}

/// Parse one geometry line
pub(crate) fn parse_line(text: &str, line: usize, units: f64) -> Result<Primitive> {
    let (keyword, args) = text.split_once('/').unwrap_or((text, ""));
    match keyword.trim() {
        LAYER => {
            let mut fields = Fields::new(LAYER, args, line);
            let z: f64 = fields.next("z")?;
            Ok(Primitive::Layer {
                z: (z * units) as f32,
            })
        }
        POLYLINE => {
            let mut fields = Fields::new(POLYLINE, args, line);
            let id = fields.next("id")?;
            let direction = PolylineDirection::from_code(fields.next("dir")?);
            let n: usize = fields.next("n")?;
            let coords = fields.coords(n.saturating_mul(2), units)?;
            Ok(Primitive::Polyline {
                id,
                direction,
                points: Payload::Inline(coords),
            })
        }
        HATCHES => {
            let mut fields = Fields::new(HATCHES, args, line);
            let id = fields.next("id")?;
            let n: usize = fields.next("n")?;
            let coords = fields.coords(n.saturating_mul(4), units)?;
            Ok(Primitive::Hatches {
                id,
                segments: Payload::Inline(coords),
            })
        }
        other => Err(LayerError::UnknownKeyword {
            keyword: other.to_string(),
            line,
        }),
    }
}
