//! CLI header section
//!
//! The header is always text, one `$$KEY/value` line each, framed by
//! `$$HEADERSTART` and `$$HEADEREND`. In binary documents geometry starts
//! right after the end sentinel, so the header is scanned byte by byte and
//! the sentinel is recognized even without a trailing newline.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use crate::error::{LayerError, Result};

const HEADER_START: &str = "$$HEADERSTART";
const HEADER_END: &str = "$$HEADEREND";

/// Encoding of the geometry section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// `$$GEOMETRYSTART` … `$$GEOMETRYEND` text lines
    #[default]
    Ascii,
    /// Op-code stream
    Binary,
}

/// Parsed header fields
#[derive(Debug, Clone, PartialEq)]
pub struct CliHeader {
    /// Geometry encoding
    pub encoding: FileEncoding,
    /// Millimetres per coordinate unit
    pub units: f64,
    /// Format version as written
    pub version: String,
    /// Creation date as written
    pub date: String,
    /// Bounding box x1 y1 z1 x2 y2 z2
    pub dimension: Option<[f32; 6]>,
    /// Declared layer count
    pub layers: Option<u32>,
    /// Part names by primitive id
    pub labels: BTreeMap<i32, String>,
    /// `$$USERDATA` lines and unrecognized keys, verbatim
    pub user_data: Vec<String>,
}

impl Default for CliHeader {
    fn default() -> Self {
        Self {
            encoding: FileEncoding::Ascii,
            units: 1.0,
            version: String::new(),
            date: String::new(),
            dimension: None,
            layers: None,
            labels: BTreeMap::new(),
            user_data: Vec::new(),
        }
    }
}

/// Result of scanning the header off a stream
#[derive(Debug)]
pub(crate) struct HeaderScan {
    pub header: CliHeader,
    /// Bytes consumed up to and including the end sentinel
    pub consumed: u64,
    /// Lines seen
    pub lines: usize,
}

impl CliHeader {
    /// Apply one `$$KEY/value` line, `None` if it is malformed
    fn apply_line(&mut self, text: &str) -> Option<()> {
        let body = text.strip_prefix("$$")?;
        let (key, value) = match body.split_once('/') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (body.trim(), None),
        };

        match (key.to_ascii_uppercase().as_str(), value) {
            ("ASCII", _) => self.encoding = FileEncoding::Ascii,
            ("BINARY", _) => self.encoding = FileEncoding::Binary,
            ("UNITS", Some(v)) => {
                let units: f64 = v.parse().ok()?;
                if units.is_nan() || units <= 0.0 {
                    return None;
                }
                self.units = units;
            }
            ("VERSION", Some(v)) => self.version = v.to_string(),
            ("DATE", Some(v)) => self.date = v.to_string(),
            ("DIMENSION", Some(v)) => {
                let values: Vec<f32> = v
                    .split(',')
                    .map(|f| f.trim().parse().ok())
                    .collect::<Option<_>>()?;
                self.dimension = Some(values.try_into().ok()?);
            }
            ("LAYERS", Some(v)) => self.layers = Some(v.parse().ok()?),
            ("LABEL", Some(v)) => {
                let (id, label) = v.split_once(',')?;
                self.labels
                    .insert(id.trim().parse().ok()?, label.trim().to_string());
            }
            ("USERDATA", Some(v)) => self.user_data.push(v.to_string()),
            (other, _) => {
                tracing::trace!(key = other, "unrecognized CLI header key kept as user data");
                self.user_data.push(text.to_string());
            }
        }
        Some(())
    }

    /// Read the header from the start of `reader`
    pub(crate) fn scan<R: BufRead>(reader: &mut R) -> Result<HeaderScan> {
        let mut header = CliHeader::default();
        let mut consumed = 0u64;
        let mut lines = 0usize;
        let mut started = false;
        let mut line: Vec<u8> = Vec::with_capacity(64);
        let mut byte = [0u8; 1];

        loop {
            if reader.read(&mut byte)? == 0 {
                return Err(LayerError::MissingHeaderEnd);
            }
            consumed += 1;
            if byte[0] != b'\n' {
                line.push(byte[0]);
                if !line.ends_with(HEADER_END.as_bytes()) {
                    continue;
                }
            }
            lines += 1;

            let text = String::from_utf8_lossy(&line).trim().to_string();
            line.clear();
            if text.is_empty() || text.starts_with("//") {
                continue;
            }
            if !started {
                if text == HEADER_START {
                    started = true;
                    continue;
                }
                return Err(LayerError::MalformedHeader { line: lines, text });
            }
            if text == HEADER_END {
                break;
            }
            if header.apply_line(&text).is_none() {
                return Err(LayerError::MalformedHeader { line: lines, text });
            }
        }

        tracing::debug!(
            encoding = ?header.encoding,
            units = header.units,
            layers = ?header.layers,
            "parsed CLI header"
        );
        Ok(HeaderScan {
            header,
            consumed,
            lines,
        })
    }

    /// Write the header, ending with the sentinel
    ///
    /// ASCII documents get a newline after the sentinel; binary documents
    /// continue with the first op-code directly.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{HEADER_START}")?;
        match self.encoding {
            FileEncoding::Ascii => writeln!(out, "$$ASCII")?,
            FileEncoding::Binary => writeln!(out, "$$BINARY")?,
        }
        writeln!(out, "$$UNITS/{}", self.units)?;
        if !self.version.is_empty() {
            writeln!(out, "$$VERSION/{}", self.version)?;
        }
        if !self.date.is_empty() {
            writeln!(out, "$$DATE/{}", self.date)?;
        }
        if let Some(d) = self.dimension {
            writeln!(
                out,
                "$$DIMENSION/{},{},{},{},{},{}",
                d[0], d[1], d[2], d[3], d[4], d[5]
            )?;
        }
        if let Some(layers) = self.layers {
            writeln!(out, "$$LAYERS/{layers}")?;
        }
        for (id, label) in &self.labels {
            writeln!(out, "$$LABEL/{id},{label}")?;
        }
        for data in &self.user_data {
            if data.starts_with("$$") {
                writeln!(out, "{data}")?;
            } else {
                writeln!(out, "$$USERDATA/{data}")?;
            }
        }
        write!(out, "{HEADER_END}")?;
        if self.encoding == FileEncoding::Ascii {
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scan_ascii_header() {
        let text = "$$HEADERSTART\n$$ASCII\n$$UNITS/0.005\n$$VERSION/200\n$$LAYERS/3\n\
                    $$LABEL/1,bracket\n$$DIMENSION/0,0,0,10,10,1.5\n$$HEADEREND\n";
        let scan = CliHeader::scan(&mut Cursor::new(text)).unwrap();
        let header = scan.header;
        assert_eq!(header.encoding, FileEncoding::Ascii);
        assert_eq!(header.units, 0.005);
        assert_eq!(header.version, "200");
        assert_eq!(header.layers, Some(3));
        assert_eq!(header.labels[&1], "bracket");
        assert_eq!(header.dimension.unwrap()[5], 1.5);
    }

    #[test]
    fn test_scan_stops_at_binary_sentinel() {
        let mut bytes = b"$$HEADERSTART\n$$BINARY\n$$HEADEREND".to_vec();
        bytes.extend_from_slice(&[0x7f, 0x00]);
        let mut cursor = Cursor::new(bytes);
        let scan = CliHeader::scan(&mut cursor).unwrap();
        assert_eq!(scan.header.encoding, FileEncoding::Binary);
        assert_eq!(scan.consumed, 34);
        assert_eq!(cursor.position(), 34);
    }

    #[test]
    fn test_missing_start_is_malformed() {
        let err = CliHeader::scan(&mut Cursor::new("$$UNITS/1\n")).unwrap_err();
        assert!(matches!(err, LayerError::MalformedHeader { line: 1, .. }));
    }

    #[test]
    fn test_missing_end() {
        let err = CliHeader::scan(&mut Cursor::new("$$HEADERSTART\n$$ASCII\n")).unwrap_err();
        assert!(matches!(err, LayerError::MissingHeaderEnd));
    }

    #[test]
    fn test_bad_units_is_malformed() {
        let text = "$$HEADERSTART\n$$UNITS/zero\n$$HEADEREND\n";
        let err = CliHeader::scan(&mut Cursor::new(text)).unwrap_err();
        assert!(matches!(err, LayerError::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_unknown_keys_kept() {
        let text = "$$HEADERSTART\n$$USERDATA/abc\n$$VENDOR/x\n$$HEADEREND\n";
        let header = CliHeader::scan(&mut Cursor::new(text)).unwrap().header;
        assert_eq!(header.user_data, vec!["abc".to_string(), "$$VENDOR/x".to_string()]);
    }

    #[test]
    fn test_write_then_scan() {
        let mut header = CliHeader {
            units: 0.01,
            layers: Some(2),
            ..CliHeader::default()
        };
        header.labels.insert(4, "lattice".to_string());
        let mut out = Vec::new();
        header.write(&mut out).unwrap();
        let back = CliHeader::scan(&mut Cursor::new(out)).unwrap().header;
        assert_eq!(back, header);
    }
}
