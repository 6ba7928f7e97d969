//! Command set and line parser
//!
//! Each line is a two-letter mnemonic followed by comma-separated numbers,
//! e.g. `LP200` or `JP10.5,0,0.03`. The arity of every mnemonic is fixed by
//! [`COMMAND_TABLE`].

use vectorkit_core::{MarkingMode, ParamChange};

use crate::error::{LaserError, Result};

/// Command mnemonics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// `LP` laser power, W
    LaserPower,
    /// `VG` mark speed, mm/s
    MarkSpeed,
    /// `VJ` jump speed, mm/s
    JumpSpeed,
    /// `DJ` jump delay, µs
    JumpDelay,
    /// `DM` mark delay, µs
    MarkDelay,
    /// `DP` polygon delay, µs
    PolygonDelay,
    /// `DN` laser-on delay, µs
    LaserOnDelay,
    /// `DF` laser-off delay, µs
    LaserOffDelay,
    /// `FS` focus shift, mm
    FocusShift,
    /// `SK` sky-writing mode 0–3
    SkyMode,
    /// `JP` jump to x,y,z
    Jump,
    /// `GO` mark to x,y,z
    Mark,
    /// `PE` point exposure at x,y,z for a duration in µs
    PointExposure,
    /// `WT` laser-off wait, µs
    Wait,
    /// `LY` start layer at z
    Layer,
}

/// Mnemonic, wire code and argument count of every command
pub const COMMAND_TABLE: [(Mnemonic, &str, usize); 15] = [
    (Mnemonic::LaserPower, "LP", 1),
    (Mnemonic::MarkSpeed, "VG", 1),
    (Mnemonic::JumpSpeed, "VJ", 1),
    (Mnemonic::JumpDelay, "DJ", 1),
    (Mnemonic::MarkDelay, "DM", 1),
    (Mnemonic::PolygonDelay, "DP", 1),
    (Mnemonic::LaserOnDelay, "DN", 1),
    (Mnemonic::LaserOffDelay, "DF", 1),
    (Mnemonic::FocusShift, "FS", 1),
    (Mnemonic::SkyMode, "SK", 1),
    (Mnemonic::Jump, "JP", 3),
    (Mnemonic::Mark, "GO", 3),
    (Mnemonic::PointExposure, "PE", 4),
    (Mnemonic::Wait, "WT", 1),
    (Mnemonic::Layer, "LY", 1),
];

impl Mnemonic {
    fn entry(self) -> (Mnemonic, &'static str, usize) {
        COMMAND_TABLE[self as usize]
    }

    /// Two-letter code
    pub fn code(self) -> &'static str {
        self.entry().1
    }

    /// Number of arguments
    pub fn arity(self) -> usize {
        self.entry().2
    }

    /// Look up a two-letter code
    pub fn from_code(code: &str) -> Option<Self> {
        COMMAND_TABLE
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(m, _, _)| *m)
    }
}

/// A decoded command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Any parameter setter
    Param(ParamChange),
    /// Travel with the laser off
    Jump([f32; 3]),
    /// Travel with the laser on
    Mark([f32; 3]),
    /// Stationary exposure
    PointExposure {
        /// Position
        at: [f32; 3],
        /// Dwell time in µs
        duration_us: f32,
    },
    /// Laser-off pause
    Wait {
        /// Pause in µs
        duration_us: u64,
    },
    /// Layer change
    Layer {
        /// Height in mm
        z: f32,
    },
}

impl Command {
    /// Whether this is a [`Command::Mark`]
    pub fn is_mark(&self) -> bool {
        matches!(self, Self::Mark(_))
    }

    /// Whether this is a [`Command::Jump`]
    pub fn is_jump(&self) -> bool {
        matches!(self, Self::Jump(_))
    }
}

/// Parse one line; blank lines and `#` comments yield `None`
pub fn parse_line(text: &str, line: usize) -> Result<Option<Command>> {
    let text = match text.find('#') {
        Some(at) => &text[..at],
        None => text,
    }
    .trim();
    if text.is_empty() {
        return Ok(None);
    }

    let split = text.char_indices().nth(2).map_or(text.len(), |(i, _)| i);
    let (code, rest) = text.split_at(split);
    let mnemonic =
        Mnemonic::from_code(&code.to_ascii_uppercase()).ok_or_else(|| LaserError::UnknownCommand {
            command: code.to_string(),
            line,
        })?;

    let rest = rest.trim();
    let args = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',')
            .map(|a| {
                let a = a.trim();
                a.parse::<f64>().map_err(|_| LaserError::InvalidNumber {
                    text: a.to_string(),
                    line,
                })
            })
            .collect::<Result<Vec<f64>>>()?
    };
    if args.len() != mnemonic.arity() {
        return Err(LaserError::ArityMismatch {
            command: mnemonic.code(),
            expected: mnemonic.arity(),
            found: args.len(),
            line,
        });
    }

    let v = |i: usize| args[i] as f32;
    let point = || [v(0), v(1), v(2)];
    let command = match mnemonic {
        Mnemonic::LaserPower => Command::Param(ParamChange::LaserPower(v(0))),
        Mnemonic::MarkSpeed => Command::Param(ParamChange::MarkSpeed(v(0))),
        Mnemonic::JumpSpeed => Command::Param(ParamChange::JumpSpeed(v(0))),
        Mnemonic::JumpDelay => Command::Param(ParamChange::JumpDelay(v(0))),
        Mnemonic::MarkDelay => Command::Param(ParamChange::MarkDelay(v(0))),
        Mnemonic::PolygonDelay => Command::Param(ParamChange::PolygonDelay(v(0))),
        Mnemonic::LaserOnDelay => Command::Param(ParamChange::LaserOnDelay(v(0))),
        Mnemonic::LaserOffDelay => Command::Param(ParamChange::LaserOffDelay(v(0))),
        Mnemonic::FocusShift => Command::Param(ParamChange::FocusShift(v(0))),
        Mnemonic::SkyMode => {
            let mode = (args[0].fract() == 0.0 && (0.0..=3.0).contains(&args[0]))
                .then(|| MarkingMode::from_code(args[0] as u8))
                .flatten()
                .ok_or(LaserError::InvalidValue {
                    command: mnemonic.code(),
                    value: args[0],
                    line,
                })?;
            Command::Param(ParamChange::MarkingMode(mode))
        }
        Mnemonic::Jump => Command::Jump(point()),
        Mnemonic::Mark => Command::Mark(point()),
        Mnemonic::PointExposure => Command::PointExposure {
            at: point(),
            duration_us: v(3),
        },
        Mnemonic::Wait => {
            if args[0].is_nan() || args[0] < 0.0 {
                return Err(LaserError::InvalidValue {
                    command: mnemonic.code(),
                    value: args[0],
                    line,
                });
            }
            Command::Wait {
                duration_us: args[0].round() as u64,
            }
        }
        Mnemonic::Layer => Command::Layer { z: v(0) },
    };
    Ok(Some(command))
}
