//! Tagged G-code commands
//!
//! Mode words (`G20`, `G21`, `G90`, `G91`) on a line take effect first, in
//! the order written. The first other `G`, `M` or `T` word then selects the
//! command. Known codes map to a variant; everything else becomes
//! [`GcodeCommand::Misc`] and is passed over by the decoder. Lines without a
//! command word continue the modal motion.

use std::fmt;

use crate::error::{GcodeError, Result};
use crate::lexer::Word;

/// Motion modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// `G0`
    Rapid,
    /// `G1`
    Linear,
    /// `G2`
    ArcClockwise,
    /// `G3`
    ArcCounterClockwise,
}

impl Motion {
    /// G number
    pub fn code(self) -> u8 {
        match self {
            Self::Rapid => 0,
            Self::Linear => 1,
            Self::ArcClockwise => 2,
            Self::ArcCounterClockwise => 3,
        }
    }
}

/// Optional X Y Z words
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    /// X word
    pub x: Option<f64>,
    /// Y word
    pub y: Option<f64>,
    /// Z word
    pub z: Option<f64>,
}

impl Axes {
    /// Whether no axis word is present
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// A decoded G-code line
#[derive(Debug, Clone, PartialEq)]
pub enum GcodeCommand {
    /// `G0`–`G3`, or axis words under the modal motion
    Move {
        /// Motion mode, `None` for a modal continuation
        motion: Option<Motion>,
        /// Target
        axes: Axes,
        /// Arc center offset I
        i: Option<f64>,
        /// Arc center offset J
        j: Option<f64>,
        /// Feed rate, units per minute
        feed: Option<f64>,
        /// Laser power
        power: Option<f64>,
    },
    /// `G4`, dwell in milliseconds
    Dwell {
        /// Duration in ms
        millis: f64,
    },
    /// `G20` (true) or `G21` (false)
    Inches(bool),
    /// `G90` (true) or `G91` (false)
    Absolute(bool),
    /// `G92`
    SetPosition(Axes),
    /// Any other command, kept opaque
    Misc {
        /// Command letter
        letter: char,
        /// Command number
        code: f64,
    },
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.code())
    }
}

fn find(words: &[Word], letter: char) -> Option<f64> {
    words.iter().find(|w| w.letter == letter).map(|w| w.value)
}

fn axes(words: &[Word]) -> Axes {
    Axes {
        x: find(words, 'X'),
        y: find(words, 'Y'),
        z: find(words, 'Z'),
    }
}

fn motion_command(motion: Option<Motion>, words: &[Word]) -> GcodeCommand {
    GcodeCommand::Move {
        motion,
        axes: axes(words),
        i: find(words, 'I'),
        j: find(words, 'J'),
        feed: find(words, 'F'),
        power: find(words, 'S'),
    }
}

fn mode(word: &Word) -> Option<GcodeCommand> {
    if word.letter != 'G' {
        return None;
    }
    match word.value {
        c if c == 20.0 => Some(GcodeCommand::Inches(true)),
        c if c == 21.0 => Some(GcodeCommand::Inches(false)),
        c if c == 90.0 => Some(GcodeCommand::Absolute(true)),
        c if c == 91.0 => Some(GcodeCommand::Absolute(false)),
        _ => None,
    }
}

/// Build the commands of one tokenized line, in execution order
///
/// An empty line yields no command.
pub fn parse_words(words: &[Word], line: usize) -> Result<Vec<GcodeCommand>> {
    let mut commands: Vec<GcodeCommand> = words.iter().filter_map(mode).collect();

    let head = words
        .iter()
        .find(|w| matches!(w.letter, 'G' | 'M' | 'T') && mode(w).is_none());
    let Some(head) = head else {
        if words.iter().any(|w| !matches!(w.letter, 'G' | 'M' | 'T')) {
            commands.push(motion_command(None, words));
        }
        return Ok(commands);
    };

    let code = head.value;
    let command = match (head.letter, code) {
        ('G', c) if c == 0.0 => motion_command(Some(Motion::Rapid), words),
        ('G', c) if c == 1.0 => motion_command(Some(Motion::Linear), words),
        ('G', c) if c == 2.0 => motion_command(Some(Motion::ArcClockwise), words),
        ('G', c) if c == 3.0 => motion_command(Some(Motion::ArcCounterClockwise), words),
        ('G', c) if c == 4.0 => {
            let millis = match (find(words, 'P'), find(words, 'S')) {
                (Some(p), _) => p,
                (None, Some(s)) => s * 1000.0,
                (None, None) => {
                    return Err(GcodeError::MissingParameter {
                        command: "G4",
                        letter: 'P',
                        line,
                    })
                }
            };
            GcodeCommand::Dwell { millis }
        }
        ('G', c) if c == 92.0 => GcodeCommand::SetPosition(axes(words)),
        (letter, code) => GcodeCommand::Misc { letter, code },
    };
    commands.push(command);
    Ok(commands)
}
