//! Line tokenizer
//!
//! Strips `( … )` and `; …` comments and splits what remains into
//! `letter number` words. Line numbers (`N`) are dropped.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{GcodeError, Result};

/// One `letter number` pair, letter upper-cased
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Word {
    /// Address letter
    pub letter: char,
    /// Value
    pub value: f64,
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"\([^)]*\)|;.*").expect("invalid regex pattern"))
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

/// Split a line into words
pub fn tokenize(text: &str, line: usize) -> Result<Vec<Word>> {
    let cleaned = comment_regex().replace_all(text, " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "%" {
        return Ok(Vec::new());
    }

    let mut words = Vec::new();
    let mut last = 0;
    for caps in word_regex().captures_iter(cleaned) {
        let (Some(whole), Some(letter), Some(number)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let gap = cleaned[last..whole.start()].trim();
        if !gap.is_empty() {
            return Err(GcodeError::InvalidWord {
                text: gap.to_string(),
                line,
            });
        }
        last = whole.end();

        let letter = letter.as_str().chars().next().unwrap_or('?').to_ascii_uppercase();
        if letter == 'N' {
            continue;
        }
        let value = number
            .as_str()
            .parse::<f64>()
            .map_err(|_| GcodeError::InvalidWord {
                text: whole.as_str().to_string(),
                line,
            })?;
        words.push(Word { letter, value });
    }

    let rest = cleaned[last..].trim();
    if !rest.is_empty() {
        return Err(GcodeError::InvalidWord {
            text: rest.to_string(),
            line,
        });
    }
    Ok(words)
}
