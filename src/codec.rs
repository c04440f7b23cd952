use std::io;

use serde::{Deserialize, Serialize};

use crate::types::JobRecord;
use crate::utils::{Error, Result};

/// One numeric token from an input stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub fn as_i64(self) -> i64 {
        match self {
            Num::Int(v) => v,
            Num::Float(v) => v as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }
}

/// Extract all numbers from a JSON-ish stream, in order, ignoring every
/// structural token. YAML-style `#` comments run to end of line. Both the
/// task-system reader and the checkpoint loader accept this relaxed format:
/// only the order of numbers matters.
pub fn scan_numbers(mut reader: impl io::Read) -> Result<Vec<Num>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut numbers = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '#' => {
                while let Some(&(_, c)) = chars.peek() {
                    chars.next();
                    if c == '\n' {
                        break;
                    }
                }
            }
            '-' | '0'..='9' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if matches!(c, '0'..='9' | '.' | 'e' | 'E' | '+' | '-') {
                        chars.next();
                        end = i + c.len_utf8();
                    } else {
                        break;
                    }
                }
                let token = &text[start..end];
                let num = if let Ok(v) = token.parse::<i64>() {
                    Num::Int(v)
                } else {
                    token
                        .parse::<f64>()
                        .map(Num::Float)
                        .map_err(|_| Error::MalformedInput(format!("bad number `{}`", token)))?
                };
                numbers.push(num);
            }
            _ => {}
        }
    }
    Ok(numbers)
}

/// Serialized simulator state: the clock plus every live job as a
/// `[task_id, arrival, overrun_deadline, absolute_deadline, computation]`
/// tuple, in queue priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub now: i64,
    pub jobs: Vec<JobRecord>,
}

impl Checkpoint {
    pub fn write(&self, mut writer: impl io::Write) -> Result<()> {
        serde_json::to_writer(&mut writer, self)?;
        Ok(())
    }
}
