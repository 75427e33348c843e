// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command words and the commands recognized by the dispatcher.
//!
//! A line is a set of words, each a letter followed by a number:
//!
//! ```text
//! G91 I2.5 V30 K-1 X10
//! ```
//!
//! `G` selects the command. `I`..`M` carry axis positions in mm, `V`..`Z` the paired speeds in
//! mm/min.

use crate::motors::{AxisRole, AXIS_COUNT};

/// Numeric values of one line, indexed by letter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Words {
    values: [Option<f64>; 26],
}

impl Words {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `letter`. Lowercase letters are folded; non-letters are ignored.
    /// A repeated letter overwrites the earlier value.
    pub fn set(&mut self, letter: char, value: f64) {
        if let Some(i) = letter_index(letter) {
            self.values[i] = Some(value);
        }
    }

    pub fn get(&self, letter: char) -> Option<f64> {
        letter_index(letter).and_then(|i| self.values[i])
    }

    pub fn has(&self, letter: char) -> bool {
        self.get(letter).is_some()
    }
}

fn letter_index(letter: char) -> Option<usize> {
    let upper = letter.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| (upper as u8 - b'A') as usize)
}

/// Displacement request for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMove {
    pub amount_mm: f64,
    pub speed_mm_per_min: f64,
}

/// Commands understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// G90 (absolute) / G91 (incremental). Axes without both a position and a speed word are
    /// `None`.
    Move {
        incremental: bool,
        axes: [Option<AxisMove>; AXIS_COUNT],
    },
    /// G52: redefine the current position of each listed axis.
    SetOrigin([Option<f64>; AXIS_COUNT]),
    /// G17 (`true`) / G18 (`false`): driver enable.
    Power(bool),
    /// G21: firmware and storage status.
    Info,
    /// G28: homing. Accepted, not implemented.
    Home,
    /// Any other G number.
    Unknown(i32),
}

impl Command {
    /// Build a command from a parsed line. Returns `None` if the line has no `G` word.
    pub fn from_words(words: &Words) -> Option<Self> {
        // Fractional G numbers truncate toward zero.
        let code = words.get('G')? as i32;
        let command = match code {
            90 | 91 => Command::Move {
                incremental: code == 91,
                axes: AxisRole::ALL.map(|role| {
                    let amount_mm = words.get(role.position_letter())?;
                    let speed_mm_per_min = words.get(role.speed_letter())?;
                    Some(AxisMove {
                        amount_mm,
                        speed_mm_per_min,
                    })
                }),
            },
            52 => Command::SetOrigin(AxisRole::ALL.map(|role| words.get(role.position_letter()))),
            17 => Command::Power(true),
            18 => Command::Power(false),
            21 => Command::Info,
            28 => Command::Home,
            other => Command::Unknown(other),
        };
        Some(command)
    }
}
