// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line assembler for the command protocol.
//!
//! Bytes are fed one at a time from the serial port. A line ends at `\n` or `\r`; `;` comments
//! run to the end of the line and `( ... )` comments are skipped inline. Lines longer than
//! [`LINE_CAPACITY`] are discarded up to the next terminator.

use heapless::Vec;

use crate::protocol::messages::{Command, Words};

/// Longest accepted line, excluding the terminator and comments.
pub const LINE_CAPACITY: usize = 96;

enum State {
    Line,
    LineComment,
    InlineComment,
    Overflow,
}

pub struct LineParser {
    state: State,
    line: Vec<u8, LINE_CAPACITY>,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            state: State::Line,
            line: Vec::new(),
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` when a terminator completes a line
    /// that carries a command.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        if byte == b'\n' || byte == b'\r' {
            return self.finish_line();
        }

        match self.state {
            State::Line => match byte {
                b';' => self.state = State::LineComment,
                b'(' => self.state = State::InlineComment,
                _ => {
                    if self.line.push(byte).is_err() {
                        warn!("command line longer than {} bytes dropped", LINE_CAPACITY);
                        self.line.clear();
                        self.state = State::Overflow;
                    }
                }
            },
            State::InlineComment => {
                if byte == b')' {
                    self.state = State::Line;
                }
            }
            State::LineComment | State::Overflow => {}
        }
        None
    }

    fn finish_line(&mut self) -> Option<Command> {
        let overflowed = matches!(self.state, State::Overflow);
        self.state = State::Line;
        if overflowed || self.line.is_empty() {
            self.line.clear();
            return None;
        }

        let words = tokenize(&self.line);
        self.line.clear();
        match words {
            Some(words) => Command::from_words(&words),
            None => {
                warn!("malformed command line dropped");
                None
            }
        }
    }
}

/// Split a line into letter/number words. Returns `None` if any word is malformed.
pub fn tokenize(line: &[u8]) -> Option<Words> {
    let mut words = Words::new();
    let mut i = 0;

    while i < line.len() {
        let letter = line[i];
        i += 1;
        if letter.is_ascii_whitespace() {
            continue;
        }
        if !letter.is_ascii_alphabetic() {
            return None;
        }

        while i < line.len() && matches!(line[i], b' ' | b'\t') {
            i += 1;
        }
        let start = i;
        while i < line.len() && matches!(line[i], b'0'..=b'9' | b'.' | b'+' | b'-') {
            i += 1;
        }

        let text = core::str::from_utf8(&line[start..i]).ok()?;
        let value: f64 = text.parse().ok()?;
        words.set(letter as char, value);
    }

    Some(words)
}
