// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Serial Command Protocol
//!
//! Line-oriented commands in, status lines out.
//!
//! ## Modules
//!
//! - [`messages`] - Parsed words and the commands built from them.
//! - [`parser`] - Byte-at-a-time line assembler and tokenizer.
//! - [`report`] - Status and info line rendering.
//! - [`tx`] - Bounded outbound byte queue.

pub mod messages;
pub mod parser;
pub mod report;
pub mod tx;

pub use messages::{AxisMove, Command, Words};
pub use parser::LineParser;
pub use report::StatusReport;
pub use tx::TxBuffer;

/// Byte-level, non-blocking serial link.
pub trait SerialPort {
    /// Next received byte, if one is waiting.
    fn read_byte(&mut self) -> Option<u8>;

    /// Hand `byte` to the transmitter. Returns `false` if it could not take the byte right now.
    fn try_write(&mut self, byte: u8) -> bool;
}
