// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status and identity lines.
//!
//! JSON form:
//!
//! ```text
//! REPORT: {"Time":1.230,"Status":"IDLE","MCU":"STM32F7","I":0.000,"J":0.000,"K":0.000,"L":0.000,"M":0.000}
//! ```
//!
//! Compact form:
//!
//! ```text
//! T:1.230,S:I,I:0.000,J:0.000,K:0.000,L:0.000,M:0.000
//! ```
//!
//! Both end with CRLF. Time is seconds since boot, positions are mm, three decimals each.

use core::fmt::{self, Write};

use crate::config::ReportFormat;
use crate::control::MotionSession;
use crate::motors::{AxisRole, AXIS_COUNT};

/// Snapshot of the machine for one status line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport<'a> {
    pub elapsed_ms: u64,
    pub session: MotionSession,
    pub mcu: &'a str,
    pub positions_mm: [f64; AXIS_COUNT],
}

impl StatusReport<'_> {
    pub fn write<W: Write>(&self, format: ReportFormat, w: &mut W) -> fmt::Result {
        match format {
            ReportFormat::Json => self.write_json(w),
            ReportFormat::Short => self.write_short(w),
        }
    }

    pub fn write_json<W: Write>(&self, w: &mut W) -> fmt::Result {
        let status = match self.session {
            MotionSession::Idle => "IDLE",
            MotionSession::Running => "BUSY",
        };
        w.write_str("REPORT: {\"Time\":")?;
        self.write_seconds(w)?;
        write!(w, ",\"Status\":\"{}\",\"MCU\":\"{}\"", status, self.mcu)?;
        for role in AxisRole::ALL {
            write!(
                w,
                ",\"{}\":{:.3}",
                role.position_letter(),
                self.positions_mm[role.index()]
            )?;
        }
        w.write_str("}\r\n")
    }

    pub fn write_short<W: Write>(&self, w: &mut W) -> fmt::Result {
        let status = match self.session {
            MotionSession::Idle => 'I',
            MotionSession::Running => 'B',
        };
        w.write_str("T:")?;
        self.write_seconds(w)?;
        write!(w, ",S:{}", status)?;
        for role in AxisRole::ALL {
            write!(
                w,
                ",{}:{:.3}",
                role.position_letter(),
                self.positions_mm[role.index()]
            )?;
        }
        w.write_str("\r\n")
    }

    fn write_seconds<W: Write>(&self, w: &mut W) -> fmt::Result {
        write!(w, "{}.{:03}", self.elapsed_ms / 1000, self.elapsed_ms % 1000)
    }
}

/// Response to the identity query.
pub fn write_info<W: Write>(w: &mut W, mcu: &str, storage_valid: bool) -> fmt::Result {
    write!(
        w,
        "FIRMWARE: {} v{} - {}\r\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        mcu
    )?;
    let status = if storage_valid {
        "Valid"
    } else {
        "Needs initialization"
    };
    write!(w, "STORAGE: Flash-based EEPROM with wear leveling - {}\r\n", status)
}
