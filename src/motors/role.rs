// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis identities and their protocol letters.

/// Number of stepper axes on the board.
pub const AXIS_COUNT: usize = 5;

/// Stable role tag of an axis.
///
/// Each role owns one position letter and one paired speed letter in the command protocol:
///
/// | Role | Position | Speed |
/// | ---- | -------- | ----- |
/// | I    | `I`      | `V`   |
/// | J    | `J`      | `W`   |
/// | K    | `K`      | `X`   |
/// | L    | `L`      | `Y`   |
/// | M    | `M`      | `Z`   |
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisRole {
    I,
    J,
    K,
    L,
    M,
}

impl AxisRole {
    /// All roles in control-loop order.
    pub const ALL: [AxisRole; AXIS_COUNT] = [
        AxisRole::I,
        AxisRole::J,
        AxisRole::K,
        AxisRole::L,
        AxisRole::M,
    ];

    /// Dense index, also used as the storage slot.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Letter carrying this axis' position in a command line.
    #[inline]
    pub const fn position_letter(self) -> char {
        match self {
            AxisRole::I => 'I',
            AxisRole::J => 'J',
            AxisRole::K => 'K',
            AxisRole::L => 'L',
            AxisRole::M => 'M',
        }
    }

    /// Letter carrying this axis' speed in a command line.
    #[inline]
    pub const fn speed_letter(self) -> char {
        match self {
            AxisRole::I => 'V',
            AxisRole::J => 'W',
            AxisRole::K => 'X',
            AxisRole::L => 'Y',
            AxisRole::M => 'Z',
        }
    }
}
