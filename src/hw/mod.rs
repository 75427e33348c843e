// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # STM32F7 Board Support
//!
//! MCU-level wrappers around SysTick, GPIO, USART and internal flash.

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod pins;
pub mod usart;

pub use clock::SysTickClock;
pub use flash::{FlashError, FlashSector};
pub use gpio::{InputLine, OutputLine};
pub use pins::{BoardAxisPins, BoardPins};
pub use usart::Usart;
