// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # linstep Firmware
//!
//! Five-axis linear stepper controller driven by line-oriented motion commands over a serial link,
//! written in Rust, targeting an STM32F777 MCU.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`motors`] | Per-axis step/direction pulse state machine |
//! | [`control`] | Multi-axis coordination, command dispatch, main loop |
//! | [`protocol`] | Command line parsing, status reports, outbound queue |
//! | [`storage`] | Validated position persistence and wear-leveled flash log |
//! | [`time`] | Clock abstraction and periodic timer |
//! | [`config`] | Machine constants and configuration |
//! | `hw` | STM32F7 SysTick, GPIO, USART and flash (feature `board`) |
//!
//! Everything except `hw` is target-independent and unit tested on the host.
//!
//! ## Getting Started
//!
//! Run the unit tests on the host:
//!
//! ```bash
//! cargo test --lib
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod control;
pub mod motors;
pub mod protocol;
pub mod storage;
pub mod time;

#[cfg(feature = "board")]
pub mod hw;

#[cfg(test)]
mod testing;
