// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! Motor-level building blocks that sit between the board pins in `hw` and the coordination logic
//! in `control`.
//!
//! ## Modules
//!
//! - [`role`] - Axis identities (I/J/K/L/M) and their protocol letters.
//! - [`stepper_axis`] - Step/direction pulse state machine with limit-switch interlock.

pub mod role;
pub mod stepper_axis;

pub use role::{AxisRole, AXIS_COUNT};
pub use stepper_axis::{AxisPins, AxisState, PulseTiming, StepperAxis};
