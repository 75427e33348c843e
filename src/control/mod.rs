// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Motion Control
//!
//! ## Modules
//!
//! - [`coordinator`] - Five-axis owner and motion session tracking.
//! - [`dispatcher`] - Command to axis/storage operation mapping.
//! - [`machine`] - Cooperative main loop tying serial, motion and reporting together.

pub mod coordinator;
pub mod dispatcher;
pub mod machine;

pub use coordinator::{MotionCoordinator, MotionSession};
pub use dispatcher::{CommandDispatcher, Response};
pub use machine::Machine;
