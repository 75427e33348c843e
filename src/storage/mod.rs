// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Non-Volatile Position Storage
//!
//! ## Modules
//!
//! - [`position_store`] - Validated, bounds-checked axis position records.
//! - [`wear_level`] - Log-structured slot storage over a raw flash region.
//!
//! ## Layout
//!
//! | Slot | Content |
//! | ---- | ------- |
//! | 0..=4 | Axis I..M position in steps (`i64`) |
//! | 15   | Validity marker [`MAGIC_NUMBER`] |
//!
//! All slots are `i64`. The layout version lives in the wear-leveled region header; bumping it
//! formats the region on the next boot.

use thiserror::Error;

pub mod position_store;
pub mod wear_level;

pub use position_store::PersistentPositionStore;
pub use wear_level::{FlashRegion, WearLeveled};

/// Version of the slot layout above.
pub const LAYOUT_VERSION: u16 = 0;

/// Number of slots reserved in the region.
pub const SLOT_COUNT: usize = 20;

/// Slot holding the validity marker.
pub const MAGIC_SLOT: usize = 15;

/// Marker value meaning "the axis slots were written by this firmware".
pub const MAGIC_NUMBER: i64 = 0x1234_5678;

/// Stored positions outside +/- this many steps are treated as corrupt.
pub const SANITY_LIMIT_STEPS: i64 = 1_000_000;

/// Storage failures below the position store.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    #[error("slot index out of range")]
    SlotOutOfRange,
    #[error("slot has never been written")]
    Empty,
    #[error("flash access failed")]
    Flash,
    #[error("region too small for the slot layout")]
    RegionTooSmall,
    #[error("no storage mounted")]
    Unavailable,
}

/// Fixed array of `i64` slots that survive power cycles.
pub trait SlotStorage {
    /// Read the latest value written to `index`.
    fn get(&mut self, index: usize) -> Result<i64, StorageError>;

    /// Write `value` to `index`.
    fn put(&mut self, index: usize, value: i64) -> Result<(), StorageError>;
}

/// `None` stands in for a region that failed to mount: every access fails, so the position store
/// serves defaults and the machine keeps running.
impl<S: SlotStorage> SlotStorage for Option<S> {
    fn get(&mut self, index: usize) -> Result<i64, StorageError> {
        match self {
            Some(slots) => slots.get(index),
            None => Err(StorageError::Unavailable),
        }
    }

    fn put(&mut self, index: usize, value: i64) -> Result<(), StorageError> {
        match self {
            Some(slots) => slots.put(index, value),
            None => Err(StorageError::Unavailable),
        }
    }
}
