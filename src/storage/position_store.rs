// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis position persistence with validity and range checks layered over [`SlotStorage`].
//!
//! The store never caches the validity marker: every [`read`](PersistentPositionStore::read)
//! re-checks it, so a region that was erased or torn after boot falls back to the default
//! instead of serving stale content.

use crate::motors::AxisRole;
use crate::storage::{SlotStorage, MAGIC_NUMBER, MAGIC_SLOT, SANITY_LIMIT_STEPS};

/// Owner of all writes to non-volatile storage.
pub struct PersistentPositionStore<S> {
    slots: S,
}

impl<S: SlotStorage> PersistentPositionStore<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    /// True if the stored marker matches [`MAGIC_NUMBER`].
    pub fn is_valid(&mut self) -> bool {
        matches!(self.slots.get(MAGIC_SLOT), Ok(MAGIC_NUMBER))
    }

    /// Stored position of `axis`, or `default` when the region is invalid, the slot cannot be
    /// read, or the stored value is outside the sanity bound.
    pub fn read(&mut self, axis: AxisRole, default: i64) -> i64 {
        if !self.is_valid() {
            return default;
        }
        match self.slots.get(axis.index()) {
            Ok(value) if is_sane(value) => value,
            Ok(value) => {
                warn!("stored position {} for {} out of range", value, axis);
                default
            }
            Err(e) => {
                warn!("position read for {} failed: {}", axis, e);
                default
            }
        }
    }

    /// Persist the position of `axis`. Values outside the sanity bound are silently dropped.
    pub fn write(&mut self, axis: AxisRole, value: i64) {
        if !is_sane(value) {
            debug!("refusing to persist {} for {}", value, axis);
            return;
        }
        if let Err(e) = self.slots.put(axis.index(), value) {
            warn!("position write for {} failed: {}", axis, e);
        }
    }

    /// Zero every axis slot, then write the marker.
    pub fn initialize(&mut self) {
        for axis in AxisRole::ALL {
            if let Err(e) = self.slots.put(axis.index(), 0) {
                warn!("clearing {} failed: {}", axis, e);
            }
        }
        if let Err(e) = self.slots.put(MAGIC_SLOT, MAGIC_NUMBER) {
            error!("writing storage marker failed: {}", e);
        }
    }

    /// Access the slot storage.
    pub fn inner(&mut self) -> &mut S {
        &mut self.slots
    }

    pub fn free(self) -> S {
        self.slots
    }
}

#[inline]
fn is_sane(value: i64) -> bool {
    (-SANITY_LIMIT_STEPS..=SANITY_LIMIT_STEPS).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RamSlots;

    fn valid_store() -> PersistentPositionStore<RamSlots> {
        let mut slots = RamSlots::blank();
        slots.preload(MAGIC_SLOT, MAGIC_NUMBER);
        PersistentPositionStore::new(slots)
    }

    #[test]
    fn blank_storage_is_invalid_and_reads_default() {
        let mut store = PersistentPositionStore::new(RamSlots::blank());
        assert!(!store.is_valid());
        assert_eq!(store.read(AxisRole::I, -7), -7);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut store = valid_store();
        store.write(AxisRole::K, -12_480);
        store.write(AxisRole::M, 1_000_000);
        assert_eq!(store.read(AxisRole::K, 0), -12_480);
        assert_eq!(store.read(AxisRole::M, 0), 1_000_000);
    }

    #[test]
    fn wrong_marker_hides_written_values() {
        let mut store = valid_store();
        store.write(AxisRole::J, 4_800);
        store.inner().preload(MAGIC_SLOT, 0x0BAD);
        assert_eq!(store.read(AxisRole::J, 3), 3);
    }

    #[test]
    fn insane_stored_value_reads_default() {
        let mut store = valid_store();
        store.inner().preload(AxisRole::L.index(), -1_000_001);
        assert_eq!(store.read(AxisRole::L, 11), 11);
    }

    #[test]
    fn insane_value_is_not_written() {
        let mut store = valid_store();
        store.write(AxisRole::I, 2_000_000);
        store.write(AxisRole::I, i64::MIN);
        assert_eq!(store.inner().puts(AxisRole::I.index()), 0);
        assert_eq!(store.inner().raw(AxisRole::I.index()), None);
    }

    #[test]
    fn read_failure_falls_back_to_default() {
        let mut store = valid_store();
        store.write(AxisRole::I, 10);
        store.inner().fail_reads = true;
        assert!(!store.is_valid());
        assert_eq!(store.read(AxisRole::I, 99), 99);
    }

    #[test]
    fn write_failure_keeps_previous_value() {
        let mut store = valid_store();
        store.write(AxisRole::K, 480);
        store.inner().fail_writes = true;
        store.write(AxisRole::K, 960);
        store.inner().fail_writes = false;
        assert_eq!(store.read(AxisRole::K, 0), 480);
        assert_eq!(store.inner().puts(AxisRole::K.index()), 2);
    }

    #[test]
    fn marker_is_rechecked_on_every_read() {
        let mut store = valid_store();
        store.write(AxisRole::I, 10);
        assert_eq!(store.read(AxisRole::I, 0), 10);
        store.inner().preload(MAGIC_SLOT, 0);
        assert_eq!(store.read(AxisRole::I, 0), 0);
    }

    #[test]
    fn initialize_zeroes_axes_and_sets_marker() {
        let mut slots = RamSlots::blank();
        slots.preload(AxisRole::J.index(), 77);
        let mut store = PersistentPositionStore::new(slots);

        store.initialize();

        assert!(store.is_valid());
        for axis in AxisRole::ALL {
            assert_eq!(store.read(axis, -1), 0);
            assert_eq!(store.inner().puts(axis.index()), 1);
        }
    }
}
