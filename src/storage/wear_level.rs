// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Log-structured slot storage over a NOR flash region.
//!
//! Flash can only be erased a whole sector at a time, so instead of rewriting slots in place each
//! `put` appends a 16-byte record. The newest valid record of a slot wins. When the region fills,
//! it is erased and the latest value of every slot is written back.
//!
//! ```text
//! offset 0   header : tag u32 | version u16 | slots u16 | !tag u32 | 0xFFFFFFFF
//! offset 16  record : slot u16 | !slot u16 | value i64 | check u32
//! offset 32  record ...
//! ```
//!
//! All fields are little-endian. An all-`0xFF` record marks the end of the log. Records whose slot
//! complement or check word do not match (torn writes) are skipped.

use crate::storage::{SlotStorage, StorageError, LAYOUT_VERSION, SLOT_COUNT};

/// Raw erasable region. Erased bytes read back as `0xFF`; programming can only clear bits.
pub trait FlashRegion {
    type Error;

    /// Size of the region in bytes.
    fn capacity(&self) -> usize;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;

    /// Erase the whole region.
    fn erase(&mut self) -> Result<(), Self::Error>;
}

const REGION_TAG: u32 = 0x4C53_5450;
const RECORD_SEED: u32 = 0x5A5A_C3C3;
const HEADER_LEN: usize = 16;
const RECORD_LEN: usize = 16;

enum Record {
    Erased,
    Torn,
    Valid { slot: usize, value: i64 },
}

fn check_word(slot: u16, value: i64) -> u32 {
    let bits = value as u64;
    RECORD_SEED ^ u32::from(slot) ^ (bits as u32) ^ ((bits >> 32) as u32)
}

fn encode_record(slot: u16, value: i64) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0..2].copy_from_slice(&slot.to_le_bytes());
    buf[2..4].copy_from_slice(&(!slot).to_le_bytes());
    buf[4..12].copy_from_slice(&value.to_le_bytes());
    buf[12..16].copy_from_slice(&check_word(slot, value).to_le_bytes());
    buf
}

fn decode_record(buf: &[u8; RECORD_LEN]) -> Record {
    if buf.iter().all(|&b| b == 0xFF) {
        return Record::Erased;
    }
    let slot = u16::from_le_bytes([buf[0], buf[1]]);
    let inverse = u16::from_le_bytes([buf[2], buf[3]]);
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[4..12]);
    let value = i64::from_le_bytes(raw);
    let check = u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]);

    if inverse != !slot || check != check_word(slot, value) || usize::from(slot) >= SLOT_COUNT {
        return Record::Torn;
    }
    Record::Valid {
        slot: usize::from(slot),
        value,
    }
}

fn encode_header() -> [u8; HEADER_LEN] {
    let mut buf = [0xFFu8; HEADER_LEN];
    buf[0..4].copy_from_slice(&REGION_TAG.to_le_bytes());
    buf[4..6].copy_from_slice(&LAYOUT_VERSION.to_le_bytes());
    buf[6..8].copy_from_slice(&(SLOT_COUNT as u16).to_le_bytes());
    buf[8..12].copy_from_slice(&(!REGION_TAG).to_le_bytes());
    buf
}

/// [`SlotStorage`] backed by an append-only log in a [`FlashRegion`].
///
/// Mounting scans the log once and keeps the newest value of each slot in RAM; `get` is served
/// from that index and `put` appends to flash.
pub struct WearLeveled<F> {
    flash: F,
    cursor: usize,
    latest: [Option<i64>; SLOT_COUNT],
}

impl<F: FlashRegion> WearLeveled<F> {
    /// Open the log in `flash`, formatting the region if its header does not match this layout.
    pub fn mount(flash: F) -> Result<Self, StorageError> {
        if flash.capacity() < HEADER_LEN + (SLOT_COUNT + 1) * RECORD_LEN {
            return Err(StorageError::RegionTooSmall);
        }

        let mut store = Self {
            flash,
            cursor: HEADER_LEN,
            latest: [None; SLOT_COUNT],
        };

        let mut header = [0u8; HEADER_LEN];
        store
            .flash
            .read(0, &mut header)
            .map_err(|_| StorageError::Flash)?;

        if header != encode_header() {
            info!("storage header mismatch, formatting region");
            store.format()?;
            return Ok(store);
        }

        store.scan()?;
        debug!("storage mounted, {} records in log", store.record_count());
        Ok(store)
    }

    /// Erase the region and write a fresh header. All slots become empty.
    pub fn format(&mut self) -> Result<(), StorageError> {
        self.flash.erase().map_err(|_| StorageError::Flash)?;
        self.flash
            .program(0, &encode_header())
            .map_err(|_| StorageError::Flash)?;
        self.cursor = HEADER_LEN;
        self.latest = [None; SLOT_COUNT];
        Ok(())
    }

    /// Number of records currently in the log, torn ones included.
    pub fn record_count(&self) -> usize {
        (self.cursor - HEADER_LEN) / RECORD_LEN
    }

    pub fn free(self) -> F {
        self.flash
    }

    fn scan(&mut self) -> Result<(), StorageError> {
        let mut offset = HEADER_LEN;
        let mut buf = [0u8; RECORD_LEN];
        while offset + RECORD_LEN <= self.flash.capacity() {
            self.flash
                .read(offset, &mut buf)
                .map_err(|_| StorageError::Flash)?;
            match decode_record(&buf) {
                Record::Erased => break,
                Record::Torn => warn!("skipping torn record at {}", offset),
                Record::Valid { slot, value } => self.latest[slot] = Some(value),
            }
            offset += RECORD_LEN;
        }
        self.cursor = offset;
        Ok(())
    }

    fn append(&mut self, slot: usize, value: i64) -> Result<(), StorageError> {
        self.flash
            .program(self.cursor, &encode_record(slot as u16, value))
            .map_err(|_| StorageError::Flash)?;
        self.cursor += RECORD_LEN;
        Ok(())
    }

    /// Erase the region and rewrite the newest value of every slot.
    fn compact(&mut self) -> Result<(), StorageError> {
        let latest = self.latest;
        self.format()?;
        for (slot, value) in latest.iter().enumerate() {
            if let Some(value) = *value {
                self.append(slot, value)?;
                self.latest[slot] = Some(value);
            }
        }
        debug!("storage compacted, {} records kept", self.record_count());
        Ok(())
    }
}

impl<F: FlashRegion> SlotStorage for WearLeveled<F> {
    fn get(&mut self, index: usize) -> Result<i64, StorageError> {
        let slot = self.latest.get(index).ok_or(StorageError::SlotOutOfRange)?;
        slot.ok_or(StorageError::Empty)
    }

    fn put(&mut self, index: usize, value: i64) -> Result<(), StorageError> {
        if index >= SLOT_COUNT {
            return Err(StorageError::SlotOutOfRange);
        }
        if self.latest[index] == Some(value) {
            return Ok(());
        }
        if self.cursor + RECORD_LEN > self.flash.capacity() {
            self.compact()?;
        }
        self.append(index, value)?;
        self.latest[index] = Some(value);
        Ok(())
    }
}
