// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Last internal flash sector used as the position storage region.
//!
//! STM32F77x single-bank layout: sectors 0-3 are 32 KiB, sector 4 is 128 KiB, sectors 5-11 are
//! 256 KiB. Sector 11 starts at `0x081C_0000` and must not overlap the firmware image.

use core::ptr;

use stm32f7xx_hal::{flash::Flash, pac};

use crate::storage::FlashRegion;

const FLASH_BASE: usize = 0x0800_0000;
const SECTOR: u8 = 11;
const SECTOR_START: usize = 0x081C_0000;
const SECTOR_LEN: usize = 256 * 1024;

#[derive(Debug)]
pub enum FlashError {
    OutOfBounds,
    Hal(stm32f7xx_hal::flash::Error),
}

pub struct FlashSector {
    flash: Flash,
}

impl FlashSector {
    pub fn new(flash: pac::FLASH) -> Self {
        Self {
            flash: Flash::new(flash),
        }
    }

    fn check(&self, offset: usize, len: usize) -> Result<(), FlashError> {
        match offset.checked_add(len) {
            Some(end) if end <= SECTOR_LEN => Ok(()),
            _ => Err(FlashError::OutOfBounds),
        }
    }
}

impl FlashRegion for FlashSector {
    type Error = FlashError;

    fn capacity(&self) -> usize {
        SECTOR_LEN
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.check(offset, buf.len())?;
        let src = (SECTOR_START + offset) as *const u8;
        for (i, b) in buf.iter_mut().enumerate() {
            // SAFETY: bounds checked above; the sector is memory-mapped and readable.
            *b = unsafe { ptr::read_volatile(src.add(i)) };
        }
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        self.check(offset, data.len())?;
        self.flash.unlock();
        let result = self
            .flash
            .blocking_program(SECTOR_START - FLASH_BASE + offset, data);
        self.flash.lock();
        result.map_err(FlashError::Hal)
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        info!("erasing storage sector {}", SECTOR);
        self.flash.unlock();
        let result = self.flash.blocking_erase_sector(SECTOR);
        self.flash.lock();
        result.map_err(FlashError::Hal)
    }
}
