// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Port- and pin-erased GPIO lines implementing the `embedded-hal` 1.0 digital traits.
//!
//! All five axes must share one pin type, so each configured HAL pin is consumed and replaced by
//! its port/pin numbers. Output writes go through BSRR and are atomic; input reads use IDR.

use core::convert::Infallible;
use core::ptr;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stm32f7xx_hal::gpio::{Input, Output, Pin, PushPull};

const GPIO_BASE: usize = 0x4002_0000;
const PORT_STRIDE: usize = 0x400;
const IDR_OFFSET: usize = 0x10;
const BSRR_OFFSET: usize = 0x18;

#[inline]
fn port_base(port: char) -> usize {
    GPIO_BASE + (port as usize - 'A' as usize) * PORT_STRIDE
}

/// Push-pull output on any port.
pub struct OutputLine {
    bsrr: *mut u32,
    pin: u8,
}

impl OutputLine {
    pub fn new<const P: char, const N: u8>(pin: Pin<P, N, Output<PushPull>>) -> Self {
        let _configured = pin;
        Self {
            bsrr: (port_base(P) + BSRR_OFFSET) as *mut u32,
            pin: N,
        }
    }
}

impl ErrorType for OutputLine {
    type Error = Infallible;
}

impl OutputPin for OutputLine {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        // SAFETY: BSRR is write-only and set/reset bits only affect this pin.
        unsafe { ptr::write_volatile(self.bsrr, 1 << self.pin) };
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        // SAFETY: as above.
        unsafe { ptr::write_volatile(self.bsrr, 1 << (self.pin + 16)) };
        Ok(())
    }
}

/// Input on any port, with whatever pull the HAL pin was configured with.
pub struct InputLine {
    idr: *const u32,
    pin: u8,
}

impl InputLine {
    pub fn new<const P: char, const N: u8, PULL>(pin: Pin<P, N, Input<PULL>>) -> Self {
        let _configured = pin;
        Self {
            idr: (port_base(P) + IDR_OFFSET) as *const u32,
            pin: N,
        }
    }
}

impl ErrorType for InputLine {
    type Error = Infallible;
}

impl InputPin for InputLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        // SAFETY: IDR is read-only.
        let idr = unsafe { ptr::read_volatile(self.idr) };
        Ok(idr & (1 << self.pin) != 0)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
