// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SysTick-based monotonic clock.
//!
//! SysTick fires at 1 kHz and increments a `u64` millisecond counter. Microseconds are the
//! counter plus the elapsed fraction of the current SysTick period.

use core::cell::Cell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::{syst::SystClkSource, SCB, SYST};
use cortex_m_rt::exception;

use crate::time::Clock;

static MILLIS: Mutex<Cell<u64>> = Mutex::new(Cell::new(0));

pub struct SysTickClock {
    syst: SYST,
    ticks_per_ms: u32,
}

impl SysTickClock {
    /// Start SysTick from the core clock at `sysclk_hz`.
    pub fn start(mut syst: SYST, sysclk_hz: u32) -> Self {
        let ticks_per_ms = sysclk_hz / 1_000;
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(ticks_per_ms - 1);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();
        Self { syst, ticks_per_ms }
    }

    pub fn free(mut self) -> SYST {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
        self.syst
    }
}

impl Clock for SysTickClock {
    fn millis(&self) -> u64 {
        interrupt::free(|cs| MILLIS.borrow(cs).get())
    }

    fn micros(&self) -> u64 {
        interrupt::free(|cs| {
            let mut ms = MILLIS.borrow(cs).get();
            let mut current = SYST::get_current();
            // Wrapped since the interrupt was masked; the handler has not counted it yet.
            if SCB::is_pendst_pending() {
                ms += 1;
                current = SYST::get_current();
            }
            let reload = SYST::get_reload();
            let elapsed = u64::from(reload - current);
            ms * 1_000 + elapsed * 1_000 / u64::from(self.ticks_per_ms)
        })
    }
}

#[exception]
fn SysTick() {
    interrupt::free(|cs| {
        let millis = MILLIS.borrow(cs);
        millis.set(millis.get() + 1);
    });
}
