// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m_rt::entry;
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use linstep::config::MachineConfig;
use linstep::control::Machine;
use linstep::hw::{BoardPins, FlashSector, SysTickClock, Usart};
use linstep::motors::StepperAxis;
use linstep::storage::WearLeveled;

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();
    let clock = SysTickClock::start(cp.SYST, clocks.sysclk().raw());

    // GPIO
    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF);

    // USART1
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );
    let mut usart = Usart::new(serial);

    // Storage. Without it the machine still runs, on default positions.
    let slots = match WearLeveled::mount(FlashSector::new(dp.FLASH)) {
        Ok(slots) => Some(slots),
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("storage mount failed: {}", _e);
            None
        }
    };

    // Axes
    let config = MachineConfig::default();
    let axes = pins.axes.map(|axis_pins| StepperAxis::new(axis_pins, config.axis));

    let mut machine = Machine::boot(axes, slots, clock, config);

    loop {
        machine.poll(&mut usart);
    }
}
