// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the five-axis stepper board (STM32F777).
//!
//! | Axis | Pulse | Dir  | Enable | Max limit | Min limit |
//! | ---- | ----- | ---- | ------ | --------- | --------- |
//! | I    | PE2   | PE7  | PD0    | PF0       | PF5       |
//! | J    | PE3   | PE8  | PD1    | PF1       | PF6       |
//! | K    | PE4   | PE9  | PD2    | PF2       | PF7       |
//! | L    | PE5   | PE10 | PD3    | PF3       | PF8       |
//! | M    | PE6   | PE11 | PD4    | PF4       | PF9       |
//!
//! Limit switches are active-low with internal pull-ups.

use stm32f7xx_hal::{
    gpio::{gpioa, Alternate},
    pac,
    prelude::*,
};

use crate::hw::gpio::{InputLine, OutputLine};
use crate::motors::{AxisPins, AXIS_COUNT};

pub type BoardAxisPins = AxisPins<OutputLine, InputLine>;

/// All board pins. Construct this once at startup using:
///
/// ```rust,ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE, dp.GPIOF);
/// ```
pub struct BoardPins {
    pub usart1: Usart1Pins,
    /// Indexed by axis role.
    pub axes: [BoardAxisPins; AXIS_COUNT],
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD, gpioe: pac::GPIOE, gpiof: pac::GPIOF) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();
        let gpiof = gpiof.split();

        Self {
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            axes: [
                AxisPins {
                    pulse: OutputLine::new(gpioe.pe2.into_push_pull_output()),
                    dir: OutputLine::new(gpioe.pe7.into_push_pull_output()),
                    enable: OutputLine::new(gpiod.pd0.into_push_pull_output()),
                    max_limit: InputLine::new(gpiof.pf0.into_pull_up_input()),
                    min_limit: InputLine::new(gpiof.pf5.into_pull_up_input()),
                },
                AxisPins {
                    pulse: OutputLine::new(gpioe.pe3.into_push_pull_output()),
                    dir: OutputLine::new(gpioe.pe8.into_push_pull_output()),
                    enable: OutputLine::new(gpiod.pd1.into_push_pull_output()),
                    max_limit: InputLine::new(gpiof.pf1.into_pull_up_input()),
                    min_limit: InputLine::new(gpiof.pf6.into_pull_up_input()),
                },
                AxisPins {
                    pulse: OutputLine::new(gpioe.pe4.into_push_pull_output()),
                    dir: OutputLine::new(gpioe.pe9.into_push_pull_output()),
                    enable: OutputLine::new(gpiod.pd2.into_push_pull_output()),
                    max_limit: InputLine::new(gpiof.pf2.into_pull_up_input()),
                    min_limit: InputLine::new(gpiof.pf7.into_pull_up_input()),
                },
                AxisPins {
                    pulse: OutputLine::new(gpioe.pe5.into_push_pull_output()),
                    dir: OutputLine::new(gpioe.pe10.into_push_pull_output()),
                    enable: OutputLine::new(gpiod.pd3.into_push_pull_output()),
                    max_limit: InputLine::new(gpiof.pf3.into_pull_up_input()),
                    min_limit: InputLine::new(gpiof.pf8.into_pull_up_input()),
                },
                AxisPins {
                    pulse: OutputLine::new(gpioe.pe6.into_push_pull_output()),
                    dir: OutputLine::new(gpioe.pe11.into_push_pull_output()),
                    enable: OutputLine::new(gpiod.pd4.into_push_pull_output()),
                    max_limit: InputLine::new(gpiof.pf4.into_pull_up_input()),
                    min_limit: InputLine::new(gpiof.pf9.into_pull_up_input()),
                },
            ],
        }
    }
}
