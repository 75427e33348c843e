// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Non-blocking USART link for the command protocol.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

use crate::protocol::SerialPort;

pub struct Usart<U: Instance> {
    tx: Tx<U>,
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, rx) = serial.split();
        Self { tx, rx }
    }

    pub fn free(self) -> (Tx<U>, Rx<U>) {
        (self.tx, self.rx)
    }
}

impl<U: Instance> SerialPort for Usart<U> {
    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => {
                warn!("usart receive error");
                None
            }
        }
    }

    #[inline]
    fn try_write(&mut self, byte: u8) -> bool {
        self.tx.write(byte).is_ok()
    }
}
