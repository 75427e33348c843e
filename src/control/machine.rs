// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Top-level cooperative control loop.
//!
//! One [`Machine::poll`] call performs, in order:
//!
//! 1. at most one received byte, and at most one dispatched command,
//! 2. one coordinator advance,
//! 3. one status report attempt,
//! 4. at most one transmitted byte.
//!
//! Nothing in the loop blocks.

use core::fmt::Write;

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::MachineConfig;
use crate::control::{CommandDispatcher, MotionCoordinator, Response};
use crate::motors::{AxisRole, StepperAxis, AXIS_COUNT};
use crate::protocol::report::write_info;
use crate::protocol::{LineParser, SerialPort, StatusReport, TxBuffer};
use crate::storage::{PersistentPositionStore, SlotStorage};
use crate::time::{Clock, PeriodicTimer};

pub struct Machine<O, I, S, C> {
    config: MachineConfig,
    clock: C,
    coordinator: MotionCoordinator<O, I>,
    store: PersistentPositionStore<S>,
    dispatcher: CommandDispatcher,
    parser: LineParser,
    tx: TxBuffer,
    report_timer: PeriodicTimer,
}

impl<O, I, S, C> Machine<O, I, S, C>
where
    O: OutputPin,
    I: InputPin,
    S: SlotStorage,
    C: Clock,
{
    /// Restore axis positions from `slots` and get ready to poll.
    ///
    /// If the stored marker is invalid, every axis starts at the configured default position and
    /// storage is reinitialized to match. Storage that cannot be written leaves the machine
    /// running on defaults.
    pub fn boot(
        mut axes: [StepperAxis<O, I>; AXIS_COUNT],
        slots: S,
        clock: C,
        config: MachineConfig,
    ) -> Self {
        let mut store = PersistentPositionStore::new(slots);
        let valid = store.is_valid();

        for role in AxisRole::ALL {
            let steps = store.read(role, config.default_position_steps);
            axes[role.index()].set_position_steps(steps);
        }

        let coordinator = MotionCoordinator::new(axes);
        let mut usable = valid;
        if !valid {
            info!("position storage invalid, initializing");
            store.initialize();
            coordinator.persist_all(&mut store);
            usable = store.is_valid();
            if !usable {
                error!("position storage unavailable, positions will not persist");
            }
        }

        let report_timer = PeriodicTimer::new(config.report_period_ms, clock.millis());

        let mut machine = Self {
            config,
            clock,
            coordinator,
            store,
            dispatcher: CommandDispatcher::new(),
            parser: LineParser::new(),
            tx: TxBuffer::new(),
            report_timer,
        };
        if !usable {
            machine.write_line("ERROR: position storage unavailable");
        } else if !valid {
            machine.write_line("INFO: position storage initialized");
        }
        info!("machine booted");
        machine
    }

    /// Run one loop iteration against `port`.
    pub fn poll<P: SerialPort + ?Sized>(&mut self, port: &mut P) {
        let mut report_due = false;

        if let Some(command) = port.read_byte().and_then(|b| self.parser.push(b)) {
            let now_us = self.clock.micros();
            match self.dispatcher.dispatch(
                command,
                &mut self.coordinator,
                &mut self.store,
                now_us,
            ) {
                Response::None => {}
                Response::Report => report_due = true,
                Response::Info => {
                    let valid = self.store.is_valid();
                    write_info(&mut self.tx, self.config.mcu_name, valid).ok();
                }
            }
        }

        if self.coordinator.advance(self.clock.micros(), &mut self.store) {
            report_due = true;
        }

        let now_ms = self.clock.millis();
        if report_due || self.report_timer.trigger_and_next(now_ms) {
            self.write_report(now_ms);
        }

        self.tx.service(port);
    }

    fn write_report(&mut self, now_ms: u64) {
        let report = StatusReport {
            elapsed_ms: now_ms,
            session: self.coordinator.session(),
            mcu: self.config.mcu_name,
            positions_mm: self.coordinator.positions_mm(),
        };
        if report.write(self.config.report_format, &mut self.tx).is_err() {
            warn!("status report formatting failed");
        }
    }

    /// Queue free-form text on the outbound link.
    pub fn write_line(&mut self, text: &str) {
        self.tx.write_str(text).ok();
        self.tx.write_str("\r\n").ok();
    }

    pub fn coordinator(&self) -> &MotionCoordinator<O, I> {
        &self.coordinator
    }

    pub fn store(&mut self) -> &mut PersistentPositionStore<S> {
        &mut self.store
    }

    pub fn tx(&self) -> &TxBuffer {
        &self.tx
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
