// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side fakes for unit tests: clock, pins, storage and serial port.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::config::AxisConfig;
use crate::motors::{AxisPins, StepperAxis, AXIS_COUNT};
use crate::protocol::SerialPort;
use crate::storage::{FlashRegion, SlotStorage, StorageError, SLOT_COUNT};
use crate::time::Clock;

/// Manually advanced clock.
#[derive(Default)]
pub struct FakeClock {
    micros: Cell<u64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&self, us: u64) {
        self.micros.set(self.micros.get() + us);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000);
    }

    pub fn micros_now(&self) -> u64 {
        self.micros.get()
    }
}

impl Clock for FakeClock {
    fn millis(&self) -> u64 {
        self.micros.get() / 1000
    }

    fn micros(&self) -> u64 {
        self.micros.get()
    }
}

#[derive(Default)]
struct Line {
    high: Cell<bool>,
    rises: Cell<u32>,
    falls: Cell<u32>,
}

/// Shared view of a mock pin's level and edge counts.
#[derive(Clone, Default)]
pub struct Probe(Rc<Line>);

impl Probe {
    /// Probe starting at the given level.
    pub fn at(high: bool) -> Self {
        let probe = Self::default();
        probe.0.high.set(high);
        probe
    }

    pub fn is_high(&self) -> bool {
        self.0.high.get()
    }

    /// Force the level, counting the edge if it changes.
    pub fn set(&self, high: bool) {
        let was = self.0.high.replace(high);
        if high && !was {
            self.0.rises.set(self.0.rises.get() + 1);
        } else if !high && was {
            self.0.falls.set(self.0.falls.get() + 1);
        }
    }

    pub fn rises(&self) -> u32 {
        self.0.rises.get()
    }

    pub fn falls(&self) -> u32 {
        self.0.falls.get()
    }
}

pub struct MockOutput(Probe);

impl ErrorType for MockOutput {
    type Error = Infallible;
}

impl OutputPin for MockOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

pub struct MockInput(Probe);

impl ErrorType for MockInput {
    type Error = Infallible;
}

impl InputPin for MockInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.is_high())
    }
}

/// Probes of one mocked axis.
#[derive(Clone)]
pub struct AxisProbes {
    pub pulse: Probe,
    pub dir: Probe,
    pub enable: Probe,
    pub max_limit: Probe,
    pub min_limit: Probe,
}

pub type MockAxis = StepperAxis<MockOutput, MockInput>;

/// Mocked pins with both limit switches open (pulled high).
pub fn mock_pins() -> (AxisPins<MockOutput, MockInput>, AxisProbes) {
    let probes = AxisProbes {
        pulse: Probe::at(false),
        dir: Probe::at(false),
        enable: Probe::at(false),
        max_limit: Probe::at(true),
        min_limit: Probe::at(true),
    };
    let pins = AxisPins {
        pulse: MockOutput(probes.pulse.clone()),
        dir: MockOutput(probes.dir.clone()),
        enable: MockOutput(probes.enable.clone()),
        max_limit: MockInput(probes.max_limit.clone()),
        min_limit: MockInput(probes.min_limit.clone()),
    };
    (pins, probes)
}

/// Axis with default configuration on mocked pins.
///
/// Edge counters are reset after construction so only motion edges are counted.
pub fn mock_axis() -> (MockAxis, AxisProbes) {
    let (pins, probes) = mock_pins();
    let axis = StepperAxis::new(pins, AxisConfig::default());
    let probes = AxisProbes {
        pulse: reset_counts(probes.pulse),
        ..probes
    };
    (axis, probes)
}

/// One mocked axis per role, indexed by [`AxisRole::index`](crate::motors::AxisRole::index).
pub fn mock_axes() -> ([MockAxis; AXIS_COUNT], [AxisProbes; AXIS_COUNT]) {
    let pairs: [(MockAxis, AxisProbes); AXIS_COUNT] = core::array::from_fn(|_| mock_axis());
    let probes = core::array::from_fn(|i| pairs[i].1.clone());
    (pairs.map(|(axis, _)| axis), probes)
}

fn reset_counts(probe: Probe) -> Probe {
    probe.0.rises.set(0);
    probe.0.falls.set(0);
    probe
}

/// Tick `axis` every `tick_us` until it stops. Panics if it never does.
pub fn run_until_idle(axis: &mut MockAxis, clock: &FakeClock, tick_us: u64) {
    for _ in 0..5_000_000u32 {
        axis.loop_tick(clock.micros_now());
        if axis.is_idle() {
            return;
        }
        clock.advance_us(tick_us);
    }
    panic!("axis did not stop");
}

/// Slot storage in RAM that records every write.
pub struct RamSlots {
    slots: [Option<i64>; SLOT_COUNT],
    puts: [u32; SLOT_COUNT],
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl RamSlots {
    /// Storage that has never been written.
    pub fn blank() -> Self {
        Self {
            slots: [None; SLOT_COUNT],
            puts: [0; SLOT_COUNT],
            fail_reads: false,
            fail_writes: false,
        }
    }

    /// Place raw content without counting it as a write.
    pub fn preload(&mut self, index: usize, value: i64) {
        self.slots[index] = Some(value);
    }

    pub fn raw(&self, index: usize) -> Option<i64> {
        self.slots[index]
    }

    /// Number of `put` calls that reached `index`.
    pub fn puts(&self, index: usize) -> u32 {
        self.puts[index]
    }

    pub fn clear_counts(&mut self) {
        self.puts = [0; SLOT_COUNT];
    }
}

impl SlotStorage for RamSlots {
    fn get(&mut self, index: usize) -> Result<i64, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Flash);
        }
        let slot = self.slots.get(index).ok_or(StorageError::SlotOutOfRange)?;
        slot.ok_or(StorageError::Empty)
    }

    fn put(&mut self, index: usize, value: i64) -> Result<(), StorageError> {
        if index >= SLOT_COUNT {
            return Err(StorageError::SlotOutOfRange);
        }
        self.puts[index] += 1;
        if self.fail_writes {
            return Err(StorageError::Flash);
        }
        self.slots[index] = Some(value);
        Ok(())
    }
}

/// NOR-flash region in RAM: erase sets bytes to 0xFF, programming can only clear bits.
pub struct RamFlash {
    pub bytes: Vec<u8>,
    pub erases: u32,
}

impl RamFlash {
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0xFF; capacity],
            erases: 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct OutOfBounds;

impl FlashRegion for RamFlash {
    type Error = OutOfBounds;

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let src = self
            .bytes
            .get(offset..offset + buf.len())
            .ok_or(OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn program(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let dst = self
            .bytes
            .get_mut(offset..offset + data.len())
            .ok_or(OutOfBounds)?;
        for (cell, b) in dst.iter_mut().zip(data) {
            *cell &= *b;
        }
        Ok(())
    }

    fn erase(&mut self) -> Result<(), Self::Error> {
        self.bytes.iter_mut().for_each(|b| *b = 0xFF);
        self.erases += 1;
        Ok(())
    }
}

/// Serial port that feeds queued bytes in and collects everything written out.
#[derive(Default)]
pub struct LoopbackPort {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub tx_busy: bool,
}

impl LoopbackPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, line: &str) {
        self.rx.extend(line.bytes());
    }

    /// Everything written so far, as text.
    pub fn output(&self) -> std::string::String {
        std::string::String::from_utf8_lossy(&self.tx).into_owned()
    }

    pub fn take_output(&mut self) -> std::string::String {
        let out = self.output();
        self.tx.clear();
        out
    }
}

impl SerialPort for LoopbackPort {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn try_write(&mut self, byte: u8) -> bool {
        if self.tx_busy {
            return false;
        }
        self.tx.push(byte);
        true
    }
}
