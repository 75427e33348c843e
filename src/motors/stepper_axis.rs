// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Step/direction axis driven by a non-blocking pulse state machine.
//!
//! Each call to [`StepperAxis::loop_tick`] performs at most one transition, so one step pulse is
//! spread over several control-loop iterations:
//!
//! ```text
//! Stopped -> Ready -> CheckLimit -> DriveHigh -> HoldHigh -> DriveLow -> HoldLow -> CheckLimit ...
//!                          |                                     |
//!                          +--> Stopped (limit engaged)          +--> Stopped (target reached)
//! ```
//!
//! This lets the main loop interleave all axes and the serial link without any axis blocking
//! another's pulse timing. The loop has to run much faster than the shortest pulse half-period.
//!
//! Transitions are computed by [`transition`], a pure function of the current state, the motion
//! parameters, the limit inputs and the time. Pin writes happen only in
//! [`StepperAxis::loop_tick`] when the resulting [`Action`] is applied.

use embedded_hal::digital::{InputPin, OutputPin, PinState};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{AxisConfig, PulsePolarity};

/// Pulse state machine position.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisState {
    /// Idle. Also entered on completion and on emergency stop.
    Stopped,
    /// Move accepted; direction and enable not yet driven.
    Ready,
    /// Waiting for the next step deadline while watching the limit switches.
    CheckLimit,
    DriveHigh,
    HoldHigh,
    DriveLow,
    HoldLow,
}

/// Pin bundle of one axis.
///
/// Limit inputs are active-low with pull-ups: a closed switch reads low.
pub struct AxisPins<O, I> {
    pub pulse: O,
    pub dir: O,
    pub enable: O,
    pub max_limit: I,
    pub min_limit: I,
}

/// Pulse shape derived from the commanded speed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PulseTiming {
    /// Time the pulse line is held at its active level.
    pub high_us: u32,
    /// Time the pulse line is held inactive after the step.
    pub low_us: u32,
    /// Delay between the end of one pulse and the deadline of the next.
    pub interval_us: u32,
}

impl PulseTiming {
    /// Derive pulse timing from a speed in mm/min. Only the magnitude of `mm_per_min` is used.
    ///
    /// `period = 60e6 / (speed * steps_per_mm)` microseconds, with the speed clamped to the
    /// configured maximum and the period clamped to the minimum step interval. Periods under the
    /// short-period threshold use a 25/75 high/low split to keep the high time above the driver's
    /// minimum pulse width.
    pub fn from_speed(mm_per_min: f32, config: &AxisConfig) -> Self {
        let speed = mm_per_min.abs().min(config.max_speed_mm_per_min);
        let period = (60.0e6_f32 / (speed * config.steps_per_mm as f32)).floor();

        // Float-to-int casts saturate, so a vanishing speed lands on u32::MAX.
        let period_us = (period as u32).max(config.min_step_interval_us);

        let (high_us, low_us) = if period_us < config.short_period_threshold_us {
            (period_us / 4, period_us * 3 / 4)
        } else {
            (period_us / 2, period_us / 2)
        };

        Self {
            high_us,
            low_us,
            interval_us: period_us,
        }
    }
}

/// Limit switch readings, already decoded to "engaged".
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Limits {
    pub max_engaged: bool,
    pub min_engaged: bool,
}

/// Snapshot of the move in progress, as seen by [`transition`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Motion {
    pub position: i64,
    pub target: i64,
    pub timing: PulseTiming,
    /// Deadline of the next step edge.
    pub next_step_at: u64,
    /// Time of the last pulse edge.
    pub edge_at: u64,
}

/// Side effect requested by a transition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Action {
    None,
    /// Drive the direction line and enable the driver.
    Arm { reverse: bool },
    /// Put the pulse line at its active level and stamp the edge time.
    Assert,
    /// Release the pulse line, move the position by `step` and stamp the edge time.
    Release { step: i64 },
    /// Schedule the next step deadline one interval from now.
    Schedule,
    /// Limit switch tripped: release the pulse line and stop.
    Halt,
}

/// Compute the next state and its side effect. Performs no I/O.
pub fn transition(state: AxisState, motion: &Motion, limits: Limits, now: u64) -> (AxisState, Action) {
    let forward = motion.target > motion.position;
    let reverse = motion.target < motion.position;

    match state {
        AxisState::Stopped => (AxisState::Stopped, Action::None),

        AxisState::Ready => (AxisState::CheckLimit, Action::Arm { reverse }),

        AxisState::CheckLimit => {
            if (forward && limits.max_engaged) || (reverse && limits.min_engaged) {
                (AxisState::Stopped, Action::Halt)
            } else if !forward && !reverse {
                // Nothing left to do; never emit a pulse that would not be counted.
                (AxisState::Stopped, Action::None)
            } else if now >= motion.next_step_at {
                (AxisState::DriveHigh, Action::None)
            } else {
                (AxisState::CheckLimit, Action::None)
            }
        }

        AxisState::DriveHigh => (AxisState::HoldHigh, Action::Assert),

        AxisState::HoldHigh => {
            if now.saturating_sub(motion.edge_at) >= motion.timing.high_us as u64 {
                (AxisState::DriveLow, Action::None)
            } else {
                (AxisState::HoldHigh, Action::None)
            }
        }

        AxisState::DriveLow => {
            let step = if forward { 1 } else if reverse { -1 } else { 0 };
            if motion.position + step == motion.target {
                (AxisState::Stopped, Action::Release { step })
            } else {
                (AxisState::HoldLow, Action::Release { step })
            }
        }

        AxisState::HoldLow => {
            if now.saturating_sub(motion.edge_at) >= motion.timing.low_us as u64 {
                (AxisState::CheckLimit, Action::Schedule)
            } else {
                (AxisState::HoldLow, Action::None)
            }
        }
    }
}

/// One stepper axis: pins, configuration and the pulse state machine.
pub struct StepperAxis<O, I> {
    pins: AxisPins<O, I>,
    config: AxisConfig,
    state: AxisState,
    motion: Motion,
}

impl<O, I> StepperAxis<O, I>
where
    O: OutputPin,
    I: InputPin,
{
    /// Create an idle axis at position zero with the pulse line released.
    pub fn new(mut pins: AxisPins<O, I>, config: AxisConfig) -> Self {
        pins.pulse.set_state(inactive_level(config.pulse_polarity)).ok();
        pins.dir.set_low().ok();

        Self {
            pins,
            config,
            state: AxisState::Stopped,
            motion: Motion::default(),
        }
    }

    /// Begin a constant-speed move.
    ///
    /// `move_mm` is an absolute position, or a displacement when `incremental` is set; it is
    /// clamped to the travel envelope and floored to whole steps, and the resulting target is
    /// clamped again. `mm_per_min` sets the step rate; its sign is ignored.
    ///
    /// Ignored unless the axis is stopped, when the speed is zero, or for a zero incremental
    /// move.
    pub fn start(&mut self, move_mm: f64, mm_per_min: f64, incremental: bool, now: u64) {
        if self.state != AxisState::Stopped {
            return;
        }
        if mm_per_min == 0.0 || (incremental && move_mm == 0.0) {
            return;
        }

        let steps = floor_steps(self.config.clamp_mm(move_mm) * self.config.steps_per_mm as f64);
        let target = if incremental {
            self.motion.position + steps
        } else {
            steps
        };

        self.motion.target = self.config.clamp_steps(target);
        self.motion.timing = PulseTiming::from_speed(mm_per_min as f32, &self.config);
        self.motion.next_step_at = now + self.motion.timing.interval_us as u64;
        self.state = AxisState::Ready;

        debug!(
            "axis start: {} -> {} steps, {} us/step",
            self.motion.position,
            self.motion.target,
            self.motion.timing.interval_us
        );
    }

    /// Advance the state machine by at most one transition.
    pub fn loop_tick(&mut self, now: u64) {
        let limits = if self.state == AxisState::CheckLimit {
            self.read_limits()
        } else {
            Limits::default()
        };

        let (next, action) = transition(self.state, &self.motion, limits, now);
        self.apply(action, now);
        self.state = next;
    }

    fn apply(&mut self, action: Action, now: u64) {
        match action {
            Action::None => {}
            Action::Arm { reverse } => {
                self.pins.dir.set_state(PinState::from(reverse)).ok();
                self.pins.enable.set_high().ok();
            }
            Action::Assert => {
                self.pins
                    .pulse
                    .set_state(active_level(self.config.pulse_polarity))
                    .ok();
                self.motion.edge_at = now;
            }
            Action::Release { step } => {
                self.pins
                    .pulse
                    .set_state(inactive_level(self.config.pulse_polarity))
                    .ok();
                self.motion.position += step;
                self.motion.edge_at = now;
            }
            Action::Schedule => {
                self.motion.next_step_at = now + self.motion.timing.interval_us as u64;
            }
            Action::Halt => {
                warn!(
                    "limit switch engaged at {} steps (target {})",
                    self.motion.position,
                    self.motion.target
                );
                self.release_pulse();
            }
        }
    }

    /// Stop immediately and release the pulse line. The position keeps the last completed step.
    pub fn emergency_stop(&mut self) {
        self.state = AxisState::Stopped;
        self.release_pulse();
    }

    fn release_pulse(&mut self) {
        self.pins
            .pulse
            .set_state(inactive_level(self.config.pulse_polarity))
            .ok();
    }

    /// Sample both limit switches. A read failure counts as engaged.
    fn read_limits(&mut self) -> Limits {
        Limits {
            max_engaged: self.pins.max_limit.is_low().unwrap_or(true),
            min_engaged: self.pins.min_limit.is_low().unwrap_or(true),
        }
    }

    /// Drive the enable output. Ignored while moving.
    pub fn set_power(&mut self, enabled: bool) {
        if self.state != AxisState::Stopped {
            return;
        }
        self.pins.enable.set_state(PinState::from(enabled)).ok();
    }

    /// True iff the axis is stopped.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == AxisState::Stopped
    }

    #[inline]
    pub fn state(&self) -> AxisState {
        self.state
    }

    #[inline]
    pub fn position_steps(&self) -> i64 {
        self.motion.position
    }

    #[inline]
    pub fn target_steps(&self) -> i64 {
        self.motion.target
    }

    #[inline]
    pub fn timing(&self) -> PulseTiming {
        self.motion.timing
    }

    /// Current position in millimeters.
    pub fn position_mm(&self) -> f64 {
        self.motion.position as f64 / self.config.steps_per_mm as f64
    }

    /// Redefine the current position in steps, clamped to the envelope. Ignored while moving.
    pub fn set_position_steps(&mut self, steps: i64) {
        if self.state != AxisState::Stopped {
            return;
        }
        self.motion.position = self.config.clamp_steps(steps);
    }

    /// Redefine the current position in millimeters, clamped to the envelope and truncated toward
    /// zero. Ignored while moving.
    pub fn set_position_mm(&mut self, mm: f64) {
        if self.state != AxisState::Stopped {
            return;
        }
        let steps = (self.config.clamp_mm(mm) * self.config.steps_per_mm as f64) as i64;
        self.motion.position = self.config.clamp_steps(steps);
    }

    #[inline]
    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// Give the pins back.
    pub fn free(self) -> AxisPins<O, I> {
        self.pins
    }
}

/// Largest whole step count not above `steps`. The input is already inside the envelope.
#[inline]
fn floor_steps(steps: f64) -> i64 {
    let whole = steps as i64;
    if (whole as f64) > steps {
        whole - 1
    } else {
        whole
    }
}

#[inline]
fn active_level(polarity: PulsePolarity) -> PinState {
    match polarity {
        PulsePolarity::ActiveLow => PinState::Low,
        PulsePolarity::ActiveHigh => PinState::High,
    }
}

#[inline]
fn inactive_level(polarity: PulsePolarity) -> PinState {
    !active_level(polarity)
}
