// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Machine constants and the configuration structs built from them.
//!
//! Actuator geometry (lead screw + 200 step/rev motor behind a TB6600 driver):
//! - 12 rev / mm at the screw
//! - 200 steps / rev
//! - 2400 steps / mm

/// Steps per millimeter of actuator travel.
pub const STEPS_PER_MM: i64 = 2400;

/// Travel envelope in millimeters.
pub const MAX_POSITION_MM: i64 = 50;
pub const MIN_POSITION_MM: i64 = -50;

/// Commanded speeds above this are clamped.
pub const MAX_SPEED_MM_PER_MIN: f32 = 30.0;

/// Step periods shorter than this switch from 50/50 to 25/75 duty.
pub const SHORT_PERIOD_THRESHOLD_US: u32 = 50;

/// Lower bound on the time between step edges.
pub const MIN_STEP_INTERVAL_US: u32 = 20;

/// Position assumed for an axis whose stored value is missing or corrupt.
pub const DEFAULT_POSITION_STEPS: i64 = 0;

/// Period of the unsolicited status report.
pub const AUTO_REPORT_MS: u32 = 200;

/// MCU tag printed in the status report.
pub const MCU_NAME: &str = "STM32F7";

/// Electrical level that makes the driver take a step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PulsePolarity {
    /// Pulse line idles high and is pulled low for a step (common-anode wiring).
    ActiveLow,
    ActiveHigh,
}

/// Layout of the status report line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportFormat {
    /// `REPORT: {"Time":..,"Status":..,"MCU":..,"I":..}`
    Json,
    /// `T:..,S:I,I:..`
    Short,
}

impl Default for ReportFormat {
    fn default() -> Self {
        if cfg!(feature = "short-report") {
            ReportFormat::Short
        } else {
            ReportFormat::Json
        }
    }
}

/// Per-axis kinematic limits and pulse shaping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisConfig {
    pub steps_per_mm: i64,
    pub min_position_mm: i64,
    pub max_position_mm: i64,
    pub max_speed_mm_per_min: f32,
    pub short_period_threshold_us: u32,
    pub min_step_interval_us: u32,
    pub pulse_polarity: PulsePolarity,
}

impl AxisConfig {
    /// Lowest reachable position in steps.
    #[inline]
    pub fn min_steps(&self) -> i64 {
        self.min_position_mm * self.steps_per_mm
    }

    /// Highest reachable position in steps.
    #[inline]
    pub fn max_steps(&self) -> i64 {
        self.max_position_mm * self.steps_per_mm
    }

    /// Clamp a step count into the travel envelope.
    #[inline]
    pub fn clamp_steps(&self, steps: i64) -> i64 {
        steps.clamp(self.min_steps(), self.max_steps())
    }

    /// Clamp a millimeter value into the travel envelope.
    #[inline]
    pub fn clamp_mm(&self, mm: f64) -> f64 {
        mm.clamp(self.min_position_mm as f64, self.max_position_mm as f64)
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: STEPS_PER_MM,
            min_position_mm: MIN_POSITION_MM,
            max_position_mm: MAX_POSITION_MM,
            max_speed_mm_per_min: MAX_SPEED_MM_PER_MIN,
            short_period_threshold_us: SHORT_PERIOD_THRESHOLD_US,
            min_step_interval_us: MIN_STEP_INTERVAL_US,
            pulse_polarity: PulsePolarity::ActiveLow,
        }
    }
}

/// Machine-wide settings used by the control loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MachineConfig {
    pub axis: AxisConfig,
    pub report_period_ms: u32,
    pub report_format: ReportFormat,
    pub mcu_name: &'static str,
    pub default_position_steps: i64,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            axis: AxisConfig::default(),
            report_period_ms: AUTO_REPORT_MS,
            report_format: ReportFormat::default(),
            mcu_name: MCU_NAME,
            default_position_steps: DEFAULT_POSITION_STEPS,
        }
    }
}
