// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tuning and calibration for the gimbal.
//!
//! Each axis is built from its own configuration, so tests can use synthetic calibrations. The
//! defaults match the tuned values of the production gimbal:
//!
//! | Axis | Servo range | Duty | Image span | Tracking span |
//! | ---- | ----------- | ---- | ---------- | ------------- |
//! | Pan  | 9.0° – 171.0° | 24 – 96 | 0 – 640 px, centre 320 | 90° ± 50.4° |
//! | Tilt | 13.5° – 256.5° | 24 – 96 | 0 – 480 px, centre 240 | 135° ± 16.5° |
//!
//! Duty units are timer counts of a 25 µs tick in a 20 ms servo frame, so 24 – 96 is a
//! 0.6 ms – 2.4 ms pulse.

use crate::error::CalibrationError;
use crate::servo::{SafetyLimits, ServoCalibration};

/// PID gains and output bounds for one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub output_min: f32,
    pub output_max: f32,
}

impl PidConfig {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            output_min: -10.0,
            output_max: 10.0,
        }
    }

    /// Set output (and integral) bounds.
    pub const fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }
}

/// Maps the sensor's pixel space onto a tracking angle span for one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrackingRange {
    /// Pixel coordinate mapped to `angle_min`.
    pub coord_min: f32,
    /// Pixel coordinate mapped to `angle_max`.
    pub coord_max: f32,
    /// Pixel coordinate the PID loop drives the target toward.
    pub center: f32,
    pub angle_min: f32,
    pub angle_max: f32,
}

impl TrackingRange {
    /// Span `[0, extent]` pixels centred on `extent / 2`, mapped onto `mid ± half_span` degrees.
    pub const fn centered(extent: f32, mid: f32, half_span: f32) -> Self {
        Self {
            coord_min: 0.0,
            coord_max: extent,
            center: extent / 2.0,
            angle_min: mid - half_span,
            angle_max: mid + half_span,
        }
    }
}

/// Complete configuration of one servo axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisConfig {
    pub calibration: ServoCalibration,
    pub tracking: TrackingRange,
    pub pid: PidConfig,
}

impl AxisConfig {
    pub const PAN: Self = Self {
        calibration: ServoCalibration::new(9.0, 171.0, 24, 96),
        tracking: TrackingRange::centered(640.0, 90.0, 50.4),
        pid: PidConfig::new(0.1, 0.01, 0.05),
    };

    pub const TILT: Self = Self {
        calibration: ServoCalibration::new(13.5, 256.5, 24, 96),
        tracking: TrackingRange::centered(480.0, 135.0, 16.5),
        pid: PidConfig::new(0.1, 0.01, 0.05),
    };

    pub const fn with_pid(mut self, pid: PidConfig) -> Self {
        self.pid = pid;
        self
    }

    pub const fn with_tracking(mut self, tracking: TrackingRange) -> Self {
        self.tracking = tracking;
        self
    }
}

/// Timing of the command/response link to the vision sensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    /// Delay after a command byte has left the transmitter.
    pub settle_ms: u32,
    /// Delay between response segments and after the stop command.
    pub pacing_ms: u32,
    /// Longest wait for any single byte or for the transmitter to drain.
    pub byte_timeout_ms: u32,
    /// Granularity of the receive poll loop.
    pub poll_interval_us: u32,
    /// Number of received bytes inspected for the self-check ack before giving up.
    pub self_check_attempts: u32,
}

impl LinkConfig {
    pub const DEFAULT: Self = Self {
        settle_ms: 100,
        pacing_ms: 50,
        byte_timeout_ms: 500,
        poll_interval_us: 10,
        self_check_attempts: 255,
    };

    pub const fn with_byte_timeout_ms(mut self, ms: u32) -> Self {
        self.byte_timeout_ms = ms;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Top-level gimbal configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GimbalConfig {
    pub pan: AxisConfig,
    pub tilt: AxisConfig,
    pub safety: SafetyLimits,
    pub link: LinkConfig,
    /// Control tick period (ms).
    pub tick_ms: u32,
    /// Time without a committed frame before the target counts as lost (ms).
    pub target_timeout_ms: u32,
}

impl GimbalConfig {
    pub const DEFAULT: Self = Self {
        pan: AxisConfig::PAN,
        tilt: AxisConfig::TILT,
        safety: SafetyLimits::new(24, 96),
        link: LinkConfig::DEFAULT,
        tick_ms: 20,
        target_timeout_ms: 500,
    };

    /// Check both servo calibrations before they are handed to the gimbal.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.pan.calibration.validate()?;
        self.tilt.calibration.validate()
    }

    /// Control ticks without a new frame after which the target counts as lost.
    pub fn target_timeout_ticks(&self) -> u32 {
        self.target_timeout_ms / self.tick_ms.max(1)
    }
}

impl Default for GimbalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
