// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Servo Abstractions
//!
//! This module sits between the control algorithms in [`crate::control`] and the PWM outputs. It
//! owns the angle ↔ duty calibration of each servo and the absolute duty limits that every write to
//! the hardware passes through.
//!
//! ## Modules
//!
//! - [`calibration`] - Per-axis angle → duty mapping and the hardware safety clamp.
//! - [`gimbal`] - Two-axis gimbal built on a pair of `PwmPin`s.

pub mod calibration;
pub mod gimbal;

pub use calibration::{angle_to_duty, map_range, DutyCommand, SafetyLimits, ServoCalibration};
pub use gimbal::Gimbal;

/// Servo axis, addressed by PWM channel index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis, channel 0.
    Pan,
    /// Vertical axis, channel 1.
    Tilt,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Pan, Axis::Tilt];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Pan => 0,
            Axis::Tilt => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Axis::Pan),
            1 => Some(Axis::Tilt),
            _ => None,
        }
    }
}
