// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Discrete-time PID controller for closed-loop control.
//!
//! The control tick is the unit of time, so there is no `dt`: the integral is a plain running sum
//! of the error and the derivative is the change in error since the previous tick. The integral is
//! clamped to the output bounds to stop windup.
//!
//! Works in `no_std` and does not allocate memory.

use crate::config::PidConfig;

/// PID controller with tunable gains and output clamping.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,

    /// Running sum of the error, kept inside the output bounds
    integral: f32,
    /// Error of the previous update (for derivative term)
    last_error: f32,
    last_output: f32,

    /// Output and integral clamp
    out_min: f32,
    out_max: f32,
}

impl Pid {
    /// Create a new PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants. Output defaults to `[-1.0, 1.0]`.
    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self {
            kp,
            ki,
            kd,

            integral: 0.0,
            last_error: 0.0,
            last_output: 0.0,

            out_min: -1.0,
            out_max: 1.0,
        }
    }

    pub fn from_config(config: &PidConfig) -> Self {
        Self::new(config.kp, config.ki, config.kd)
            .with_output_limits(config.output_min, config.output_max)
    }

    /// Set output limits. The integral is held to the same range.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.last_output = 0.0;
    }

    /// Update the controller.
    ///
    /// `target`: desired value
    /// `current`: measured value
    ///
    /// Returns the correction in [`out_min`, `out_max`].
    pub fn update(&mut self, target: f32, current: f32) -> f32 {
        let error = target - current;

        // ----- I term, with anti-windup clamp -----
        self.integral = (self.integral + error).clamp(self.out_min, self.out_max);

        // ----- D term -----
        let derivative = error - self.last_error;
        self.last_error = error;

        let out = self.kp * error + self.ki * self.integral + self.kd * derivative;
        self.last_output = out.clamp(self.out_min, self.out_max);
        self.last_output
    }

    #[inline]
    pub fn integral(&self) -> f32 {
        self.integral
    }

    #[inline]
    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    #[inline]
    pub fn last_error(&self) -> f32 {
        self.last_error
    }
}
