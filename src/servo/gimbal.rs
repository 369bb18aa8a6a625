// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-axis servo gimbal driven by a pair of hardware PWM channels.
//!
//! The gimbal offers two ways to move:
//!
//! - [`Gimbal::set_angles`] / [`Gimbal::adjust`] / [`Gimbal::reset`] take absolute angles from the
//!   application and *reject* anything outside the calibrated range.
//! - [`Gimbal::drive`] is used by the tracking loop and *clamps* instead, so bad data never stops the
//!   loop.
//!
//! Either way, every duty value passes through [`SafetyLimits`] right before it reaches the timer.

use embedded_hal::PwmPin;
use log::{debug, info, warn};

use crate::config::GimbalConfig;
use crate::error::{GimbalError, GimbalResult};
use crate::servo::{Axis, DutyCommand, SafetyLimits, ServoCalibration};

/// One servo output and its calibration.
pub struct ServoAxis<P> {
    pwm: P,
    calibration: ServoCalibration,
    angle: f32,
    duty: u16,
}

impl<P> ServoAxis<P>
where
    P: PwmPin<Duty = u16>,
{
    pub fn new(pwm: P, calibration: ServoCalibration) -> Self {
        Self {
            pwm,
            calibration,
            angle: calibration.center(),
            duty: calibration.angle_to_duty(calibration.center()),
        }
    }

    #[inline]
    pub fn calibration(&self) -> &ServoCalibration {
        &self.calibration
    }

    /// Last commanded angle, after clamping.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Last duty value written to the timer.
    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }

    fn drive(&mut self, angle: f32, limits: &SafetyLimits) -> DutyCommand {
        let mut cmd = self.calibration.map(angle);
        let (duty, clamped) = self.write_duty(cmd.duty, limits);
        cmd.duty = duty;
        cmd.safety_clamped = clamped;
        self.angle = cmd.angle;
        cmd
    }

    fn write_duty(&mut self, duty: u16, limits: &SafetyLimits) -> (u16, bool) {
        let (safe, clamped) = limits.apply(duty);
        self.pwm.set_duty(safe);
        self.duty = safe;
        (safe, clamped)
    }

    pub fn free(self) -> P {
        self.pwm
    }
}

/// Pan/tilt gimbal.
pub struct Gimbal<P, T> {
    pan: ServoAxis<P>,
    tilt: ServoAxis<T>,
    safety: SafetyLimits,
    initialized: bool,
}

impl<P, T> Gimbal<P, T>
where
    P: PwmPin<Duty = u16>,
    T: PwmPin<Duty = u16>,
{
    /// Wrap two PWM channels. Outputs stay untouched until [`init`](Self::init).
    pub fn new(pan_pwm: P, tilt_pwm: T, config: &GimbalConfig) -> Self {
        Self {
            pan: ServoAxis::new(pan_pwm, config.pan.calibration),
            tilt: ServoAxis::new(tilt_pwm, config.tilt.calibration),
            safety: config.safety,
            initialized: false,
        }
    }

    /// Centre both servos and enable the outputs.
    pub fn init(&mut self) {
        let pan = self.pan.calibration.center();
        let tilt = self.tilt.calibration.center();
        self.pan.drive(pan, &self.safety);
        self.tilt.drive(tilt, &self.safety);
        self.pan.pwm.enable();
        self.tilt.pwm.enable();
        self.initialized = true;

        info!(
            "gimbal centred at pan {} deg (duty {}), tilt {} deg (duty {})",
            pan, self.pan.duty, tilt, self.tilt.duty
        );
    }

    /// Disable both outputs. Angle commands are rejected until the next [`init`](Self::init).
    pub fn disable(&mut self) {
        self.pan.pwm.disable();
        self.tilt.pwm.disable();
        self.initialized = false;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set absolute angles for both axes.
    ///
    /// Nothing is written unless both angles lie inside their calibrated ranges.
    pub fn set_angles(&mut self, pan: f32, tilt: f32) -> GimbalResult<()> {
        if !self.initialized {
            return Err(GimbalError::NotInitialized);
        }
        Self::check(Axis::Pan, &self.pan.calibration, pan)?;
        Self::check(Axis::Tilt, &self.tilt.calibration, tilt)?;

        self.pan.drive(pan, &self.safety);
        self.tilt.drive(tilt, &self.safety);
        Ok(())
    }

    /// Current (pan, tilt) angles.
    #[inline]
    pub fn angles(&self) -> (f32, f32) {
        (self.pan.angle, self.tilt.angle)
    }

    /// Return to the centre of both ranges.
    pub fn reset(&mut self) -> GimbalResult<()> {
        let pan = self.pan.calibration.center();
        let tilt = self.tilt.calibration.center();
        self.set_angles(pan, tilt)
    }

    /// Move relative to the current angles.
    pub fn adjust(&mut self, pan_delta: f32, tilt_delta: f32) -> GimbalResult<()> {
        let (pan, tilt) = self.angles();
        self.set_angles(pan + pan_delta, tilt + tilt_delta)
    }

    /// Drive one axis toward `angle`, clamping rather than rejecting.
    pub fn drive(&mut self, axis: Axis, angle: f32) -> DutyCommand {
        let cmd = match axis {
            Axis::Pan => self.pan.drive(angle, &self.safety),
            Axis::Tilt => self.tilt.drive(angle, &self.safety),
        };
        if cmd.angle_clamped || cmd.safety_clamped {
            debug!(
                "{:?} command {} deg clamped to {} deg / duty {} (safety: {})",
                axis, angle, cmd.angle, cmd.duty, cmd.safety_clamped
            );
        }
        cmd
    }

    /// Write a raw duty value to an axis. The safety clamp still applies.
    ///
    /// Returns the value actually written.
    pub fn write_duty(&mut self, axis: Axis, duty: u16) -> u16 {
        let (written, clamped) = match axis {
            Axis::Pan => self.pan.write_duty(duty, &self.safety),
            Axis::Tilt => self.tilt.write_duty(duty, &self.safety),
        };
        if clamped {
            debug!("{:?} duty {} clamped to {}", axis, duty, written);
        }
        written
    }

    #[inline]
    pub fn duty(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Pan => self.pan.duty,
            Axis::Tilt => self.tilt.duty,
        }
    }

    pub fn calibration(&self, axis: Axis) -> &ServoCalibration {
        match axis {
            Axis::Pan => &self.pan.calibration,
            Axis::Tilt => &self.tilt.calibration,
        }
    }

    /// Release the PWM channels.
    pub fn free(self) -> (P, T) {
        (self.pan.free(), self.tilt.free())
    }

    fn check(axis: Axis, calibration: &ServoCalibration, angle: f32) -> GimbalResult<()> {
        if calibration.contains(angle) {
            Ok(())
        } else {
            warn!("rejecting {:?} angle {}", axis, angle);
            Err(GimbalError::AngleOutOfRange {
                axis,
                angle,
                min: calibration.min_angle,
                max: calibration.max_angle,
            })
        }
    }
}
