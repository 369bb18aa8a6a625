// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Angle → duty mapping for hobby servos.
//!
//! Two independent clamps stand between a commanded angle and the timer compare register:
//!
//! 1. [`ServoCalibration::map`] clamps the angle into the servo's calibrated range before the affine
//!    map to duty.
//! 2. [`SafetyLimits::apply`] forces the resulting duty into the absolute range the mechanics can
//!    take, whatever the calibration says.
//!
//! Both must stay in place.

use micromath::F32Ext;

use crate::error::CalibrationError;

/// Linear map of `value` from `[in_min, in_max]` onto `[out_min, out_max]`, clamped to the output
/// range.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let mapped = out_min + (value - in_min) * (out_max - out_min) / span;
    clamp_between(mapped, out_min, out_max)
}

/// Clamp `value` into the range spanned by `a` and `b`, given in either order.
///
/// Never panics: a NaN bound is ignored and a NaN value lands on the lower bound.
#[inline]
fn clamp_between(value: f32, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value.max(lo).min(hi)
}

/// Clamp `angle` into `[min_angle, max_angle]` and map it linearly onto `[duty_min, duty_max]`,
/// rounded to the nearest duty unit.
pub fn angle_to_duty(angle: f32, min_angle: f32, max_angle: f32, duty_min: u16, duty_max: u16) -> u16 {
    let angle = clamp_between(angle, min_angle, max_angle);
    let span = max_angle - min_angle;
    if span == 0.0 {
        return duty_min;
    }

    let duty = duty_min as f32 + (angle - min_angle) * (duty_max as f32 - duty_min as f32) / span;
    F32Ext::round(duty) as u16
}

/// Immutable calibration of one servo: commandable angle range and matching duty range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ServoCalibration {
    pub min_angle: f32,
    pub max_angle: f32,
    pub duty_min: u16,
    pub duty_max: u16,
}

/// Result of mapping one commanded angle to a duty value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DutyCommand {
    /// Angle after the calibration clamp.
    pub angle: f32,
    /// Duty value written to the timer.
    pub duty: u16,
    /// The requested angle was outside the calibrated range.
    pub angle_clamped: bool,
    /// The mapped duty was outside the absolute safety range.
    pub safety_clamped: bool,
}

impl ServoCalibration {
    pub const fn new(min_angle: f32, max_angle: f32, duty_min: u16, duty_max: u16) -> Self {
        Self {
            min_angle,
            max_angle,
            duty_min,
            duty_max,
        }
    }

    /// Midpoint of the angle range.
    #[inline]
    pub fn center(&self) -> f32 {
        (self.min_angle + self.max_angle) / 2.0
    }

    /// Like [`new`](Self::new), but rejects calibrations that cannot describe a servo: non-finite
    /// or empty angle ranges, and empty duty ranges. A reversed duty range (servo mounted the other
    /// way round) is fine.
    pub fn try_new(
        min_angle: f32,
        max_angle: f32,
        duty_min: u16,
        duty_max: u16,
    ) -> Result<Self, CalibrationError> {
        let cal = Self::new(min_angle, max_angle, duty_min, duty_max);
        cal.validate()?;
        Ok(cal)
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !self.min_angle.is_finite() || !self.max_angle.is_finite() {
            return Err(CalibrationError::NonFiniteAngle);
        }
        if self.min_angle >= self.max_angle {
            return Err(CalibrationError::AngleRange {
                min: self.min_angle,
                max: self.max_angle,
            });
        }
        if self.duty_min == self.duty_max {
            return Err(CalibrationError::EmptyDutyRange {
                duty: self.duty_min,
            });
        }
        Ok(())
    }

    /// True if `angle` is a valid absolute command (NaN is not).
    #[inline]
    pub fn contains(&self, angle: f32) -> bool {
        let (lo, hi) = if self.min_angle <= self.max_angle {
            (self.min_angle, self.max_angle)
        } else {
            (self.max_angle, self.min_angle)
        };
        angle >= lo && angle <= hi
    }

    #[inline]
    pub fn angle_to_duty(&self, angle: f32) -> u16 {
        angle_to_duty(
            angle,
            self.min_angle,
            self.max_angle,
            self.duty_min,
            self.duty_max,
        )
    }

    /// Map an angle to duty, recording whether the calibration clamp engaged.
    ///
    /// `safety_clamped` is always false here; the gimbal sets it once the safety limits are applied.
    pub fn map(&self, angle: f32) -> DutyCommand {
        let clamped = clamp_between(angle, self.min_angle, self.max_angle);
        DutyCommand {
            angle: clamped,
            duty: self.angle_to_duty(clamped),
            angle_clamped: clamped != angle,
            safety_clamped: false,
        }
    }

    /// Inverse of [`angle_to_duty`](Self::angle_to_duty). Duty is clamped into the calibrated range
    /// first.
    pub fn duty_to_angle(&self, duty: u16) -> f32 {
        let (dmin, dmax) = (self.duty_min as f32, self.duty_max as f32);
        if self.duty_min == self.duty_max {
            return self.min_angle;
        }
        let duty = clamp_between(duty as f32, dmin, dmax);
        self.min_angle + (duty - dmin) * (self.max_angle - self.min_angle) / (dmax - dmin)
    }
}

/// Absolute duty range the servos may ever be driven with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SafetyLimits {
    pub duty_lo: u16,
    pub duty_hi: u16,
}

impl SafetyLimits {
    pub const fn new(duty_lo: u16, duty_hi: u16) -> Self {
        Self { duty_lo, duty_hi }
    }

    /// Clamp a duty value. Returns the value to write and whether it was changed.
    #[inline]
    pub fn apply(&self, duty: u16) -> (u16, bool) {
        let safe = duty
            .max(self.duty_lo.min(self.duty_hi))
            .min(self.duty_lo.max(self.duty_hi));
        (safe, safe != duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAN: ServoCalibration = ServoCalibration::new(9.0, 171.0, 24, 96);

    #[test]
    fn boundary_angles_map_to_boundary_duty() {
        assert_eq!(PAN.angle_to_duty(9.0), 24);
        assert_eq!(PAN.angle_to_duty(171.0), 96);
    }

    #[test]
    fn out_of_range_angles_clamp_before_mapping() {
        assert_eq!(PAN.angle_to_duty(-40.0), 24);
        assert_eq!(PAN.angle_to_duty(500.0), 96);

        let cmd = PAN.map(200.0);
        assert!(cmd.angle_clamped);
        assert_eq!(cmd.angle, 171.0);
        assert_eq!(cmd.duty, 96);
    }

    #[test]
    fn mapping_rounds_to_nearest_unit() {
        // 33.5 deg -> 24 + 24.5 * 72 / 162 = 34.888 -> 35
        assert_eq!(angle_to_duty(33.5, 9.0, 171.0, 24, 96), 35);
        // 32.0 deg -> 34.222 -> 34
        assert_eq!(angle_to_duty(32.0, 9.0, 171.0, 24, 96), 34);
    }

    #[test]
    fn in_range_map_reports_no_clamp() {
        let cmd = PAN.map(90.0);
        assert!(!cmd.angle_clamped);
        assert!(!cmd.safety_clamped);
        assert_eq!(cmd.duty, 60);
    }

    #[test]
    fn duty_to_angle_inverts_boundaries() {
        assert_eq!(PAN.duty_to_angle(24), 9.0);
        assert_eq!(PAN.duty_to_angle(96), 171.0);
        assert_eq!(PAN.duty_to_angle(60), 90.0);
        assert_eq!(PAN.duty_to_angle(0), 9.0);
        assert_eq!(PAN.duty_to_angle(1000), 171.0);
    }

    #[test]
    fn safety_limits_clamp_independently() {
        let limits = SafetyLimits::new(30, 90);
        assert_eq!(limits.apply(24), (30, true));
        assert_eq!(limits.apply(96), (90, true));
        assert_eq!(limits.apply(60), (60, false));
    }

    #[test]
    fn map_range_clamps_output() {
        assert_eq!(map_range(0.0, 0.0, 640.0, -50.0, 50.0), -50.0);
        assert_eq!(map_range(640.0, 0.0, 640.0, -50.0, 50.0), 50.0);
        assert_eq!(map_range(320.0, 0.0, 640.0, -50.0, 50.0), 0.0);
        assert_eq!(map_range(900.0, 0.0, 640.0, -50.0, 50.0), 50.0);
        assert_eq!(map_range(-10.0, 0.0, 640.0, 50.0, -50.0), 50.0);
    }

    #[test]
    fn degenerate_calibration_does_not_divide_by_zero() {
        let fixed = ServoCalibration::new(45.0, 45.0, 50, 50);
        assert_eq!(fixed.angle_to_duty(45.0), 50);
        assert_eq!(fixed.duty_to_angle(50), 45.0);
    }

    #[test]
    fn reversed_angle_bounds_do_not_panic() {
        let flipped = ServoCalibration::new(171.0, 9.0, 24, 96);
        let cmd = flipped.map(90.0);
        assert!(!cmd.angle_clamped);
        assert_eq!(cmd.duty, 60);
        assert!(flipped.contains(90.0));

        let cmd = flipped.map(500.0);
        assert!(cmd.angle_clamped);
        assert_eq!(cmd.angle, 171.0);
        assert_eq!(
            ServoCalibration::try_new(171.0, 9.0, 24, 96),
            Err(CalibrationError::AngleRange {
                min: 171.0,
                max: 9.0
            })
        );
    }

    #[test]
    fn nan_bounds_do_not_panic_and_are_rejected() {
        let broken = ServoCalibration::new(f32::NAN, 171.0, 24, 96);
        let _ = broken.map(90.0);
        assert_eq!(broken.validate(), Err(CalibrationError::NonFiniteAngle));
        assert_eq!(
            ServoCalibration::try_new(9.0, f32::INFINITY, 24, 96),
            Err(CalibrationError::NonFiniteAngle)
        );
    }

    #[test]
    fn reversed_servo_maps_both_ways() {
        let reversed = ServoCalibration::try_new(9.0, 171.0, 96, 24).unwrap();
        assert_eq!(reversed.angle_to_duty(9.0), 96);
        assert_eq!(reversed.angle_to_duty(171.0), 24);
        assert_eq!(reversed.duty_to_angle(96), 9.0);
        assert_eq!(reversed.duty_to_angle(24), 171.0);
        assert_eq!(reversed.duty_to_angle(60), 90.0);
        assert_eq!(reversed.duty_to_angle(0), 171.0);
    }

    #[test]
    fn empty_duty_range_is_rejected() {
        assert_eq!(
            ServoCalibration::try_new(9.0, 171.0, 50, 50),
            Err(CalibrationError::EmptyDutyRange { duty: 50 })
        );
        assert_eq!(PAN.validate(), Ok(()));
    }

    #[test]
    fn swapped_safety_limits_still_clamp() {
        let limits = SafetyLimits::new(90, 30);
        assert_eq!(limits.apply(10), (30, true));
        assert_eq!(limits.apply(200), (90, true));
    }
}
