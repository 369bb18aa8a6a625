// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Closed-loop target tracking for the pan/tilt gimbal.
//!
//! This controller wraps a [`Gimbal`] and provides a periodic `step()` function. Each tick, per
//! axis:
//!
//! 1. The target's pixel coordinate is mapped linearly (and clamped) onto the axis' tracking span.
//!    This is the feed-forward base angle.
//! 2. The PID loop compares the coordinate to the screen centre and yields a correction.
//! 3. `base + correction` goes through the servo calibration and safety clamp to the PWM output.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! let mut controller = TrackingController::new(gimbal, &config);
//!
//! loop {
//!     controller.step(TARGET.latest());
//!     delay.delay_ms(config.tick_ms);
//! }
//! ```

use embedded_hal::PwmPin;

use crate::config::{AxisConfig, GimbalConfig, TrackingRange};
use crate::control::Pid;
use crate::protocol::TargetCoordinate;
use crate::servo::{map_range, Axis, DutyCommand, Gimbal};

/// Operating mode of the tracking controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    /// Follow the latest target every tick.
    Tracking,

    /// Leave the servos where they are.
    Hold,
}

/// Per-axis loop state.
#[derive(Clone, Debug)]
pub struct AxisTracker {
    pid: Pid,
    range: TrackingRange,
}

impl AxisTracker {
    pub fn new(config: &AxisConfig) -> Self {
        Self {
            pid: Pid::from_config(&config.pid),
            range: config.tracking,
        }
    }

    /// Feed-forward angle for a pixel coordinate.
    #[inline]
    pub fn base_angle(&self, raw: f32) -> f32 {
        let r = &self.range;
        map_range(raw, r.coord_min, r.coord_max, r.angle_min, r.angle_max)
    }

    /// Returns `(base, correction)` for one tick.
    pub fn update(&mut self, raw: f32) -> (f32, f32) {
        let base = self.base_angle(raw);
        let correction = self.pid.update(self.range.center, raw);
        (base, correction)
    }

    #[inline]
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    #[inline]
    pub fn pid_mut(&mut self) -> &mut Pid {
        &mut self.pid
    }

    #[inline]
    pub fn range(&self) -> &TrackingRange {
        &self.range
    }
}

/// What one axis did during a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisReport {
    /// Pixel coordinate fed to the loop.
    pub raw: u16,
    pub base: f32,
    pub correction: f32,
    /// Angle and duty actually commanded, with clamp outcomes.
    pub command: DutyCommand,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TickReport {
    pub pan: AxisReport,
    pub tilt: AxisReport,
}

impl TickReport {
    pub fn axis(&self, axis: Axis) -> &AxisReport {
        match axis {
            Axis::Pan => &self.pan,
            Axis::Tilt => &self.tilt,
        }
    }
}

/// Controller state and configuration.
pub struct TrackingController<P, T> {
    gimbal: Gimbal<P, T>,
    pan: AxisTracker,
    tilt: AxisTracker,
    mode: TrackingMode,
}

impl<P, T> TrackingController<P, T>
where
    P: PwmPin<Duty = u16>,
    T: PwmPin<Duty = u16>,
{
    /// Create a tracking controller. Starts in [`TrackingMode::Tracking`].
    pub fn new(gimbal: Gimbal<P, T>, config: &GimbalConfig) -> Self {
        Self {
            gimbal,
            pan: AxisTracker::new(&config.pan),
            tilt: AxisTracker::new(&config.tilt),
            mode: TrackingMode::Tracking,
        }
    }

    #[inline]
    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Switch mode. PID history is kept; call [`reset_pid`](Self::reset_pid) to clear it.
    pub fn set_mode(&mut self, mode: TrackingMode) {
        self.mode = mode;
    }

    pub fn reset_pid(&mut self) {
        self.pan.pid_mut().reset();
        self.tilt.pid_mut().reset();
    }

    #[inline]
    pub fn gimbal(&self) -> &Gimbal<P, T> {
        &self.gimbal
    }

    /// Direct access for the absolute angle interface.
    #[inline]
    pub fn gimbal_mut(&mut self) -> &mut Gimbal<P, T> {
        &mut self.gimbal
    }

    pub fn tracker(&self, axis: Axis) -> &AxisTracker {
        match axis {
            Axis::Pan => &self.pan,
            Axis::Tilt => &self.tilt,
        }
    }

    pub fn into_gimbal(self) -> Gimbal<P, T> {
        self.gimbal
    }

    /// Run one control tick.
    ///
    /// Nothing is written, and `None` returned, while holding, while the gimbal is disabled, or
    /// before the first target has arrived.
    pub fn step(&mut self, target: Option<TargetCoordinate>) -> Option<TickReport> {
        if self.mode == TrackingMode::Hold || !self.gimbal.is_initialized() {
            return None;
        }
        let target = target?;

        let pan = Self::step_axis(&mut self.gimbal, &mut self.pan, Axis::Pan, target.x);
        let tilt = Self::step_axis(&mut self.gimbal, &mut self.tilt, Axis::Tilt, target.y);
        Some(TickReport { pan, tilt })
    }

    fn step_axis(
        gimbal: &mut Gimbal<P, T>,
        tracker: &mut AxisTracker,
        axis: Axis,
        raw: u16,
    ) -> AxisReport {
        let (base, correction) = tracker.update(raw as f32);
        let command = gimbal.drive(axis, base + correction);
        AxisReport {
            raw,
            base,
            correction,
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPwm;

    fn controller() -> TrackingController<MockPwm, MockPwm> {
        let cfg = GimbalConfig::default();
        let mut gimbal = Gimbal::new(MockPwm::new(), MockPwm::new(), &cfg);
        gimbal.init();
        TrackingController::new(gimbal, &cfg)
    }

    #[test]
    fn no_target_writes_nothing() {
        let mut c = controller();
        assert_eq!(c.step(None), None);
        let (pan, tilt) = c.into_gimbal().free();
        // only the centring write from init
        assert_eq!((pan.writes, tilt.writes), (1, 1));
    }

    #[test]
    fn hold_mode_writes_nothing() {
        let mut c = controller();
        c.set_mode(TrackingMode::Hold);
        assert_eq!(c.step(Some(TargetCoordinate::new(10, 10))), None);
        assert_eq!(c.gimbal().angles(), (90.0, 135.0));
    }

    #[test]
    fn centred_target_stays_centred() {
        let mut c = controller();
        for _ in 0..5 {
            let report = c.step(Some(TargetCoordinate::new(320, 240))).unwrap();
            assert_eq!(report.pan.correction, 0.0);
            assert_eq!(report.tilt.correction, 0.0);
            assert_eq!(report.pan.command.duty, 60);
            assert_eq!(report.tilt.command.duty, 60);
        }
    }

    #[test]
    fn off_centre_target_saturates_correction() {
        let mut c = controller();
        let report = c.step(Some(TargetCoordinate::new(200, 150))).unwrap();

        // 39.6 + 200 * 100.8 / 640
        assert!((report.pan.base - 71.1).abs() < 1e-3);
        assert_eq!(report.pan.correction, 10.0);
        assert!((report.pan.command.angle - 81.1).abs() < 1e-3);
        assert_eq!(report.pan.command.duty, 56);

        // 118.5 + 150 * 33 / 480
        assert!((report.tilt.base - 128.8125).abs() < 1e-3);
        assert_eq!(report.tilt.correction, 10.0);
        assert_eq!(report.tilt.command.duty, 61);
    }

    #[test]
    fn coordinates_outside_the_image_clamp() {
        let mut c = controller();
        let report = c.step(Some(TargetCoordinate::new(u16::MAX, u16::MAX))).unwrap();
        assert!((report.pan.base - 140.4).abs() < 1e-3);
        assert_eq!(report.pan.correction, -10.0);
        assert!(!report.pan.command.angle_clamped);
        assert!(report.tilt.command.duty >= 24 && report.tilt.command.duty <= 96);
    }

    #[test]
    fn disabled_gimbal_is_not_driven() {
        let mut c = controller();
        c.gimbal_mut().disable();
        assert_eq!(c.step(Some(TargetCoordinate::new(0, 0))), None);
    }
}
