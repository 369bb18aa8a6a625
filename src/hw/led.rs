// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LEDs.
//!
//! The board has a red, yellow and green LED, all active-low. [`StatusLeds`] turns the firmware
//! state into a light pattern:
//!
//! | Status | Red | Yellow | Green |
//! | ------ | --- | ------ | ----- |
//! | Booting | off | on | off |
//! | Searching | off | blink | off |
//! | Tracking | off | off | blink |
//! | Fault | on | off | off |

use embedded_hal::digital::v2::OutputPin;

/// One active-low LED.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn active_low(mut pin: PIN) -> Self {
        pin.set_high().ok();
        Self { pin, is_on: false }
    }

    pub fn set(&mut self, on: bool) {
        if on {
            self.pin.set_low().ok();
        } else {
            self.pin.set_high().ok();
        }
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }
}

/// Firmware state shown on the LEDs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Peripherals up, waiting for the sensor self-check.
    Booting,
    /// Tracking loop running, no target received yet.
    Searching,
    /// Tracking loop following a target.
    Tracking,
    /// Sensor never answered; servos disabled.
    Fault,
}

pub struct StatusLeds<R: OutputPin, Y: OutputPin, G: OutputPin> {
    red: Led<R>,
    yellow: Led<Y>,
    green: Led<G>,
    status: Status,
}

impl<R: OutputPin, Y: OutputPin, G: OutputPin> StatusLeds<R, Y, G> {
    pub fn new(red: R, yellow: Y, green: G) -> Self {
        let mut leds = Self {
            red: Led::active_low(red),
            yellow: Led::active_low(yellow),
            green: Led::active_low(green),
            status: Status::Booting,
        };
        leds.show(Status::Booting);
        leds
    }

    /// Switch to the pattern for `status`.
    pub fn show(&mut self, status: Status) {
        self.status = status;
        self.red.set(status == Status::Fault);
        self.yellow
            .set(matches!(status, Status::Booting | Status::Searching));
        self.green.set(status == Status::Tracking);
    }

    /// Advance the blink of the current pattern. Call at a steady rate.
    pub fn tick(&mut self) {
        match self.status {
            Status::Searching => self.yellow.toggle(),
            Status::Tracking => self.green.toggle(),
            Status::Booting | Status::Fault => {}
        }
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }
}
