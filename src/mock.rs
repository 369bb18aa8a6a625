// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side stand-ins for the board peripherals, used by the unit tests.

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::PwmPin;

use crate::protocol::exchange::Transport;

/// PWM channel that records the last duty and enable state.
#[derive(Debug, Default)]
pub struct MockPwm {
    pub duty: u16,
    pub enabled: bool,
    pub writes: usize,
}

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PwmPin for MockPwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        800
    }

    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
        self.writes += 1;
    }
}

/// Delay that only accumulates the requested time.
#[derive(Debug, Default)]
pub struct MockDelay {
    pub elapsed_us: u64,
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }
}

impl DelayMs<u32> for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_us += ms as u64 * 1000;
    }
}

impl DelayUs<u32> for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault;

/// Scripted byte link. Reads drain `rx` and block once it is empty.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    /// Number of `flush` polls that report busy before draining.
    pub busy_polls: usize,
    /// Fail every read with a hardware error.
    pub rx_fault: bool,
}

impl MockTransport {
    pub fn with_rx(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl Transport for MockTransport {
    type Error = MockFault;

    fn write(&mut self, byte: u8) -> nb::Result<(), MockFault> {
        self.tx.push(byte);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), MockFault> {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    fn read(&mut self) -> nb::Result<u8, MockFault> {
        if self.rx_fault {
            return Err(nb::Error::Other(MockFault));
        }
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}
