// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo PWM on TIM3 CH1/CH2.
//!
//! The timer is prescaled to a 25 µs tick with an 800-tick period, giving the standard 20 ms servo
//! frame. Duty values are therefore in ticks: 24 – 96 is a 0.6 ms – 2.4 ms pulse.

use embedded_hal::PwmPin;
use stm32f7xx_hal::{pac, rcc::Clocks};

/// Timer ticks per second.
const TICK_HZ: u32 = 40_000;

/// Ticks per 20 ms frame.
pub const PERIOD_TICKS: u16 = 800;

/// TIM3 configured for two PWM outputs.
pub struct ServoPwm {
    _tim: pac::TIM3,
}

impl ServoPwm {
    pub fn tim3(tim3: pac::TIM3, clocks: &Clocks) -> Self {
        let tim = tim3;

        // Timer clock on APB1
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim3en().set_bit());

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let psc = clocks.timclk1().raw() / TICK_HZ - 1;
        tim.psc.write(|w| unsafe { w.bits(psc) });
        tim.arr.write(|w| unsafe { w.bits(PERIOD_TICKS as u32 - 1) });

        // CH1/CH2: PWM mode 1 (OCxM = 110) with preload (OCxPE)
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits((0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11)) });

        // Outputs stay off until the channel is enabled.
        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // Latch PSC/ARR, then start with auto-reload preload
        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

        Self { _tim: tim }
    }

    /// Split into the pan (CH1) and tilt (CH2) outputs.
    pub fn split(self) -> (ServoChannel, ServoChannel) {
        (
            ServoChannel {
                channel: Channel::C1,
            },
            ServoChannel {
                channel: Channel::C2,
            },
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Channel {
    C1,
    C2,
}

/// One TIM3 output channel.
pub struct ServoChannel {
    channel: Channel,
}

impl ServoChannel {
    #[inline]
    fn tim(&self) -> &'static pac::tim3::RegisterBlock {
        // Each channel only touches its own CCR and CCER bit.
        unsafe { &*pac::TIM3::ptr() }
    }

    #[inline]
    fn ccer_mask(&self) -> u32 {
        match self.channel {
            Channel::C1 => 1 << 0,
            Channel::C2 => 1 << 4,
        }
    }
}

impl PwmPin for ServoChannel {
    type Duty = u16;

    fn disable(&mut self) {
        let mask = self.ccer_mask();
        cortex_m::interrupt::free(|_| {
            self.tim()
                .ccer
                .modify(|r, w| unsafe { w.bits(r.bits() & !mask) })
        });
    }

    fn enable(&mut self) {
        let mask = self.ccer_mask();
        cortex_m::interrupt::free(|_| {
            self.tim()
                .ccer
                .modify(|r, w| unsafe { w.bits(r.bits() | mask) })
        });
    }

    fn get_duty(&self) -> u16 {
        let tim = self.tim();
        match self.channel {
            Channel::C1 => tim.ccr1.read().bits() as u16,
            Channel::C2 => tim.ccr2.read().bits() as u16,
        }
    }

    fn get_max_duty(&self) -> u16 {
        PERIOD_TICKS
    }

    fn set_duty(&mut self, duty: u16) {
        let tim = self.tim();
        match self.channel {
            Channel::C1 => tim.ccr1.write(|w| unsafe { w.bits(duty as u32) }),
            Channel::C2 => tim.ccr2.write(|w| unsafe { w.bits(duty as u32) }),
        }
    }
}
