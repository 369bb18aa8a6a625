// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Gimbal Tracker Firmware
//!
//! This crate contains the firmware for a dual-axis servo tracking gimbal, written in Rust,
//! targeting an STM32F777 MCU. A vision sensor streams target coordinates over a UART; the gimbal
//! keeps the target centred with one PID loop per axis and drives two hobby servos through a
//! calibrated, hard-clamped PWM mapping.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`protocol`] | Sensor link: frame synchronizer, command/response exchange, field decoding |
//! | [`control`] | Control algorithms (PID, per-tick target tracking) |
//! | [`servo`] | Angle → duty calibration, safety clamp, two-axis gimbal |
//! | [`config`] | Calibration and tuning |
//! | [`error`] | Error types |
//! | `hw` | MCU-level wrappers for timers, USART and LEDs (feature `firmware`) |
//!
//! Everything except `hw` is hardware-independent and is tested on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features firmware --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod error;
pub mod protocol;
pub mod servo;

#[cfg(feature = "firmware")]
pub mod hw;

#[cfg(test)]
mod mock;
