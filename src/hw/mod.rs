// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Board Support
//!
//! MCU-level wrappers for the STM32F777 gimbal board. Only built with the `firmware` feature.
//!
//! ## Modules
//!
//! - [`pins`] - Named pin map of the board.
//! - [`servo_pwm`] - TIM3 servo outputs implementing `PwmPin`.
//! - [`usart`] - Debug terminal and the `log` backend on top of it.
//! - [`led`] - Status LED patterns.

pub mod led;
pub mod pins;
pub mod servo_pwm;
pub mod usart;

pub use led::{Led, Status, StatusLeds};
pub use pins::BoardPins;
pub use servo_pwm::{ServoChannel, ServoPwm};
pub use usart::{Usart, UsartLogger};
