// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the closed-loop building blocks of the gimbal.
//!
//! ## Modules
//!
//! - [`pid`] - Tick-based PID controller with anti-windup.
//! - [`tracking`] - Per-tick target tracking for both gimbal axes.

pub mod pid;
pub mod tracking;

pub use pid::Pid;
pub use tracking::{AxisReport, AxisTracker, TickReport, TrackingController, TrackingMode};
