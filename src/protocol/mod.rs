// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Vision Sensor Protocol
//!
//! The sensor talks to the gimbal over one UART in two mutually exclusive modes: a continuous
//! stream of checksummed coordinate frames, and blocking command/response sessions.
//!
//! ## Modules
//!
//! - [`messages`] - Wire constants and typed payloads.
//! - [`fields`] - Cursor reader for fields inside a response payload.
//! - [`parser`] - Byte-at-a-time frame synchronizer for the coordinate stream.
//! - [`target`] - Lock-free cell carrying the latest coordinate out of the interrupt.
//! - [`exchange`] - Command/response sessions and the sensor self-check.

pub mod exchange;
pub mod fields;
pub mod messages;
pub mod parser;
pub mod target;

pub use exchange::{CommandLink, Flow, SplitPort, Transport};
pub use fields::FieldReader;
pub use messages::ServoParams;
pub use parser::{FrameEvent, FrameStats, FrameSync};
pub use target::{TargetCell, TargetCoordinate, TargetWatch};
