// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types for the gimbal firmware.
//!
//! Only conditions that the caller has to decide about are errors. Checksum drops in the frame
//! synchronizer and angle/duty clamps in the servo layer are reported as outcome values instead,
//! because the control loop keeps running through them.

use thiserror::Error;

use crate::servo::Axis;

/// Failure to read a field out of a response payload.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("field needs {needed} bytes at offset {offset}, payload has {len}")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("string at offset {offset} has no null terminator")]
    Unterminated { offset: usize },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
}

/// Errors surfaced by the command/response link to the vision sensor.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("transport error while {0}")]
    Transport(Stage),

    #[error("timed out after {waited_ms} ms while {stage}")]
    Timeout { stage: Stage, waited_ms: u32 },

    #[error("response segment exceeds {capacity} bytes")]
    ResponseOverflow { capacity: usize },

    #[error("response handler failed: {0}")]
    Decode(#[from] FieldError),

    #[error("sensor self-check not acknowledged after {attempts} bytes")]
    SelfCheckFailed { attempts: u32 },
}

/// Which part of an exchange was in progress when the link failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SendingCommand,
    WaitingAck,
    ReadingResponse,
    SendingStop,
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Stage::SendingCommand => "sending command",
            Stage::WaitingAck => "waiting for ack",
            Stage::ReadingResponse => "reading response",
            Stage::SendingStop => "sending stop",
        };
        f.write_str(s)
    }
}

/// Rejections from the absolute angle interface of the gimbal.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GimbalError {
    #[error("gimbal is not initialized")]
    NotInitialized,

    #[error("{axis:?} angle {angle} outside [{min}, {max}]")]
    AngleOutOfRange {
        axis: Axis,
        angle: f32,
        min: f32,
        max: f32,
    },
}

/// A servo calibration that cannot be used.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error("angle bounds must be finite")]
    NonFiniteAngle,

    #[error("angle range [{min}, {max}] is empty or reversed")]
    AngleRange { min: f32, max: f32 },

    #[error("duty range is empty (both ends {duty})")]
    EmptyDutyRange { duty: u16 },
}

/// Errors decoding the servo-parameter payload.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsError {
    #[error("payload too short: {0}")]
    Field(#[from] FieldError),

    #[error("bad header {0:#04x} {1:#04x}")]
    BadHeader(u8, u8),

    #[error("checksum mismatch: computed {computed:#04x}, received {received:#04x}")]
    Checksum { computed: u8, received: u8 },

    #[error("servo angle {0} out of range")]
    AngleOutOfRange(u8),
}

pub type LinkResult<T> = Result<T, LinkError>;
pub type GimbalResult<T> = Result<T, GimbalError>;
