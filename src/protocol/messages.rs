// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wire constants of the vision-sensor link and the typed responses built on them.

use crate::error::ParamsError;
use crate::protocol::fields::FieldReader;

/// Sync byte. Appears twice at the start of every coordinate frame.
pub const SYNC_BYTE: u8 = 0xAA;

/// End byte. Appears twice at the end of every coordinate frame and closes every response segment.
pub const END_BYTE: u8 = 0xFF;

/// Length of a coordinate frame including both sync and both end bytes.
pub const FRAME_LEN: usize = 9;

// Index of the checksum byte in a coordinate frame.
pub const FRAME_CHECKSUM_INDEX: usize = 6;

// Command bytes
pub const CMD_SELF_CHECK: u8 = 0x1A;
pub const ACK_SELF_CHECK: u8 = 0x1B;
pub const CMD_STOP: u8 = 0x1C;

/// Trailer closing every response segment.
pub const RESPONSE_TERMINATOR: [u8; 3] = [0x01, 0xFE, END_BYTE];

/// Largest response segment the exchange will buffer, terminator included.
pub const RESPONSE_CAPACITY: usize = 128;

/// Header of the servo-parameter payload.
pub const PARAMS_HEADER: [u8; 2] = [0xFF, 0xFE];

/// Largest angle either servo-parameter field may carry.
pub const PARAMS_MAX_ANGLE: u8 = 171;

/// Servo parameters reported by the sensor.
///
/// Layout: `FF FE base arm r0 r1 r2 r3 r4 bcc`, where `bcc` is the XOR of the seven data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoParams {
    pub base_angle: u8,
    pub arm_angle: u8,
    pub reserved: [u8; 5],
}

impl ServoParams {
    pub const LEN: usize = 10;

    pub fn decode(payload: &[u8]) -> Result<Self, ParamsError> {
        let mut r = FieldReader::new(payload);

        let h0 = r.byte()?;
        let h1 = r.byte()?;
        if [h0, h1] != PARAMS_HEADER {
            return Err(ParamsError::BadHeader(h0, h1));
        }

        let data = r.bytes(7)?;
        let received = r.byte()?;
        let computed = data.iter().fold(0u8, |acc, b| acc ^ b);
        if computed != received {
            return Err(ParamsError::Checksum { computed, received });
        }

        let base_angle = data[0];
        let arm_angle = data[1];
        for angle in [base_angle, arm_angle] {
            if angle > PARAMS_MAX_ANGLE {
                return Err(ParamsError::AngleOutOfRange(angle));
            }
        }

        let mut reserved = [0u8; 5];
        reserved.copy_from_slice(&data[2..]);

        Ok(Self {
            base_angle,
            arm_angle,
            reserved,
        })
    }

    /// Encode into the 10-byte wire layout.
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[..2].copy_from_slice(&PARAMS_HEADER);
        out[2] = self.base_angle;
        out[3] = self.arm_angle;
        out[4..9].copy_from_slice(&self.reserved);
        out[9] = out[2..9].iter().fold(0u8, |acc, b| acc ^ b);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn decodes_valid_payload() {
        // bcc = 0x5A ^ 0x2D = 0x77
        let payload = [0xFF, 0xFE, 0x5A, 0x2D, 0, 0, 0, 0, 0, 0x77];
        let params = ServoParams::decode(&payload).unwrap();
        assert_eq!(params.base_angle, 90);
        assert_eq!(params.arm_angle, 45);
        assert_eq!(params.encode(), payload);
    }

    #[test]
    fn rejects_bad_header() {
        let payload = [0xFF, 0x00, 0x5A, 0x2D, 0, 0, 0, 0, 0, 0x77];
        assert_eq!(
            ServoParams::decode(&payload),
            Err(ParamsError::BadHeader(0xFF, 0x00))
        );
    }

    #[test]
    fn rejects_checksum_mismatch() {
        let payload = [0xFF, 0xFE, 0x5A, 0x2D, 0, 0, 0, 0, 0, 0x78];
        assert_eq!(
            ServoParams::decode(&payload),
            Err(ParamsError::Checksum {
                computed: 0x77,
                received: 0x78
            })
        );
    }

    #[test]
    fn rejects_angle_above_limit() {
        let params = ServoParams {
            base_angle: 172,
            arm_angle: 0,
            reserved: [0; 5],
        };
        assert_eq!(
            ServoParams::decode(&params.encode()),
            Err(ParamsError::AngleOutOfRange(172))
        );
    }

    #[test]
    fn short_payload_is_a_field_error() {
        let err = ServoParams::decode(&[0xFF, 0xFE, 0x5A]).unwrap_err();
        assert!(matches!(
            err,
            ParamsError::Field(FieldError::UnexpectedEnd { .. })
        ));
    }
}
