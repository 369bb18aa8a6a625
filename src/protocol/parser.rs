// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Frame synchronizer for the coordinate stream of the vision sensor.
//!
//! Frames look like `AA AA xh xl yh yl chk FF FF`. The synchronizer is fed one byte at a time from
//! the receive interrupt: a doubled sync byte realigns the accumulator, and a doubled end byte
//! closes the frame. A frame is committed only if the low byte of `xh + xl + yh + yl` equals
//! `chk`; anything else is dropped without side effects.
//!
//! This runs in interrupt context, so it never blocks, allocates or logs.

use crate::protocol::messages::*;
use crate::protocol::target::TargetCoordinate;

/// What a single byte did to the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Byte stored in the accumulator.
    Stored,
    /// Doubled sync byte seen, accumulator realigned.
    Resync,
    /// Doubled end byte closed a valid frame.
    Committed(TargetCoordinate),
    /// Doubled end byte closed a frame whose checksum did not match.
    ChecksumMismatch,
}

/// Running totals, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub committed: u32,
    pub checksum_errors: u32,
    pub resyncs: u32,
}

pub struct FrameSync {
    buf: [u8; FRAME_LEN],
    pt: usize,
    last_byte: u8,
    stats: FrameStats,
}

impl FrameSync {
    pub const fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            pt: 0,
            last_byte: 0,
            stats: FrameStats {
                committed: 0,
                checksum_errors: 0,
                resyncs: 0,
            },
        }
    }

    /// Process a single incoming byte.
    pub fn push(&mut self, byte: u8) -> FrameEvent {
        let event = if byte == SYNC_BYTE && self.last_byte == SYNC_BYTE {
            self.buf[0] = SYNC_BYTE;
            self.buf[1] = SYNC_BYTE;
            self.pt = 2;
            self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
            FrameEvent::Resync
        } else if byte == END_BYTE && self.last_byte == END_BYTE {
            match self.decode() {
                Some(coord) => {
                    self.stats.committed = self.stats.committed.wrapping_add(1);
                    FrameEvent::Committed(coord)
                }
                None => {
                    self.stats.checksum_errors = self.stats.checksum_errors.wrapping_add(1);
                    FrameEvent::ChecksumMismatch
                }
            }
        } else {
            self.buf[self.pt] = byte;
            self.pt = (self.pt + 1) % FRAME_LEN;
            FrameEvent::Stored
        };

        self.last_byte = byte;
        event
    }

    /// Checksum and decode whatever sits in the payload slots.
    fn decode(&self) -> Option<TargetCoordinate> {
        let b = &self.buf;
        let sum = b[2]
            .wrapping_add(b[3])
            .wrapping_add(b[4])
            .wrapping_add(b[5]);
        if sum != b[FRAME_CHECKSUM_INDEX] {
            return None;
        }
        Some(TargetCoordinate {
            x: u16::from_be_bytes([b[2], b[3]]),
            y: u16::from_be_bytes([b[4], b[5]]),
        })
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

impl Default for FrameSync {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(sync: &mut FrameSync, bytes: &[u8]) -> Option<FrameEvent> {
        bytes.iter().map(|&b| sync.push(b)).last()
    }

    #[test]
    fn valid_frame_commits() {
        let mut sync = FrameSync::new();
        let last = feed(&mut sync, &[0xAA, 0xAA, 0x00, 0xC8, 0x00, 0x96, 0x5E, 0xFF, 0xFF]);
        assert_eq!(
            last,
            Some(FrameEvent::Committed(TargetCoordinate { x: 200, y: 150 }))
        );
        assert_eq!(sync.stats().committed, 1);
    }

    #[test]
    fn checksum_wraps_mod_256() {
        let mut sync = FrameSync::new();
        // 0x01 + 0xF4 + 0x01 + 0x2C = 0x222 -> 0x22
        let last = feed(&mut sync, &[0xAA, 0xAA, 0x01, 0xF4, 0x01, 0x2C, 0x22, 0xFF, 0xFF]);
        assert_eq!(
            last,
            Some(FrameEvent::Committed(TargetCoordinate { x: 500, y: 300 }))
        );
    }

    #[test]
    fn bad_checksum_is_dropped() {
        let mut sync = FrameSync::new();
        let last = feed(&mut sync, &[0xAA, 0xAA, 0x00, 0xC8, 0x00, 0x96, 0x5F, 0xFF, 0xFF]);
        assert_eq!(last, Some(FrameEvent::ChecksumMismatch));
        assert_eq!(sync.stats().committed, 0);
        assert_eq!(sync.stats().checksum_errors, 1);
    }

    #[test]
    fn garbage_before_sync_is_ignored() {
        let mut sync = FrameSync::new();
        feed(&mut sync, &[0x13, 0x37, 0xAA, 0x42, 0x00, 0x10]);
        let last = feed(&mut sync, &[0xAA, 0xAA, 0x01, 0x40, 0x00, 0xF0, 0x31, 0xFF, 0xFF]);
        assert_eq!(
            last,
            Some(FrameEvent::Committed(TargetCoordinate { x: 320, y: 240 }))
        );
    }

    #[test]
    fn truncated_frame_is_recovered_by_next_sync() {
        let mut sync = FrameSync::new();
        feed(&mut sync, &[0xAA, 0xAA, 0x00, 0xC8]);
        let events: Vec<_> = [0xAA, 0xAA, 0x00, 0x0A, 0x00, 0x14, 0x1E, 0xFF, 0xFF]
            .iter()
            .map(|&b| sync.push(b))
            .collect();
        assert_eq!(events[1], FrameEvent::Resync);
        assert_eq!(
            events[8],
            FrameEvent::Committed(TargetCoordinate { x: 10, y: 20 })
        );
    }

    #[test]
    fn back_to_back_frames() {
        let mut sync = FrameSync::new();
        let frame = [0xAA, 0xAA, 0x00, 0xC8, 0x00, 0x96, 0x5E, 0xFF, 0xFF];
        feed(&mut sync, &frame);
        feed(&mut sync, &frame);
        assert_eq!(sync.stats().committed, 2);
        assert_eq!(sync.stats().resyncs, 2);
    }

    #[test]
    fn accumulator_wraps_without_panicking() {
        let mut sync = FrameSync::new();
        for b in 0..40u8 {
            assert_eq!(sync.push(b), FrameEvent::Stored);
        }

        // Twelve payload bytes overrun the accumulator; the wrapped slots fail the checksum.
        let mut oversized = std::vec![0xAA, 0xAA];
        oversized.extend(1..=12u8);
        oversized.extend([0xFF, 0xFF]);
        assert_eq!(feed(&mut sync, &oversized), Some(FrameEvent::ChecksumMismatch));
        assert_eq!(sync.stats().committed, 0);

        let last = feed(&mut sync, &[0xAA, 0xAA, 0x00, 0xC8, 0x00, 0x96, 0x5E, 0xFF, 0xFF]);
        assert_eq!(
            last,
            Some(FrameEvent::Committed(TargetCoordinate { x: 200, y: 150 }))
        );
    }
}
