// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Target coordinate shared between the receive interrupt and the control tick.
//!
//! Both coordinates live in one `AtomicU32` (x in the high half), so a reader can never see x from
//! one frame and y from another. A separate commit counter, stored after the coordinate with
//! release ordering, tells readers whether any frame has arrived yet.

use core::sync::atomic::{AtomicU32, Ordering};

/// Detection centroid in sensor pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetCoordinate {
    pub x: u16,
    pub y: u16,
}

impl TargetCoordinate {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    #[inline]
    const fn pack(self) -> u32 {
        (self.x as u32) << 16 | self.y as u32
    }

    #[inline]
    const fn unpack(raw: u32) -> Self {
        Self {
            x: (raw >> 16) as u16,
            y: raw as u16,
        }
    }
}

pub struct TargetCell {
    coord: AtomicU32,
    commits: AtomicU32,
}

impl TargetCell {
    pub const fn new() -> Self {
        Self {
            coord: AtomicU32::new(0),
            commits: AtomicU32::new(0),
        }
    }

    /// Store a freshly validated coordinate. Called from the receive interrupt.
    pub fn publish(&self, coord: TargetCoordinate) {
        self.coord.store(coord.pack(), Ordering::Relaxed);
        let n = self.commits.load(Ordering::Relaxed);
        self.commits.store(n.wrapping_add(1), Ordering::Release);
    }

    /// Both fields from a single load. Returns (0, 0) before the first commit.
    #[inline]
    pub fn read_snapshot(&self) -> TargetCoordinate {
        TargetCoordinate::unpack(self.coord.load(Ordering::Acquire))
    }

    /// Latest coordinate, or `None` if no frame has been committed yet.
    pub fn latest(&self) -> Option<TargetCoordinate> {
        if self.commits.load(Ordering::Acquire) == 0 {
            None
        } else {
            Some(self.read_snapshot())
        }
    }

    /// Number of committed frames (wrapping).
    #[inline]
    pub fn frames(&self) -> u32 {
        self.commits.load(Ordering::Relaxed)
    }
}

/// Watches the commit counter of a [`TargetCell`] from the control loop.
///
/// The target counts as live while a new frame has arrived within the last `timeout_ticks` polls.
#[derive(Debug, Clone)]
pub struct TargetWatch {
    last_frames: u32,
    idle_ticks: u32,
    timeout_ticks: u32,
}

impl TargetWatch {
    /// Starts out stale.
    pub const fn new(timeout_ticks: u32) -> Self {
        Self {
            last_frames: 0,
            idle_ticks: timeout_ticks,
            timeout_ticks,
        }
    }

    /// Call once per control tick with [`TargetCell::frames`]. Returns true while the target is live.
    pub fn poll(&mut self, frames: u32) -> bool {
        if frames != self.last_frames {
            self.last_frames = frames;
            self.idle_ticks = 0;
        } else {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
        }
        self.idle_ticks < self.timeout_ticks
    }
}

impl Default for TargetCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_first_commit() {
        let cell = TargetCell::new();
        assert_eq!(cell.latest(), None);
        assert_eq!(cell.read_snapshot(), TargetCoordinate::new(0, 0));
        assert_eq!(cell.frames(), 0);
    }

    #[test]
    fn latest_returns_both_fields_of_last_publish() {
        let cell = TargetCell::new();
        cell.publish(TargetCoordinate::new(200, 150));
        cell.publish(TargetCoordinate::new(0xFFFF, 1));
        assert_eq!(cell.latest(), Some(TargetCoordinate::new(0xFFFF, 1)));
        assert_eq!(cell.frames(), 2);
    }

    #[test]
    fn watch_goes_stale_when_frames_stop() {
        let cell = TargetCell::new();
        let mut watch = TargetWatch::new(3);
        assert!(!watch.poll(cell.frames()));

        cell.publish(TargetCoordinate::new(1, 2));
        assert!(watch.poll(cell.frames()));
        assert!(watch.poll(cell.frames()));
        assert!(watch.poll(cell.frames()));
        assert!(!watch.poll(cell.frames()));

        cell.publish(TargetCoordinate::new(3, 4));
        assert!(watch.poll(cell.frames()));
    }
}
