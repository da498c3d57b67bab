//! Host collaborators: raw input devices, status probes and system actions.

mod evdev;
mod status;
mod system;

use std::io;
use std::time::{Duration, Instant};

pub use evdev::EvdevInput;
pub use status::{clock_text, StatusCache, StatusProbe, StatusSnapshot, SysfsStatus};
pub use system::{LinuxSystem, SystemActions};

/// Relative axis code for vertical trackball motion.
pub const REL_Y: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Sync,
    Key,
    Relative,
    /// One complete touch report: `code` is the contact flag, `value` packs `x << 16 | y`.
    Absolute,
    Other(u16),
}

/// One decoded sample from an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub kind: SampleKind,
    pub code: u16,
    pub value: i32,
    pub timestamp: Instant,
}

impl RawSample {
    pub fn key(code: u16, down: bool, timestamp: Instant) -> Self {
        Self {
            kind: SampleKind::Key,
            code,
            value: i32::from(down),
            timestamp,
        }
    }

    pub fn relative(code: u16, value: i32, timestamp: Instant) -> Self {
        Self {
            kind: SampleKind::Relative,
            code,
            value,
            timestamp,
        }
    }

    /// Touch report at `(x, y)`; coordinates are clamped to 16 bits each.
    pub fn touch(x: i32, y: i32, contact: bool, timestamp: Instant) -> Self {
        let x = x.clamp(0, 0x7fff);
        let y = y.clamp(0, 0xffff);
        Self {
            kind: SampleKind::Absolute,
            code: u16::from(contact),
            value: (x << 16) | y,
            timestamp,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.value >> 16, self.value & 0xffff)
    }
}

/// A source of raw input samples.
pub trait InputDevice: Send {
    /// Wait at most `timeout` for the next sample. `Ok(None)` on timeout.
    fn next_sample(&mut self, timeout: Duration) -> io::Result<Option<RawSample>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_packs_position() {
        let sample = RawSample::touch(321, 654, true, Instant::now());
        assert_eq!(sample.position(), (321, 654));
        assert_eq!(sample.code, 1);
        let released = RawSample::touch(-5, 70_000, false, Instant::now());
        assert_eq!(released.position(), (0, 0xffff));
        assert_eq!(released.code, 0);
    }
}
