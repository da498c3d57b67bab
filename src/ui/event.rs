//! Normalized input events handed from the capture thread to the decision loop.

use std::time::Instant;

/// Linux input key codes the engine and its default mappings care about.
pub mod keys {
    pub const KEY_ESC: u16 = 1;
    pub const KEY_R: u16 = 19;
    pub const KEY_TAB: u16 = 15;
    pub const KEY_ENTER: u16 = 28;
    pub const KEY_L: u16 = 38;
    pub const KEY_LEFTALT: u16 = 56;
    pub const KEY_HOME: u16 = 102;
    pub const KEY_UP: u16 = 103;
    pub const KEY_LEFT: u16 = 105;
    pub const KEY_RIGHT: u16 = 106;
    pub const KEY_END: u16 = 107;
    pub const KEY_DOWN: u16 = 108;
    pub const KEY_VOLUMEDOWN: u16 = 114;
    pub const KEY_VOLUMEUP: u16 = 115;
    pub const KEY_POWER: u16 = 116;
    pub const KEY_MENU: u16 = 139;
    pub const KEY_BACK: u16 = 158;
    pub const KEY_CAMERA: u16 = 212;
    pub const KEY_SEARCH: u16 = 217;
    pub const BTN_TOUCH: u16 = 0x14a;
    pub const KEY_MAX: u16 = 0x2ff;
}

/// Phase of a single-finger touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Drag,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Key transition; the queue only ever carries key-downs.
    Key { code: u16, down: bool },
    Touch { phase: TouchPhase, x: i32, y: i32 },
}

/// One queued input event, stamped when the capture thread classified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub at: Instant,
}

impl InputEvent {
    pub fn key(code: u16, at: Instant) -> Self {
        Self {
            kind: EventKind::Key { code, down: true },
            at,
        }
    }

    pub fn touch(phase: TouchPhase, x: i32, y: i32, at: Instant) -> Self {
        Self {
            kind: EventKind::Touch { phase, x, y },
            at,
        }
    }
}
