use std::sync::atomic::{AtomicBool, Ordering};

use super::event::keys::KEY_MAX;

/// Advisory per-key "is down" table.
///
/// Written only by the input thread and read without any lock, so a reader may see a
/// slightly stale value. Good enough for hotkey chords and `key_down` queries; never
/// use it to order events.
#[derive(Debug)]
pub struct KeyTable {
    pressed: Box<[AtomicBool]>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTable {
    pub fn new() -> Self {
        let pressed = (0..=usize::from(KEY_MAX))
            .map(|_| AtomicBool::new(false))
            .collect();
        Self { pressed }
    }

    /// Codes above `KEY_MAX` are ignored.
    pub fn set(&self, code: u16, down: bool) {
        if let Some(slot) = self.pressed.get(usize::from(code)) {
            slot.store(down, Ordering::Relaxed);
        }
    }

    pub fn is_down(&self, code: u16) -> bool {
        self.pressed
            .get(usize::from(code))
            .is_some_and(|slot| slot.load(Ordering::Relaxed))
    }
}
