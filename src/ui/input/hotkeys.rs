use crate::ui::event::keys;
use crate::ui::key_table::KeyTable;

/// Global chords checked on every key-down before the key reaches the queue.
///
/// `code` is the key that just went down; `pressed` already includes it.
pub trait Hotkeys: Send + Sync {
    /// Cycle to the next tab.
    fn toggle_display(&self, pressed: &KeyTable, code: u16) -> bool;
    /// Reboot immediately.
    fn reboot_now(&self, pressed: &KeyTable, code: u16) -> bool;
}

/// Alt+L or Power+VolumeUp cycles tabs; VolumeUp+VolumeDown+Power reboots.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHotkeys;

impl Hotkeys for DefaultHotkeys {
    fn toggle_display(&self, pressed: &KeyTable, code: u16) -> bool {
        (code == keys::KEY_L && pressed.is_down(keys::KEY_LEFTALT))
            || (code == keys::KEY_VOLUMEUP && pressed.is_down(keys::KEY_POWER))
    }

    fn reboot_now(&self, pressed: &KeyTable, code: u16) -> bool {
        code == keys::KEY_POWER
            && pressed.is_down(keys::KEY_VOLUMEUP)
            && pressed.is_down(keys::KEY_VOLUMEDOWN)
    }
}

/// Never fires; for hosts that handle chords themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHotkeys;

impl Hotkeys for NoHotkeys {
    fn toggle_display(&self, _pressed: &KeyTable, _code: u16) -> bool {
        false
    }

    fn reboot_now(&self, _pressed: &KeyTable, _code: u16) -> bool {
        false
    }
}
