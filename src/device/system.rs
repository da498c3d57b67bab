use std::fs;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::log_debug;

/// Side effects the engine may trigger on the host.
pub trait SystemActions: Send + Sync {
    /// Emergency reboot from the hotkey chord.
    fn reboot(&self);
    /// Haptic pulse for `ms` milliseconds.
    fn vibrate(&self, ms: u32);
}

/// Real device actions. Reboot is refused unless explicitly allowed.
#[derive(Debug, Clone)]
pub struct LinuxSystem {
    allow_reboot: bool,
    vibrator: PathBuf,
}

impl LinuxSystem {
    pub fn new(allow_reboot: bool, vibrator: PathBuf) -> Self {
        Self {
            allow_reboot,
            vibrator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.allow_reboot, config.vibrator_path.clone())
    }
}

impl SystemActions for LinuxSystem {
    fn reboot(&self) {
        if !self.allow_reboot {
            log_debug("reboot requested but not allowed (pass --allow-reboot)");
            return;
        }
        log_debug("rebooting");
        // SAFETY: sync() and reboot() take no pointers; reboot only returns on failure.
        let rc = unsafe {
            libc::sync();
            libc::reboot(libc::RB_AUTOBOOT)
        };
        if rc != 0 {
            log_debug(&format!("reboot failed: {}", std::io::Error::last_os_error()));
        }
    }

    fn vibrate(&self, ms: u32) {
        if let Err(err) = fs::write(&self.vibrator, ms.to_string()) {
            log_debug(&format!("vibrate failed ({}): {err}", self.vibrator.display()));
        }
    }
}
