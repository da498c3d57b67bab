use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::AppConfig;

const ADB_CHARGE_STATE: &str = "usb_mode_charge_adb";
const STATUS_REFRESH: Duration = Duration::from_secs(1);

/// Device facts shown in the status bar.
pub trait StatusProbe: Send + Sync {
    /// `"usb"`, `"usb-d"`, `"-d"` or empty.
    fn connectivity(&self) -> String;
    fn battery_percent(&self) -> Option<u8>;
}

/// Reads the power-supply and usb daemon state files.
#[derive(Debug, Clone)]
pub struct SysfsStatus {
    battery: PathBuf,
    usb_online: PathBuf,
    ac_online: PathBuf,
    adb_state: PathBuf,
}

impl SysfsStatus {
    pub fn new(battery: PathBuf, usb_online: PathBuf, ac_online: PathBuf, adb_state: PathBuf) -> Self {
        Self {
            battery,
            usb_online,
            ac_online,
            adb_state,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.battery_path.clone(),
            config.usb_online_path.clone(),
            config.ac_online_path.clone(),
            config.adb_state_path.clone(),
        )
    }

    fn usb_connected(&self) -> bool {
        read_trimmed(&self.usb_online).as_deref() == Some("1")
            && read_trimmed(&self.ac_online).as_deref() != Some("1")
    }

    fn adb_started(&self) -> bool {
        read_trimmed(&self.adb_state).as_deref() == Some(ADB_CHARGE_STATE)
    }
}

impl StatusProbe for SysfsStatus {
    fn connectivity(&self) -> String {
        let usb = if self.usb_connected() { "usb" } else { "" };
        let adb = if self.adb_started() { "-d" } else { "" };
        format!("{usb}{adb}")
    }

    fn battery_percent(&self) -> Option<u8> {
        let value: u32 = read_trimmed(&self.battery)?.parse().ok()?;
        Some(value.min(100) as u8)
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|text| text.trim().to_string())
}

/// Local wall-clock time as `HH:MM`.
pub fn clock_text() -> String {
    // SAFETY: time(NULL) has no preconditions; localtime_r only writes into `tm`.
    unsafe {
        let now = libc::time(std::ptr::null_mut());
        let mut tm: libc::tm = std::mem::zeroed();
        if libc::localtime_r(&now, &mut tm).is_null() {
            return String::from("--:--");
        }
        format!("{:02}:{:02}", tm.tm_hour, tm.tm_min)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub clock: String,
    pub connectivity: String,
    pub battery: Option<u8>,
}

/// Rate-limited status reads for the render thread.
pub struct StatusCache {
    probe: Box<dyn StatusProbe>,
    refreshed_at: Option<Instant>,
    snapshot: StatusSnapshot,
}

impl StatusCache {
    pub fn new(probe: Box<dyn StatusProbe>) -> Self {
        Self {
            probe,
            refreshed_at: None,
            snapshot: StatusSnapshot::default(),
        }
    }

    /// Current snapshot, re-read from the probe at most once per second.
    pub fn snapshot(&mut self, now: Instant) -> &StatusSnapshot {
        let stale = self
            .refreshed_at
            .map_or(true, |at| now.saturating_duration_since(at) >= STATUS_REFRESH);
        if stale {
            self.snapshot = StatusSnapshot {
                clock: clock_text(),
                connectivity: self.probe.connectivity(),
                battery: self.probe.battery_percent(),
            };
            self.refreshed_at = Some(now);
        }
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bootmenu_status_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn probe_in(dir: &Path) -> SysfsStatus {
        SysfsStatus::new(
            dir.join("capacity"),
            dir.join("usb_online"),
            dir.join("ac_online"),
            dir.join("usbd_state"),
        )
    }

    #[test]
    fn usb_and_adb_labels() {
        let dir = temp_dir("usb");
        let probe = probe_in(&dir);
        assert_eq!(probe.connectivity(), "");
        fs::write(dir.join("usb_online"), "1\n").expect("write");
        fs::write(dir.join("ac_online"), "0\n").expect("write");
        assert_eq!(probe.connectivity(), "usb");
        fs::write(dir.join("usbd_state"), "usb_mode_charge_adb\n").expect("write");
        assert_eq!(probe.connectivity(), "usb-d");
        fs::write(dir.join("ac_online"), "1\n").expect("write");
        assert_eq!(probe.connectivity(), "-d");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn battery_reads_percent() {
        let dir = temp_dir("battery");
        let probe = probe_in(&dir);
        assert_eq!(probe.battery_percent(), None);
        fs::write(dir.join("capacity"), "87\n").expect("write");
        assert_eq!(probe.battery_percent(), Some(87));
        fs::write(dir.join("capacity"), "garbage").expect("write");
        assert_eq!(probe.battery_percent(), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clock_is_hh_mm() {
        let clock = clock_text();
        assert_eq!(clock.len(), 5);
        assert_eq!(clock.as_bytes()[2], b':');
    }

    struct CountingProbe(Arc<AtomicUsize>);

    impl StatusProbe for CountingProbe {
        fn connectivity(&self) -> String {
            self.0.fetch_add(1, Ordering::SeqCst);
            String::new()
        }

        fn battery_percent(&self) -> Option<u8> {
            Some(50)
        }
    }

    #[test]
    fn cache_refreshes_once_per_second() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut cache = StatusCache::new(Box::new(CountingProbe(Arc::clone(&reads))));
        let start = Instant::now();
        assert_eq!(cache.snapshot(start).battery, Some(50));
        cache.snapshot(start + Duration::from_millis(500));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        cache.snapshot(start + Duration::from_millis(1000));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }
}
