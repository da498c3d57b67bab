pub const DEFAULT_SCREEN_WIDTH: u32 = 480;
pub const DEFAULT_SCREEN_HEIGHT: u32 = 854;
pub const DEFAULT_FAST_FPS: u32 = 60;
pub const DEFAULT_SLOW_FPS: u32 = 1;
pub const DEFAULT_PROGRESS_FPS: u32 = 15;
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_LOG_TAB: usize = 2;
pub const DEFAULT_INPUT_POLL_MS: u64 = 100;

pub const MIN_EVENT_QUEUE_CAPACITY: usize = 128;
pub const MAX_EVENT_QUEUE_CAPACITY: usize = 4096;

pub(super) const MIN_SCREEN_DIMENSION: u32 = 128;
pub(super) const MAX_SCREEN_DIMENSION: u32 = 4096;
pub(super) const MAX_LAYOUT_FILE_BYTES: u64 = 64 * 1024;

pub(super) const DEFAULT_INPUT_DIR: &str = "/dev/input";
pub(super) const DEFAULT_BATTERY_PATH: &str = "/sys/class/power_supply/battery/capacity";
pub(super) const DEFAULT_USB_ONLINE_PATH: &str = "/sys/class/power_supply/usb/online";
pub(super) const DEFAULT_AC_ONLINE_PATH: &str = "/sys/class/power_supply/ac/online";
pub(super) const DEFAULT_ADB_STATE_PATH: &str = "/tmp/usbd_current_state";
pub(super) const DEFAULT_VIBRATOR_PATH: &str = "/sys/class/timed_output/vibrator/enable";
