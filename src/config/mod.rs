//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use defaults::{
    DEFAULT_AC_ONLINE_PATH, DEFAULT_ADB_STATE_PATH, DEFAULT_BATTERY_PATH, DEFAULT_INPUT_DIR,
    DEFAULT_USB_ONLINE_PATH, DEFAULT_VIBRATOR_PATH,
};
pub use defaults::{
    DEFAULT_EVENT_QUEUE_CAPACITY, DEFAULT_FAST_FPS, DEFAULT_INPUT_POLL_MS, DEFAULT_LOG_TAB,
    DEFAULT_PROGRESS_FPS, DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH, DEFAULT_SLOW_FPS,
    MAX_EVENT_QUEUE_CAPACITY, MIN_EVENT_QUEUE_CAPACITY,
};
pub use validation::load_layout_overrides;

/// CLI options for the bootmenu console. Validated values keep the engine threads sane.
#[derive(Debug, Parser, Clone)]
#[command(about = "Bootmenu touch/key menu console", author, version)]
pub struct AppConfig {
    /// Where raw input samples come from
    #[arg(long, value_enum, default_value_t = InputBackend::Terminal)]
    pub input: InputBackend,

    /// Explicit evdev node to read (repeatable); defaults to every event node
    #[arg(long = "input-device", action = ArgAction::Append, value_name = "PATH")]
    pub input_devices: Vec<PathBuf>,

    /// Directory scanned for event nodes when no --input-device is given
    #[arg(long = "input-dir", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Width of the virtual screen in pixels
    #[arg(long, default_value_t = DEFAULT_SCREEN_WIDTH)]
    pub width: u32,

    /// Height of the virtual screen in pixels
    #[arg(long, default_value_t = DEFAULT_SCREEN_HEIGHT)]
    pub height: u32,

    /// JSON file overriding bar heights and list margins
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Redraw rate while input is active
    #[arg(long = "fast-fps", default_value_t = DEFAULT_FAST_FPS)]
    pub fast_fps: u32,

    /// Redraw rate once the screen goes idle
    #[arg(long = "slow-fps", default_value_t = DEFAULT_SLOW_FPS)]
    pub slow_fps: u32,

    /// Progress animation rate
    #[arg(long = "progress-fps", default_value_t = DEFAULT_PROGRESS_FPS)]
    pub progress_fps: u32,

    /// Pending input events kept before new ones are dropped
    #[arg(long = "event-queue-capacity", default_value_t = DEFAULT_EVENT_QUEUE_CAPACITY)]
    pub event_queue_capacity: usize,

    /// Index of the tab that shows the full-screen log
    #[arg(long = "log-tab", default_value_t = DEFAULT_LOG_TAB)]
    pub log_tab: usize,

    /// Battery capacity file (percent)
    #[arg(long = "battery-path", default_value = DEFAULT_BATTERY_PATH)]
    pub battery_path: PathBuf,

    /// USB supply "online" file
    #[arg(long = "usb-online-path", default_value = DEFAULT_USB_ONLINE_PATH)]
    pub usb_online_path: PathBuf,

    /// AC supply "online" file
    #[arg(long = "ac-online-path", default_value = DEFAULT_AC_ONLINE_PATH)]
    pub ac_online_path: PathBuf,

    /// File holding the current usb daemon mode
    #[arg(long = "adb-state-path", default_value = DEFAULT_ADB_STATE_PATH)]
    pub adb_state_path: PathBuf,

    /// Timed-output vibrator node used for tap feedback
    #[arg(long = "vibrator-path", default_value = DEFAULT_VIBRATOR_PATH)]
    pub vibrator_path: PathBuf,

    /// Actually reboot on the reboot hotkey/menu item (otherwise only logged)
    #[arg(long = "allow-reboot", env = "BOOTMENU_ALLOW_REBOOT", default_value_t = false)]
    pub allow_reboot: bool,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "BOOTMENU_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "BOOTMENU_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging menu titles and console lines (debug log only)
    #[arg(
        long = "log-content",
        env = "BOOTMENU_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,
}

/// Source of raw input samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputBackend {
    /// Keyboard and mouse of the controlling terminal
    Terminal,
    /// Linux event device nodes
    Evdev,
}

impl InputBackend {
    pub fn label(self) -> &'static str {
        match self {
            InputBackend::Terminal => "terminal",
            InputBackend::Evdev => "evdev",
        }
    }
}
