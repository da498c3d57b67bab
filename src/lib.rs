mod app;
pub mod canvas;
pub mod config;
pub mod device;
mod lock;
pub mod preview;
pub mod telemetry;
pub mod terminal_restore;
pub mod ui;

pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
};
pub(crate) use lock::lock_or_recover;
