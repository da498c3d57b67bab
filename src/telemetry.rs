//! Structured trace of engine lifecycle and menu decisions.

use crate::config::AppConfig;
use std::env;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INSTALLED: OnceLock<bool> = OnceLock::new();

/// JSON-lines trace destination; `BOOTMENU_TRACE_LOG` wins over the temp dir default.
pub fn tracing_log_path() -> PathBuf {
    env::var_os("BOOTMENU_TRACE_LOG")
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("bootmenu_trace.jsonl"))
}

/// Tracing follows the file-logging switches.
fn tracing_enabled(config: &AppConfig) -> bool {
    config.logs && !config.no_logs
}

fn open_trace_file() -> Option<File> {
    let path = tracing_log_path();
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(err) => {
            crate::log_debug(&format!("trace log {} unavailable: {err}", path.display()));
            None
        }
    }
}

/// Install the global JSON subscriber at most once. Returns whether a subscriber
/// from this call or an earlier one is active.
pub fn init_tracing(config: &AppConfig) -> bool {
    if !tracing_enabled(config) {
        return false;
    }
    *TRACING_INSTALLED.get_or_init(|| {
        let Some(file) = open_trace_file() else {
            return false;
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_thread_names(true)
            .with_target(false)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn tracing_follows_log_flags() {
        assert!(!tracing_enabled(&AppConfig::parse_from(["bootmenu"])));
        assert!(tracing_enabled(&AppConfig::parse_from(["bootmenu", "--logs"])));
        assert!(!tracing_enabled(&AppConfig::parse_from([
            "bootmenu",
            "--logs",
            "--no-logs"
        ])));
    }

    #[test]
    fn disabled_config_installs_nothing() {
        assert!(!init_tracing(&AppConfig::parse_from(["bootmenu", "--no-logs"])));
    }
}
