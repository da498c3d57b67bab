use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    panic,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: OnceLock<Mutex<Option<CappedFile>>> = OnceLock::new();

/// Debug log shared by the engine threads.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("bootmenu_ui.log")
}

/// Panic locations only; payloads need `--log-content`.
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("bootmenu_crash.log")
}

/// Append-only file that starts over once it would grow past `cap` bytes.
struct CappedFile {
    path: PathBuf,
    file: fs::File,
    cap: u64,
    len: u64,
}

impl CappedFile {
    fn open(path: PathBuf, cap: u64) -> Option<Self> {
        let existing = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        let stale = existing > cap;
        let file = fs::OpenOptions::new()
            .create(true)
            .append(!stale)
            .write(true)
            .truncate(stale)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            cap,
            len: if stale { 0 } else { existing },
        })
    }

    fn append(&mut self, line: &str) {
        let incoming = line.len() as u64;
        if self.len.saturating_add(incoming) > self.cap {
            match fs::File::create(&self.path) {
                Ok(file) => {
                    self.file = file;
                    self.len = 0;
                }
                Err(_) => return,
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(incoming);
        }
    }
}

fn debug_log() -> &'static Mutex<Option<CappedFile>> {
    DEBUG_LOG.get_or_init(|| Mutex::new(None))
}

/// `[secs.millis] [thread]` prefix; the engine logs from several named threads.
fn line_prefix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let current = thread::current();
    format!(
        "[{}.{:03}] [{}]",
        now.as_secs(),
        now.subsec_millis(),
        current.name().unwrap_or("main")
    )
}

fn set_enabled(enabled: bool, content_enabled: bool) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    LOG_CONTENT_ENABLED.store(enabled && content_enabled, Ordering::Relaxed);
    let mut log = debug_log()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *log = if enabled {
        CappedFile::open(log_file_path(), LOG_MAX_BYTES)
    } else {
        None
    };
}

/// Turn file logging on or off from the CLI flags. `--no-logs` always wins.
pub fn init_logging(config: &AppConfig) {
    set_enabled(config.logs && !config.no_logs, config.log_content);
}

/// Append a line to the debug file; stdout belongs to the console renderer.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("{} {msg}\n", line_prefix());
    let mut log = debug_log()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(file) = log.as_mut() {
        file.append(&line);
    }
}

/// Like [`log_debug`], for lines carrying menu titles or console text.
pub fn log_debug_content(msg: &str) {
    if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        log_debug(msg);
    }
}

/// Record a panic in the crash log when logging is on.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        "payload omitted (log-content disabled)".to_string()
    } else if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string payload".to_string()
    };
    let line = format!(
        "{} panic at {location}: {payload} (bootmenu v{})\n",
        line_prefix(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(mut crash) = CappedFile::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        crash.append(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(tag: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        env::temp_dir().join(format!("bootmenu_log_{tag}_{stamp}.log"))
    }

    #[test]
    fn capped_file_starts_over_when_full() {
        let path = scratch_path("rotate");
        let mut file = CappedFile::open(path.clone(), 32).expect("open log");
        file.append("0123456789012345678901234\n");
        file.append("second line that overflows\n");
        let contents = fs::read_to_string(&path).expect("read log");
        assert_eq!(contents, "second line that overflows\n");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn oversized_existing_file_is_truncated() {
        let path = scratch_path("stale");
        fs::write(&path, "x".repeat(64)).expect("seed log");
        let mut file = CappedFile::open(path.clone(), 16).expect("open log");
        assert_eq!(file.len, 0);
        file.append("fresh\n");
        assert_eq!(fs::read_to_string(&path).expect("read log"), "fresh\n");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn small_existing_file_is_appended() {
        let path = scratch_path("keep");
        fs::write(&path, "old\n").expect("seed log");
        let mut file = CappedFile::open(path.clone(), 64).expect("open log");
        file.append("new\n");
        assert_eq!(fs::read_to_string(&path).expect("read log"), "old\nnew\n");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn content_logging_requires_both_flags() {
        set_enabled(false, true);
        assert!(!LOG_CONTENT_ENABLED.load(Ordering::Relaxed));
        set_enabled(true, false);
        assert!(LOG_ENABLED.load(Ordering::Relaxed));
        assert!(!LOG_CONTENT_ENABLED.load(Ordering::Relaxed));
        set_enabled(false, false);
        assert!(!LOG_ENABLED.load(Ordering::Relaxed));
    }

    #[test]
    fn prefix_names_the_thread() {
        let prefix = thread::Builder::new()
            .name("bootmenu-test".into())
            .spawn(line_prefix)
            .expect("spawn")
            .join()
            .expect("join");
        assert!(prefix.ends_with("[bootmenu-test]"));
    }
}
