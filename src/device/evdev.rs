//! Linux evdev reader: polls `/dev/input/event*` nodes and decodes `input_event` records.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{InputDevice, RawSample, SampleKind};
use crate::log_debug;
use crate::ui::keys::BTN_TOUCH;

const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;
const EV_REL: u16 = 0x02;
const EV_ABS: u16 = 0x03;
const SYN_REPORT: u16 = 0x00;
const ABS_X: u16 = 0x00;
const ABS_Y: u16 = 0x01;
const ABS_MT_POSITION_X: u16 = 0x35;
const ABS_MT_POSITION_Y: u16 = 0x36;
const ABS_MT_TRACKING_ID: u16 = 0x39;
const READ_BATCH: usize = 16;

/// Collects absolute axis updates until `SYN_REPORT` and emits them as one sample.
#[derive(Debug, Default)]
struct TouchAssembler {
    x: i32,
    y: i32,
    contact: bool,
    reported_contact: bool,
    dirty: bool,
}

impl TouchAssembler {
    fn feed(&mut self, kind: u16, code: u16, value: i32, at: Instant) -> Option<RawSample> {
        match (kind, code) {
            (EV_ABS, ABS_X | ABS_MT_POSITION_X) => {
                self.x = value;
                self.dirty = true;
                None
            }
            (EV_ABS, ABS_Y | ABS_MT_POSITION_Y) => {
                self.y = value;
                self.dirty = true;
                None
            }
            (EV_ABS, ABS_MT_TRACKING_ID) => {
                self.contact = value >= 0;
                self.dirty = true;
                None
            }
            (EV_ABS, _) => None,
            (EV_KEY, BTN_TOUCH) => {
                self.contact = value != 0;
                self.dirty = true;
                None
            }
            (EV_KEY, _) => Some(RawSample {
                kind: SampleKind::Key,
                code,
                value,
                timestamp: at,
            }),
            (EV_REL, _) => Some(RawSample::relative(code, value, at)),
            (EV_SYN, SYN_REPORT) if self.dirty => {
                self.dirty = false;
                // Hover motion without contact is not a touch.
                if !self.contact && !self.reported_contact {
                    return None;
                }
                self.reported_contact = self.contact;
                Some(RawSample::touch(self.x, self.y, self.contact, at))
            }
            (EV_SYN, _) => Some(RawSample {
                kind: SampleKind::Sync,
                code,
                value,
                timestamp: at,
            }),
            (other, _) => Some(RawSample {
                kind: SampleKind::Other(other),
                code,
                value,
                timestamp: at,
            }),
        }
    }
}

struct EvdevNode {
    path: PathBuf,
    file: File,
    touch: TouchAssembler,
}

impl EvdevNode {
    /// Read every record currently buffered. `Ok(false)` means the node hit EOF.
    fn drain(&mut self, out: &mut VecDeque<RawSample>) -> io::Result<bool> {
        let record = mem::size_of::<libc::input_event>();
        // SAFETY: input_event is plain old data; all-zero is a valid value.
        let mut events: [libc::input_event; READ_BATCH] = unsafe { mem::zeroed() };
        loop {
            // SAFETY: the buffer is valid for `record * READ_BATCH` bytes and the fd
            // is owned by `self.file` for the duration of the call.
            let n = unsafe {
                libc::read(
                    self.file.as_raw_fd(),
                    events.as_mut_ptr().cast::<libc::c_void>(),
                    record * READ_BATCH,
                )
            };
            if n > 0 {
                let bytes = n as usize;
                let now = Instant::now();
                for event in events.iter().take(bytes / record) {
                    if let Some(sample) = self.touch.feed(event.type_, event.code, event.value, now) {
                        out.push_back(sample);
                    }
                }
                if bytes < record * READ_BATCH {
                    return Ok(true);
                }
                continue;
            }
            if n == 0 {
                return Ok(false);
            }
            let err = io::Error::last_os_error();
            match err.kind() {
                ErrorKind::WouldBlock => return Ok(true),
                ErrorKind::Interrupted => continue,
                _ => return Err(err),
            }
        }
    }
}

/// Reads one or more evdev nodes as a single input stream.
pub struct EvdevInput {
    nodes: Vec<EvdevNode>,
    pending: VecDeque<RawSample>,
}

impl EvdevInput {
    /// Open each path; any failure aborts.
    pub fn open(paths: &[PathBuf]) -> io::Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let file = open_node(path)
                .map_err(|err| io::Error::new(err.kind(), format!("{}: {err}", path.display())))?;
            files.push((path.clone(), file));
        }
        Ok(Self::from_files(files))
    }

    /// Open every readable `event*` node in `dir`. Unreadable nodes are skipped.
    pub fn open_dir(dir: &Path) -> io::Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("event"))
            })
            .collect();
        paths.sort();
        let mut files = Vec::new();
        for path in paths {
            match open_node(&path) {
                Ok(file) => files.push((path, file)),
                Err(err) => log_debug(&format!("skipping input device {}: {err}", path.display())),
            }
        }
        if files.is_empty() {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("no readable event devices in {}", dir.display()),
            ));
        }
        Ok(Self::from_files(files))
    }

    /// Wrap already-open non-blocking files.
    pub fn from_files(files: Vec<(PathBuf, File)>) -> Self {
        let nodes = files
            .into_iter()
            .map(|(path, file)| EvdevNode {
                path,
                file,
                touch: TouchAssembler::default(),
            })
            .collect();
        Self {
            nodes,
            pending: VecDeque::new(),
        }
    }

    pub fn device_count(&self) -> usize {
        self.nodes.len()
    }
}

fn open_node(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK | libc::O_CLOEXEC)
        .open(path)
}

impl InputDevice for EvdevInput {
    fn next_sample(&mut self, timeout: Duration) -> io::Result<Option<RawSample>> {
        if let Some(sample) = self.pending.pop_front() {
            return Ok(Some(sample));
        }
        if self.nodes.is_empty() {
            return Err(io::Error::new(ErrorKind::NotFound, "no input devices left"));
        }
        let mut fds: Vec<libc::pollfd> = self
            .nodes
            .iter()
            .map(|node| libc::pollfd {
                fd: node.file.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        let timeout_ms = timeout.as_millis().min(i32::MAX as u128) as libc::c_int;
        // SAFETY: `fds` is a valid array of `fds.len()` pollfd entries.
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if ready < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == ErrorKind::Interrupted {
                return Ok(None);
            }
            return Err(err);
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut closed = Vec::new();
        for (index, pollfd) in fds.iter().enumerate() {
            if pollfd.revents == 0 {
                continue;
            }
            let node = &mut self.nodes[index];
            match node.drain(&mut self.pending) {
                Ok(true) => {}
                Ok(false) => closed.push(index),
                Err(err) => {
                    log_debug(&format!("input device {} read error: {err}", node.path.display()));
                    closed.push(index);
                }
            }
        }
        for index in closed.into_iter().rev() {
            let node = self.nodes.remove(index);
            log_debug(&format!("input device {} closed", node.path.display()));
        }
        Ok(self.pending.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::keys;
    use std::io::Write;
    use std::os::unix::io::FromRawFd;

    fn pipe_device() -> (EvdevInput, File) {
        let mut fds = [0; 2];
        // SAFETY: `fds` has room for the two descriptors pipe() writes.
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        // SAFETY: fds[0] is a fresh descriptor we own.
        unsafe {
            libc::fcntl(fds[0], libc::F_SETFL, libc::O_NONBLOCK);
        }
        // SAFETY: ownership of each descriptor moves into exactly one File.
        let reader = unsafe { File::from_raw_fd(fds[0]) };
        let writer = unsafe { File::from_raw_fd(fds[1]) };
        (
            EvdevInput::from_files(vec![(PathBuf::from("pipe"), reader)]),
            writer,
        )
    }

    fn write_event(writer: &mut File, kind: u16, code: u16, value: i32) {
        let event = libc::input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: kind,
            code,
            value,
        };
        // SAFETY: input_event is plain old data; we view exactly its bytes.
        let bytes = unsafe {
            std::slice::from_raw_parts(
                (&event as *const libc::input_event).cast::<u8>(),
                mem::size_of::<libc::input_event>(),
            )
        };
        writer.write_all(bytes).expect("write event");
    }

    fn next_non_sync(device: &mut EvdevInput) -> Option<RawSample> {
        for _ in 0..16 {
            match device.next_sample(Duration::from_millis(200)).expect("read") {
                Some(sample) if sample.kind == SampleKind::Sync => continue,
                other => return other,
            }
        }
        None
    }

    #[test]
    fn key_records_pass_through() {
        let (mut device, mut writer) = pipe_device();
        write_event(&mut writer, EV_KEY, keys::KEY_VOLUMEDOWN, 1);
        write_event(&mut writer, EV_SYN, SYN_REPORT, 0);
        let sample = next_non_sync(&mut device).expect("key sample");
        assert_eq!(sample.kind, SampleKind::Key);
        assert_eq!(sample.code, keys::KEY_VOLUMEDOWN);
        assert_eq!(sample.value, 1);
    }

    #[test]
    fn multitouch_reports_assemble_into_one_sample() {
        let (mut device, mut writer) = pipe_device();
        write_event(&mut writer, EV_ABS, ABS_MT_TRACKING_ID, 7);
        write_event(&mut writer, EV_ABS, ABS_MT_POSITION_X, 120);
        write_event(&mut writer, EV_ABS, ABS_MT_POSITION_Y, 340);
        write_event(&mut writer, EV_KEY, BTN_TOUCH, 1);
        write_event(&mut writer, EV_SYN, SYN_REPORT, 0);
        let down = next_non_sync(&mut device).expect("touch down");
        assert_eq!(down.kind, SampleKind::Absolute);
        assert_eq!(down.code, 1);
        assert_eq!(down.position(), (120, 340));

        write_event(&mut writer, EV_ABS, ABS_MT_TRACKING_ID, -1);
        write_event(&mut writer, EV_KEY, BTN_TOUCH, 0);
        write_event(&mut writer, EV_SYN, SYN_REPORT, 0);
        let up = next_non_sync(&mut device).expect("touch up");
        assert_eq!(up.kind, SampleKind::Absolute);
        assert_eq!(up.code, 0);
        assert_eq!(up.position(), (120, 340));
    }

    #[test]
    fn relative_motion_passes_through() {
        let (mut device, mut writer) = pipe_device();
        write_event(&mut writer, EV_REL, crate::device::REL_Y, -2);
        let sample = next_non_sync(&mut device).expect("relative");
        assert_eq!(sample.kind, SampleKind::Relative);
        assert_eq!(sample.value, -2);
    }

    #[test]
    fn idle_device_times_out() {
        let (mut device, _writer) = pipe_device();
        let sample = device
            .next_sample(Duration::from_millis(20))
            .expect("poll");
        assert!(sample.is_none());
    }

    #[test]
    fn closed_device_is_dropped() {
        let (mut device, writer) = pipe_device();
        drop(writer);
        assert!(device
            .next_sample(Duration::from_millis(50))
            .expect("eof poll")
            .is_none());
        assert_eq!(device.device_count(), 0);
        assert!(device.next_sample(Duration::from_millis(10)).is_err());
    }

    #[test]
    fn open_dir_without_nodes_fails() {
        let dir = std::env::temp_dir().join(format!("bootmenu_evdev_empty_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create dir");
        let err = EvdevInput::open_dir(&dir).err().expect("no devices");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let _ = fs::remove_dir(&dir);
    }
}
