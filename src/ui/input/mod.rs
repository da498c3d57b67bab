//! Input capture thread: raw samples in, queued events and hotkey actions out.

mod classify;
mod hotkeys;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub use classify::{Classified, SampleClassifier, REL_THRESHOLD};
pub use hotkeys::{DefaultHotkeys, Hotkeys, NoHotkeys};

use super::event::InputEvent;
use super::key_table::KeyTable;
use super::queue::EventQueue;
use super::redraw::{RedrawBudget, KEY_ACTIVITY, TOUCH_ACTIVITY};
use super::state::DisplayState;
use crate::device::{InputDevice, SystemActions};
use crate::{lock_or_recover, log_debug};

/// Cooperative stop request shared with a worker thread.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// What the capture thread shares with the rest of the engine.
#[derive(Clone)]
pub(crate) struct CaptureContext {
    pub(crate) state: Arc<Mutex<DisplayState>>,
    pub(crate) queue: Arc<EventQueue>,
    pub(crate) keys: Arc<KeyTable>,
    pub(crate) redraw: Arc<RedrawBudget>,
    pub(crate) hotkeys: Arc<dyn Hotkeys>,
    pub(crate) system: Arc<dyn SystemActions>,
}

impl CaptureContext {
    /// Route one classified sample. Key-ups only update the key table.
    pub(crate) fn dispatch(&self, classified: Classified, at: Instant) {
        match classified {
            Classified::Key {
                code,
                down,
                synthetic,
            } => {
                if !synthetic {
                    self.keys.set(code, down);
                }
                if !down {
                    return;
                }
                if self.hotkeys.toggle_display(&self.keys, code) {
                    let tab = lock_or_recover(&self.state, "hotkey next tab").next_tab();
                    self.redraw.request();
                    log_debug(&format!("hotkey: switched to tab {tab}"));
                    return;
                }
                if self.hotkeys.reboot_now(&self.keys, code) {
                    log_debug("hotkey: reboot");
                    self.system.reboot();
                    return;
                }
                self.push(InputEvent::key(code, at), KEY_ACTIVITY);
            }
            Classified::Touch { phase, x, y } => {
                self.push(InputEvent::touch(phase, x, y, at), TOUCH_ACTIVITY);
            }
        }
    }

    fn push(&self, event: InputEvent, activity: i32) {
        if self.queue.push(event) {
            self.redraw.mark_activity(activity);
        } else {
            log_debug(&format!("event queue full or closed; dropped {:?}", event.kind));
        }
    }
}

pub(crate) fn spawn_capture_thread(
    mut device: Box<dyn InputDevice>,
    context: CaptureContext,
    stop: StopFlag,
    poll_timeout: Duration,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("bootmenu-input".into())
        .spawn(move || {
            let mut classifier = SampleClassifier::new();
            let mut failing = false;
            while !stop.is_stopped() {
                let sample = match device.next_sample(poll_timeout) {
                    Ok(Some(sample)) => sample,
                    Ok(None) => continue,
                    Err(err) => {
                        if !failing {
                            log_debug(&format!("input device error: {err}"));
                            failing = true;
                        }
                        thread::sleep(poll_timeout);
                        continue;
                    }
                };
                failing = false;
                if let Some(classified) = classifier.classify(&sample) {
                    context.dispatch(classified, sample.timestamp);
                }
            }
            log_debug("input thread stopped");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::event::{keys, EventKind, TouchPhase};
    use crate::ui::layout::Layout;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingSystem {
        reboots: AtomicUsize,
    }

    impl SystemActions for CountingSystem {
        fn reboot(&self) {
            self.reboots.fetch_add(1, Ordering::SeqCst);
        }

        fn vibrate(&self, _ms: u32) {}
    }

    fn context(system: Arc<CountingSystem>) -> CaptureContext {
        let mut state = DisplayState::new(Layout::new(480, 854), 40, 2);
        let tabs = vec!["Menu".to_string(), "Tools".to_string(), "Log".to_string()];
        state.start_menu(&[], &tabs, &[], 0);
        CaptureContext {
            state: Arc::new(Mutex::new(state)),
            queue: Arc::new(EventQueue::new(128)),
            keys: Arc::new(KeyTable::new()),
            redraw: Arc::new(RedrawBudget::new()),
            hotkeys: Arc::new(DefaultHotkeys),
            system,
        }
    }

    fn key(code: u16, down: bool) -> Classified {
        Classified::Key {
            code,
            down,
            synthetic: false,
        }
    }

    #[test]
    fn key_down_is_queued_and_marks_activity() {
        let ctx = context(Arc::default());
        ctx.dispatch(key(keys::KEY_DOWN, true), Instant::now());
        ctx.dispatch(key(keys::KEY_DOWN, false), Instant::now());
        assert_eq!(ctx.queue.len(), 1);
        assert_eq!(ctx.redraw.countdown(), KEY_ACTIVITY);
        assert!(!ctx.keys.is_down(keys::KEY_DOWN));
    }

    #[test]
    fn synthetic_keys_skip_key_table() {
        let ctx = context(Arc::default());
        ctx.dispatch(
            Classified::Key {
                code: keys::KEY_UP,
                down: true,
                synthetic: true,
            },
            Instant::now(),
        );
        assert!(!ctx.keys.is_down(keys::KEY_UP));
        assert_eq!(ctx.queue.len(), 1);
    }

    #[test]
    fn toggle_chord_cycles_tab_without_queueing() {
        let ctx = context(Arc::default());
        ctx.dispatch(key(keys::KEY_LEFTALT, true), Instant::now());
        ctx.queue.clear();
        ctx.dispatch(key(keys::KEY_L, true), Instant::now());
        assert!(ctx.queue.is_empty());
        assert_eq!(lock_or_recover(&ctx.state, "test").active_tab, 1);
        assert!(ctx.redraw.take_request());
    }

    #[test]
    fn reboot_chord_calls_system() {
        let system = Arc::new(CountingSystem::default());
        let ctx = context(Arc::clone(&system));
        ctx.dispatch(key(keys::KEY_VOLUMEUP, true), Instant::now());
        ctx.dispatch(key(keys::KEY_VOLUMEDOWN, true), Instant::now());
        ctx.queue.clear();
        ctx.dispatch(key(keys::KEY_POWER, true), Instant::now());
        assert_eq!(system.reboots.load(Ordering::SeqCst), 1);
        assert!(ctx.queue.is_empty());
    }

    #[test]
    fn touches_are_always_queued() {
        let ctx = context(Arc::default());
        for phase in [TouchPhase::Start, TouchPhase::Drag, TouchPhase::Release] {
            ctx.dispatch(Classified::Touch { phase, x: 5, y: 6 }, Instant::now());
        }
        assert_eq!(ctx.redraw.countdown(), TOUCH_ACTIVITY);
        let phases: Vec<_> = std::iter::from_fn(|| ctx.queue.try_pop())
            .map(|event| match event.kind {
                EventKind::Touch { phase, .. } => phase,
                EventKind::Key { .. } => panic!("unexpected key"),
            })
            .collect();
        assert_eq!(
            phases,
            vec![TouchPhase::Start, TouchPhase::Drag, TouchPhase::Release]
        );
    }
}
