//! Engine lifecycle and the public menu API.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;

use super::decision::{Decision, DecisionContext, KeyMapper};
use super::input::{spawn_capture_thread, CaptureContext, Hotkeys, StopFlag};
use super::key_table::KeyTable;
use super::layout::Layout;
use super::menu::MenuItem;
use super::progress::{spawn_progress_thread, ProgressState};
use super::queue::EventQueue;
use super::redraw::RedrawBudget;
use super::render::{spawn_render_thread, Cadence};
use super::state::DisplayState;
use crate::canvas::{BackgroundIcon, Canvas, FontKind, SurfaceId};
use crate::config::{
    AppConfig, DEFAULT_EVENT_QUEUE_CAPACITY, DEFAULT_FAST_FPS, DEFAULT_INPUT_POLL_MS,
    DEFAULT_LOG_TAB, DEFAULT_PROGRESS_FPS, DEFAULT_SLOW_FPS,
};
use crate::device::{InputDevice, StatusCache, StatusProbe, SystemActions};
use crate::{lock_or_recover, log_debug, log_debug_content};

/// Why the engine could not start.
#[derive(Debug)]
pub enum EngineError {
    /// The canvas reported no drawable area.
    CanvasUnavailable { width: i32, height: i32 },
    /// No input device could be opened.
    InputUnavailable(io::Error),
    ThreadSpawn {
        thread: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::CanvasUnavailable { width, height } => {
                write!(f, "canvas unavailable ({width}x{height})")
            }
            EngineError::InputUnavailable(source) => write!(f, "input unavailable: {source}"),
            EngineError::ThreadSpawn { thread, source } => {
                write!(f, "failed to start {thread} thread: {source}")
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::ThreadSpawn { source, .. } | EngineError::InputUnavailable(source) => {
                Some(source)
            }
            EngineError::CanvasUnavailable { .. } => None,
        }
    }
}

/// Tunables for the engine threads.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Bar heights and margins. Width and height are taken from the canvas.
    pub layout: Layout,
    pub fast_fps: u32,
    pub slow_fps: u32,
    pub progress_fps: u32,
    pub queue_capacity: usize,
    pub log_tab: usize,
    pub input_poll: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            layout: Layout::new(0, 0),
            fast_fps: DEFAULT_FAST_FPS,
            slow_fps: DEFAULT_SLOW_FPS,
            progress_fps: DEFAULT_PROGRESS_FPS,
            queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            log_tab: DEFAULT_LOG_TAB,
            input_poll: Duration::from_millis(DEFAULT_INPUT_POLL_MS),
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            layout: config.resolve_layout()?,
            fast_fps: config.fast_fps,
            slow_fps: config.slow_fps,
            progress_fps: config.progress_fps,
            queue_capacity: config.event_queue_capacity,
            log_tab: config.log_tab,
            ..Self::default()
        })
    }
}

/// The host collaborators an engine drives.
pub struct EngineParts {
    pub canvas: Box<dyn Canvas>,
    pub input: Box<dyn InputDevice>,
    pub status: Box<dyn StatusProbe>,
    pub system: Arc<dyn SystemActions>,
    pub keymap: Arc<dyn KeyMapper>,
    pub hotkeys: Arc<dyn Hotkeys>,
}

/// A running menu engine: render, input and progress threads around one display state.
///
/// All methods take `&self`, so the engine can be shared with a host thread that
/// blocks in [`Engine::await_decision`] while another thread calls
/// [`Engine::shutdown`].
pub struct Engine {
    state: Arc<Mutex<DisplayState>>,
    queue: Arc<EventQueue>,
    keys: Arc<KeyTable>,
    redraw: Arc<RedrawBudget>,
    keymap: Arc<dyn KeyMapper>,
    system: Arc<dyn SystemActions>,
    input_stop: StopFlag,
    stop_tx: Mutex<Option<Sender<()>>>,
    threads: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl Engine {
    pub fn init(options: EngineOptions, parts: EngineParts) -> Result<Self, EngineError> {
        let EngineParts {
            canvas,
            input,
            status,
            system,
            keymap,
            hotkeys,
        } = parts;

        let (width, height) = canvas.size();
        if width <= 0 || height <= 0 {
            return Err(EngineError::CanvasUnavailable { width, height });
        }
        let layout = Layout {
            width,
            height,
            ..options.layout
        };
        let char_width = canvas.measure("M", FontKind::Logs);
        let mut display = DisplayState::new(layout, layout.log_cols(char_width), options.log_tab);
        let bar_width = canvas
            .surface_size(SurfaceId::ProgressEmpty)
            .map_or(0, |(w, _)| w);
        display.progress = ProgressState::new(bar_width, canvas.indeterminate_frames());

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let engine = Self {
            state: Arc::new(Mutex::new(display)),
            queue: Arc::new(EventQueue::new(options.queue_capacity)),
            keys: Arc::new(KeyTable::new()),
            redraw: Arc::new(RedrawBudget::new()),
            keymap,
            system: Arc::clone(&system),
            input_stop: StopFlag::new(),
            stop_tx: Mutex::new(Some(stop_tx)),
            threads: Mutex::new(Vec::new()),
        };

        let progress = spawn_progress_thread(
            Arc::clone(&engine.state),
            Arc::clone(&engine.redraw),
            stop_rx.clone(),
            options.progress_fps,
        );
        engine.track("progress", progress)?;

        let capture = CaptureContext {
            state: Arc::clone(&engine.state),
            queue: Arc::clone(&engine.queue),
            keys: Arc::clone(&engine.keys),
            redraw: Arc::clone(&engine.redraw),
            hotkeys,
            system,
        };
        let input = spawn_capture_thread(
            input,
            capture,
            engine.input_stop.clone(),
            options.input_poll,
        );
        engine.track("input", input)?;

        let render = spawn_render_thread(
            canvas,
            Arc::clone(&engine.state),
            Arc::clone(&engine.redraw),
            StatusCache::new(status),
            Cadence::new(options.fast_fps, options.slow_fps),
            stop_rx,
        );
        engine.track("render", render)?;

        engine.redraw.request();
        tracing::info!(width, height, "engine started");
        log_debug(&format!("engine started ({width}x{height})"));
        Ok(engine)
    }

    /// Keep a spawned thread, or stop everything started so far.
    fn track(
        &self,
        thread: &'static str,
        spawned: io::Result<JoinHandle<()>>,
    ) -> Result<(), EngineError> {
        match spawned {
            Ok(handle) => {
                lock_or_recover(&self.threads, "engine track thread").push((thread, handle));
                Ok(())
            }
            Err(source) => {
                self.shutdown();
                Err(EngineError::ThreadSpawn { thread, source })
            }
        }
    }

    /// Stop and join every thread and wake any blocked `await_decision`.
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        self.input_stop.stop();
        self.queue.close();
        let stop_tx = lock_or_recover(&self.stop_tx, "engine shutdown").take();
        let threads: Vec<_> = lock_or_recover(&self.threads, "engine shutdown threads")
            .drain(..)
            .collect();
        if stop_tx.is_none() && threads.is_empty() {
            return;
        }
        drop(stop_tx);
        for (name, handle) in threads {
            if handle.join().is_err() {
                log_debug(&format!("{name} thread panicked"));
            }
        }
        tracing::info!("engine stopped");
        log_debug("engine stopped");
    }

    fn update<R>(&self, context: &str, apply: impl FnOnce(&mut DisplayState) -> R) -> R {
        let mut state = lock_or_recover(&self.state, context);
        let result = apply(&mut *state);
        drop(state);
        self.redraw.request();
        result
    }

    /// Read the display state under the lock.
    pub fn with_state<R>(&self, read: impl FnOnce(&DisplayState) -> R) -> R {
        let state = lock_or_recover(&self.state, "engine with_state");
        read(&*state)
    }

    pub fn show_overlay(&self, visible: bool) {
        self.update("show_overlay", |state| state.visible_text = visible);
    }

    pub fn overlay_visible(&self) -> bool {
        self.with_state(|state| state.visible_text)
    }

    pub fn set_background(&self, icon: Option<BackgroundIcon>) {
        self.update("set_background", |state| state.background = icon);
    }

    pub fn show_indeterminate_progress(&self) {
        self.update("show_indeterminate_progress", |state| {
            state.progress.show_indeterminate();
        });
    }

    /// Start a new progress scope of `portion` of the bar, filled automatically over
    /// `seconds` when non-zero.
    pub fn show_progress(&self, portion: f32, seconds: u32) {
        self.update("show_progress", |state| {
            state.progress.show(portion, seconds, Instant::now());
        });
    }

    pub fn set_progress(&self, fraction: f32) {
        let moved = lock_or_recover(&self.state, "set_progress")
            .progress
            .set_fraction(fraction);
        if moved {
            self.redraw.request();
        }
    }

    pub fn reset_progress(&self) {
        self.update("reset_progress", |state| state.progress.reset());
    }

    /// Append to the console log. A trailing newline is added when missing.
    pub fn log_line(&self, text: &str) {
        log_debug_content(&format!("console: {}", text.trim_end()));
        self.update("log_line", |state| {
            state.log_line(text);
            if !text.ends_with('\n') {
                state.log_line("\n");
            }
        });
    }

    pub fn start_menu(&self, headers: &[String], tabs: &[String], items: &[MenuItem], initial: usize) {
        self.update("start_menu", |state| {
            state.start_menu(headers, tabs, items, initial);
        });
    }

    /// Move the highlight; out-of-range indices wrap. Returns the new selection.
    pub fn select(&self, index: isize) -> usize {
        self.update("select", |state| state.select(index))
    }

    pub fn end_menu(&self) {
        self.update("end_menu", DisplayState::end_menu);
    }

    /// Block until the user picks, cancels or switches tab. `None` after shutdown.
    pub fn await_decision(&self, initial: usize) -> Option<Decision> {
        let decision = self.decision_context().await_decision(initial);
        tracing::debug!(?decision, "menu decision");
        decision
    }

    /// Clear stale input, show the menu, wait for a decision and hide it again.
    pub fn menu_selection(
        &self,
        headers: &[String],
        tabs: &[String],
        items: &[MenuItem],
        initial: usize,
    ) -> Option<Decision> {
        self.clear_events();
        self.start_menu(headers, tabs, items, initial);
        let decision = self.await_decision(initial);
        self.end_menu();
        decision
    }

    /// Advisory: whether `code` was last seen down by the input thread.
    pub fn key_down(&self, code: u16) -> bool {
        self.keys.is_down(code)
    }

    pub fn set_active_tab(&self, index: usize) -> bool {
        self.update("set_active_tab", |state| state.set_active_tab(index))
    }

    pub fn active_tab(&self) -> usize {
        self.with_state(|state| state.active_tab)
    }

    pub fn next_tab(&self) -> usize {
        self.update("next_tab", DisplayState::next_tab)
    }

    pub fn clear_events(&self) {
        self.queue.clear();
    }

    /// Block for the next key-down. `None` after shutdown.
    pub fn wait_key(&self) -> Option<u16> {
        self.decision_context().wait_key()
    }

    fn decision_context(&self) -> DecisionContext<'_> {
        DecisionContext {
            state: &self.state,
            queue: &self.queue,
            redraw: &self.redraw,
            keymap: self.keymap.as_ref(),
            system: self.system.as_ref(),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
