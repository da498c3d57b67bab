//! Progress bar model and the animation thread that drives it.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::redraw::RedrawBudget;
use super::state::DisplayState;
use crate::lock_or_recover;

/// Frames in the indeterminate animation when the canvas doesn't say otherwise.
pub const DEFAULT_INDETERMINATE_FRAMES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    None,
    Indeterminate,
    Determinate,
}

#[derive(Debug, Clone)]
pub struct ProgressState {
    pub kind: ProgressKind,
    pub scope_start: f32,
    pub scope_size: f32,
    /// Progress within the current scope, always in `[0, 1]`.
    pub fraction: f32,
    pub scope_started_at: Option<Instant>,
    pub scope_duration: Duration,
    pub frame: usize,
    frame_count: usize,
    bar_width: i32,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new(0, DEFAULT_INDETERMINATE_FRAMES)
    }
}

impl ProgressState {
    pub fn new(bar_width: i32, frame_count: usize) -> Self {
        Self {
            kind: ProgressKind::None,
            scope_start: 0.0,
            scope_size: 0.0,
            fraction: 0.0,
            scope_started_at: None,
            scope_duration: Duration::ZERO,
            frame: 0,
            frame_count: frame_count.max(1),
            bar_width: bar_width.max(0),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Returns `true` if the bar changed.
    pub fn show_indeterminate(&mut self) -> bool {
        if self.kind == ProgressKind::Indeterminate {
            return false;
        }
        self.kind = ProgressKind::Indeterminate;
        true
    }

    /// Open a new scope of `portion` right after the previous one. With
    /// `seconds > 0` the animation thread fills it over that time.
    pub fn show(&mut self, portion: f32, seconds: u32, now: Instant) {
        self.kind = ProgressKind::Determinate;
        self.scope_start += self.scope_size;
        self.scope_size = if portion.is_finite() { portion } else { 0.0 };
        self.scope_started_at = Some(now);
        self.scope_duration = Duration::from_secs(u64::from(seconds));
        self.fraction = 0.0;
    }

    /// Move the bar within the current scope. The fraction is always kept; the
    /// result is `true` only when the filled part shifts by at least a pixel.
    pub fn set_fraction(&mut self, fraction: f32) -> bool {
        let fraction = clamp_unit(fraction);
        if self.kind != ProgressKind::Determinate || fraction <= self.fraction {
            return false;
        }
        let scale = self.bar_width as f32 * self.scope_size;
        let moved = (self.fraction * scale) as i32 != (fraction * scale) as i32;
        self.fraction = fraction;
        moved
    }

    pub fn reset(&mut self) {
        self.kind = ProgressKind::None;
        self.scope_start = 0.0;
        self.scope_size = 0.0;
        self.fraction = 0.0;
        self.scope_started_at = None;
        self.scope_duration = Duration::ZERO;
    }

    /// Fill a timed scope from its elapsed time. Never moves the bar backwards.
    pub fn tick_timed(&mut self, now: Instant) -> bool {
        if self.kind != ProgressKind::Determinate || self.scope_duration.is_zero() {
            return false;
        }
        let Some(started) = self.scope_started_at else {
            return false;
        };
        let elapsed = now.saturating_duration_since(started);
        let progress = clamp_unit(elapsed.as_secs_f32() / self.scope_duration.as_secs_f32());
        if progress > self.fraction {
            self.fraction = progress;
            return true;
        }
        false
    }

    pub fn advance_frame(&mut self) {
        self.frame = (self.frame + 1) % self.frame_count;
    }

    /// Overall bar position in `[0, ..]`, combining scope and fraction.
    pub fn position(&self) -> f32 {
        self.scope_start + self.fraction * self.scope_size
    }

    /// Label shown next to a determinate bar, e.g. `" 42 %"`.
    pub fn percent_label(&self) -> Option<String> {
        let percent = self.position();
        (self.kind == ProgressKind::Determinate && percent > 0.0)
            .then(|| format!("{:3.0} %", percent * 100.0))
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// One animation step under the display lock. Returns `true` if a redraw is due.
pub(crate) fn progress_tick(state: &mut DisplayState, now: Instant) -> bool {
    let mut changed = false;
    if state.progress.kind == ProgressKind::Indeterminate && !state.visible_text {
        state.progress.advance_frame();
        changed = true;
    }
    changed |= state.progress.tick_timed(now);
    changed
}

pub(crate) fn spawn_progress_thread(
    state: Arc<Mutex<DisplayState>>,
    redraw: Arc<RedrawBudget>,
    stop_rx: Receiver<()>,
    fps: u32,
) -> std::io::Result<thread::JoinHandle<()>> {
    let interval = Duration::from_secs(1) / fps.max(1);
    thread::Builder::new()
        .name("bootmenu-progress".into())
        .spawn(move || loop {
            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            let mut display = lock_or_recover(&state, "progress tick");
            if progress_tick(&mut display, Instant::now()) {
                redraw.request();
            }
        })
}
