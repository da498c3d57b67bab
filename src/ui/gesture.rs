//! Touch gesture recognition for the menu list: tap vs. drag-scroll vs. bounce-back.
//!
//! # State machine
//!
//! - `Idle --start--> Down`: anchor, timestamp and the current scroll offset are recorded.
//! - `Down --drag--> Scrolling` when the touch began inside the viewport, moved at least
//!   `scroll_threshold_px` vertically and is still within `scroll_window`.
//! - `Down --drag--> Dragging` when the finger moved that far but can no longer start a
//!   scroll (outside start or window expired). Smaller moves stay `Down`.
//! - `Down | Dragging --release--> Idle`, emitting a tap when anchor and release fall in
//!   the same row's hit box.
//! - `Scrolling --release--> Bouncing` when the list was pulled out of bounds, else `Idle`.
//! - `Bouncing --advance--> Idle` once `bounce_duration` elapsed; the offset lands exactly
//!   on the rest position.
//!
//! A new touch is ignored while `Scrolling` or `Bouncing`; there is no multi-touch.

use std::time::{Duration, Instant};

use super::event::TouchPhase;
use super::layout::Viewport;
use super::menu::{content_height, inside_item, MenuItem};

/// Thresholds for tap/scroll disambiguation.
#[derive(Debug, Clone, Copy)]
pub struct GestureConfig {
    /// Vertical travel that turns a press into a scroll (default: 10px).
    pub scroll_threshold_px: i32,
    /// A scroll must start within this long after touch-down (default: 300ms).
    pub scroll_window: Duration,
    /// Bounce-back animation length (default: 200ms).
    pub bounce_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 10,
            scroll_window: Duration::from_millis(300),
            bounce_duration: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Down,
    Dragging,
    Scrolling,
    Bouncing,
}

/// What a single touch event did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Dropped: a touch arrived mid-scroll/bounce or without a touch-down.
    Ignored,
    /// Press or pointer movement that changed nothing but feedback.
    Tracking,
    /// The scroll offset moved.
    Scrolled,
    /// Release landed on the row it started on.
    Tap(usize),
    /// Release left the list out of bounds; an animation is now running.
    BounceStarted,
}

/// The list the recognizer hit-tests against.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    pub items: &'a [MenuItem],
    pub viewport: Viewport,
}

/// Anchor and current pointer of a press that may still become a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressFeedback {
    pub anchor: (i32, i32),
    pub pointer: (i32, i32),
}

#[derive(Debug, Clone, Copy)]
struct Bounce {
    from: i32,
    to: i32,
    started_at: Instant,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    phase: GesturePhase,
    anchor: (i32, i32),
    pointer: (i32, i32),
    started_at: Option<Instant>,
    started_inside: bool,
    scroll_base: i32,
    bounce: Option<Bounce>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
            anchor: (-1, -1),
            pointer: (-1, -1),
            started_at: None,
            started_inside: false,
            scroll_base: 0,
            bounce: None,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Forget any touch in flight (new menu, focus change).
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Press feedback while a tap is still possible.
    pub fn press(&self) -> Option<PressFeedback> {
        matches!(self.phase, GesturePhase::Down | GesturePhase::Dragging).then_some(
            PressFeedback {
                anchor: self.anchor,
                pointer: self.pointer,
            },
        )
    }

    /// Feed one touch event. `scroll_offset` is updated in place.
    pub fn on_touch(
        &mut self,
        phase: TouchPhase,
        x: i32,
        y: i32,
        at: Instant,
        list: ListView<'_>,
        scroll_offset: &mut i32,
    ) -> GestureOutcome {
        match phase {
            TouchPhase::Start => self.on_start(x, y, at, &list, *scroll_offset),
            TouchPhase::Drag => self.on_drag(x, y, at, scroll_offset),
            TouchPhase::Release => self.on_release(x, y, at, &list, scroll_offset),
        }
    }

    fn on_start(
        &mut self,
        x: i32,
        y: i32,
        at: Instant,
        list: &ListView<'_>,
        scroll_offset: i32,
    ) -> GestureOutcome {
        if matches!(
            self.phase,
            GesturePhase::Scrolling | GesturePhase::Bouncing
        ) {
            return GestureOutcome::Ignored;
        }
        self.phase = GesturePhase::Down;
        self.anchor = (x, y);
        self.pointer = (x, y);
        self.started_at = Some(at);
        self.started_inside = list.viewport.contains(x, y);
        self.scroll_base = scroll_offset;
        GestureOutcome::Tracking
    }

    fn on_drag(&mut self, x: i32, y: i32, at: Instant, scroll_offset: &mut i32) -> GestureOutcome {
        match self.phase {
            GesturePhase::Down | GesturePhase::Dragging => {
                self.pointer = (x, y);
                let travelled = (y - self.anchor.1).abs() >= self.config.scroll_threshold_px;
                if !travelled {
                    return GestureOutcome::Tracking;
                }
                let elapsed = self
                    .started_at
                    .map(|started| at.saturating_duration_since(started))
                    .unwrap_or(Duration::MAX);
                if self.phase == GesturePhase::Down
                    && self.started_inside
                    && elapsed <= self.config.scroll_window
                {
                    self.phase = GesturePhase::Scrolling;
                    *scroll_offset = self.scroll_base + (y - self.anchor.1);
                    return GestureOutcome::Scrolled;
                }
                self.phase = GesturePhase::Dragging;
                GestureOutcome::Tracking
            }
            GesturePhase::Scrolling => {
                self.pointer = (x, y);
                *scroll_offset = self.scroll_base + (y - self.anchor.1);
                GestureOutcome::Scrolled
            }
            GesturePhase::Idle | GesturePhase::Bouncing => GestureOutcome::Ignored,
        }
    }

    fn on_release(
        &mut self,
        x: i32,
        y: i32,
        at: Instant,
        list: &ListView<'_>,
        scroll_offset: &mut i32,
    ) -> GestureOutcome {
        match self.phase {
            GesturePhase::Down | GesturePhase::Dragging => {
                let (ax, ay) = self.anchor;
                let tapped = (0..list.items.len()).find(|&index| {
                    inside_item(list.items, &list.viewport, *scroll_offset, index, ax, ay)
                        && inside_item(list.items, &list.viewport, *scroll_offset, index, x, y)
                });
                self.finish();
                match tapped {
                    Some(index) => GestureOutcome::Tap(index),
                    None => GestureOutcome::Tracking,
                }
            }
            GesturePhase::Scrolling => {
                let target = rest_offset(
                    *scroll_offset,
                    content_height(list.items),
                    list.viewport.height(),
                );
                self.finish();
                match target {
                    Some(to) => {
                        self.phase = GesturePhase::Bouncing;
                        self.bounce = Some(Bounce {
                            from: *scroll_offset,
                            to,
                            started_at: at,
                        });
                        GestureOutcome::BounceStarted
                    }
                    None => GestureOutcome::Tracking,
                }
            }
            GesturePhase::Idle | GesturePhase::Bouncing => GestureOutcome::Ignored,
        }
    }

    /// Step the bounce animation. Returns `true` while it is still running.
    pub fn advance(&mut self, now: Instant, scroll_offset: &mut i32) -> bool {
        let Some(bounce) = self.bounce else {
            return false;
        };
        let elapsed = now.saturating_duration_since(bounce.started_at);
        let duration = self.config.bounce_duration;
        if elapsed >= duration || duration.is_zero() {
            *scroll_offset = bounce.to;
            self.bounce = None;
            self.phase = GesturePhase::Idle;
            return false;
        }
        let t = elapsed.as_secs_f64() / duration.as_secs_f64();
        let travel = f64::from(bounce.to - bounce.from) * t;
        *scroll_offset = bounce.from + travel.round() as i32;
        true
    }

    fn finish(&mut self) {
        self.phase = GesturePhase::Idle;
        self.anchor = (-1, -1);
        self.pointer = (-1, -1);
        self.started_at = None;
        self.started_inside = false;
    }
}

/// Where an out-of-bounds list comes to rest, or `None` if it already is.
pub fn rest_offset(offset: i32, content_height: i32, viewport_height: i32) -> Option<i32> {
    if offset > 0 {
        return Some(0);
    }
    if offset < 0 && content_height < viewport_height {
        return Some(0);
    }
    if offset < 0 && offset + content_height < viewport_height {
        return Some(-(content_height - viewport_height));
    }
    None
}
