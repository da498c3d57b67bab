use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

/// Countdown after a key press.
pub const KEY_ACTIVITY: i32 = 50;
/// Countdown after a touch start or drag.
pub const TOUCH_ACTIVITY: i32 = 100;
/// Countdown after a tap.
pub const TAP_ACTIVITY: i32 = 50;
/// Added on top of the current countdown when a bounce starts.
pub const BOUNCE_ACTIVITY: i32 = 50;
/// Subtracted from the countdown on every redraw.
pub const REDRAW_STEP: i32 = 10;

/// Shared idle countdown plus a coalesced "redraw soon" flag.
///
/// Input and API calls raise the countdown; the render thread spends it. While it is
/// above zero the render loop runs at the fast rate.
#[derive(Debug, Default)]
pub struct RedrawBudget {
    countdown: AtomicI32,
    requested: AtomicBool,
}

impl RedrawBudget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the countdown at `level`.
    pub fn mark_activity(&self, level: i32) {
        self.countdown.store(level.max(0), Ordering::Relaxed);
    }

    pub fn extend(&self, amount: i32) {
        self.countdown.fetch_add(amount.max(0), Ordering::Relaxed);
    }

    pub fn countdown(&self) -> i32 {
        self.countdown.load(Ordering::Relaxed)
    }

    /// Spend one redraw's worth of countdown, flooring at zero.
    pub fn consume(&self, step: i32) {
        let _ = self
            .countdown
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
                Some((value - step).max(0))
            });
    }

    /// Ask for a redraw on the next render tick. Repeated requests coalesce.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_floors_at_zero() {
        let budget = RedrawBudget::new();
        budget.mark_activity(KEY_ACTIVITY);
        for _ in 0..7 {
            budget.consume(REDRAW_STEP);
        }
        assert_eq!(budget.countdown(), 0);
    }

    #[test]
    fn bounce_extends_current_countdown() {
        let budget = RedrawBudget::new();
        budget.mark_activity(TOUCH_ACTIVITY);
        budget.consume(REDRAW_STEP);
        budget.extend(BOUNCE_ACTIVITY);
        assert_eq!(budget.countdown(), 140);
    }

    #[test]
    fn requests_coalesce() {
        let budget = RedrawBudget::new();
        budget.request();
        budget.request();
        assert!(budget.take_request());
        assert!(!budget.take_request());
    }
}
