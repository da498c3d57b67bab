use std::time::Duration;

/// Idle ticks per forced redraw.
const IDLE_TICKS_PER_REDRAW: u8 = 5;

/// Result of one render tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub redraw: bool,
    /// How long to wait before the next tick.
    pub sleep: Duration,
}

/// Adaptive redraw rate: every tick at the fast interval while the idle countdown
/// is positive, otherwise a slower tick that redraws every fifth time (or on request).
#[derive(Debug, Clone)]
pub struct Cadence {
    fast: Duration,
    idle: Duration,
    counter: u8,
}

impl Cadence {
    pub fn new(fast_fps: u32, slow_fps: u32) -> Self {
        Self {
            fast: Duration::from_secs(1) / fast_fps.max(1),
            idle: Duration::from_secs(1) / (slow_fps.max(1) * u32::from(IDLE_TICKS_PER_REDRAW)),
            counter: 0,
        }
    }

    pub fn tick(&mut self, countdown: i32, requested: bool) -> Tick {
        self.counter = (self.counter + 1) % IDLE_TICKS_PER_REDRAW;
        let active = countdown > 0;
        Tick {
            redraw: active || requested || self.counter == 0,
            sleep: if active { self.fast } else { self.idle },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_countdown_redraws_every_tick_fast() {
        let mut cadence = Cadence::new(60, 1);
        for _ in 0..10 {
            let tick = cadence.tick(30, false);
            assert!(tick.redraw);
            assert_eq!(tick.sleep, Duration::from_secs(1) / 60);
        }
    }

    #[test]
    fn idle_redraws_every_fifth_tick() {
        let mut cadence = Cadence::new(60, 1);
        let redraws: Vec<bool> = (0..10).map(|_| cadence.tick(0, false).redraw).collect();
        assert_eq!(redraws.iter().filter(|redraw| **redraw).count(), 2);
        assert_eq!(cadence.tick(0, false).sleep, Duration::from_millis(200));
    }

    #[test]
    fn requests_redraw_while_idle() {
        let mut cadence = Cadence::new(60, 1);
        cadence.tick(0, false);
        assert!(cadence.tick(0, true).redraw);
    }
}
