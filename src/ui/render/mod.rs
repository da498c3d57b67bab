//! Render thread: adaptive-rate redraw of the display state onto the canvas.

mod cadence;
mod compose;

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

pub use cadence::{Cadence, Tick};
pub use compose::{compose_frame, ACCENT, PRESSED_INSIDE, PRESSED_OUTSIDE};

use super::redraw::{RedrawBudget, REDRAW_STEP};
use super::state::DisplayState;
use crate::canvas::Canvas;
use crate::device::StatusCache;
use crate::{lock_or_recover, log_debug};

/// Delay before the first frame.
const FIRST_FRAME_DELAY: Duration = Duration::from_millis(10);

pub(crate) fn spawn_render_thread(
    mut canvas: Box<dyn Canvas>,
    state: Arc<Mutex<DisplayState>>,
    redraw: Arc<RedrawBudget>,
    mut status: StatusCache,
    mut cadence: Cadence,
    stop_rx: Receiver<()>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("bootmenu-render".into())
        .spawn(move || {
            let mut sleep = FIRST_FRAME_DELAY;
            let mut flip_failing = false;
            loop {
                match stop_rx.recv_timeout(sleep) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                let tick = cadence.tick(redraw.countdown(), redraw.take_request());
                sleep = tick.sleep;
                if !tick.redraw {
                    continue;
                }

                let now = Instant::now();
                // Status files are read before taking the display lock.
                let snapshot = status.snapshot(now).clone();
                let animating = {
                    let mut display = lock_or_recover(&state, "render frame");
                    let animating = display.advance_animations(now);
                    compose_frame(canvas.as_mut(), &display, &snapshot);
                    animating
                };
                if animating {
                    redraw.request();
                }
                match canvas.flip() {
                    Ok(()) => flip_failing = false,
                    Err(err) => {
                        if !flip_failing {
                            log_debug(&format!("canvas flip failed: {err}"));
                        }
                        flip_failing = true;
                    }
                }
                redraw.consume(REDRAW_STEP);
            }
            log_debug("render thread stopped");
        })
}
