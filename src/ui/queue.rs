use crossbeam_channel::{select, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::Mutex;

use super::event::InputEvent;
use crate::lock_or_recover;

/// Bounded FIFO between the capture thread and the decision loop.
///
/// Producers never block: once `capacity` events are pending the newest event is
/// dropped. Consumers block in [`EventQueue::pop_blocking`] until an event arrives
/// or the queue is closed for shutdown.
pub struct EventQueue {
    tx: Sender<InputEvent>,
    rx: Receiver<InputEvent>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    shutdown_rx: Receiver<()>,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(0);
        Self {
            tx,
            rx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            shutdown_rx,
        }
    }

    fn closed(&self) -> bool {
        matches!(self.shutdown_rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Queue an event; returns `false` when it was dropped (full or closed).
    pub fn push(&self, event: InputEvent) -> bool {
        if self.closed() {
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Wait for the next event. `None` means the queue was closed and drained.
    pub fn pop_blocking(&self) -> Option<InputEvent> {
        if let Ok(event) = self.rx.try_recv() {
            return Some(event);
        }
        select! {
            recv(self.rx) -> event => event.ok(),
            // An event can land between the first check and the close.
            recv(self.shutdown_rx) -> _ => self.rx.try_recv().ok(),
        }
    }

    /// Throw away pending events so stale presses don't trigger the next menu.
    pub fn clear(&self) {
        self.rx.try_iter().for_each(drop);
    }

    /// Wake every waiter and refuse new events. Pending events are still delivered.
    pub fn close(&self) {
        lock_or_recover(&self.shutdown_tx, "event queue close").take();
    }

    #[cfg(test)]
    pub(crate) fn try_pop(&self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rx.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::event::{keys, EventKind, TouchPhase};
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn key(code: u16) -> InputEvent {
        InputEvent::key(code, Instant::now())
    }

    fn code_of(event: InputEvent) -> u16 {
        match event.kind {
            EventKind::Key { code, .. } => code,
            EventKind::Touch { .. } => panic!("expected key event"),
        }
    }

    #[test]
    fn pops_in_push_order() {
        let queue = EventQueue::new(128);
        for code in 0..100u16 {
            assert!(queue.push(key(code)));
        }
        for code in 0..100u16 {
            assert_eq!(queue.pop_blocking().map(code_of), Some(code));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn drops_newest_when_full() {
        let queue = EventQueue::new(128);
        for code in 0..128u16 {
            assert!(queue.push(key(code)));
        }
        assert!(!queue.push(key(999)));
        assert_eq!(queue.len(), 128);
        let mut last = None;
        while let Some(event) = queue.try_pop() {
            last = Some(code_of(event));
        }
        assert_eq!(last, Some(127));
    }

    #[test]
    fn clear_discards_backlog() {
        let queue = EventQueue::new(128);
        queue.push(key(keys::KEY_UP));
        queue.push(InputEvent::touch(TouchPhase::Start, 1, 2, Instant::now()));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.try_pop().is_none());
    }

    #[test]
    fn blocked_consumer_wakes_on_push() {
        let queue = Arc::new(EventQueue::new(128));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking().map(code_of))
        };
        thread::sleep(Duration::from_millis(20));
        assert!(queue.push(key(keys::KEY_ENTER)));
        assert_eq!(consumer.join().expect("consumer"), Some(keys::KEY_ENTER));
    }

    #[test]
    fn close_wakes_empty_consumer() {
        let queue = Arc::new(EventQueue::new(128));
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop_blocking())
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert!(consumer.join().expect("consumer").is_none());
        assert!(!queue.push(key(keys::KEY_UP)));
    }

    #[test]
    fn close_is_repeatable() {
        let queue = EventQueue::new(4);
        queue.close();
        queue.close();
        assert!(queue.pop_blocking().is_none());
    }

    #[test]
    fn zero_capacity_still_buffers_one_event() {
        let queue = EventQueue::new(0);
        assert!(queue.push(key(keys::KEY_UP)));
        assert!(!queue.push(key(keys::KEY_DOWN)));
        assert_eq!(queue.try_pop().map(code_of), Some(keys::KEY_UP));
    }

    #[test]
    fn close_still_drains_pending_events() {
        let queue = EventQueue::new(128);
        queue.push(key(keys::KEY_DOWN));
        queue.close();
        assert_eq!(queue.pop_blocking().map(code_of), Some(keys::KEY_DOWN));
        assert!(queue.pop_blocking().is_none());
    }
}
