//! The blocking "wait for the user's choice" loop and the key mapping it consults.

use std::sync::Mutex;

use super::event::{keys, EventKind, InputEvent};
use super::gesture::GestureOutcome;
use super::queue::EventQueue;
use super::redraw::{RedrawBudget, BOUNCE_ACTIVITY, TAP_ACTIVITY};
use super::state::DisplayState;
use crate::device::SystemActions;
use crate::lock_or_recover;

/// Haptic pulse length for a tap.
pub const TAP_VIBRATE_MS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    NoAction,
    HighlightUp,
    HighlightDown,
    SelectItem,
    Cancel,
    NextTab,
    /// Shortcut straight to an item.
    Item(usize),
}

/// Host-defined key bindings.
pub trait KeyMapper: Send + Sync {
    fn key_to_action(&self, code: u16, overlay_visible: bool) -> KeyAction;
}

/// Arrow/volume keys move, Enter/Power/Camera select, Back/Esc cancel, Tab/Menu
/// switch tabs. Nothing is mapped while the overlay is hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyMap;

impl KeyMapper for DefaultKeyMap {
    fn key_to_action(&self, code: u16, overlay_visible: bool) -> KeyAction {
        if !overlay_visible {
            return KeyAction::NoAction;
        }
        match code {
            keys::KEY_UP | keys::KEY_VOLUMEUP => KeyAction::HighlightUp,
            keys::KEY_DOWN | keys::KEY_VOLUMEDOWN => KeyAction::HighlightDown,
            keys::KEY_ENTER | keys::KEY_POWER | keys::KEY_CAMERA => KeyAction::SelectItem,
            keys::KEY_BACK | keys::KEY_ESC => KeyAction::Cancel,
            keys::KEY_TAB | keys::KEY_MENU => KeyAction::NextTab,
            _ => KeyAction::NoAction,
        }
    }
}

/// How a menu interaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    ItemSelected(usize),
    /// The user switched tabs; carries the now active tab.
    NextTab(usize),
    Cancel,
}

pub(crate) struct DecisionContext<'a> {
    pub(crate) state: &'a Mutex<DisplayState>,
    pub(crate) queue: &'a EventQueue,
    pub(crate) redraw: &'a RedrawBudget,
    pub(crate) keymap: &'a dyn KeyMapper,
    pub(crate) system: &'a dyn SystemActions,
}

impl DecisionContext<'_> {
    /// Block until the user decides. `None` once the queue is closed for shutdown.
    pub(crate) fn await_decision(&self, initial: usize) -> Option<Decision> {
        self.queue.clear();
        {
            let mut state = lock_or_recover(self.state, "await_decision start");
            state.show_menu = true;
            state.select(initial as isize);
        }
        self.redraw.request();

        let decision = loop {
            let Some(event) = self.queue.pop_blocking() else {
                break None;
            };
            if let Some(decision) = self.handle_event(event) {
                break Some(decision);
            }
        };

        lock_or_recover(self.state, "await_decision end").show_menu = false;
        self.redraw.request();
        decision
    }

    fn handle_event(&self, event: InputEvent) -> Option<Decision> {
        match event.kind {
            EventKind::Key { code, .. } => self.handle_key(code),
            EventKind::Touch { phase, x, y } => {
                let outcome =
                    lock_or_recover(self.state, "decision touch").handle_touch(phase, x, y, event.at);
                match outcome {
                    GestureOutcome::Tap(index) => {
                        self.redraw.mark_activity(TAP_ACTIVITY);
                        self.system.vibrate(TAP_VIBRATE_MS);
                        Some(Decision::ItemSelected(index))
                    }
                    GestureOutcome::BounceStarted => {
                        self.redraw.extend(BOUNCE_ACTIVITY);
                        None
                    }
                    GestureOutcome::Scrolled | GestureOutcome::Tracking => {
                        self.redraw.request();
                        None
                    }
                    GestureOutcome::Ignored => None,
                }
            }
        }
    }

    /// Maps and applies a key under one lock, so a concurrent `show_overlay(false)`
    /// can't move a hidden menu.
    fn handle_key(&self, code: u16) -> Option<Decision> {
        let mut state = lock_or_recover(self.state, "decision key");
        let action = self.keymap.key_to_action(code, state.visible_text);
        let decision = match action {
            KeyAction::NoAction => return None,
            KeyAction::HighlightUp => {
                state.show_selection = true;
                state.move_selection(-1);
                None
            }
            KeyAction::HighlightDown => {
                state.show_selection = true;
                state.move_selection(1);
                None
            }
            KeyAction::SelectItem => {
                state.show_selection = true;
                // Nothing to pick on an empty menu; keep waiting.
                (!state.menu.is_empty()).then_some(Decision::ItemSelected(state.selection))
            }
            KeyAction::Cancel => Some(Decision::Cancel),
            KeyAction::NextTab => Some(Decision::NextTab(state.next_tab())),
            KeyAction::Item(index) => {
                (index < state.menu.len()).then_some(Decision::ItemSelected(index))
            }
        };
        drop(state);
        self.redraw.request();
        decision
    }

    /// Block until a key goes down; touches are discarded.
    pub(crate) fn wait_key(&self) -> Option<u16> {
        loop {
            match self.queue.pop_blocking()?.kind {
                EventKind::Key { code, .. } => return Some(code),
                EventKind::Touch { .. } => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::event::TouchPhase;
    use crate::ui::layout::Layout;
    use crate::ui::menu::MenuItem;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Instant;

    #[derive(Default)]
    struct Haptics {
        last_ms: AtomicU32,
    }

    impl SystemActions for Haptics {
        fn reboot(&self) {}

        fn vibrate(&self, ms: u32) {
            self.last_ms.store(ms, Ordering::SeqCst);
        }
    }

    struct Fixture {
        state: Mutex<DisplayState>,
        queue: EventQueue,
        redraw: RedrawBudget,
        haptics: Haptics,
    }

    impl Fixture {
        fn new() -> Self {
            let mut state = DisplayState::new(Layout::new(480, 854), 40, 2);
            let items = vec![
                MenuItem::small("A"),
                MenuItem::small("B"),
                MenuItem::small("Cancel"),
            ];
            let tabs = vec!["Menu".to_string(), "Tools".to_string()];
            state.start_menu(&[], &tabs, &items, 0);
            Self {
                state: Mutex::new(state),
                queue: EventQueue::new(128),
                redraw: RedrawBudget::new(),
                haptics: Haptics::default(),
            }
        }

        fn context(&self) -> DecisionContext<'_> {
            DecisionContext {
                state: &self.state,
                queue: &self.queue,
                redraw: &self.redraw,
                keymap: &DefaultKeyMap,
                system: &self.haptics,
            }
        }

        fn handle(&self, event: InputEvent) -> Option<Decision> {
            self.context().handle_event(event)
        }
    }

    fn key(code: u16) -> InputEvent {
        InputEvent::key(code, Instant::now())
    }

    #[test]
    fn down_down_select_picks_third_item() {
        let fixture = Fixture::new();
        assert_eq!(fixture.handle(key(keys::KEY_DOWN)), None);
        assert_eq!(fixture.handle(key(keys::KEY_VOLUMEDOWN)), None);
        assert_eq!(
            fixture.handle(key(keys::KEY_ENTER)),
            Some(Decision::ItemSelected(2))
        );
    }

    #[test]
    fn up_wraps_to_last_item() {
        let fixture = Fixture::new();
        fixture.handle(key(keys::KEY_UP));
        assert_eq!(
            fixture.handle(key(keys::KEY_POWER)),
            Some(Decision::ItemSelected(2))
        );
    }

    #[test]
    fn cancel_and_tab_actions() {
        let fixture = Fixture::new();
        assert_eq!(fixture.handle(key(keys::KEY_BACK)), Some(Decision::Cancel));
        assert_eq!(fixture.handle(key(keys::KEY_MENU)), Some(Decision::NextTab(1)));
        assert_eq!(fixture.handle(key(keys::KEY_TAB)), Some(Decision::NextTab(0)));
        assert_eq!(fixture.handle(key(keys::KEY_SEARCH)), None);
    }

    #[test]
    fn hidden_overlay_ignores_keys() {
        let fixture = Fixture::new();
        lock_or_recover(&fixture.state, "test").visible_text = false;
        assert_eq!(fixture.handle(key(keys::KEY_ENTER)), None);
    }

    /// Maps digit keys 1..=9 straight to items.
    struct Shortcuts;

    impl KeyMapper for Shortcuts {
        fn key_to_action(&self, code: u16, _overlay_visible: bool) -> KeyAction {
            match code {
                2..=10 => KeyAction::Item(usize::from(code - 2)),
                _ => KeyAction::NoAction,
            }
        }
    }

    #[test]
    fn item_shortcuts_outside_the_menu_are_ignored() {
        let fixture = Fixture::new();
        let context = DecisionContext {
            keymap: &Shortcuts,
            ..fixture.context()
        };
        assert_eq!(context.handle_event(key(3)), Some(Decision::ItemSelected(1)));
        assert_eq!(context.handle_event(key(5)), None);
    }

    /// Records whether the display lock was held while a key was mapped.
    struct LockObserver<'a> {
        state: &'a Mutex<DisplayState>,
        held: AtomicBool,
    }

    impl KeyMapper for LockObserver<'_> {
        fn key_to_action(&self, _code: u16, _overlay_visible: bool) -> KeyAction {
            self.held.store(self.state.try_lock().is_err(), Ordering::SeqCst);
            KeyAction::HighlightDown
        }
    }

    #[test]
    fn keys_are_mapped_while_the_display_is_locked() {
        let fixture = Fixture::new();
        let observer = LockObserver {
            state: &fixture.state,
            held: AtomicBool::new(false),
        };
        let context = DecisionContext {
            keymap: &observer,
            ..fixture.context()
        };
        assert_eq!(context.handle_event(key(keys::KEY_DOWN)), None);
        assert!(observer.held.load(Ordering::SeqCst));
        assert_eq!(lock_or_recover(&fixture.state, "test").selection, 1);
    }

    #[test]
    fn tap_selects_and_vibrates() {
        let fixture = Fixture::new();
        let now = Instant::now();
        // Row B spans y 210..290.
        assert_eq!(
            fixture.handle(InputEvent::touch(TouchPhase::Start, 200, 250, now)),
            None
        );
        assert_eq!(
            fixture.handle(InputEvent::touch(TouchPhase::Release, 200, 250, now)),
            Some(Decision::ItemSelected(1))
        );
        assert_eq!(fixture.haptics.last_ms.load(Ordering::SeqCst), TAP_VIBRATE_MS);
        assert_eq!(fixture.redraw.countdown(), TAP_ACTIVITY);
    }

    #[test]
    fn key_after_touch_restores_highlight() {
        let fixture = Fixture::new();
        let now = Instant::now();
        fixture.handle(InputEvent::touch(TouchPhase::Start, 200, 700, now));
        assert!(!lock_or_recover(&fixture.state, "test").show_selection);
        fixture.handle(key(keys::KEY_DOWN));
        let state = lock_or_recover(&fixture.state, "test");
        assert!(state.show_selection);
        assert_eq!(state.selection, 1);
    }

    #[test]
    fn await_decision_discards_backlog_and_returns_none_on_close() {
        let fixture = Fixture::new();
        fixture.queue.push(key(keys::KEY_ENTER));
        fixture.queue.close();
        assert_eq!(fixture.context().await_decision(1), None);
        let state = lock_or_recover(&fixture.state, "test");
        assert!(!state.show_menu);
        assert_eq!(state.selection, 1);
    }

    #[test]
    fn wait_key_skips_touches() {
        let fixture = Fixture::new();
        let now = Instant::now();
        fixture.queue.push(InputEvent::touch(TouchPhase::Start, 1, 1, now));
        fixture.queue.push(key(keys::KEY_HOME));
        assert_eq!(fixture.context().wait_key(), Some(keys::KEY_HOME));
        fixture.queue.close();
        assert_eq!(fixture.context().wait_key(), None);
    }
}
