//! The display model shared by the render, progress and input threads.

use std::time::Instant;

use unicode_width::UnicodeWidthChar;

use super::event::TouchPhase;
use super::gesture::{GestureOutcome, GestureRecognizer, ListView, PressFeedback};
use super::layout::{Layout, MAX_LOG_ROWS};
use super::log_buffer::LogBuffer;
use super::menu::{ItemKind, MenuItem};
use super::progress::ProgressState;
use crate::canvas::BackgroundIcon;

/// Everything the renderer needs for one frame. Lives behind the engine's single
/// display lock; every public engine call is one critical section over it.
#[derive(Debug)]
pub struct DisplayState {
    pub layout: Layout,
    pub menu: Vec<MenuItem>,
    pub selection: usize,
    /// Applied to the list; may be out of bounds while a bounce is pending.
    pub scroll_offset: i32,
    pub tabs: Vec<String>,
    pub active_tab: usize,
    pub log_tab: usize,
    pub headers: Vec<String>,
    pub log: LogBuffer,
    pub progress: ProgressState,
    /// Overlay (menu, bars, log) on top of the bare background.
    pub visible_text: bool,
    pub show_menu: bool,
    /// Keyboard highlight; hidden while the user is touching.
    pub show_selection: bool,
    pub background: Option<BackgroundIcon>,
    pub gesture: GestureRecognizer,
}

impl DisplayState {
    pub fn new(layout: Layout, log_cols: usize, log_tab: usize) -> Self {
        Self {
            log: LogBuffer::new(layout.log_rows(), log_cols),
            layout,
            menu: Vec::new(),
            selection: 0,
            scroll_offset: 0,
            tabs: Vec::new(),
            active_tab: 0,
            log_tab,
            headers: Vec::new(),
            progress: ProgressState::default(),
            visible_text: true,
            show_menu: false,
            show_selection: true,
            background: None,
            gesture: GestureRecognizer::default(),
        }
    }

    /// Install a menu. Items from the first `Null` on are dropped; headers are
    /// capped in count and width.
    pub fn start_menu(
        &mut self,
        headers: &[String],
        tabs: &[String],
        items: &[MenuItem],
        initial: usize,
    ) {
        let cols = self.log.cols();
        self.headers = headers
            .iter()
            .take(MAX_LOG_ROWS)
            .map(|header| truncate_to_width(header, cols - 1))
            .collect();
        self.tabs = tabs.to_vec();
        if self.active_tab >= self.tabs.len() {
            self.active_tab = 0;
        }
        self.menu = items
            .iter()
            .take_while(|item| item.kind != ItemKind::Null)
            .cloned()
            .collect();
        self.scroll_offset = 0;
        self.gesture.reset();
        self.show_menu = true;
        self.selection = 0;
        self.select(initial as isize);
    }

    pub fn end_menu(&mut self) {
        self.show_menu = false;
        self.gesture.reset();
    }

    /// Move the highlight, wrapping in both directions. Returns the new selection.
    pub fn select(&mut self, index: isize) -> usize {
        if !self.menu.is_empty() {
            self.selection = index.rem_euclid(self.menu.len() as isize) as usize;
        }
        self.selection
    }

    pub fn move_selection(&mut self, delta: isize) -> usize {
        self.select(self.selection as isize + delta)
    }

    /// Cycle to the next tab. Without tabs this stays on 0.
    pub fn next_tab(&mut self) -> usize {
        if !self.tabs.is_empty() {
            self.active_tab = (self.active_tab + 1) % self.tabs.len();
        }
        self.active_tab
    }

    /// Returns `false` for an index past the last tab.
    pub fn set_active_tab(&mut self, index: usize) -> bool {
        if self.tabs.is_empty() || index < self.tabs.len() {
            self.active_tab = index;
            return true;
        }
        false
    }

    pub fn on_log_tab(&self) -> bool {
        self.active_tab == self.log_tab
    }

    pub fn handle_touch(&mut self, phase: TouchPhase, x: i32, y: i32, at: Instant) -> GestureOutcome {
        self.show_selection = false;
        let list = ListView {
            items: &self.menu,
            viewport: self.layout.viewport(),
        };
        self.gesture
            .on_touch(phase, x, y, at, list, &mut self.scroll_offset)
    }

    /// Step time-based animations. Returns `true` while something is moving.
    pub fn advance_animations(&mut self, now: Instant) -> bool {
        self.gesture.advance(now, &mut self.scroll_offset)
    }

    pub fn press(&self) -> Option<PressFeedback> {
        self.gesture.press()
    }

    pub fn log_line(&mut self, text: &str) {
        self.log.push_str(text);
    }
}

fn truncate_to_width(text: &str, max: usize) -> String {
    let mut width = 0;
    text.chars()
        .take_while(|ch| {
            width += UnicodeWidthChar::width(*ch).unwrap_or(0);
            width <= max
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DisplayState {
        DisplayState::new(Layout::new(480, 854), 20, 2)
    }

    fn titles(names: &[&str]) -> Vec<MenuItem> {
        names.iter().map(|name| MenuItem::small(*name)).collect()
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut state = state();
        state.start_menu(&[], &[], &titles(&["a", "b", "c"]), 0);
        assert_eq!(state.move_selection(-1), 2);
        assert_eq!(state.move_selection(1), 0);
        assert_eq!(state.select(7), 1);
        assert_eq!(state.select(-4), 2);
    }

    #[test]
    fn selection_stays_in_range_for_any_walk() {
        let mut state = state();
        state.start_menu(&[], &[], &titles(&["a", "b", "c", "d", "e"]), 3);
        let steps = [1isize, 1, -1, 3, -7, 2, 2, 2, -1, 11, -13];
        for step in steps.iter().cycle().take(200) {
            let selection = state.move_selection(*step);
            assert!(selection < state.menu.len());
        }
    }

    #[test]
    fn start_menu_truncates_at_terminator() {
        let mut state = state();
        let mut items = titles(&["a", "b"]);
        items.push(MenuItem::terminator());
        items.push(MenuItem::small("hidden"));
        state.start_menu(&[], &[], &items, 5);
        assert_eq!(state.menu.len(), 2);
        assert_eq!(state.selection, 1);
        assert!(state.show_menu);
    }

    #[test]
    fn headers_are_capped() {
        let mut state = state();
        let headers: Vec<String> = (0..60).map(|i| format!("header line number {i} padded")).collect();
        state.start_menu(&headers, &[], &titles(&["a"]), 0);
        assert_eq!(state.headers.len(), MAX_LOG_ROWS);
        assert!(state.headers.iter().all(|h| h.chars().count() <= 19));
    }

    #[test]
    fn empty_menu_keeps_selection_zero() {
        let mut state = state();
        state.start_menu(&[], &[], &[], 4);
        assert_eq!(state.select(3), 0);
        assert_eq!(state.move_selection(-1), 0);
    }

    #[test]
    fn tabs_cycle() {
        let mut state = state();
        let tabs = vec!["Menu".to_string(), "Tools".to_string(), "Log".to_string()];
        state.start_menu(&[], &tabs, &titles(&["a"]), 0);
        assert_eq!(state.next_tab(), 1);
        assert_eq!(state.next_tab(), 2);
        assert!(state.on_log_tab());
        assert_eq!(state.next_tab(), 0);
        assert!(!state.set_active_tab(3));
        assert!(state.set_active_tab(2));
    }

    #[test]
    fn touch_hides_keyboard_highlight() {
        let mut state = state();
        state.start_menu(&[], &[], &titles(&["a", "b"]), 0);
        let now = Instant::now();
        state.handle_touch(TouchPhase::Start, 100, 150, now);
        assert!(!state.show_selection);
        assert!(state.press().is_some());
        assert_eq!(
            state.handle_touch(TouchPhase::Release, 100, 150, now),
            GestureOutcome::Tap(0)
        );
    }
}
