use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

use crate::device::{InputDevice, RawSample, REL_Y};
use crate::ui::input::REL_THRESHOLD;
use crate::ui::keys;

/// Keyboard and mouse of the controlling terminal as an input device.
///
/// Terminals report no key releases, so every press becomes a down/up pair. Alt
/// chords are bracketed by LEFTALT transitions so the held-key hotkeys still work.
/// Mouse cells are mapped to the centre of the matching virtual pixel block; the
/// wheel acts like a trackball.
pub struct TerminalInput {
    width: i32,
    height: i32,
    cols: i32,
    rows: i32,
    pending: VecDeque<RawSample>,
}

impl TerminalInput {
    pub fn for_terminal(width: u32, height: u32) -> io::Result<Self> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(Self::new(width, height, cols, rows))
    }

    pub fn new(width: u32, height: u32, cols: u16, rows: u16) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            cols: i32::from(cols.max(1)),
            rows: i32::from(rows.max(1)),
            pending: VecDeque::new(),
        }
    }

    fn translate(&mut self, event: Event, at: Instant) {
        match event {
            Event::Key(key) => self.translate_key(key, at),
            Event::Mouse(mouse) => self.translate_mouse(mouse, at),
            Event::Resize(cols, rows) => {
                self.cols = i32::from(cols.max(1));
                self.rows = i32::from(rows.max(1));
            }
            _ => {}
        }
    }

    fn translate_key(&mut self, key: KeyEvent, at: Instant) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let Some(code) = key_code(&key) else {
            return;
        };
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        if alt {
            self.pending.push_back(RawSample::key(keys::KEY_LEFTALT, true, at));
        }
        self.pending.push_back(RawSample::key(code, true, at));
        self.pending.push_back(RawSample::key(code, false, at));
        if alt {
            self.pending.push_back(RawSample::key(keys::KEY_LEFTALT, false, at));
        }
    }

    fn translate_mouse(&mut self, mouse: MouseEvent, at: Instant) {
        let x = (2 * i32::from(mouse.column) + 1) * self.width / (2 * self.cols);
        let y = (2 * i32::from(mouse.row) + 1) * self.height / (2 * self.rows);
        let sample = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                RawSample::touch(x, y, true, at)
            }
            MouseEventKind::Up(MouseButton::Left) => RawSample::touch(x, y, false, at),
            MouseEventKind::ScrollUp => RawSample::relative(REL_Y, -(REL_THRESHOLD + 1), at),
            MouseEventKind::ScrollDown => RawSample::relative(REL_Y, REL_THRESHOLD + 1, at),
            _ => return,
        };
        self.pending.push_back(sample);
    }
}

fn key_code(key: &KeyEvent) -> Option<u16> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(keys::KEY_ESC);
    }
    let code = match key.code {
        KeyCode::Up => keys::KEY_UP,
        KeyCode::Down => keys::KEY_DOWN,
        KeyCode::Left => keys::KEY_LEFT,
        KeyCode::Right => keys::KEY_RIGHT,
        KeyCode::Home => keys::KEY_HOME,
        KeyCode::End => keys::KEY_END,
        KeyCode::Enter => keys::KEY_ENTER,
        KeyCode::Esc => keys::KEY_ESC,
        KeyCode::Backspace => keys::KEY_BACK,
        KeyCode::Tab => keys::KEY_TAB,
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'q' => keys::KEY_ESC,
            'l' => keys::KEY_L,
            'r' => keys::KEY_R,
            'm' => keys::KEY_MENU,
            'p' => keys::KEY_POWER,
            '+' | '=' => keys::KEY_VOLUMEUP,
            '-' => keys::KEY_VOLUMEDOWN,
            _ => return None,
        },
        _ => return None,
    };
    Some(code)
}

impl InputDevice for TerminalInput {
    fn next_sample(&mut self, timeout: Duration) -> io::Result<Option<RawSample>> {
        if let Some(sample) = self.pending.pop_front() {
            return Ok(Some(sample));
        }
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = event::read()?;
        self.translate(event, Instant::now());
        Ok(self.pending.pop_front())
    }
}
