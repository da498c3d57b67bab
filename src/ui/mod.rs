//! Touch/key menu engine: display state, gesture recognition and the worker threads.

pub mod decision;
mod engine;
pub mod event;
pub mod gesture;
pub mod input;
pub mod key_table;
pub mod layout;
pub mod log_buffer;
pub mod menu;
pub mod progress;
pub mod queue;
pub mod redraw;
pub mod render;
pub mod state;


pub use decision::{Decision, DefaultKeyMap, KeyAction, KeyMapper};
pub use engine::{Engine, EngineError, EngineOptions, EngineParts};
pub use event::{keys, EventKind, InputEvent, TouchPhase};
pub use input::{DefaultHotkeys, Hotkeys, NoHotkeys};
pub use layout::{Layout, LayoutOverrides, Rect, Viewport};
pub use menu::{ItemKind, MenuItem};
