//! Console preview: a crossterm canvas and input device so the engine runs in any terminal.

mod canvas;
mod input;

pub use canvas::TerminalCanvas;
pub use input::TerminalInput;
