//! Drawing surface abstraction the render thread composes frames onto.

mod recording;

use std::io;

pub use recording::{DrawOp, FrameLog, RecordingCanvas};

use crate::ui::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKind {
    Head,
    Item,
    Logs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackgroundIcon {
    Default,
    Alternate,
}

/// Pre-loaded images a canvas can blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Background(BackgroundIcon),
    ProgressEmpty,
    ProgressFill,
    Indeterminate(usize),
}

/// A rasterizer with a back buffer.
///
/// Draw calls only touch the back buffer; `flip` presents it. Coordinates are screen
/// pixels with the origin top-left. Only the render thread ever holds the canvas.
pub trait Canvas: Send {
    fn size(&self) -> (i32, i32);

    /// `None` when the surface isn't available on this canvas.
    fn surface_size(&self, surface: SurfaceId) -> Option<(i32, i32)>;

    fn indeterminate_frames(&self) -> usize {
        1
    }

    fn font_height(&self, font: FontKind) -> i32;

    /// Pixel width of `text` in `font`.
    fn measure(&self, text: &str, font: FontKind) -> i32;

    fn fill(&mut self, rect: Rect, color: Color);

    fn blit(&mut self, surface: SurfaceId, src: Rect, dst: (i32, i32));

    /// `at` is the text baseline origin. Glyphs outside `clip` are dropped.
    fn draw_text(&mut self, at: (i32, i32), text: &str, font: FontKind, color: Color, clip: Option<Rect>);

    fn flip(&mut self) -> io::Result<()>;
}
