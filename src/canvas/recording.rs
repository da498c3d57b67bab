use std::io;
use std::sync::{Arc, Mutex};

use unicode_width::UnicodeWidthStr;

use super::{Canvas, Color, FontKind, SurfaceId};
use crate::lock_or_recover;
use crate::ui::Rect;

const PROGRESS_BAR_SIZE: (i32, i32) = (400, 20);
const ICON_SIZE: (i32, i32) = (200, 200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Color,
    },
    Blit {
        surface: SurfaceId,
        src: Rect,
        dst: (i32, i32),
    },
    Text {
        at: (i32, i32),
        text: String,
        font: FontKind,
        color: Color,
    },
}

/// Frames presented by a [`RecordingCanvas`], readable from another thread.
#[derive(Debug, Default)]
pub struct FrameLog {
    pending: Vec<DrawOp>,
    last_frame: Vec<DrawOp>,
    flips: usize,
}

/// Headless canvas with fixed font metrics that records every draw call.
///
/// Clone the [`RecordingCanvas::frames`] handle before moving the canvas into an
/// engine to inspect what was rendered.
pub struct RecordingCanvas {
    width: i32,
    height: i32,
    frames: Arc<Mutex<FrameLog>>,
}

impl RecordingCanvas {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            frames: Arc::new(Mutex::new(FrameLog::default())),
        }
    }

    pub fn frames(&self) -> Arc<Mutex<FrameLog>> {
        Arc::clone(&self.frames)
    }

    fn record(&self, op: DrawOp) {
        lock_or_recover(&self.frames, "recording canvas record")
            .pending
            .push(op);
    }

    fn char_width(font: FontKind) -> i32 {
        match font {
            FontKind::Head => 14,
            FontKind::Item => 12,
            FontKind::Logs => 10,
        }
    }
}

impl FrameLog {
    pub fn flips(&self) -> usize {
        self.flips
    }

    pub fn last_frame(&self) -> &[DrawOp] {
        &self.last_frame
    }

    /// Text drawn in the last presented frame, in draw order.
    pub fn last_texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn surface_size(&self, surface: SurfaceId) -> Option<(i32, i32)> {
        match surface {
            SurfaceId::Background(_) => Some(ICON_SIZE),
            SurfaceId::ProgressEmpty | SurfaceId::ProgressFill => Some(PROGRESS_BAR_SIZE),
            SurfaceId::Indeterminate(0) => Some(PROGRESS_BAR_SIZE),
            SurfaceId::Indeterminate(_) => None,
        }
    }

    fn font_height(&self, font: FontKind) -> i32 {
        match font {
            FontKind::Head => 30,
            FontKind::Item => 24,
            FontKind::Logs => 16,
        }
    }

    fn measure(&self, text: &str, font: FontKind) -> i32 {
        text.width() as i32 * Self::char_width(font)
    }

    fn fill(&mut self, rect: Rect, color: Color) {
        if !rect.is_empty() {
            self.record(DrawOp::Fill { rect, color });
        }
    }

    fn blit(&mut self, surface: SurfaceId, src: Rect, dst: (i32, i32)) {
        self.record(DrawOp::Blit { surface, src, dst });
    }

    fn draw_text(&mut self, at: (i32, i32), text: &str, font: FontKind, color: Color, clip: Option<Rect>) {
        if let Some(clip) = clip {
            let height = self.font_height(font);
            let line = Rect::new(clip.x, at.1 - height, clip.w, height);
            if clip.intersect(&line).is_none() {
                return;
            }
        }
        self.record(DrawOp::Text {
            at,
            text: text.to_string(),
            font,
            color,
        });
    }

    fn flip(&mut self) -> io::Result<()> {
        let mut frames = lock_or_recover(&self.frames, "recording canvas flip");
        frames.last_frame = std::mem::take(&mut frames.pending);
        frames.flips += 1;
        Ok(())
    }
}
