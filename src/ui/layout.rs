//! Screen geometry: bar heights, the scrollable list viewport, and log grid size.

use anyhow::{bail, Result};
use serde::Deserialize;

pub const STATUSBAR_HEIGHT: i32 = 40;
pub const TABCONTROL_HEIGHT: i32 = 90;
pub const LIST_MARGIN_LEFT: i32 = 20;
pub const LIST_MARGIN_RIGHT: i32 = 20;
pub const LIST_MARGIN_BOTTOM: i32 = 0;
/// Pixel height budgeted per tailed log row when sizing the log buffer.
pub const LOG_ROW_HEIGHT: i32 = 100;
pub const MAX_LOG_ROWS: usize = 40;
pub const MAX_LOG_COLS: usize = 96;

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlap of two rectangles, `None` when they don't touch.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let rect = Rect::new(x, y, right - x, bottom - y);
        (!rect.is_empty()).then_some(rect)
    }
}

/// Scrollable list area. Edges are inclusive, matching touch hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Viewport {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            (self.right - self.left).max(0),
            self.height(),
        )
    }
}

/// Optional per-device overrides read from `--layout`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOverrides {
    pub statusbar_height: Option<i32>,
    pub tab_height: Option<i32>,
    pub margin_left: Option<i32>,
    pub margin_right: Option<i32>,
    pub margin_bottom: Option<i32>,
    pub log_row_height: Option<i32>,
}

impl LayoutOverrides {
    pub fn check(&self) -> Result<()> {
        let fields = [
            ("statusbar_height", self.statusbar_height),
            ("tab_height", self.tab_height),
            ("margin_left", self.margin_left),
            ("margin_right", self.margin_right),
            ("margin_bottom", self.margin_bottom),
            ("log_row_height", self.log_row_height),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                if !(0..=1024).contains(&value) {
                    bail!("layout {name} must be between 0 and 1024, got {value}");
                }
            }
        }
        if self.log_row_height == Some(0) {
            bail!("layout log_row_height must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    pub statusbar_height: i32,
    pub tab_height: i32,
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
    pub log_row_height: i32,
}

impl Layout {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            statusbar_height: STATUSBAR_HEIGHT,
            tab_height: TABCONTROL_HEIGHT,
            margin_left: LIST_MARGIN_LEFT,
            margin_right: LIST_MARGIN_RIGHT,
            margin_bottom: LIST_MARGIN_BOTTOM,
            log_row_height: LOG_ROW_HEIGHT,
        }
    }

    pub fn with_overrides(mut self, overrides: &LayoutOverrides) -> Self {
        if let Some(value) = overrides.statusbar_height {
            self.statusbar_height = value;
        }
        if let Some(value) = overrides.tab_height {
            self.tab_height = value;
        }
        if let Some(value) = overrides.margin_left {
            self.margin_left = value;
        }
        if let Some(value) = overrides.margin_right {
            self.margin_right = value;
        }
        if let Some(value) = overrides.margin_bottom {
            self.margin_bottom = value;
        }
        if let Some(value) = overrides.log_row_height {
            self.log_row_height = value.max(1);
        }
        self
    }

    /// Height of status bar plus tab strip; the list starts right below it.
    pub fn chrome_height(&self) -> i32 {
        self.statusbar_height + self.tab_height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            left: self.margin_left,
            top: self.chrome_height(),
            right: self.width - self.margin_right,
            bottom: self.height - self.margin_bottom,
        }
    }

    /// Rows kept in the console log ring.
    pub fn log_rows(&self) -> usize {
        let rows = (self.height / self.log_row_height.max(1)).max(1) as usize;
        rows.min(MAX_LOG_ROWS)
    }

    /// Columns kept per log row for a font `char_width` pixels wide.
    pub fn log_cols(&self, char_width: i32) -> usize {
        let cols = (self.width / char_width.max(1)).max(2) as usize;
        cols.min(MAX_LOG_COLS - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_sits_below_chrome() {
        let layout = Layout::new(480, 854);
        let viewport = layout.viewport();
        assert_eq!(viewport.top, STATUSBAR_HEIGHT + TABCONTROL_HEIGHT);
        assert_eq!(viewport.left, 20);
        assert_eq!(viewport.right, 460);
        assert_eq!(viewport.bottom, 854);
        assert!(viewport.contains(20, 130));
        assert!(!viewport.contains(19, 200));
    }

    #[test]
    fn log_grid_is_capped() {
        let layout = Layout::new(4000, 4000);
        assert_eq!(layout.log_rows(), MAX_LOG_ROWS);
        assert_eq!(layout.log_cols(1), MAX_LOG_COLS - 1);
        let small = Layout::new(480, 854);
        assert_eq!(small.log_rows(), 8);
        assert_eq!(small.log_cols(10), 48);
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 80, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 80, 50, 20)));
        assert_eq!(a.intersect(&Rect::new(200, 0, 10, 10)), None);
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let layout = Layout::new(480, 854).with_overrides(&LayoutOverrides {
            tab_height: Some(60),
            ..LayoutOverrides::default()
        });
        assert_eq!(layout.tab_height, 60);
        assert_eq!(layout.statusbar_height, STATUSBAR_HEIGHT);
        assert_eq!(layout.viewport().top, STATUSBAR_HEIGHT + 60);
    }
}
