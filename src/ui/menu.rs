//! Menu items and list hit-testing.

use super::layout::Viewport;

/// Row style; also decides the row height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Full,
    Small,
    Standard,
    /// Terminator: it and everything after it is ignored by `start_menu`.
    Null,
}

impl ItemKind {
    pub fn height(self) -> i32 {
        match self {
            ItemKind::Small => 80,
            ItemKind::Standard => 18,
            ItemKind::Full => 100,
            ItemKind::Null => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub kind: ItemKind,
    pub title: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(kind: ItemKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }

    /// The row style used by every bootmenu screen.
    pub fn small(title: impl Into<String>) -> Self {
        Self::new(ItemKind::Small, title, "")
    }

    pub fn terminator() -> Self {
        Self::new(ItemKind::Null, "", "")
    }
}

/// Sum of all row heights.
pub fn content_height(items: &[MenuItem]) -> i32 {
    items.iter().map(|item| item.kind.height()).sum()
}

/// Top edge of row `index` once the list is shifted by `scroll_offset`.
pub fn item_top(items: &[MenuItem], viewport: &Viewport, scroll_offset: i32, index: usize) -> i32 {
    let before: i32 = items
        .iter()
        .take(index)
        .map(|item| item.kind.height())
        .sum();
    viewport.top + scroll_offset + before
}

/// Hit box test: the row's vertical span crossed with the viewport's horizontal span.
pub fn inside_item(
    items: &[MenuItem],
    viewport: &Viewport,
    scroll_offset: i32,
    index: usize,
    x: i32,
    y: i32,
) -> bool {
    let Some(item) = items.get(index) else {
        return false;
    };
    let top = item_top(items, viewport, scroll_offset, index);
    x >= viewport.left && x <= viewport.right && y >= top && y < top + item.kind.height()
}

/// Row under the pointer, if any.
pub fn item_at(
    items: &[MenuItem],
    viewport: &Viewport,
    scroll_offset: i32,
    x: i32,
    y: i32,
) -> Option<usize> {
    (0..items.len()).find(|&index| inside_item(items, viewport, scroll_offset, index, x, y))
}
