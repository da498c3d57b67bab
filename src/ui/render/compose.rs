//! Turns a [`DisplayState`] into draw calls. No I/O, no flip.

use crate::canvas::{BackgroundIcon, Canvas, Color, FontKind, SurfaceId};
use crate::device::StatusSnapshot;
use crate::ui::layout::{Rect, Viewport};
use crate::ui::menu::{inside_item, item_top, ItemKind};
use crate::ui::progress::ProgressKind;
use crate::ui::state::DisplayState;

pub const ACCENT: Color = Color::rgb(0, 170, 255);
pub const PRESSED_INSIDE: Color = Color::rgb(255, 183, 0);
pub const PRESSED_OUTSIDE: Color = Color::rgb(255, 205, 86);
const ITEM_DIVIDER: Color = Color::rgb(164, 164, 164);
const LOG_TEXT: Color = Color::rgb(192, 192, 192);
const STATUSBAR_BG: Color = Color::rgba(0, 0, 0, 160);
const LOG_TAB_BG: Color = Color::rgba(50, 50, 50, 160);
const STATUSBAR_RIGHT_PAD: i32 = 10;
const TAB_PADDING: i32 = 20;
const TAB_MARKER_HEIGHT: i32 = 10;
const DIVIDER_THICKNESS: i32 = 4;
const LOG_TAB_TOP_PAD: i32 = 22;

pub fn compose_frame(canvas: &mut dyn Canvas, state: &DisplayState, status: &StatusSnapshot) {
    draw_background(canvas, state);
    draw_progress(canvas, state);
    if !state.visible_text {
        return;
    }
    if state.on_log_tab() {
        let (width, height) = canvas.size();
        canvas.fill(Rect::new(0, 0, width, height), LOG_TAB_BG);
    } else if state.show_menu {
        draw_menu(canvas, state);
    }
    draw_status_bar(canvas, state, status);
    draw_tabs(canvas, state);
    if state.on_log_tab() {
        draw_full_log(canvas, state);
    } else {
        draw_tailed_log(canvas, state);
    }
}

fn draw_background(canvas: &mut dyn Canvas, state: &DisplayState) {
    let (width, height) = canvas.size();
    canvas.fill(Rect::new(0, 0, width, height), Color::BLACK);
    let Some(icon) = state.background else {
        return;
    };
    let surface = SurfaceId::Background(icon);
    if let Some((icon_w, icon_h)) = canvas.surface_size(surface) {
        canvas.blit(
            surface,
            Rect::new(0, 0, icon_w, icon_h),
            ((width - icon_w) / 2, (height - icon_h) / 2),
        );
    }
}

fn draw_progress(canvas: &mut dyn Canvas, state: &DisplayState) {
    let progress = &state.progress;
    if progress.kind == ProgressKind::None {
        return;
    }
    let Some((bar_w, bar_h)) = canvas.surface_size(SurfaceId::ProgressEmpty) else {
        return;
    };
    let (width, height) = canvas.size();
    let icon_h = canvas
        .surface_size(SurfaceId::Background(BackgroundIcon::Alternate))
        .map_or(0, |(_, h)| h);
    let dx = (width - bar_w) / 2;
    let dy = (3 * height + icon_h - 2 * bar_h) / 4 - 5;
    canvas.fill(Rect::new(dx, dy, bar_w, bar_h), Color::BLACK);

    match progress.kind {
        ProgressKind::Determinate => {
            let pos = ((progress.position() * bar_w as f32) as i32).clamp(0, bar_w);
            if pos > 0 {
                canvas.blit(SurfaceId::ProgressFill, Rect::new(0, 0, pos, bar_h), (dx, dy));
            }
            if pos < bar_w - 1 {
                canvas.blit(
                    SurfaceId::ProgressEmpty,
                    Rect::new(pos, 0, bar_w - pos, bar_h),
                    (dx + pos, dy),
                );
            }
            if let Some(label) = progress.percent_label().filter(|_| pos > 0) {
                canvas.draw_text((dx + 8, dy - 4), &label, FontKind::Logs, Color::WHITE, None);
            }
        }
        ProgressKind::Indeterminate => {
            let frame = SurfaceId::Indeterminate(progress.frame);
            let frame = if canvas.surface_size(frame).is_some() {
                frame
            } else {
                SurfaceId::Indeterminate(0)
            };
            canvas.blit(frame, Rect::new(0, 0, bar_w, bar_h), (dx, dy));
        }
        ProgressKind::None => {}
    }
}

fn draw_menu(canvas: &mut dyn Canvas, state: &DisplayState) {
    let viewport = state.layout.viewport();
    let clip = viewport.as_rect();
    let press = state.press();
    let font_h = canvas.font_height(FontKind::Item);

    for (index, item) in state.menu.iter().enumerate() {
        if item.kind == ItemKind::Null {
            continue;
        }
        let height = item.kind.height();
        let top = item_top(&state.menu, &viewport, state.scroll_offset, index);
        if top + height < viewport.top || top > viewport.bottom {
            continue;
        }

        let (mut text, mut background) = (Color::WHITE, Color::BLACK);
        if state.show_selection && index == state.selection {
            text = Color::BLACK;
            background = Color::WHITE;
        }
        if let Some(press) = press {
            let (ax, ay) = press.anchor;
            if inside_item(&state.menu, &viewport, state.scroll_offset, index, ax, ay) {
                let (px, py) = press.pointer;
                text = Color::BLACK;
                background = if inside_item(&state.menu, &viewport, state.scroll_offset, index, px, py) {
                    PRESSED_INSIDE
                } else {
                    PRESSED_OUTSIDE
                };
            }
        }

        let row = Rect::new(viewport.left, top, clip.w, height);
        if let Some(visible) = row.intersect(&clip) {
            canvas.fill(visible, background);
        }
        let baseline = top + height / 2 + font_h / 2;
        canvas.draw_text((viewport.left, baseline), &item.title, FontKind::Item, text, Some(clip));
        if top + height <= viewport.bottom {
            canvas.fill(Rect::new(viewport.left, top + height - 1, clip.w, 1), ITEM_DIVIDER);
        }
    }
}

fn draw_status_bar(canvas: &mut dyn Canvas, state: &DisplayState, status: &StatusSnapshot) {
    let (width, _) = canvas.size();
    let bar_h = state.layout.statusbar_height;
    canvas.fill(Rect::new(0, 0, width, bar_h), STATUSBAR_BG);

    let font = FontKind::Logs;
    let y = canvas.font_height(font) / 2 + bar_h / 2;
    let version = concat!("Bootmenu v", env!("CARGO_PKG_VERSION"));
    canvas.draw_text((0, y), version, font, ACCENT, None);

    let clock_w = canvas.measure(&status.clock, font);
    canvas.draw_text((width / 2 - clock_w / 2, y), &status.clock, font, ACCENT, None);
    if !status.connectivity.is_empty() {
        canvas.draw_text((width / 4 * 3, y), &status.connectivity, font, ACCENT, None);
    }
    if let Some(level) = status.battery {
        let label = format!("{level}%");
        let label_w = canvas.measure(&label, font);
        canvas.draw_text(
            (width - label_w - STATUSBAR_RIGHT_PAD, y),
            &label,
            font,
            ACCENT,
            None,
        );
    }
}

fn draw_tabs(canvas: &mut dyn Canvas, state: &DisplayState) {
    let (width, _) = canvas.size();
    let top = state.layout.statusbar_height;
    let tab_h = state.layout.tab_height;
    canvas.fill(Rect::new(0, top, width, tab_h), Color::BLACK);

    let font = FontKind::Head;
    let baseline = top + canvas.font_height(font) / 2 + tab_h / 2;
    let mut left = 0;
    for (index, title) in state.tabs.iter().enumerate() {
        let tab_w = canvas.measure(title, font) + 2 * TAB_PADDING;
        canvas.draw_text((left + TAB_PADDING, baseline), title, font, Color::WHITE, None);
        if index == state.active_tab {
            canvas.fill(
                Rect::new(left, top + tab_h - TAB_MARKER_HEIGHT, tab_w, TAB_MARKER_HEIGHT),
                ACCENT,
            );
        }
        left += tab_w;
    }
    canvas.fill(
        Rect::new(0, state.layout.chrome_height(), width, DIVIDER_THICKNESS),
        ACCENT,
    );
}

fn draw_full_log(canvas: &mut dyn Canvas, state: &DisplayState) {
    let (width, height) = canvas.size();
    let font = FontKind::Logs;
    let line_h = canvas.font_height(font).max(1);
    let top = state.layout.chrome_height() + LOG_TAB_TOP_PAD;
    let rows = ((height - top) / line_h).max(0) as usize;

    let counter = format!("{rows} rows");
    let counter_w = canvas.measure(&counter, font);
    canvas.draw_text((width - counter_w - STATUSBAR_RIGHT_PAD, top), &counter, font, LOG_TEXT, None);

    let headers = state.headers.iter().map(String::as_str);
    let body_rows = rows.saturating_sub(state.headers.len().min(rows));
    let lines = headers.take(rows).chain(state.log.tail(body_rows));
    for (row, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = top + line_h * (row as i32 + 1);
        canvas.draw_text((2, y), line, font, LOG_TEXT, None);
    }
}

fn draw_tailed_log(canvas: &mut dyn Canvas, state: &DisplayState) {
    let viewport: Viewport = state.layout.viewport();
    let font = FontKind::Logs;
    let line_h = canvas.font_height(font).max(1);
    let lines: Vec<&str> = state.log.lines().collect();
    let bottom = viewport.bottom - line_h / 4;
    for (from_bottom, line) in lines.iter().rev().enumerate() {
        if line.is_empty() {
            continue;
        }
        let y = bottom - line_h * from_bottom as i32;
        if y - line_h < viewport.top {
            break;
        }
        canvas.draw_text((viewport.left, y), line, font, LOG_TEXT, Some(viewport.as_rect()));
    }
}
