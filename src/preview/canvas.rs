use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::canvas::{BackgroundIcon, Canvas, Color, FontKind, SurfaceId};
use crate::ui::Rect;

const INDETERMINATE_FRAMES: usize = 8;
const STRIPE_PERIOD: i32 = 4;
const BAR_EMPTY: Color = Color::rgb(90, 90, 90);
const BAR_FILL: Color = Color::rgb(0, 170, 255);
const ICON_DEFAULT: Color = Color::rgb(30, 60, 110);
const ICON_ALTERNATE: Color = Color::rgb(120, 70, 20);
/// Marks the second half of a double-width glyph.
const WIDE_TAIL: char = '\0';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::WHITE,
        bg: Color::BLACK,
    };
}

/// Rasterizes a virtual pixel screen onto a grid of terminal cells.
///
/// Every cell covers `cell_w` x `cell_h` virtual pixels. Fonts are one cell tall and
/// one cell per column wide, surfaces are drawn with block glyphs. `flip` rewrites only
/// the rows that changed since the last presented frame.
pub struct TerminalCanvas {
    width: i32,
    height: i32,
    cell_w: i32,
    cell_h: i32,
    cols: usize,
    rows: usize,
    back: Vec<Cell>,
    front: Vec<Cell>,
    presented: bool,
    out: Box<dyn Write + Send>,
}

impl TerminalCanvas {
    /// Canvas over the current terminal, writing to stdout.
    pub fn for_stdout(width: u32, height: u32) -> io::Result<Self> {
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(Self::new(width, height, cols, rows, Box::new(io::stdout())))
    }

    pub fn new(width: u32, height: u32, cols: u16, rows: u16, out: Box<dyn Write + Send>) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let (cols_i, rows_i) = (i32::from(cols), i32::from(rows));
        let usable = width > 0 && height > 0 && cols_i > 0 && rows_i > 0;
        let (cell_w, cell_h) = if usable {
            ((width / cols_i).max(1), (height / rows_i).max(1))
        } else {
            (1, 1)
        };
        let (grid_cols, grid_rows) = if usable {
            ((width / cell_w).min(cols_i) as usize, (height / cell_h).min(rows_i) as usize)
        } else {
            (0, 0)
        };
        let cells = grid_cols * grid_rows;
        Self {
            width: if usable { width } else { 0 },
            height: if usable { height } else { 0 },
            cell_w,
            cell_h,
            cols: grid_cols,
            rows: grid_rows,
            back: vec![Cell::BLANK; cells],
            front: vec![Cell::BLANK; cells],
            presented: false,
            out,
        }
    }

    /// Terminal cell grid actually used, `(cols, rows)`.
    pub fn grid(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn col_of(&self, x: i32) -> i32 {
        x.div_euclid(self.cell_w)
    }

    fn row_of(&self, y: i32) -> i32 {
        y.div_euclid(self.cell_h)
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return None;
        }
        let index = row as usize * self.cols + col as usize;
        self.back.get_mut(index)
    }

    /// Cells whose centre lies inside `rect`, as `(col, row)` ranges.
    fn covered(&self, rect: Rect) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
        let first = |start: i32, cell: i32| (start - cell / 2 + cell - 1).div_euclid(cell);
        let cols = first(rect.x, self.cell_w)..first(rect.right(), self.cell_w);
        let rows = first(rect.y, self.cell_h)..first(rect.bottom(), self.cell_h);
        (cols, rows)
    }

    fn paint(&mut self, rect: Rect, mut glyph: impl FnMut(i32, i32) -> (char, Color)) {
        let (cols, rows) = self.covered(rect);
        let origin = self.col_of(rect.x);
        for row in rows {
            for col in cols.clone() {
                let (ch, fg) = glyph(col - origin, row);
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.ch = ch;
                    cell.fg = fg;
                }
            }
        }
    }

    fn surface_dims(&self, surface: SurfaceId) -> Option<(i32, i32)> {
        match surface {
            SurfaceId::Background(_) => Some((self.width / 3, self.height / 6)),
            SurfaceId::ProgressEmpty | SurfaceId::ProgressFill => {
                Some((self.width * 5 / 6, self.cell_h))
            }
            SurfaceId::Indeterminate(frame) if frame < INDETERMINATE_FRAMES => {
                Some((self.width * 5 / 6, self.cell_h))
            }
            SurfaceId::Indeterminate(_) => None,
        }
    }

    fn encode_frame(&self) -> io::Result<Vec<u8>> {
        let mut frame = Vec::new();
        for row in 0..self.rows {
            let span = row * self.cols..(row + 1) * self.cols;
            if self.presented && self.back[span.clone()] == self.front[span.clone()] {
                continue;
            }
            queue!(frame, MoveTo(0, row as u16))?;
            let mut pen: Option<(Color, Color)> = None;
            for cell in &self.back[span] {
                if cell.ch == WIDE_TAIL {
                    continue;
                }
                if pen != Some((cell.fg, cell.bg)) {
                    queue!(
                        frame,
                        SetForegroundColor(term_color(cell.fg)),
                        SetBackgroundColor(term_color(cell.bg))
                    )?;
                    pen = Some((cell.fg, cell.bg));
                }
                queue!(frame, Print(cell.ch))?;
            }
        }
        if !frame.is_empty() {
            queue!(frame, ResetColor)?;
        }
        Ok(frame)
    }

    #[cfg(test)]
    fn row_text(&self, row: usize) -> String {
        self.back[row * self.cols..(row + 1) * self.cols]
            .iter()
            .filter(|cell| cell.ch != WIDE_TAIL)
            .map(|cell| cell.ch)
            .collect()
    }
}

fn term_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

impl Canvas for TerminalCanvas {
    fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn surface_size(&self, surface: SurfaceId) -> Option<(i32, i32)> {
        self.surface_dims(surface)
    }

    fn indeterminate_frames(&self) -> usize {
        INDETERMINATE_FRAMES
    }

    fn font_height(&self, _font: FontKind) -> i32 {
        self.cell_h
    }

    fn measure(&self, text: &str, _font: FontKind) -> i32 {
        text.width() as i32 * self.cell_w
    }

    fn fill(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        // Rules thinner than half a cell become a line glyph over the existing background.
        if rect.h * 2 < self.cell_h {
            let row = self.row_of(rect.y);
            let line = Rect::new(rect.x, row * self.cell_h, rect.w, self.cell_h);
            self.paint(line, |_, _| ('─', color));
            return;
        }
        let (cols, rows) = self.covered(rect);
        for row in rows {
            for col in cols.clone() {
                if let Some(cell) = self.cell_mut(col, row) {
                    *cell = Cell {
                        ch: ' ',
                        fg: Color::WHITE,
                        bg: color,
                    };
                }
            }
        }
    }

    fn blit(&mut self, surface: SurfaceId, src: Rect, dst: (i32, i32)) {
        let Some((surface_w, surface_h)) = self.surface_dims(surface) else {
            return;
        };
        let Some(src) = src.intersect(&Rect::new(0, 0, surface_w, surface_h)) else {
            return;
        };
        let target = Rect::new(dst.0, dst.1, src.w, src.h);
        match surface {
            SurfaceId::Background(icon) => {
                let color = match icon {
                    BackgroundIcon::Default => ICON_DEFAULT,
                    BackgroundIcon::Alternate => ICON_ALTERNATE,
                };
                self.paint(target, |_, _| ('▒', color));
            }
            SurfaceId::ProgressEmpty => self.paint(target, |_, _| ('░', BAR_EMPTY)),
            SurfaceId::ProgressFill => self.paint(target, |_, _| ('█', BAR_FILL)),
            SurfaceId::Indeterminate(frame) => {
                let shift = frame as i32;
                self.paint(target, |col, _| {
                    if (col + shift).rem_euclid(STRIPE_PERIOD * 2) < STRIPE_PERIOD {
                        ('▓', BAR_FILL)
                    } else {
                        ('░', BAR_EMPTY)
                    }
                });
            }
        }
    }

    fn draw_text(&mut self, at: (i32, i32), text: &str, _font: FontKind, color: Color, clip: Option<Rect>) {
        let middle = at.1 - self.cell_h / 2;
        let row = self.row_of(middle);
        let (mut min_col, mut max_col) = (0, self.cols as i32);
        if let Some(clip) = clip {
            if middle < clip.y || middle >= clip.bottom() {
                return;
            }
            min_col = self.col_of(clip.x);
            max_col = max_col.min(self.col_of(clip.right() - 1) + 1);
        }
        let mut col = self.col_of(at.0);
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if col + width > max_col {
                break;
            }
            if col >= min_col {
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.ch = ch;
                    cell.fg = color;
                }
                if width == 2 {
                    if let Some(cell) = self.cell_mut(col + 1, row) {
                        cell.ch = WIDE_TAIL;
                    }
                }
            }
            col += width;
        }
    }

    fn flip(&mut self) -> io::Result<()> {
        let frame = self.encode_frame()?;
        if !frame.is_empty() {
            self.out.write_all(&frame)?;
            self.out.flush()?;
        }
        self.front.clone_from(&self.back);
        self.presented = true;
        Ok(())
    }
}
