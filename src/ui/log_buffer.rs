use unicode_width::UnicodeWidthChar;

/// Stands in for a glyph wider than a whole row.
const WIDE_PLACEHOLDER: char = '?';

/// Fixed-size ring of console rows.
///
/// Text is appended at the write cursor. A newline, or a row that would grow past
/// `cols - 1` columns, moves the cursor to the next row; once every row is used the
/// oldest one is recycled. Glyphs that could never fit in a row are written as `?`.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    rows: Vec<String>,
    cols: usize,
    head: usize,
    current: usize,
    write_col: usize,
}

impl LogBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        Self {
            rows: vec![String::new(); rows],
            cols: cols.max(2),
            head: 0,
            current: 0,
            write_col: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Append text, wrapping on `\n` and at the row width.
    pub fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\r' {
                continue;
            }
            let mut width = UnicodeWidthChar::width(ch).unwrap_or(0);
            let ch = if width > self.cols - 1 {
                width = 1;
                WIDE_PLACEHOLDER
            } else {
                ch
            };
            let full = self.write_col > 0 && self.write_col + width > self.cols - 1;
            if ch == '\n' || full {
                self.next_row();
            }
            if ch != '\n' {
                self.rows[self.current].push(ch);
                self.write_col += width;
            }
        }
    }

    fn next_row(&mut self) {
        self.current = (self.current + 1) % self.rows.len();
        if self.current == self.head {
            self.head = (self.head + 1) % self.rows.len();
        }
        self.rows[self.current].clear();
        self.write_col = 0;
    }

    /// Number of rows in use, including the row being written.
    pub fn len(&self) -> usize {
        (self.current + self.rows.len() - self.head) % self.rows.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 1 && self.rows[self.current].is_empty()
    }

    /// Rows from oldest to newest.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        let capacity = self.rows.len();
        (0..self.len()).map(move |i| self.rows[(self.head + i) % capacity].as_str())
    }

    /// The newest `count` rows, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &str> + '_ {
        let skip = self.len().saturating_sub(count);
        self.lines().skip(skip)
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.head = 0;
        self.current = 0;
        self.write_col = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(buffer: &LogBuffer) -> Vec<String> {
        buffer.lines().map(str::to_string).collect()
    }

    #[test]
    fn lines_split_on_newline() {
        let mut buffer = LogBuffer::new(4, 20);
        buffer.push_str("one\ntwo\n");
        assert_eq!(collect(&buffer), vec!["one", "two", ""]);
        buffer.push_str("three");
        assert_eq!(collect(&buffer), vec!["one", "two", "three"]);
    }

    #[test]
    fn long_rows_wrap_before_last_column() {
        let mut buffer = LogBuffer::new(4, 5);
        buffer.push_str("abcdefghij");
        assert_eq!(collect(&buffer), vec!["abcd", "efgh", "ij"]);
        assert!(buffer.lines().all(|line| line.chars().count() <= 4));
    }

    #[test]
    fn wide_glyphs_count_double() {
        let mut buffer = LogBuffer::new(4, 5);
        buffer.push_str("日本語");
        assert_eq!(collect(&buffer), vec!["日本", "語"]);
    }

    #[test]
    fn glyph_wider_than_a_row_is_replaced() {
        let mut buffer = LogBuffer::new(4, 2);
        buffer.push_str("日本");
        assert_eq!(collect(&buffer), vec!["?", "?"]);
        assert!(buffer.lines().all(|line| line.chars().count() <= 1));
    }

    #[test]
    fn keeps_only_most_recent_rows() {
        let mut buffer = LogBuffer::new(3, 20);
        for i in 0..10 {
            buffer.push_str(&format!("line {i}\n"));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(collect(&buffer), vec!["line 8", "line 9", ""]);
        let tail: Vec<_> = buffer.tail(2).collect();
        assert_eq!(tail, vec!["line 9", ""]);
    }

    #[test]
    fn clear_resets_cursors() {
        let mut buffer = LogBuffer::new(3, 20);
        buffer.push_str("a\nb\nc\nd");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(collect(&buffer), vec![""]);
    }
}
