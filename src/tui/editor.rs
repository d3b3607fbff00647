//! Multi-line text editor for the service configuration
//!
//! Cursor columns are grapheme cluster indices, so combining marks and emoji move and
//! delete as one unit.

use unicode_segmentation::UnicodeSegmentation;

/// Spaces inserted for Tab (YAML does not accept tab indentation)
const TAB_WIDTH: usize = 2;

/// Byte offset of grapheme `idx` in `line`, or `line.len()` past the end
fn byte_offset(line: &str, idx: usize) -> usize {
    line.grapheme_indices(true)
        .nth(idx)
        .map_or(line.len(), |(offset, _)| offset)
}

fn grapheme_len(line: &str) -> usize {
    line.graphemes(true).count()
}

/// Start of the word left of `idx`; words are delimited by whitespace
fn word_left(line: &str, idx: usize) -> usize {
    let g: Vec<&str> = line.graphemes(true).collect();
    let mut i = idx.min(g.len());
    while i > 0 && g[i - 1].trim().is_empty() {
        i -= 1;
    }
    while i > 0 && !g[i - 1].trim().is_empty() {
        i -= 1;
    }
    i
}

/// End of the word right of `idx`
fn word_right(line: &str, idx: usize) -> usize {
    let g: Vec<&str> = line.graphemes(true).collect();
    let mut i = idx.min(g.len());
    while i < g.len() && g[i].trim().is_empty() {
        i += 1;
    }
    while i < g.len() && !g[i].trim().is_empty() {
        i += 1;
    }
    i
}

/// Editable configuration text
///
/// Tracks the text last loaded from (or saved to) the service as a baseline so the panel
/// can tell whether there are unsaved edits.
#[derive(Debug, Clone)]
pub(crate) struct ConfigEditor {
    lines: Vec<String>,
    row: usize,
    col: usize,
    baseline: String,
    /// First visible row and column, kept by [`ConfigEditor::scroll_into_view`]
    scroll: (usize, usize),
}

impl Default for ConfigEditor {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl ConfigEditor {
    pub(crate) fn from_text(text: &str) -> Self {
        Self {
            lines: split_lines(text),
            row: 0,
            col: 0,
            baseline: text.to_string(),
            scroll: (0, 0),
        }
    }

    /// Replace the text and baseline, keeping the cursor where it still fits
    pub(crate) fn load(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.baseline = text.to_string();
        self.row = self.row.min(self.lines.len() - 1);
        self.clamp_col();
    }

    /// Mark the given text as the saved state
    pub(crate) fn set_baseline(&mut self, text: String) {
        self.baseline = text;
    }

    pub(crate) fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.text() != self.baseline
    }

    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor as (row, grapheme column)
    pub(crate) const fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub(crate) const fn scroll(&self) -> (usize, usize) {
        self.scroll
    }

    fn current_line(&self) -> &str {
        &self.lines[self.row]
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(grapheme_len(&self.lines[self.row]));
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub(crate) fn insert_char(&mut self, ch: char) {
        let at = byte_offset(&self.lines[self.row], self.col);
        self.lines[self.row].insert(at, ch);
        // A combining mark joins the previous cluster instead of adding one
        let before = self.col;
        self.col = grapheme_len(&self.lines[self.row][..at + ch.len_utf8()]).max(before);
    }

    pub(crate) fn insert_tab(&mut self) {
        for _ in 0..TAB_WIDTH {
            self.insert_char(' ');
        }
    }

    /// Split the line at the cursor, carrying the current indentation over
    pub(crate) fn insert_newline(&mut self) {
        let at = byte_offset(&self.lines[self.row], self.col);
        let rest = self.lines[self.row].split_off(at);
        let indent: String = self.lines[self.row]
            .chars()
            .take_while(|c| *c == ' ')
            .collect();
        self.col = grapheme_len(&indent);
        self.row += 1;
        self.lines.insert(self.row, indent + &rest);
    }

    pub(crate) fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let start = byte_offset(line, self.col - 1);
            let end = byte_offset(line, self.col);
            line.replace_range(start..end, "");
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = grapheme_len(&self.lines[self.row]);
            self.lines[self.row].push_str(&line);
        }
    }

    pub(crate) fn delete(&mut self) {
        let len = grapheme_len(self.current_line());
        if self.col < len {
            let line = &mut self.lines[self.row];
            let start = byte_offset(line, self.col);
            let end = byte_offset(line, self.col + 1);
            line.replace_range(start..end, "");
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    /// Remove the word before the cursor (Ctrl+Backspace); at column 0 joins lines
    pub(crate) fn delete_word_before(&mut self) {
        if self.col == 0 {
            self.backspace();
            return;
        }
        let start = word_left(self.current_line(), self.col);
        let line = &mut self.lines[self.row];
        let from = byte_offset(line, start);
        let to = byte_offset(line, self.col);
        line.replace_range(from..to, "");
        self.col = start;
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    pub(crate) fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = grapheme_len(self.current_line());
        }
    }

    pub(crate) fn move_right(&mut self) {
        if self.col < grapheme_len(self.current_line()) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub(crate) fn move_up(&mut self) {
        self.move_rows_up(1);
    }

    pub(crate) fn move_down(&mut self) {
        self.move_rows_down(1);
    }

    pub(crate) fn move_rows_up(&mut self, rows: usize) {
        self.row = self.row.saturating_sub(rows);
        self.clamp_col();
    }

    pub(crate) fn move_rows_down(&mut self, rows: usize) {
        self.row = (self.row + rows).min(self.lines.len() - 1);
        self.clamp_col();
    }

    pub(crate) fn move_home(&mut self) {
        self.col = 0;
    }

    pub(crate) fn move_end(&mut self) {
        self.col = grapheme_len(self.current_line());
    }

    pub(crate) fn move_word_left(&mut self) {
        if self.col == 0 {
            self.move_left();
        } else {
            self.col = word_left(self.current_line(), self.col);
        }
    }

    pub(crate) fn move_word_right(&mut self) {
        if self.col >= grapheme_len(self.current_line()) {
            self.move_right();
        } else {
            self.col = word_right(self.current_line(), self.col);
        }
    }

    /// Adjust the scroll offsets so the cursor is inside a `height` x `width` window
    pub(crate) fn scroll_into_view(&mut self, height: usize, width: usize) {
        let (mut top, mut left) = self.scroll;
        let height = height.max(1);
        let width = width.max(1);

        if self.row < top {
            top = self.row;
        } else if self.row >= top + height {
            top = self.row + 1 - height;
        }
        if self.col < left {
            left = self.col;
        } else if self.col >= left + width {
            left = self.col + 1 - width;
        }
        self.scroll = (top, left);
    }
}

fn split_lines(text: &str) -> Vec<String> {
    // `split` keeps a trailing empty line, so text ending in '\n' round-trips
    text.split('\n').map(str::to_string).collect()
}

/// Visible part of `line` starting at grapheme `left`, at most `width` graphemes
pub(crate) fn visible_slice(line: &str, left: usize, width: usize) -> &str {
    let start = byte_offset(line, left);
    let end = byte_offset(line, left + width);
    &line[start..end]
}
