//! Text input primitives shared by the TUI forms.
//!
//! Cursors are counted in chars, never bytes.

use crossterm::event::{KeyCode, KeyEvent};

/// A single-line input with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    pub value: String,
    pub cursor: usize,
}

impl LineInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = char_len(&value);
        Self { value, cursor }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        edit_single_line(&mut self.value, &mut self.cursor, key);
    }

    /// Insert pasted text at the cursor, dropping line breaks.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars().filter(|c| *c != '\n' && *c != '\r') {
            insert_char_at(&mut self.value, self.cursor, ch);
            self.cursor += 1;
        }
    }

    /// The value with a block cursor drawn in.
    pub fn display(&self) -> String {
        with_cursor(&self.value, self.cursor)
    }
}

/// A multi-line input that grows with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

impl TextArea {
    /// A text area holding `text` with the cursor at its end.
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let row = lines.len().saturating_sub(1);
        let col = lines.last().map_or(0, |line| char_len(line));
        Self { lines, row, col }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub const fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        edit_multiline(&mut self.lines, &mut self.row, &mut self.col, key);
    }

    /// Insert pasted text at the cursor, splitting on line breaks.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars().filter(|c| *c != '\r') {
            if ch == '\n' {
                let split_at = byte_index_at_char(&self.lines[self.row], self.col);
                let tail = self.lines[self.row].split_off(split_at);
                self.row += 1;
                self.col = 0;
                self.lines.insert(self.row, tail);
            } else {
                insert_char_at(&mut self.lines[self.row], self.col, ch);
                self.col += 1;
            }
        }
    }

    /// Each line rendered, with the cursor drawn on its row when `focused`.
    pub fn display_lines(&self, focused: bool) -> Vec<String> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if focused && idx == self.row {
                    with_cursor(line, self.col)
                } else {
                    line.clone()
                }
            })
            .collect()
    }
}

pub fn edit_single_line(text: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(char_len(text)),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = char_len(text),
        KeyCode::Backspace => {
            if *cursor > 0 {
                let remove_idx = *cursor - 1;
                remove_char_at(text, remove_idx);
                *cursor = remove_idx;
            }
        }
        KeyCode::Delete => {
            remove_char_at(text, *cursor);
        }
        KeyCode::Char(c) => {
            insert_char_at(text, *cursor, c);
            *cursor += 1;
        }
        _ => {}
    }
}

pub fn edit_multiline(lines: &mut Vec<String>, row: &mut usize, col: &mut usize, key: KeyEvent) {
    if lines.is_empty() {
        lines.push(String::new());
    }
    match key.code {
        KeyCode::Left => {
            if *col > 0 {
                *col -= 1;
            } else if *row > 0 {
                *row -= 1;
                *col = char_len(&lines[*row]);
            }
        }
        KeyCode::Right => {
            let line_len = char_len(&lines[*row]);
            if *col < line_len {
                *col += 1;
            } else if *row + 1 < lines.len() {
                *row += 1;
                *col = 0;
            }
        }
        KeyCode::Up => {
            if *row > 0 {
                *row -= 1;
                *col = (*col).min(char_len(&lines[*row]));
            }
        }
        KeyCode::Down => {
            if *row + 1 < lines.len() {
                *row += 1;
                *col = (*col).min(char_len(&lines[*row]));
            }
        }
        KeyCode::Home => *col = 0,
        KeyCode::End => *col = char_len(&lines[*row]),
        KeyCode::Enter => {
            let split_at = byte_index_at_char(&lines[*row], *col);
            let tail = lines[*row].split_off(split_at);
            *row += 1;
            *col = 0;
            lines.insert(*row, tail);
        }
        KeyCode::Backspace => {
            if *col > 0 {
                let remove_idx = *col - 1;
                remove_char_at(&mut lines[*row], remove_idx);
                *col = remove_idx;
            } else if *row > 0 {
                let current = lines.remove(*row);
                *row -= 1;
                *col = char_len(&lines[*row]);
                lines[*row].push_str(&current);
            }
        }
        KeyCode::Delete => {
            let line_len = char_len(&lines[*row]);
            if *col < line_len {
                remove_char_at(&mut lines[*row], *col);
            } else if *row + 1 < lines.len() {
                let next = lines.remove(*row + 1);
                lines[*row].push_str(&next);
            }
        }
        KeyCode::Char(c) => {
            insert_char_at(&mut lines[*row], *col, c);
            *col += 1;
        }
        _ => {}
    }
}

pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn byte_index_at_char(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(idx, _)| idx)
}

fn insert_char_at(value: &mut String, char_idx: usize, ch: char) {
    let idx = byte_index_at_char(value, char_idx);
    value.insert(idx, ch);
}

fn remove_char_at(value: &mut String, char_idx: usize) {
    if char_idx >= char_len(value) {
        return;
    }
    let start = byte_index_at_char(value, char_idx);
    let end = byte_index_at_char(value, char_idx + 1);
    value.replace_range(start..end, "");
}

pub fn with_cursor(value: &str, char_idx: usize) -> String {
    let mut out = String::new();
    let mut inserted = false;
    for (idx, ch) in value.chars().enumerate() {
        if idx == char_idx {
            out.push('█');
            inserted = true;
        }
        out.push(ch);
    }
    if !inserted {
        out.push('█');
    }
    out
}
