//! Input handling for the chat TUI
//!
//! Maps crossterm key events to actions and holds the single-line prompt.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions that can be performed from keyboard input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit,
    NewChat,
    InsertChar(char),
    InsertNewline,
    DeleteBack,
    DeleteForward,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    PageUp,
    PageDown,
    Exit,
    None,
}

/// Map a crossterm key event to a TUI action
pub fn map_key_event(event: &KeyEvent) -> InputAction {
    if event.kind == KeyEventKind::Release {
        return InputAction::None;
    }

    match (event.code, event.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => InputAction::Exit,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => InputAction::NewChat,

        (KeyCode::Enter, KeyModifiers::SHIFT) => InputAction::InsertNewline,
        (KeyCode::Enter, _) => InputAction::Submit,

        (KeyCode::PageUp, _) => InputAction::PageUp,
        (KeyCode::PageDown, _) => InputAction::PageDown,
        (KeyCode::Left, _) => InputAction::MoveCursorLeft,
        (KeyCode::Right, _) => InputAction::MoveCursorRight,
        (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
            InputAction::MoveCursorHome
        }
        (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
            InputAction::MoveCursorEnd
        }

        (KeyCode::Backspace, _) => InputAction::DeleteBack,
        (KeyCode::Delete, _) => InputAction::DeleteForward,
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => InputAction::InsertChar(c),

        _ => InputAction::None,
    }
}

/// Prompt text with a character cursor. Lines are separated by `\n`.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    text: String,
    /// Cursor position in characters
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert('\n');
    }

    /// The prompt split into its lines. Always at least one.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Cursor as (line, characters into that line).
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        (row, column)
    }

    pub fn delete_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
