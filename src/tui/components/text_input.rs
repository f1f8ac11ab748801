//! Single-line text editing shared by the search bar and the import prompt

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Editable line with a character-indexed cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    /// Delete character at cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Apply an editing key.
    ///
    /// Returns `None` when the key is not an editing key, otherwise whether the
    /// value changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<bool> {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                Some(true)
            }
            KeyCode::Backspace => Some(self.backspace()),
            KeyCode::Delete => Some(self.delete()),
            KeyCode::Left => {
                self.cursor_left();
                Some(false)
            }
            KeyCode::Right => {
                self.cursor_right();
                Some(false)
            }
            KeyCode::Home => {
                self.cursor_home();
                Some(false)
            }
            KeyCode::End => {
                self.cursor_end();
                Some(false)
            }
            _ => None,
        }
    }

    /// The value as a line, with the cursor cell reversed when `show_cursor` is set
    pub fn line(&self, style: Style, show_cursor: bool) -> Line<'static> {
        if !show_cursor {
            return Line::from(Span::styled(self.value.clone(), style));
        }
        let before: String = self.value.chars().take(self.cursor).collect();
        let at: String = self
            .value
            .chars()
            .nth(self.cursor)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after: String = self.value.chars().skip(self.cursor + 1).collect();
        Line::from(vec![
            Span::styled(before, style),
            Span::styled(at, style.add_modifier(Modifier::REVERSED)),
            Span::styled(after, style),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editing_multibyte_text() {
        let mut input = TextInput::new();
        for c in "Société".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.value(), "Société");
        assert_eq!(input.cursor(), 7);

        input.cursor_left();
        input.cursor_left();
        assert!(input.backspace());
        assert_eq!(input.value(), "Socité");
        assert!(input.delete());
        assert_eq!(input.value(), "Socié");
        input.cursor_end();
        assert!(!input.delete());
        input.cursor_home();
        assert!(!input.backspace());
    }

    #[test]
    fn test_handle_key() {
        let mut input = TextInput::with_value("ab");
        assert_eq!(input.handle_key(&key(KeyCode::Char('c'))), Some(true));
        assert_eq!(input.handle_key(&key(KeyCode::Left)), Some(false));
        assert_eq!(input.handle_key(&key(KeyCode::Backspace)), Some(true));
        assert_eq!(input.value(), "ac");
        assert_eq!(input.handle_key(&key(KeyCode::Enter)), None);
        assert_eq!(input.handle_key(&key(KeyCode::Esc)), None);

        let ctrl_f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(&ctrl_f), None);
        assert_eq!(input.value(), "ac");
    }

    #[test]
    fn test_line_with_cursor() {
        let input = TextInput::with_value("hé");
        let line = input.line(Style::default(), true);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content, "hé");
        assert_eq!(line.spans[1].content, " ");
    }
}
