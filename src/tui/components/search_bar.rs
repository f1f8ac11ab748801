use crate::tui::components::TextInput;
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Live query input above the table
#[derive(Default)]
pub struct SearchBar {
    input: TextInput,
    focused: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        self.input.value()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Apply an editing key. Returns `Some(query)` when the query changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Option<String>> {
        self.input
            .handle_key(key)
            .map(|changed| changed.then(|| self.input.value().to_string()))
    }
}

impl Component for SearchBar {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Confirm | Action::Cancel => {
                self.focused = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = Theme::default();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search")
            .border_style(if self.focused {
                theme.focused_border_style()
            } else {
                theme.border_style()
            });

        let line = if self.input.is_empty() && !self.focused {
            Line::from(Span::styled(
                "Press / to filter rows",
                theme.muted_style(),
            ))
        } else {
            self.input.line(theme.normal_style(), self.focused)
        };

        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "SearchBar"
    }
}

impl Focusable for SearchBar {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_edits_report_new_query() {
        let mut bar = SearchBar::new();
        assert_eq!(bar.handle_key(&key(KeyCode::Char('p'))), Some(Some("p".to_string())));
        assert_eq!(bar.handle_key(&key(KeyCode::Left)), Some(None));
        assert_eq!(bar.handle_key(&key(KeyCode::Enter)), None);
        assert_eq!(bar.handle_key(&key(KeyCode::End)), Some(None));
        assert_eq!(bar.handle_key(&key(KeyCode::Backspace)), Some(Some(String::new())));
        assert_eq!(bar.query(), "");
    }

    #[test]
    fn test_confirm_and_cancel_release_focus() {
        let mut bar = SearchBar::new();
        bar.set_focused(true);
        assert!(bar.handle_action(Action::Confirm).unwrap());
        assert!(!bar.is_focused());

        bar.set_focused(true);
        assert!(bar.handle_action(Action::Cancel).unwrap());
        assert!(!bar.is_focused());
        assert!(!bar.handle_action(Action::Sort).unwrap());
    }
}
