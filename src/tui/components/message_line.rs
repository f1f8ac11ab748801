use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Error,
}

/// One-line status message under the table, dismissed with Cancel
#[derive(Debug, Default)]
pub struct MessageLine {
    message: Option<(MessageLevel, String)>,
}

impl MessageLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.message = Some((MessageLevel::Info, message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.message = Some((MessageLevel::Error, message.into()));
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn current(&self) -> Option<(MessageLevel, &str)> {
        self.message
            .as_ref()
            .map(|(level, text)| (*level, text.as_str()))
    }
}

impl Component for MessageLine {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        if action == Action::Cancel && self.is_visible() {
            self.clear();
            return Ok(true);
        }
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = Theme::default();
        let line = match &self.message {
            Some((MessageLevel::Error, text)) => Line::from(vec![
                Span::styled(format!(" {text}"), theme.error_style()),
                Span::styled("  (Esc to dismiss)", theme.muted_style()),
            ]),
            Some((MessageLevel::Info, text)) => {
                Line::from(Span::styled(format!(" {text}"), theme.info_style()))
            }
            None => Line::from(Span::styled(
                " ?: help  /: search  s: sort  Enter: details  o: load  q: quit",
                theme.muted_style(),
            )),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Cancel]
    }

    fn name(&self) -> &str {
        "MessageLine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_dismisses_only_when_visible() {
        let mut line = MessageLine::new();
        assert!(!line.handle_action(Action::Cancel).unwrap());

        line.error("File is empty");
        assert_eq!(line.current(), Some((MessageLevel::Error, "File is empty")));
        assert!(line.handle_action(Action::Cancel).unwrap());
        assert!(!line.is_visible());

        line.info("Copied");
        assert!(!line.handle_action(Action::Sort).unwrap());
        assert!(line.is_visible());
    }
}
