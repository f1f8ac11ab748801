use crate::tui::components::TextInput;
use crate::tui::{Action, Component, Theme};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// Path entry for the Import action
#[derive(Default)]
pub struct ImportPrompt {
    input: TextInput,
    error: Option<String>,
}

impl ImportPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let handled = self.input.handle_key(key).is_some();
        if handled {
            self.error = None;
        }
        handled
    }

    /// The entered path with a leading `~` expanded, or `None` when blank
    pub fn path(&self) -> Option<PathBuf> {
        let raw = self.input.value().trim();
        if raw.is_empty() {
            return None;
        }
        Some(crate::config::expand_tilde(raw))
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Component for ImportPrompt {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Confirm => {
                if self.path().is_none() {
                    self.set_error("Enter the path of a .csv or spreadsheet file");
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = Theme::default();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title("Load file")
            .title_bottom(Line::from(" Enter: load  Esc: cancel ").right_aligned())
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(theme.focused_border_style());

        let mut lines = vec![
            Line::from(Span::styled(
                "Path to a .csv, .xlsx, .xls, .xlsm, .xlsb or .ods file:",
                theme.muted_style(),
            )),
            self.input.line(theme.normal_style(), true),
        ];
        if let Some(error) = &self.error {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(error.clone(), theme.error_style())));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[Action::Confirm, Action::Cancel]
    }

    fn name(&self) -> &str {
        "ImportPrompt"
    }
}
