use crate::core::CellKind;
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// The selected cell, with its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellInfo {
    /// Row in the derived view (0-based)
    pub row: usize,
    /// Row in the base table (0-based)
    pub base_row: usize,
    pub col: usize,
    pub column_name: String,
    pub value: String,
    pub kind: CellKind,
}

impl CellInfo {
    /// Text to show as the cell's normalized form, when it differs from the raw value
    pub fn normalized(&self) -> Option<&str> {
        match &self.kind {
            CellKind::Phone(n) | CellKind::Url(n) if n != self.value.trim() => Some(n),
            _ => None,
        }
    }
}

/// Configuration for the cell viewer display
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub height_mode: HeightMode,
    /// Maximum height when using AutoFit (in lines, excluding borders)
    pub max_height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightMode {
    /// One value line plus the link line
    Fixed,
    /// Grow with the wrapped value, up to `max_height`
    AutoFit,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            height_mode: HeightMode::AutoFit,
            max_height: 6,
        }
    }
}

/// Shows the value under the table cursor, and its link for phones and URLs
pub struct CellViewer {
    cell_info: Option<CellInfo>,
    focused: bool,
    config: ViewerConfig,
}

impl CellViewer {
    pub fn new() -> Self {
        Self::with_config(ViewerConfig::default())
    }

    pub fn with_config(config: ViewerConfig) -> Self {
        Self {
            cell_info: None,
            focused: false,
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Required height for the viewer (including borders)
    pub fn calculate_height(&self, available_width: u16) -> u16 {
        let Some(info) = &self.cell_info else {
            return 3;
        };
        let link_lines = u16::from(info.kind.link().is_some());
        match self.config.height_mode {
            HeightMode::Fixed => 3 + link_lines,
            HeightMode::AutoFit => {
                let content_width = available_width.saturating_sub(2).max(1) as usize;
                let value_lines = textwrap::wrap(&info.value, content_width).len().max(1) as u16;
                let content_lines = (value_lines + link_lines).min(self.config.max_height).max(1);
                content_lines + 2
            }
        }
    }

    pub fn set_cell_info(&mut self, cell_info: Option<CellInfo>) {
        self.cell_info = cell_info;
    }

    pub fn cell_info(&self) -> Option<&CellInfo> {
        self.cell_info.as_ref()
    }

    pub fn clear(&mut self) {
        self.cell_info = None;
    }
}

impl Default for CellViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CellViewer {
    fn handle_action(&mut self, _action: Action) -> Result<bool> {
        Ok(false)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = Theme::default();
        let border_style = if self.focused {
            theme.focused_border_style()
        } else {
            theme.border_style()
        };

        let Some(info) = &self.cell_info else {
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Cell")
                .border_style(border_style);
            let placeholder = Paragraph::new(Span::styled("No cell selected", theme.muted_style()))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        };

        let title = format!("{} ({})", info.column_name, info.kind.label());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let mut lines = vec![Line::from(info.value.as_str())];
        if let Some(link) = info.kind.link() {
            let label = match info.normalized() {
                Some(normalized) => format!("{normalized} → "),
                None => "→ ".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled(label, theme.muted_style()),
                Span::styled(link, theme.link_style()),
            ]));
        }

        let content = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(content, area);
    }

    fn supported_actions(&self) -> &[Action] {
        &[]
    }

    fn name(&self) -> &str {
        "CellViewer"
    }
}

impl Focusable for CellViewer {
    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
