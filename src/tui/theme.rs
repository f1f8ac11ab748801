use crate::core::CellKind;
use ratatui::style::{Color, Modifier, Style};

/// Color scheme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // General UI colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Table colors
    pub header_fg: Color,
    pub header_bg: Color,
    pub selected_fg: Color,
    pub selected_bg: Color,
    pub row_alt_bg: Color,

    // Classified cells
    pub phone: Color,
    pub link: Color,

    // Status/feedback colors
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "Default Dark".to_string(),
            background: Color::Reset,
            foreground: Color::Gray,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            header_fg: Color::Cyan,
            header_bg: Color::Reset,
            selected_fg: Color::Black,
            selected_bg: Color::Cyan,
            row_alt_bg: Color::Rgb(25, 25, 35),
            phone: Color::Green,
            link: Color::LightBlue,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            info: Color::Blue,
        }
    }
}

impl Theme {
    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the currently active cell
    pub fn selected_cell_style(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn normal_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn alt_row_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.row_alt_bg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    /// Foreground for a classified cell; plain text keeps the row style
    pub fn cell_kind_style(&self, kind: &CellKind) -> Style {
        match kind {
            CellKind::Phone(_) => Style::default().fg(self.phone),
            CellKind::Url(_) => self.link_style(),
            CellKind::PlainText => Style::default(),
        }
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn info_style(&self) -> Style {
        Style::default().fg(self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = Theme::default();
        assert_eq!(theme.name, "Default Dark");
        assert_ne!(theme.header_fg, Color::Reset);
        assert_ne!(theme.selected_bg, Color::Reset);
    }

    #[test]
    fn test_style_helpers() {
        let theme = Theme::default();

        let header = theme.header_style();
        assert!(header.add_modifier.contains(Modifier::BOLD));

        let selected = theme.selected_style();
        assert_eq!(selected.fg, Some(theme.selected_fg));
        assert_eq!(selected.bg, Some(theme.selected_bg));
    }

    #[test]
    fn test_cell_kind_styles() {
        let theme = Theme::default();
        let phone = theme.cell_kind_style(&CellKind::Phone("+33612345678".into()));
        assert_eq!(phone.fg, Some(theme.phone));

        let url = theme.cell_kind_style(&CellKind::Url("https://acme.fr".into()));
        assert!(url.add_modifier.contains(Modifier::UNDERLINED));

        assert_eq!(theme.cell_kind_style(&CellKind::PlainText), Style::default());
    }
}
