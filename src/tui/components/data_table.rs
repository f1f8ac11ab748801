use crate::core::classifier::classify;
use crate::core::FieldMapping;
use crate::services::TableViewEngine;
use crate::tui::components::CellInfo;
use crate::tui::{Action, Component, Focusable, Theme};
use color_eyre::Result;
use ratatui::{
    layout::{Constraint, Rect},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};
use tracing::debug;

/// Rendered width of one column, borders excluded
const COLUMN_WIDTH: u16 = 18;

/// Position in the derived view (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

/// Window onto the derived view
#[derive(Debug, Clone)]
pub struct Viewport {
    pub top: usize,    // First visible row
    pub left: usize,   // First visible column
    pub height: usize, // Visible rows
    pub width: usize,  // Visible columns
}

/// Table of the loaded file's filtered and sorted rows
///
/// The cursor addresses positions in the derived view; the base row under the
/// cursor identifies the prospect for the detail view.
pub struct DataTable {
    engine: TableViewEngine,
    title: String,
    cursor: Position,
    viewport: Viewport,
    focused: bool,
    supported_actions: Vec<Action>,
}

impl DataTable {
    pub fn new(engine: TableViewEngine, title: impl Into<String>) -> Self {
        Self {
            engine,
            title: title.into(),
            cursor: Position::default(),
            viewport: Viewport {
                top: 0,
                left: 0,
                height: 20, // Updated from the terminal size on render
                width: 5,
            },
            focused: false,
            supported_actions: vec![
                Action::MoveUp,
                Action::MoveDown,
                Action::MoveLeft,
                Action::MoveRight,
                Action::PageUp,
                Action::PageDown,
                Action::Home,
                Action::End,
                Action::GoToTop,
                Action::GoToBottom,
                Action::Sort,
            ],
        }
    }

    pub fn engine(&self) -> &TableViewEngine {
        &self.engine
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    fn row_count(&self) -> usize {
        self.engine.visible_len()
    }

    fn column_count(&self) -> usize {
        self.engine.headers().len()
    }

    /// Re-filter from the base rows and keep the cursor inside the new view
    pub fn search(&mut self, query: &str) {
        self.engine.search(query);
        self.cursor.row = self.cursor.row.min(self.row_count().saturating_sub(1));
        self.viewport.top = 0;
        self.ensure_cursor_visible();
    }

    /// Advance the tri-state sort of the cursor column
    pub fn sort_current_column(&mut self) {
        if self.column_count() == 0 {
            return;
        }
        self.engine.sort(self.cursor.col);
        debug!(
            "Sort on column {} is now {:?}",
            self.cursor.col,
            self.engine.sort_state().direction
        );
    }

    /// Base-table index of the row under the cursor
    pub fn selected_base_row(&self) -> Option<usize> {
        self.engine.base_index(self.cursor.row)
    }

    /// Field mapping of the row under the cursor
    pub fn selected_mapping(&self) -> Option<FieldMapping> {
        self.selected_base_row()
            .and_then(|row| self.engine.table().field_mapping(row))
    }

    pub fn current_cell_info(&self) -> Option<CellInfo> {
        let base_row = self.selected_base_row()?;
        let column_name = self.engine.headers().get(self.cursor.col)?.clone();
        let value = self.engine.cell_at(self.cursor.row, self.cursor.col).to_string();
        let kind = classify(&value);
        Some(CellInfo {
            row: self.cursor.row,
            base_row,
            col: self.cursor.col,
            column_name,
            value,
            kind,
        })
    }

    fn update_viewport(&mut self, area: Rect) {
        // Borders, header row and status title
        self.viewport.height = area.height.saturating_sub(3).max(1) as usize;
        self.viewport.width = (area.width.saturating_sub(2) / (COLUMN_WIDTH + 1)).max(1) as usize;
        self.ensure_cursor_visible();
    }

    fn ensure_cursor_visible(&mut self) {
        if self.cursor.row < self.viewport.top {
            self.viewport.top = self.cursor.row;
        } else if self.cursor.row >= self.viewport.top + self.viewport.height {
            self.viewport.top = self.cursor.row + 1 - self.viewport.height.max(1);
        }

        if self.cursor.col < self.viewport.left {
            self.viewport.left = self.cursor.col;
        } else if self.cursor.col >= self.viewport.left + self.viewport.width {
            self.viewport.left = self.cursor.col + 1 - self.viewport.width.max(1);
        }
    }

    fn move_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.ensure_cursor_visible();
        }
    }

    fn move_down(&mut self) {
        if self.cursor.row + 1 < self.row_count() {
            self.cursor.row += 1;
            self.ensure_cursor_visible();
        }
    }

    fn move_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
            self.ensure_cursor_visible();
        }
    }

    fn move_right(&mut self) {
        if self.cursor.col + 1 < self.column_count() {
            self.cursor.col += 1;
            self.ensure_cursor_visible();
        }
    }

    fn page_up(&mut self) {
        self.cursor.row = self.cursor.row.saturating_sub(self.viewport.height);
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        let row_count = self.row_count();
        if row_count > 0 {
            self.cursor.row = (self.cursor.row + self.viewport.height).min(row_count - 1);
            self.ensure_cursor_visible();
        }
    }

    fn go_to_top(&mut self) {
        self.cursor.row = 0;
        self.ensure_cursor_visible();
    }

    fn go_to_bottom(&mut self) {
        self.cursor.row = self.row_count().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    fn go_home(&mut self) {
        self.cursor.col = 0;
        self.ensure_cursor_visible();
    }

    fn go_end(&mut self) {
        self.cursor.col = self.column_count().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    fn header_label(&self, col: usize, name: &str) -> String {
        match self.engine.applied_sort() {
            Some(sort) if sort.column == Some(col) => {
                format!("{} {}", name, sort.direction.marker())
            }
            _ => name.to_string(),
        }
    }
}

impl Component for DataTable {
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::MoveUp => self.move_up(),
            Action::MoveDown => self.move_down(),
            Action::MoveLeft => self.move_left(),
            Action::MoveRight => self.move_right(),
            Action::PageUp => self.page_up(),
            Action::PageDown => self.page_down(),
            Action::GoToTop => self.go_to_top(),
            Action::GoToBottom => self.go_to_bottom(),
            Action::Home => self.go_home(),
            Action::End => self.go_end(),
            Action::Sort => self.sort_current_column(),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.update_viewport(area);

        let theme = Theme::default();
        let columns = self.viewport.left
            ..(self.viewport.left + self.viewport.width).min(self.column_count());

        let header_cells: Vec<Cell> = columns
            .clone()
            .map(|col| Cell::from(self.header_label(col, &self.engine.headers()[col])))
            .collect();
        let header = Row::new(header_cells).style(theme.header_style());

        let last = (self.viewport.top + self.viewport.height).min(self.row_count());
        let rows: Vec<Row> = (self.viewport.top..last)
            .map(|view_row| {
                let cells: Vec<Cell> = columns
                    .clone()
                    .map(|col| {
                        let value = self.engine.cell_at(view_row, col);
                        let style = if view_row == self.cursor.row && col == self.cursor.col {
                            theme.selected_cell_style()
                        } else {
                            theme.cell_kind_style(&classify(value))
                        };
                        Cell::from(value.to_string()).style(style)
                    })
                    .collect();

                let row_style = if view_row == self.cursor.row {
                    theme.selected_style()
                } else if view_row % 2 == 1 {
                    theme.alt_row_style()
                } else {
                    theme.normal_style()
                };
                Row::new(cells).style(row_style)
            })
            .collect();

        let constraints = vec![Constraint::Length(COLUMN_WIDTH); columns.len().max(1)];

        let position = if self.row_count() == 0 {
            "0/0".to_string()
        } else {
            format!("{}/{}", self.cursor.row + 1, self.row_count())
        };

        let table = Table::new(rows, constraints).header(header).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} [{}]", self.title, position))
                .title_bottom(Line::from(format!(" {} ", self.engine.status_line())).right_aligned())
                .border_style(if self.focused {
                    theme.focused_border_style()
                } else {
                    theme.border_style()
                }),
        );

        frame.render_widget(table, area);
    }

    fn supported_actions(&self) -> &[Action] {
        &self.supported_actions
    }

    fn name(&self) -> &str {
        "DataTable"
    }
}

impl Focusable for DataTable {
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
    use crate::core::{CellKind, Table as DataSet};
    use crate::services::SortDirection;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn create_test_table() -> DataTable {
        let table = DataSet::new(
            vec!["Name".into(), "City".into(), "Phone".into()],
            vec![
                vec!["Charlie".into(), "Paris".into(), "0612345678".into()],
                vec!["alice".into(), "Lyon".into(), "".into()],
                vec!["Bob".into(), "Paris".into(), "n/a".into()],
            ],
        );
        DataTable::new(TableViewEngine::new(Arc::new(table)), "leads.csv")
    }

    #[test]
    fn test_cursor_movement() {
        let mut table = create_test_table();
        assert_eq!(table.cursor(), Position { row: 0, col: 0 });

        table.handle_action(Action::MoveDown).unwrap();
        table.handle_action(Action::MoveRight).unwrap();
        assert_eq!(table.cursor(), Position { row: 1, col: 1 });

        table.handle_action(Action::MoveUp).unwrap();
        table.handle_action(Action::MoveLeft).unwrap();
        table.handle_action(Action::MoveLeft).unwrap();
        assert_eq!(table.cursor(), Position { row: 0, col: 0 });
    }

    #[test]
    fn test_bounds() {
        let mut table = create_test_table();
        table.handle_action(Action::GoToBottom).unwrap();
        table.handle_action(Action::MoveDown).unwrap();
        assert_eq!(table.cursor().row, 2);
        table.handle_action(Action::End).unwrap();
        table.handle_action(Action::MoveRight).unwrap();
        assert_eq!(table.cursor().col, 2);
        table.handle_action(Action::GoToTop).unwrap();
        table.handle_action(Action::Home).unwrap();
        assert_eq!(table.cursor(), Position::default());
        assert!(!table.handle_action(Action::Quit).unwrap());
    }

    #[test]
    fn test_sort_cycles_cursor_column() {
        let mut table = create_test_table();
        table.handle_action(Action::Sort).unwrap();
        assert_eq!(table.engine().sort_state().direction, SortDirection::Ascending);
        assert_eq!(table.selected_base_row(), Some(1)); // alice

        table.handle_action(Action::Sort).unwrap();
        assert_eq!(table.selected_base_row(), Some(0)); // Charlie

        table.handle_action(Action::Sort).unwrap();
        assert_eq!(table.engine().sort_state().direction, SortDirection::None);
        assert_eq!(table.selected_base_row(), Some(0));
    }

    #[test]
    fn test_search_clamps_cursor() {
        let mut table = create_test_table();
        table.handle_action(Action::GoToBottom).unwrap();
        table.search("lyon");
        assert_eq!(table.cursor().row, 0);
        assert_eq!(table.selected_base_row(), Some(1));

        table.search("nobody");
        assert_eq!(table.selected_base_row(), None);
        assert!(table.current_cell_info().is_none());
        assert!(table.selected_mapping().is_none());
    }

    #[test]
    fn test_current_cell_info_is_classified() {
        let mut table = create_test_table();
        table.handle_action(Action::End).unwrap();
        let info = table.current_cell_info().unwrap();
        assert_eq!(info.column_name, "Phone");
        assert_eq!(info.kind, CellKind::Phone("+33612345678".into()));

        let mapping = table.selected_mapping().unwrap();
        assert_eq!(mapping.get("City"), Some("Paris"));
    }

    #[test]
    fn test_render_shows_sort_marker_and_status() {
        let mut table = create_test_table();
        table.handle_action(Action::Sort).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|f| table.render(f, f.area())).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Name ▲"));
        assert!(content.contains("3 of 3 rows"));
        assert!(content.contains("leads.csv [1/3]"));
    }

    #[test]
    fn test_focus() {
        let mut table = create_test_table();
        assert!(!table.is_focused());
        table.set_focused(true);
        assert!(table.is_focused());
    }
}
