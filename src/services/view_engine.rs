//! Filtered and sorted projection over the base dataset
//!
//! The engine never copies rows. The visible view is a list of base row indices that
//! is recomputed from the base table on every search, then ordered by the sort state.

use crate::core::{Row, Table};
use feruca::Collator;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Tri-state sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
    #[default]
    None,
}

impl SortDirection {
    /// Header marker for the sort column
    pub fn marker(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
            SortDirection::None => "",
        }
    }
}

/// Current sort target and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    /// Direction after clicking `column`: a new column starts ascending,
    /// the current column cycles ascending -> descending -> none -> ascending.
    pub fn next_for(&self, column: usize) -> SortDirection {
        if self.column != Some(column) {
            return SortDirection::Ascending;
        }
        match self.direction {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
            SortDirection::None => SortDirection::Ascending,
        }
    }
}

/// Holds the base table plus query and sort state, and derives the visible rows
#[derive(Debug, Clone)]
pub struct TableViewEngine {
    table: Arc<Table>,
    query: String,
    sort: SortState,
    /// Whether `visible` currently reflects `sort`
    sort_applied: bool,
    visible: Vec<usize>,
}

impl TableViewEngine {
    pub fn new(table: Arc<Table>) -> Self {
        let visible = (0..table.row_count()).collect();
        Self {
            table,
            query: String::new(),
            sort: SortState::default(),
            sort_applied: false,
            visible,
        }
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn headers(&self) -> &[String] {
        &self.table.headers
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Sort state when it is reflected by the visible order
    pub fn applied_sort(&self) -> Option<SortState> {
        (self.sort_applied && self.sort.direction != SortDirection::None).then_some(self.sort)
    }

    /// Re-filter from the base dataset. The last sort is not re-applied.
    pub fn search(&mut self, query: &str) {
        self.query = query.to_string();
        self.visible = self.filtered();
        self.sort_applied = false;
        debug!(
            "Search '{}' keeps {} of {} rows",
            self.query,
            self.visible.len(),
            self.table.row_count()
        );
    }

    /// Advance the tri-state sort for `column` and reorder the filtered rows
    pub fn sort(&mut self, column: usize) {
        let direction = self.sort.next_for(column);
        self.sort = SortState {
            column: Some(column),
            direction,
        };

        let mut rows = self.filtered();
        if direction != SortDirection::None {
            let keys: Vec<String> = rows
                .iter()
                .map(|&r| self.table.cell(r, column).to_lowercase())
                .collect();
            let mut collator = Collator::default();
            let mut order: Vec<usize> = (0..rows.len()).collect();
            // sort_by is stable, so equal keys keep their filtered order
            order.sort_by(|&a, &b| compare_keys(&mut collator, &keys[a], &keys[b], direction));
            rows = order.into_iter().map(|i| rows[i]).collect();
        }
        self.visible = rows;
        self.sort_applied = true;
        debug!("Sort column {} {:?}", column, direction);
    }

    /// Base indices of the rows matching the current query, in base order
    fn filtered(&self) -> Vec<usize> {
        if self.query.is_empty() {
            return (0..self.table.row_count()).collect();
        }
        let needle = self.query.to_lowercase();
        self.table
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
            .map(|(i, _)| i)
            .collect()
    }

    /// Visible rows as base indices, in display order
    pub fn visible_rows(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_len(&self) -> usize {
        self.table.row_count()
    }

    /// Base index of the row at a view position
    pub fn base_index(&self, view_index: usize) -> Option<usize> {
        self.visible.get(view_index).copied()
    }

    pub fn row_at(&self, view_index: usize) -> Option<&Row> {
        self.base_index(view_index).and_then(|i| self.table.row(i))
    }

    /// Cell at a view position; missing cells read as empty
    pub fn cell_at(&self, view_index: usize, column: usize) -> &str {
        match self.base_index(view_index) {
            Some(i) => self.table.cell(i, column),
            None => "",
        }
    }

    /// "N of M rows"
    pub fn status_line(&self) -> String {
        format!("{} of {} rows", self.visible_len(), self.total_len())
    }
}

/// Unicode collation order, so accented letters sort next to their base letter
fn compare_keys(collator: &mut Collator, a: &str, b: &str, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Descending => collator.collate(b, a),
        _ => collator.collate(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine(rows: &[&[&str]]) -> TableViewEngine {
        let headers = vec!["name".to_string(), "city".to_string()];
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        TableViewEngine::new(Arc::new(Table::new(headers, rows)))
    }

    #[test]
    fn test_initial_view_is_base_order() {
        let e = engine(&[&["b", "x"], &["a", "y"]]);
        assert_eq!(e.visible_rows(), &[0, 1]);
        assert_eq!(e.status_line(), "2 of 2 rows");
    }

    #[test]
    fn test_search_case_insensitive() {
        let mut e = engine(&[&["Alice", "Paris"], &["Bob", "Lyon"], &["carol", "PARIS"]]);
        e.search("paris");
        assert_eq!(e.visible_rows(), &[0, 2]);
        e.search("LYON");
        assert_eq!(e.visible_rows(), &[1]);
        e.search("");
        assert_eq!(e.visible_rows(), &[0, 1, 2]);
    }

    #[test]
    fn test_sort_cycle() {
        let mut e = engine(&[&["b", ""], &["C", ""], &["a", ""]]);
        e.sort(0);
        assert_eq!(e.sort_state().direction, SortDirection::Ascending);
        assert_eq!(e.visible_rows(), &[2, 0, 1]);
        e.sort(0);
        assert_eq!(e.sort_state().direction, SortDirection::Descending);
        assert_eq!(e.visible_rows(), &[1, 0, 2]);
        e.sort(0);
        assert_eq!(e.sort_state().direction, SortDirection::None);
        assert_eq!(e.visible_rows(), &[0, 1, 2]);
    }

    #[test]
    fn test_new_column_resets_to_ascending() {
        let mut e = engine(&[&["b", "2"], &["a", "1"]]);
        e.sort(0);
        e.sort(0);
        e.sort(1);
        assert_eq!(
            e.sort_state(),
            SortState {
                column: Some(1),
                direction: SortDirection::Ascending
            }
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let mut e = engine(&[&["x", "1"], &["y", "0"], &["z", "1"], &["w", "0"]]);
        e.sort(1);
        assert_eq!(e.visible_rows(), &[1, 3, 0, 2]);
        e.sort(1);
        assert_eq!(e.visible_rows(), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_accented_keys_sort_with_their_base_letter() {
        let mut e = engine(&[&["zoé", ""], &["Éclair", ""], &["fleur", ""], &["eau", ""]]);
        e.sort(0);
        assert_eq!(e.visible_rows(), &[3, 1, 2, 0]);
        e.sort(0);
        assert_eq!(e.visible_rows(), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_missing_cell_sorts_as_empty() {
        let mut e = engine(&[&["b", "z"], &["a"]]);
        e.sort(1);
        assert_eq!(e.visible_rows(), &[1, 0]);
    }

    #[test]
    fn test_none_reverts_to_filtered_order() {
        let mut e = engine(&[&["b", "keep"], &["a", "drop"], &["c", "keep"], &["a", "keep"]]);
        e.search("keep");
        e.sort(0);
        assert_eq!(e.visible_rows(), &[3, 0, 2]);
        e.sort(0);
        e.sort(0);
        assert_eq!(e.visible_rows(), &[0, 2, 3]);
    }

    #[test]
    fn test_search_discards_sort_order_but_keeps_state() {
        let mut e = engine(&[&["b", ""], &["a", ""]]);
        e.sort(0);
        assert_eq!(e.visible_rows(), &[1, 0]);
        assert!(e.applied_sort().is_some());

        e.search("");
        assert_eq!(e.visible_rows(), &[0, 1]);
        assert!(e.applied_sort().is_none());

        // The stored state continues the cycle
        e.sort(0);
        assert_eq!(e.sort_state().direction, SortDirection::Descending);
        assert_eq!(e.visible_rows(), &[0, 1]);
    }

    #[test]
    fn test_row_accessors() {
        let mut e = engine(&[&["b", "x"], &["a"]]);
        e.sort(0);
        assert_eq!(e.base_index(0), Some(1));
        assert_eq!(e.cell_at(0, 0), "a");
        assert_eq!(e.cell_at(0, 1), "");
        assert_eq!(e.cell_at(9, 0), "");
        assert!(e.row_at(2).is_none());
    }
}
