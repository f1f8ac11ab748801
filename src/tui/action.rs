use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    Home,
    End,
    GoToTop,
    GoToBottom,

    // Table
    Sort,
    Find,

    // Detail view
    NextTab,
    PrevTab,

    // File
    Import,
    NewFile,

    // Clipboard
    Copy,

    // Application
    ToggleHelp,
    Confirm,
    Cancel,
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move cursor up",
            Action::MoveDown => "Move cursor down",
            Action::MoveLeft => "Move cursor left",
            Action::MoveRight => "Move cursor right",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::Home => "Go to first column",
            Action::End => "Go to last column",
            Action::GoToTop => "Go to first row",
            Action::GoToBottom => "Go to last row",
            Action::Sort => "Cycle sort on current column",
            Action::Find => "Search rows",
            Action::NextTab => "Next detail tab",
            Action::PrevTab => "Previous detail tab",
            Action::Import => "Load a file",
            Action::NewFile => "Discard table and load another file",
            Action::Copy => "Copy cell or template",
            Action::ToggleHelp => "Toggle help screen",
            Action::Confirm => "Confirm / open prospect details",
            Action::Cancel => "Cancel / close",
            Action::Quit => "Quit application",
        }
    }

    /// Grouping used by the help screen
    pub fn category(&self) -> ActionCategory {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::PageUp
            | Action::PageDown
            | Action::Home
            | Action::End
            | Action::GoToTop
            | Action::GoToBottom => ActionCategory::Navigation,

            Action::Sort | Action::Find => ActionCategory::Table,

            Action::NextTab | Action::PrevTab => ActionCategory::Detail,

            Action::Import | Action::NewFile => ActionCategory::File,

            Action::Copy => ActionCategory::Clipboard,

            Action::ToggleHelp | Action::Confirm | Action::Cancel | Action::Quit => {
                ActionCategory::Application
            }
        }
    }

    pub fn all() -> Vec<Action> {
        vec![
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
            Action::Find,
            Action::NextTab,
            Action::PrevTab,
            Action::Import,
            Action::NewFile,
            Action::Copy,
            Action::ToggleHelp,
            Action::Confirm,
            Action::Cancel,
            Action::Quit,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionCategory {
    Navigation,
    Table,
    Detail,
    File,
    Clipboard,
    Application,
}

impl ActionCategory {
    pub fn all() -> [ActionCategory; 6] {
        [
            ActionCategory::Navigation,
            ActionCategory::Table,
            ActionCategory::Detail,
            ActionCategory::File,
            ActionCategory::Clipboard,
            ActionCategory::Application,
        ]
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Navigation => write!(f, "Navigation"),
            ActionCategory::Table => write!(f, "Table"),
            ActionCategory::Detail => write!(f, "Prospect Details"),
            ActionCategory::File => write!(f, "File"),
            ActionCategory::Clipboard => write!(f, "Clipboard"),
            ActionCategory::Application => write!(f, "Application"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_is_described() {
        for action in Action::all() {
            assert!(!action.description().is_empty(), "{action:?}");
        }
    }

    #[test]
    fn test_every_category_is_populated() {
        for category in ActionCategory::all() {
            assert!(Action::all().iter().any(|a| a.category() == category));
        }
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::GoToBottom).unwrap();
        assert_eq!(json, "\"GoToBottom\"");

        let restored: Action = serde_json::from_str("\"NewFile\"").unwrap();
        assert_eq!(restored, Action::NewFile);
    }
}
