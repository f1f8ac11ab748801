pub mod cell_viewer;
pub mod data_table;
pub mod detail_view;
pub mod import_prompt;
pub mod message_line;
pub mod search_bar;
pub mod text_input;

pub use cell_viewer::{CellInfo, CellViewer, HeightMode, ViewerConfig};
pub use data_table::DataTable;
pub use detail_view::{DetailTab, DetailView};
pub use import_prompt::ImportPrompt;
pub use message_line::{MessageLevel, MessageLine};
pub use search_bar::SearchBar;
pub use text_input::TextInput;
