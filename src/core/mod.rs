pub mod classifier;
pub mod error;
pub mod models;
pub mod types;

pub use classifier::CellKind;
pub use error::IngestError;
pub use models::*;
pub use types::*;
