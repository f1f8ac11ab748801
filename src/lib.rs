#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_match)]

pub mod config;
pub mod core;
pub mod logging;
pub mod services;
pub mod tui;

// Re-export commonly used types
pub use config::Config;
pub use core::{CellKind, FieldMapping, IngestError, IngestOptions, SourceType, Table};
pub use services::{
    Channel, EnrichmentPipeline, EnrichmentResult, IngestService, TableViewEngine,
    TemplateGenerator,
};
pub use tui::{Action, ActionCategory, App};
