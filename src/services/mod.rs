pub mod enrichment;
pub mod ingest_service;
pub mod template_service;
pub mod view_engine;

pub use enrichment::{
    EnrichmentDispatcher, EnrichmentEvent, EnrichmentOutcome, EnrichmentPipeline,
    EnrichmentResult, EnrichmentStage, HttpFetcher, PageFetcher,
};
pub use ingest_service::{IngestService, LoadedFile};
pub use template_service::{Channel, TemplateGenerator};
pub use view_engine::{SortDirection, SortState, TableViewEngine};
