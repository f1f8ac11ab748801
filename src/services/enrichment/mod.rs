//! Per-row enrichment: website discovery, fetch, extraction, analysis and templates
//!
//! Every failure is absorbed into the result value. A row whose pipeline cannot
//! proceed still completes, carrying a sentinel analysis text and empty templates.

pub mod analysis;
pub mod dispatcher;
pub mod extract;
pub mod fetcher;

pub use dispatcher::{EnrichmentDispatcher, EnrichmentEvent};
pub use fetcher::{FetchError, HttpFetcher, PageFetcher};

use crate::core::{CachePolicy, EnrichmentConfig, FieldAliases, FieldMapping, RowKey};
use crate::services::template_service::{Channel, TemplateGenerator};
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

pub const NO_URL_SENTINEL: &str = "No valid website URL found in the provided data.";
pub const FETCH_FAILED_SENTINEL: &str = "Unable to fetch website content.";
pub const INTERNAL_FAILURE_SENTINEL: &str = "Website analysis failed unexpectedly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentStage {
    Pending,
    Done,
}

/// How a pipeline run ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// All five stages ran
    Analysed,
    /// No fetchable URL in the row; nothing was fetched
    NoUrlFound,
    /// The fetch failed, timed out or returned an empty body
    FetchFailed,
    /// A stage panicked and was caught at the pipeline boundary
    Internal,
}

/// Result of enriching one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub url_found: bool,
    pub url: Option<String>,
    pub analysis_text: String,
    pub email_template: String,
    pub phone_template: String,
    pub outcome: EnrichmentOutcome,
    pub stage: EnrichmentStage,
}

impl EnrichmentResult {
    /// Placeholder while a run is in flight
    pub fn pending() -> Self {
        Self {
            url_found: false,
            url: None,
            analysis_text: String::new(),
            email_template: String::new(),
            phone_template: String::new(),
            outcome: EnrichmentOutcome::Internal,
            stage: EnrichmentStage::Pending,
        }
    }

    fn short_circuit(url: Option<String>, outcome: EnrichmentOutcome, sentinel: &str) -> Self {
        Self {
            url_found: url.is_some(),
            url,
            analysis_text: sentinel.to_string(),
            email_template: String::new(),
            phone_template: String::new(),
            outcome,
            stage: EnrichmentStage::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == EnrichmentStage::Done
    }

    pub fn template(&self, channel: Channel) -> &str {
        match channel {
            Channel::Email => &self.email_template,
            Channel::Phone => &self.phone_template,
        }
    }
}

/// Cache cell for one row
#[derive(Default)]
struct SlotState {
    cell: OnceCell<EnrichmentResult>,
    /// Set when the row was released mid-run; the entry goes once the run finishes
    release_when_done: AtomicBool,
}

impl SlotState {
    fn initialized(&self) -> bool {
        self.cell.initialized()
    }

    fn get(&self) -> Option<&EnrichmentResult> {
        self.cell.get()
    }
}

type Slot = Arc<SlotState>;

/// Runs the enrichment stages for one row at a time, caching the result per row.
///
/// At most one run is in flight per [`RowKey`]: concurrent callers for the same row
/// await the same cell, so a row is fetched once no matter how many views ask for it.
pub struct EnrichmentPipeline {
    fetcher: Arc<dyn PageFetcher>,
    templates: TemplateGenerator,
    config: EnrichmentConfig,
    aliases: FieldAliases,
    inflight: Mutex<HashMap<RowKey, Slot>>,
}

impl EnrichmentPipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        templates: TemplateGenerator,
        config: EnrichmentConfig,
        aliases: FieldAliases,
    ) -> Self {
        Self {
            fetcher,
            templates,
            config,
            aliases,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<RowKey, Slot>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enrich a row, or wait for and reuse the run already started for it
    pub async fn enrich(&self, key: RowKey, mapping: &FieldMapping) -> EnrichmentResult {
        let slot = {
            let mut slots = self.slots();
            let slot = Arc::clone(slots.entry(key).or_default());
            // Someone wants the row again, so a pending release no longer applies
            slot.release_when_done.store(false, Ordering::SeqCst);
            slot
        };

        if slot.initialized() {
            debug!("Reusing cached enrichment for {}", key);
        } else {
            debug!("Awaiting enrichment for {}", key);
        }

        let result = slot.cell.get_or_init(|| self.run(key, mapping)).await.clone();

        let mut slots = self.slots();
        if slot.release_when_done.load(Ordering::SeqCst)
            && slots.get(&key).is_some_and(|s| Arc::ptr_eq(s, &slot))
        {
            slots.remove(&key);
            debug!("Released enrichment entry {} after its run finished", key);
        }
        result
    }

    /// Completed result for a row, if any
    pub fn cached(&self, key: RowKey) -> Option<EnrichmentResult> {
        self.slots().get(&key).and_then(|slot| slot.get().cloned())
    }

    /// A run has been started for the row and has not finished
    pub fn is_pending(&self, key: RowKey) -> bool {
        self.slots()
            .get(&key)
            .is_some_and(|slot| !slot.initialized())
    }

    /// The detail view for `key` closed; drop its entry unless results live for the session
    pub fn view_closed(&self, key: RowKey) {
        if self.config.cache_policy == CachePolicy::PerView {
            self.release(key);
        }
    }

    /// Forget a row.
    ///
    /// A run still in flight keeps its entry, so later callers attach to it instead
    /// of fetching again; the entry is dropped when that run finishes.
    pub fn release(&self, key: RowKey) {
        let mut slots = self.slots();
        let Some(slot) = slots.get(&key) else {
            return;
        };
        if slot.initialized() {
            slots.remove(&key);
            debug!("Released enrichment entry {}", key);
        } else {
            slot.release_when_done.store(true, Ordering::SeqCst);
            debug!("Enrichment entry {} will be released when its run finishes", key);
        }
    }

    /// Forget every row (a new file was loaded)
    pub fn clear(&self) {
        let mut slots = self.slots();
        if !slots.is_empty() {
            debug!("Clearing {} enrichment entries", slots.len());
        }
        slots.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.slots().len()
    }

    async fn run(&self, key: RowKey, mapping: &FieldMapping) -> EnrichmentResult {
        match AssertUnwindSafe(self.run_stages(key, mapping))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_) => {
                error!("Enrichment for {} panicked", key);
                EnrichmentResult::short_circuit(
                    None,
                    EnrichmentOutcome::Internal,
                    INTERNAL_FAILURE_SENTINEL,
                )
            }
        }
    }

    async fn run_stages(&self, key: RowKey, mapping: &FieldMapping) -> EnrichmentResult {
        // Stage 1: website discovery
        let Some(url) = analysis::discover_url(
            mapping,
            &self.aliases.website_keys,
            &self.config.disallowed_url_markers,
        ) else {
            info!("No website for {}", key);
            return EnrichmentResult::short_circuit(
                None,
                EnrichmentOutcome::NoUrlFound,
                NO_URL_SENTINEL,
            );
        };

        // Stage 2: fetch
        let html = match self.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Fetching {} for {} failed: {}", url, key, e);
                return EnrichmentResult::short_circuit(
                    Some(url),
                    EnrichmentOutcome::FetchFailed,
                    FETCH_FAILED_SENTINEL,
                );
            }
        };

        // Stages 3 and 4: extraction and analysis
        let text = extract::extract_text(&html);
        let analysis_text = analysis::build_analysis(
            &text,
            mapping,
            &self.aliases,
            self.config.analysis_char_budget,
        );

        // Stage 5: each channel renders on its own
        let email_template = self.templates.generate(Channel::Email, mapping);
        let phone_template = self.templates.generate(Channel::Phone, mapping);

        info!("Analysed {} for {}", url, key);
        EnrichmentResult {
            url_found: true,
            url: Some(url),
            analysis_text,
            email_template,
            phone_template,
            outcome: EnrichmentOutcome::Analysed,
            stage: EnrichmentStage::Done,
        }
    }

    /// Fetch bounded by the configured timeout, whatever the fetcher does
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        tokio::time::timeout(timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionId;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        body: Result<String, u16>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().map_err(FetchError::Status)
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl PageFetcher for PanickingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            panic!("fetcher exploded");
        }
    }

    fn pipeline(fetcher: Arc<dyn PageFetcher>, config: EnrichmentConfig) -> EnrichmentPipeline {
        EnrichmentPipeline::new(
            fetcher,
            TemplateGenerator::default(),
            config,
            FieldAliases::default(),
        )
    }

    fn static_fetcher(body: Result<&str, u16>) -> Arc<StaticFetcher> {
        Arc::new(StaticFetcher {
            body: body.map(str::to_string),
            calls: AtomicUsize::new(0),
        })
    }

    fn row_with_site() -> FieldMapping {
        FieldMapping::from_pairs([
            ("Company Name", "Acme"),
            ("Website", "https://acme.fr"),
        ])
    }

    #[tokio::test]
    async fn test_no_url_short_circuits() {
        let fetcher = static_fetcher(Ok("<title>x</title>"));
        let p = pipeline(fetcher.clone(), EnrichmentConfig::default());
        let key = RowKey::new(SessionId::new(), 0);

        let result = p.enrich(key, &FieldMapping::from_pairs([("Name", "Acme")])).await;

        assert!(!result.url_found);
        assert_eq!(result.outcome, EnrichmentOutcome::NoUrlFound);
        assert_eq!(result.analysis_text, NO_URL_SENTINEL);
        assert!(result.email_template.is_empty());
        assert!(result.is_done());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_short_circuits() {
        let fetcher = static_fetcher(Err(503));
        let p = pipeline(fetcher.clone(), EnrichmentConfig::default());
        let result = p.enrich(RowKey::new(SessionId::new(), 1), &row_with_site()).await;

        assert!(result.url_found);
        assert_eq!(result.outcome, EnrichmentOutcome::FetchFailed);
        assert_eq!(result.analysis_text, FETCH_FAILED_SENTINEL);
        assert!(result.phone_template.is_empty());
    }

    #[tokio::test]
    async fn test_full_run_and_cache() {
        let fetcher = static_fetcher(Ok("<title>Acme</title><body><main>Rockets</main></body>"));
        let p = pipeline(fetcher.clone(), EnrichmentConfig::default());
        let key = RowKey::new(SessionId::new(), 2);

        let first = p.enrich(key, &row_with_site()).await;
        assert_eq!(first.outcome, EnrichmentOutcome::Analysed);
        assert!(first.analysis_text.starts_with("Company Analysis for Acme"));
        assert!(first.analysis_text.contains("Acme\n\n\nRockets"));
        assert!(first.email_template.contains("Acme's"));
        assert!(first.phone_template.contains("at Acme"));

        let second = p.enrich(key, &row_with_site()).await;
        assert_eq!(first, second);
        assert_eq!(p.cached(key), Some(first));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_outcome() {
        let p = pipeline(Arc::new(PanickingFetcher), EnrichmentConfig::default());
        let result = p.enrich(RowKey::new(SessionId::new(), 0), &row_with_site()).await;
        assert_eq!(result.outcome, EnrichmentOutcome::Internal);
        assert_eq!(result.analysis_text, INTERNAL_FAILURE_SENTINEL);
    }

    #[tokio::test]
    async fn test_view_closed_respects_cache_policy() {
        let key = RowKey::new(SessionId::new(), 0);
        let mapping = FieldMapping::from_pairs([("Name", "Acme")]);

        let per_view = pipeline(static_fetcher(Ok("")), EnrichmentConfig::default());
        per_view.enrich(key, &mapping).await;
        per_view.view_closed(key);
        assert!(per_view.cached(key).is_none());

        let session = pipeline(
            static_fetcher(Ok("")),
            EnrichmentConfig {
                cache_policy: CachePolicy::Session,
                ..EnrichmentConfig::default()
            },
        );
        session.enrich(key, &mapping).await;
        session.view_closed(key);
        assert!(session.cached(key).is_some());

        session.clear();
        assert_eq!(session.cached_len(), 0);
    }

    #[test]
    fn test_result_template_by_channel() {
        let mut result = EnrichmentResult::pending();
        assert!(!result.is_done());
        result.email_template = "mail".to_string();
        result.phone_template = "call".to_string();
        assert_eq!(result.template(Channel::Email), "mail");
        assert_eq!(result.template(Channel::Phone), "call");
    }
}
