//! Bridge between the synchronous UI loop and the async pipeline

use super::{EnrichmentPipeline, EnrichmentResult};
use crate::core::{FieldMapping, RowKey, ViewId};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// A finished run, addressed to the view that asked for it
#[derive(Debug, Clone)]
pub struct EnrichmentEvent {
    pub view: ViewId,
    pub key: RowKey,
    pub result: EnrichmentResult,
}

/// Spawns pipeline runs on a runtime and hands back results on each UI tick
pub struct EnrichmentDispatcher {
    pipeline: Arc<EnrichmentPipeline>,
    runtime: Handle,
    tx: UnboundedSender<EnrichmentEvent>,
    rx: UnboundedReceiver<EnrichmentEvent>,
}

impl EnrichmentDispatcher {
    pub fn new(pipeline: Arc<EnrichmentPipeline>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            pipeline,
            runtime,
            tx,
            rx,
        }
    }

    pub fn pipeline(&self) -> &Arc<EnrichmentPipeline> {
        &self.pipeline
    }

    /// Start (or attach to) the run for `key`.
    ///
    /// Returns the cached result immediately when the row is already done; otherwise
    /// the result arrives later through [`drain`](Self::drain).
    pub fn trigger(
        &self,
        view: ViewId,
        key: RowKey,
        mapping: FieldMapping,
    ) -> Option<EnrichmentResult> {
        if let Some(result) = self.pipeline.cached(key) {
            return Some(result);
        }

        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = pipeline.enrich(key, &mapping).await;
            if tx.send(EnrichmentEvent { view, key, result }).is_err() {
                debug!("Dropped enrichment result for {}: receiver gone", key);
            }
        });
        None
    }

    /// Results finished since the last call
    pub fn drain(&mut self) -> Vec<EnrichmentEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
