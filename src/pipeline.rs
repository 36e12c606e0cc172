use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::cache::CorpusCache;
use crate::config::PipelineConfig;
use crate::corpus;
use crate::error::Result;
use crate::ingestion::{ingest_document, IngestOptions, IngestOutcome, RejectReason};
use crate::models::{EventTable, RawDocument};
use crate::storage::ObjectStore;

/// Outcome reported to the uploader for one document.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The document validated and was committed to the store.
    Stored { events: usize },
    /// The document contributed nothing; the store is untouched.
    Rejected { reason: RejectReason },
}

/// Facade over ingestion, storage, and corpus reconstruction. One instance
/// per caller; operations that may mutate the cache take `&mut self`, so a
/// pipeline instance processes one request at a time.
pub struct AlarmPipeline<S: ObjectStore> {
    store: S,
    cache: CorpusCache,
    options: IngestOptions,
}

impl<S: ObjectStore> AlarmPipeline<S> {
    pub async fn new(store: S, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        store.ensure_container().await?;
        Ok(AlarmPipeline {
            store,
            cache: CorpusCache::new(Duration::seconds(config.cache.ttl_secs as i64)),
            options: config.ingest_options(),
        })
    }

    /// Validate and commit one uploaded document. Only documents that pass
    /// the schema gate are persisted; the write is keyed by filename with
    /// overwrite semantics, and the corpus cache is invalidated
    /// synchronously after the write succeeds.
    pub async fn upload(&mut self, document: RawDocument) -> Result<UploadOutcome> {
        self.upload_at(document, Utc::now()).await
    }

    pub async fn upload_at(
        &mut self,
        document: RawDocument,
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome> {
        match ingest_document(&document, now.date_naive(), &self.options) {
            IngestOutcome::Rejected(reason) => Ok(UploadOutcome::Rejected { reason }),
            IngestOutcome::Accepted(events) => {
                let RawDocument { name, bytes } = document;
                self.store.put(&name, bytes).await?;
                self.cache.invalidate();
                info!(document = %name, events = events.len(), "document committed to history");
                Ok(UploadOutcome::Stored {
                    events: events.len(),
                })
            }
        }
    }

    /// The full historical event table, served from the cache when fresh
    /// and rebuilt from the object store otherwise.
    pub async fn corpus(&mut self) -> Result<EventTable> {
        self.corpus_at(Utc::now()).await
    }

    pub async fn corpus_at(&mut self, now: DateTime<Utc>) -> Result<EventTable> {
        if let Some(cached) = self.cache.fresh(now) {
            return Ok(cached.clone());
        }
        let table = corpus::load_corpus(&self.store, &self.options).await?;
        self.cache.replace(table.clone(), now);
        Ok(table)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
