use tracing::{info, warn};

use crate::error::Result;
use crate::ingestion::{ingest_document, IngestOptions, IngestOutcome};
use crate::models::{EventTable, RawDocument};
use crate::storage::ObjectStore;

/// Inclusion filter for the historical corpus: object names carrying the
/// alarm marker, or spreadsheet exports whose names predate the naming
/// convention.
pub fn is_corpus_object(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("alarm") || lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

/// Rebuild the full historical event table from the object store. Failures
/// are isolated per object: an unreadable or rejected document is skipped
/// with a warning and the remaining objects still contribute.
pub async fn load_corpus<S: ObjectStore + ?Sized>(
    store: &S,
    options: &IngestOptions,
) -> Result<EventTable> {
    let mut corpus = EventTable::new();
    let mut skipped = 0usize;

    for object in store.list().await? {
        if !is_corpus_object(&object.name) {
            continue;
        }
        let bytes = match store.get(&object.name).await {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(object = %object.name, %error, "skipping unreadable object");
                skipped += 1;
                continue;
            }
        };
        let document = RawDocument::new(object.name.clone(), bytes);
        match ingest_document(&document, object.created_at.date_naive(), options) {
            IngestOutcome::Accepted(events) => corpus.extend(events),
            IngestOutcome::Rejected(reason) => {
                warn!(object = %object.name, %reason, "skipping rejected object");
                skipped += 1;
            }
        }
    }

    info!(events = corpus.len(), skipped, "corpus reconstructed");
    Ok(corpus)
}
