use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::models::EventTable;

/// Time-bounded corpus cache: an explicit `{data, fetched_at}` pair with no
/// ambient global state. The pipeline facade owns the instance and
/// invalidates it synchronously after every successful write, so a freshly
/// uploaded document is visible to the very next analytics read.
#[derive(Debug)]
pub struct CorpusCache {
    data: Option<EventTable>,
    fetched_at: Option<DateTime<Utc>>,
    ttl: Duration,
}

impl CorpusCache {
    pub fn new(ttl: Duration) -> Self {
        CorpusCache {
            data: None,
            fetched_at: None,
            ttl,
        }
    }

    /// The cached table, if one is present and still within the staleness
    /// window at `now`.
    pub fn fresh(&self, now: DateTime<Utc>) -> Option<&EventTable> {
        let fetched_at = self.fetched_at?;
        if now.signed_duration_since(fetched_at) < self.ttl {
            self.data.as_ref()
        } else {
            None
        }
    }

    pub fn replace(&mut self, table: EventTable, now: DateTime<Utc>) {
        debug!(events = table.len(), "corpus cache refreshed");
        self.data = Some(table);
        self.fetched_at = Some(now);
    }

    pub fn invalidate(&mut self) {
        debug!("corpus cache invalidated");
        self.data = None;
        self.fetched_at = None;
    }
}
