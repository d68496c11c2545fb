use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::app::ports::{Clock, SourceFetcher};
use crate::domain::SourceLocation;
use crate::error::Result;
use crate::pipeline::ingestion::raw_table::RawTable;

/// Fetch-once-per-window cache for raw source tables.
///
/// Owns `{identity → (table, fetched_at)}` explicitly; the clock is injected
/// so tests control expiry. Cached tables are shared read-only via `Arc` —
/// every report run derives its own records and never mutates the raw table.
pub struct SourceCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

#[derive(Clone)]
struct CacheEntry {
    table: Arc<RawTable>,
    fetched_at: DateTime<Utc>,
}

impl SourceCache {
    pub fn new(ttl_minutes: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for `source` if still fresh, otherwise fetch,
    /// parse and cache it.
    ///
    /// URL sources are checked before any network call. File sources must be
    /// read first (the key is their content digest), so a hit there skips
    /// re-parsing rather than re-reading.
    pub async fn get_or_fetch(
        &self,
        source: &SourceLocation,
        fetcher: &dyn SourceFetcher,
    ) -> Result<Arc<RawTable>> {
        let now = self.clock.now();

        if let Some(key) = source.url_key() {
            if let Some(table) = self.fresh_entry(key, now) {
                debug!(source = %source.describe(), "source cache hit");
                return Ok(table);
            }
        }

        let fetched = fetcher.fetch(source).await?;

        if let Some(table) = self.fresh_entry(&fetched.identity, now) {
            debug!(source = %source.describe(), "source cache hit by content identity");
            return Ok(table);
        }

        debug!(
            source = %source.describe(),
            bytes = fetched.bytes.len(),
            "source cache miss, parsing payload"
        );
        let table = Arc::new(RawTable::from_csv_bytes(&fetched.bytes)?);

        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            fetched.identity,
            CacheEntry {
                table: table.clone(),
                fetched_at: now,
            },
        );
        Ok(table)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn fresh_entry(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<RawTable>> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).and_then(|entry| {
            if now - entry.fetched_at < self.ttl {
                Some(entry.table.clone())
            } else {
                None
            }
        })
    }
}
