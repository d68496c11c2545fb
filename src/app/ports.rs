use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::SourceLocation;
use crate::error::Result;

/// Raw payload fetched from a source, plus the identity the cache keys on:
/// the URL for remote sources, a content digest for file sources.
#[derive(Clone, Debug)]
pub struct FetchedSource {
    pub identity: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceLocation) -> Result<FetchedSource>;
}

/// Time source injected into the cache so tests control expiry without
/// sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
