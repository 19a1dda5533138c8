//! Image list resolution: listing payload parsing, the cache codec and the
//! in-memory tier that sits in front of the durable key-value cache.

use lru::LruCache;
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroUsize;
use thiserror::Error;

use crate::model::{CollectionId, ImageList};
use crate::{ErrorKind, DEFAULT_MEMORY_CACHE_CAPACITY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("malformed image list: {0}")]
    Parse(String),
}

impl SourceError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::Fetch,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

// Only the fields we read from a reddit listing; everything else is ignored.
#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    #[serde(default)]
    data: Option<ListingPost>,
}

#[derive(Deserialize)]
struct ListingPost {
    #[serde(default)]
    url: Option<serde_json::Value>,
}

/// Extracts `data.children[*].data.url` in listing order.
///
/// Entries without a string `url` are skipped.
pub fn parse_listing(body: &[u8]) -> Result<ImageList, SourceError> {
    let listing: Listing =
        serde_json::from_slice(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|child| child.data?.url)
        .filter_map(|url| match url {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

pub fn encode_cached(list: &ImageList) -> Result<Vec<u8>, SourceError> {
    serde_json::to_vec(list).map_err(|e| SourceError::Parse(e.to_string()))
}

/// Corrupt entries surface as [`SourceError::Parse`].
pub fn decode_cached(bytes: &[u8]) -> Result<ImageList, SourceError> {
    serde_json::from_slice(bytes).map_err(|e| SourceError::Parse(format!("cached entry: {e}")))
}

pub struct MemoryCache {
    entries: LruCache<CollectionId, ImageList>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(Self::capacity(capacity)),
        }
    }

    fn capacity(requested: usize) -> NonZeroUsize {
        NonZeroUsize::new(requested).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn get(&mut self, collection: &CollectionId) -> Option<ImageList> {
        self.entries.get(collection).cloned()
    }

    pub fn put(&mut self, collection: CollectionId, list: ImageList) {
        self.entries.put(collection, list);
    }

    pub fn resize(&mut self, capacity: usize) {
        self.entries.resize(Self::capacity(capacity));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CACHE_CAPACITY)
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .finish()
    }
}
