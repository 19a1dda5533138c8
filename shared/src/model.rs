use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::activity::ActivityIndicator;
use crate::navigation::{NavigationIndex, NavigationReducer};
use crate::pipeline::DisplayPipeline;
use crate::source::MemoryCache;
use crate::{ViewerConfig, ViewerError, MAX_COLLECTION_ID_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionIdError {
    #[error("collection name cannot be empty")]
    Empty,
    #[error("collection name exceeds {max} bytes")]
    TooLong { max: usize },
    #[error("collection name contains invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("collection name cannot be a relative path segment")]
    PathSegment,
}

/// Name of an image collection ("sub"), checked before it is placed into a URL or cache key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(raw: impl Into<String>) -> Result<Self, CollectionIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(CollectionIdError::Empty);
        }
        if trimmed.len() > MAX_COLLECTION_ID_LENGTH {
            return Err(CollectionIdError::TooLong {
                max: MAX_COLLECTION_ID_LENGTH,
            });
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(*c, '/' | '\\' | '?' | '#' | '%'))
        {
            return Err(CollectionIdError::InvalidCharacter(c));
        }
        // "." and ".." would be resolved away by the URL parser.
        if trimmed.contains("..") || trimmed.chars().all(|c| c == '.') {
            return Err(CollectionIdError::PathSegment);
        }

        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered candidate image URLs for one collection.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ImageList(Vec<String>);

impl ImageList {
    #[must_use]
    pub fn new(urls: Vec<String>) -> Self {
        Self(urls)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: NavigationIndex) -> Option<&str> {
        index
            .slot(self.0.len())
            .and_then(|slot| self.0.get(slot))
            .map(String::as_str)
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for ImageList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: ViewerConfig,
    pub navigation: NavigationReducer,
    pub pipeline: DisplayPipeline,
    pub memory_cache: MemoryCache,
    pub activity: ActivityIndicator,

    pub display_url: Option<String>,
    pub active_error: Option<ViewerError>,
}

impl Model {
    #[must_use]
    pub fn with_config(config: ViewerConfig) -> Self {
        let mut model = Self::default();
        model.configure(config);
        model
    }

    pub fn configure(&mut self, config: ViewerConfig) {
        self.memory_cache.resize(config.memory_cache_capacity);
        self.config = config;
    }

    #[must_use]
    pub fn view(&self) -> ViewModel {
        ViewModel {
            collection: self.pipeline.collection().map(|c| c.as_str().to_string()),
            image_url: self.display_url.clone(),
            loading: self.activity.is_active(),
            position: self.navigation.current().value(),
            error: self.active_error.as_ref().map(ViewerError::user_facing_message),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub collection: Option<String>,
    pub image_url: Option<String>,
    pub loading: bool,
    pub position: i64,
    pub error: Option<String>,
}
