// lib.rs - Subreddit image viewer core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod activity;
pub mod capabilities;
pub mod event;
pub mod model;
pub mod navigation;
pub mod pipeline;
pub mod source;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use event::Event;
pub use model::{CollectionId, CollectionIdError, ImageList, Model, ViewModel};

pub const LISTING_URL_BASE: &str = "https://www.reddit.com/r/";
pub const FALLBACK_IMAGE_URL: &str = "https://jhusain.github.io/reddit-image-viewer/error.png";
pub const DEFAULT_LISTING_LIMIT: u32 = 200;
pub const DEFAULT_MEMORY_CACHE_CAPACITY: usize = 16;
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const BASE_RETRY_DELAY_MS: u64 = 500;
pub const MAX_RETRY_DELAY_MS: u64 = 8_000;
pub const JITTER_MAX_MS: u64 = 250;
pub const MAX_COLLECTION_ID_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Fetch,
    Parse,
    InvalidCollection,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Fetch => "FETCH_ERROR",
            Self::Parse => "PARSE_ERROR",
            Self::InvalidCollection => "INVALID_COLLECTION",
        }
    }
}

/// User-facing notice raised once per failed selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerError {
    pub kind: ErrorKind,
    pub collection: Option<String>,
    pub message: String,
}

impl ViewerError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            collection: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Fetch | ErrorKind::Parse => {
                "I'm having trouble loading the images for that sub. Please wait a while, reload, and then try again later."
                    .into()
            }
            ErrorKind::InvalidCollection => {
                format!("That doesn't look like a sub name: {}", self.message)
            }
        }
    }
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(collection) = &self.collection {
            write!(f, " (sub: {collection})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ViewerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total fetch attempts per resolution, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            base_delay_ms: BASE_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
            jitter_ms: JITTER_MAX_MS,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the attempt following `failed_attempt`, without jitter.
    #[must_use]
    pub fn backoff_ms(&self, failed_attempt: u32) -> u64 {
        let exponent = failed_attempt.saturating_sub(1);
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(exponent));
        exponential.min(self.max_delay_ms)
    }

    #[must_use]
    pub fn delay_ms(&self, failed_attempt: u32) -> u64 {
        self.backoff_ms(failed_attempt)
            .saturating_add(generate_jitter(self.jitter_ms))
    }
}

#[must_use]
pub fn generate_jitter(max_ms: u64) -> u64 {
    use rand::Rng;

    if max_ms == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=max_ms)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub retry: RetryPolicy,
    pub memory_cache_capacity: usize,
    pub listing_limit: u32,
    pub fallback_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            memory_cache_capacity: DEFAULT_MEMORY_CACHE_CAPACITY,
            listing_limit: DEFAULT_LISTING_LIMIT,
            fallback_url: FALLBACK_IMAGE_URL.to_string(),
        }
    }
}

pub mod app {
    use tracing::{debug, error, info, warn};

    use super::{ErrorKind, ViewerError};
    use crate::capabilities::{http, kv, Capabilities};
    use crate::event::Event;
    use crate::model::{CollectionId, ImageList, Model, ViewModel};
    use crate::navigation::{NavigationIndex, NavigationOffset};
    use crate::pipeline::{Candidate, FailureStep, Generation, ValidationTicket};
    use crate::source::{self, SourceError};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn start_resolution(collection: CollectionId, model: &mut Model, caps: &Capabilities) {
            model.activity.on_action();
            let index = model.navigation.reset();
            let generation = model.pipeline.begin(collection.clone());
            model.active_error = None;

            info!(
                collection = %collection,
                generation = generation.value(),
                "resolving image list"
            );

            // No list yet, so the reset index is dropped here.
            Self::show(index, model, caps);

            if let Some(list) = model.memory_cache.get(&collection) {
                debug!(collection = %collection, len = list.len(), "memory cache hit");
                Self::list_available(generation, list, model, caps);
                return;
            }

            match kv::cache_key(&collection) {
                Ok(key) => caps.kv.get(key.raw(), move |result| Event::CacheLoaded {
                    generation,
                    result: Box::new(result),
                }),
                Err(e) => {
                    warn!(collection = %collection, error = %e, "cache key rejected, fetching");
                    Self::fetch(generation, 1, model, caps);
                }
            }
        }

        fn fetch(generation: Generation, attempt: u32, model: &mut Model, caps: &Capabilities) {
            let Some(collection) = model.pipeline.collection().cloned() else {
                return;
            };

            match http::listing_url(&collection, model.config.listing_limit) {
                Ok(url) => {
                    debug!(
                        collection = %collection,
                        generation = generation.value(),
                        attempt,
                        "fetching listing"
                    );
                    caps.http
                        .get(url.as_str())
                        .send(move |result| Event::ListingFetched {
                            generation,
                            attempt,
                            result: Box::new(result),
                        });
                }
                Err(e) => {
                    Self::resolution_failed(generation, &SourceError::Fetch(e.to_string()), model, caps);
                }
            }
        }

        fn list_available(
            generation: Generation,
            list: ImageList,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            if model.pipeline.list_ready(generation, list) {
                let index = model.navigation.current();
                Self::show(index, model, caps);
            }
        }

        fn show(index: NavigationIndex, model: &mut Model, caps: &Capabilities) {
            match model.pipeline.select(index) {
                Some(Candidate { ticket, url }) => {
                    debug!(
                        index = index.value(),
                        sequence = ticket.sequence(),
                        url = %url,
                        "validating candidate"
                    );
                    let checked = url.clone();
                    caps.preload.check(url, move |outcome| Event::ImageChecked {
                        ticket,
                        url: checked,
                        outcome,
                    });
                }
                None => {
                    debug!(index = index.value(), "index suppressed");
                }
            }
        }

        fn navigate(offset: NavigationOffset, model: &mut Model, caps: &Capabilities) {
            model.activity.on_action();
            let index = model.navigation.apply(offset);
            Self::show(index, model, caps);
            caps.render.render();
        }

        fn resolution_failed(
            generation: Generation,
            failure: &SourceError,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            let collection = model.pipeline.collection().cloned();

            match model.pipeline.fail(generation, &model.config.retry) {
                FailureStep::Stale => {
                    debug!(generation = generation.value(), error = %failure, "discarding stale failure");
                }
                FailureStep::Retry { attempt, delay_ms } => {
                    warn!(
                        generation = generation.value(),
                        next_attempt = attempt,
                        delay_ms,
                        error = %failure,
                        "image list resolution failed, retrying"
                    );
                    caps.delay.start(delay_ms, move |_| Event::RetryDue {
                        generation,
                        attempt,
                    });
                }
                FailureStep::Exhausted { attempts } => {
                    error!(
                        generation = generation.value(),
                        attempts,
                        error = %failure,
                        "image list resolution gave up"
                    );
                    let mut notice = ViewerError::new(failure.kind(), failure.to_string());
                    if let Some(collection) = collection {
                        notice = notice.with_collection(collection.as_str());
                    }
                    model.active_error = Some(notice);
                    model.activity.on_settled();
                    caps.render.render();
                }
            }
        }

        fn image_checked(
            ticket: ValidationTicket,
            url: String,
            outcome: crate::capabilities::PreloadOutcome,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            if !model.pipeline.settle(ticket) {
                debug!(sequence = ticket.sequence(), url = %url, "discarding stale validation");
                return;
            }

            let shown = outcome.resolve(url, &model.config.fallback_url);
            debug!(sequence = ticket.sequence(), url = %shown, "displaying");
            model.display_url = Some(shown);
            model.activity.on_settled();
            caps.render.render();
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(
                event = event.name(),
                user = event.is_user_initiated(),
                "update"
            );

            match event {
                Event::Configure(config) => {
                    info!(?config, "configuration replaced");
                    model.configure(config);
                    caps.render.render();
                }

                Event::CollectionSelected { collection } => {
                    match CollectionId::new(collection) {
                        Ok(id) => Self::start_resolution(id, model, caps),
                        Err(e) => {
                            warn!(error = %e, "rejected collection selection");
                            model.active_error =
                                Some(ViewerError::new(ErrorKind::InvalidCollection, e.to_string()));
                        }
                    }
                    caps.render.render();
                }

                Event::ForwardClicked => Self::navigate(NavigationOffset::Forward, model, caps),

                Event::BackClicked => Self::navigate(NavigationOffset::Back, model, caps),

                Event::DismissError => {
                    model.active_error = None;
                    caps.render.render();
                }

                Event::CacheLoaded { generation, result } => {
                    if !model.pipeline.is_resolving(generation) {
                        debug!(generation = generation.value(), "discarding stale cache read");
                        return;
                    }

                    match *result {
                        Ok(Some(bytes)) => match source::decode_cached(&bytes) {
                            Ok(list) => {
                                if let Some(collection) = model.pipeline.collection().cloned() {
                                    debug!(collection = %collection, len = list.len(), "durable cache hit");
                                    model.memory_cache.put(collection, list.clone());
                                }
                                Self::list_available(generation, list, model, caps);
                            }
                            // A corrupt entry costs no network attempt; the fetch overwrites it.
                            Err(e) => {
                                warn!(error = %e, "cached image list is corrupt, refetching");
                                Self::fetch(generation, 1, model, caps);
                            }
                        },
                        Ok(None) => Self::fetch(generation, 1, model, caps),
                        Err(e) => {
                            warn!(error = ?e, "cache read failed, treating as miss");
                            Self::fetch(generation, 1, model, caps);
                        }
                    }
                }

                Event::CacheStored { collection, result } => match *result {
                    Ok(_) => debug!(collection = %collection, "image list cached"),
                    Err(e) => warn!(collection = %collection, error = ?e, "cache write failed"),
                },

                Event::ListingFetched {
                    generation,
                    attempt,
                    result,
                } => {
                    if !model.pipeline.is_attempt_current(generation, attempt) {
                        debug!(generation = generation.value(), attempt, "discarding stale listing");
                        return;
                    }

                    let resolved =
                        http::listing_body(*result).and_then(|body| source::parse_listing(&body));

                    match resolved {
                        Ok(list) => {
                            let Some(collection) = model.pipeline.collection().cloned() else {
                                return;
                            };
                            info!(collection = %collection, len = list.len(), "image list fetched");
                            model.memory_cache.put(collection.clone(), list.clone());

                            let stored = kv::cache_key(&collection)
                                .map_err(|e| e.to_string())
                                .and_then(|key| {
                                    source::encode_cached(&list)
                                        .map(|bytes| (key, bytes))
                                        .map_err(|e| e.to_string())
                                });
                            match stored {
                                Ok((key, bytes)) => {
                                    caps.kv.set(key.raw(), bytes, move |result| Event::CacheStored {
                                        collection,
                                        result: Box::new(result),
                                    });
                                }
                                Err(e) => warn!(error = %e, "image list not cached"),
                            }

                            Self::list_available(generation, list, model, caps);
                        }
                        Err(e) => Self::resolution_failed(generation, &e, model, caps),
                    }
                }

                Event::RetryDue {
                    generation,
                    attempt,
                } => {
                    if model.pipeline.is_attempt_current(generation, attempt) {
                        Self::fetch(generation, attempt, model, caps);
                    } else {
                        debug!(generation = generation.value(), attempt, "discarding stale retry");
                    }
                }

                Event::ImageChecked {
                    ticket,
                    url,
                    outcome,
                } => Self::image_checked(ticket, url, outcome, model, caps),
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            model.view()
        }
    }
}
