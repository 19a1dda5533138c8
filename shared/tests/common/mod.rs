#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use crux_kv::error::KeyValueError;
use crux_kv::{KeyValueOperation, KeyValueResponse, KeyValueResult};
use serde_json::json;
use shared::capabilities::{DelayOperation, PreloadOperation};
use shared::{App, Effect, Event, Model, RetryPolicy, ViewModel, ViewerConfig};

/// Drives the app like a shell would, parking every non-render effect until
/// the test resolves it.
pub struct Harness {
    app: AppTester<App, Effect>,
    pub model: Model,
    effects: Vec<Effect>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ViewerConfig {
            retry: RetryPolicy {
                jitter_ms: 0,
                ..RetryPolicy::default()
            },
            ..ViewerConfig::default()
        })
    }

    pub fn with_config(config: ViewerConfig) -> Self {
        Self {
            app: AppTester::default(),
            model: Model::with_config(config),
            effects: Vec::new(),
        }
    }

    pub fn send(&mut self, event: Event) {
        let update = self.app.update(event, &mut self.model);
        self.absorb(update.effects, update.events);
    }

    pub fn select(&mut self, collection: &str) {
        self.send(Event::CollectionSelected {
            collection: collection.to_string(),
        });
    }

    pub fn resolve<Op: Operation>(&mut self, request: &mut Request<Op>, output: Op::Output) {
        let update = self
            .app
            .resolve(request, output)
            .expect("request should resolve");
        self.absorb(update.effects, update.events);
    }

    fn absorb(&mut self, effects: Vec<Effect>, events: Vec<Event>) {
        self.effects
            .extend(effects.into_iter().filter(|e| !matches!(e, Effect::Render(_))));
        for event in events {
            self.send(event);
        }
    }

    pub fn view(&self) -> ViewModel {
        self.model.view()
    }

    pub fn pending(&self) -> usize {
        self.effects.len()
    }

    fn take<T>(&mut self, pick: impl Fn(Effect) -> Result<T, Effect>) -> Option<T> {
        let mut found = None;
        let mut rest = Vec::with_capacity(self.effects.len());
        for effect in self.effects.drain(..) {
            if found.is_some() {
                rest.push(effect);
                continue;
            }
            match pick(effect) {
                Ok(t) => found = Some(t),
                Err(other) => rest.push(other),
            }
        }
        self.effects = rest;
        found
    }

    pub fn try_take_http(&mut self) -> Option<Request<HttpRequest>> {
        self.take(|e| match e {
            Effect::Http(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn take_http(&mut self) -> Request<HttpRequest> {
        self.try_take_http().expect("expected an HTTP request")
    }

    pub fn try_take_kv(&mut self) -> Option<Request<KeyValueOperation>> {
        self.take(|e| match e {
            Effect::KeyValue(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn take_kv(&mut self) -> Request<KeyValueOperation> {
        self.try_take_kv().expect("expected a key-value request")
    }

    pub fn try_take_preload(&mut self) -> Option<Request<PreloadOperation>> {
        self.take(|e| match e {
            Effect::Preload(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn take_preload(&mut self) -> Request<PreloadOperation> {
        self.try_take_preload().expect("expected an image preload")
    }

    pub fn try_take_delay(&mut self) -> Option<Request<DelayOperation>> {
        self.take(|e| match e {
            Effect::Delay(request) => Ok(request),
            other => Err(other),
        })
    }

    pub fn take_delay(&mut self) -> Request<DelayOperation> {
        self.try_take_delay().expect("expected a retry delay")
    }

    /// Selects `collection`, serves `urls` from the durable cache and lets the
    /// first image load.
    pub fn show_cached(&mut self, collection: &str, urls: &[&str]) {
        self.select(collection);
        let mut read = self.take_kv();
        self.resolve(&mut read, cache_hit(urls));
        if !urls.is_empty() {
            let mut check = self.take_preload();
            self.resolve(&mut check, shared::capabilities::PreloadOutcome::Loaded);
        }
    }
}

pub fn listing_body(urls: &[&str]) -> Vec<u8> {
    let children: Vec<_> = urls
        .iter()
        .map(|url| json!({ "kind": "t3", "data": { "url": url, "title": "post" } }))
        .collect();
    serde_json::to_vec(&json!({ "kind": "Listing", "data": { "children": children } }))
        .expect("listing serializes")
}

pub fn listing(urls: &[&str]) -> HttpResult {
    HttpResult::Ok(HttpResponse::ok().body(listing_body(urls)).build())
}

pub fn http_status(status: u16) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(status).build())
}

pub fn cache_hit(urls: &[&str]) -> KeyValueResult {
    cache_bytes(serde_json::to_vec(urls).expect("list serializes"))
}

pub fn cache_bytes(bytes: Vec<u8>) -> KeyValueResult {
    KeyValueResult::Ok {
        response: KeyValueResponse::Get {
            value: Some(bytes).into(),
        },
    }
}

pub fn cache_miss() -> KeyValueResult {
    KeyValueResult::Ok {
        response: KeyValueResponse::Get {
            value: None::<Vec<u8>>.into(),
        },
    }
}

pub fn storage_failure(message: &str) -> KeyValueResult {
    KeyValueResult::Err {
        error: KeyValueError::Io {
            message: message.to_string(),
        },
    }
}

pub fn is_get(request: &Request<KeyValueOperation>, expected: &str) -> bool {
    matches!(&request.operation, KeyValueOperation::Get { key } if key == expected)
}

pub fn is_set(request: &Request<KeyValueOperation>, expected: &str) -> bool {
    matches!(&request.operation, KeyValueOperation::Set { key, .. } if key == expected)
}
