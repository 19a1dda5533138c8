pub mod delay;
pub mod http;
pub mod kv;
pub mod preload;

pub use self::delay::{Delay, DelayElapsed, DelayOperation};
pub use self::http::{HttpError, ValidatedUrl};
pub use self::kv::{KeyNamespace, KvError, KvKey};
pub use self::preload::{Preload, PreloadOperation, PreloadOutcome};

// Crux's built-in Render is all the view layer needs.
pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::app::App;
use crate::event::Event;

/// Everything the core asks of its host shell.
///
/// `http` fetches listings, `kv` is the durable list cache, `preload` checks
/// that an image actually loads and `delay` paces fetch retries.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
    pub preload: Preload<Event>,
    pub delay: Delay<Event>,
}
