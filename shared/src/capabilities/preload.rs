//! Image validation: asks the shell to load a URL and reports whether it worked.
//!
//! A failed load is a normal outcome, not an error. The core swaps in the
//! fallback image and keeps going.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadOperation {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreloadOutcome {
    Loaded,
    Failed,
}

impl PreloadOutcome {
    /// The URL to display for a check of `url`.
    #[must_use]
    pub fn resolve(self, url: String, fallback: &str) -> String {
        match self {
            Self::Loaded => url,
            Self::Failed => fallback.to_string(),
        }
    }
}

impl Operation for PreloadOperation {
    type Output = PreloadOutcome;
}

#[derive(Clone)]
pub struct Preload<E> {
    context: CapabilityContext<PreloadOperation, E>,
}

impl<Ev> Capability<Ev> for Preload<Ev> {
    type Operation = PreloadOperation;
    type MappedSelf<MappedEv> = Preload<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Preload::new(self.context.map_event(f))
    }
}

impl<E> Preload<E>
where
    E: Send + 'static,
{
    pub fn new(context: CapabilityContext<PreloadOperation, E>) -> Self {
        Self { context }
    }

    pub fn check<F>(&self, url: String, make_event: F)
    where
        F: FnOnce(PreloadOutcome) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let outcome = ctx.request_from_shell(PreloadOperation { url }).await;
            ctx.update_app(make_event(outcome));
        });
    }
}
