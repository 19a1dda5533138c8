use crux_kv::error::KeyValueError;

use crate::capabilities::PreloadOutcome;
use crate::model::CollectionId;
use crate::pipeline::{Generation, ValidationTicket};
use crate::ViewerConfig;

pub type ListingResult = crux_http::Result<crux_http::Response<Vec<u8>>>;
pub type CacheResult = Result<Option<Vec<u8>>, KeyValueError>;

#[derive(Debug)]
pub enum Event {
    // --- Shell input ---
    Configure(ViewerConfig),
    CollectionSelected {
        collection: String,
    },
    ForwardClicked,
    BackClicked,
    DismissError,

    // --- Capability responses ---
    CacheLoaded {
        generation: Generation,
        result: Box<CacheResult>,
    },
    CacheStored {
        collection: CollectionId,
        result: Box<CacheResult>,
    },
    ListingFetched {
        generation: Generation,
        attempt: u32,
        result: Box<ListingResult>,
    },
    RetryDue {
        generation: Generation,
        attempt: u32,
    },
    ImageChecked {
        ticket: ValidationTicket,
        url: String,
        outcome: PreloadOutcome,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::CollectionSelected { .. } => "collection_selected",
            Self::ForwardClicked => "forward_clicked",
            Self::BackClicked => "back_clicked",
            Self::DismissError => "dismiss_error",
            Self::CacheLoaded { .. } => "cache_loaded",
            Self::CacheStored { .. } => "cache_stored",
            Self::ListingFetched { .. } => "listing_fetched",
            Self::RetryDue { .. } => "retry_due",
            Self::ImageChecked { .. } => "image_checked",
        }
    }

    /// Shell actions. A selection only turns the loading indicator on once its
    /// name is accepted.
    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::CollectionSelected { .. } | Self::ForwardClicked | Self::BackClicked
        )
    }
}
