use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::CollectionId;
use crate::source::SourceError;
use crate::LISTING_URL_BASE;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let parsed = Self::validate(&url)?;
        Ok(Self {
            url: parsed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    fn validate(url: &str) -> Result<Url, HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url: String::new(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP error {status}")]
    HttpStatus { status: u16 },

    #[error("empty response body")]
    EmptyBody,
}

impl From<HttpError> for SourceError {
    fn from(e: HttpError) -> Self {
        SourceError::Fetch(e.to_string())
    }
}

/// `https://www.reddit.com/r/<collection>/.json?limit=<limit>&show=all`
pub fn listing_url(collection: &CollectionId, limit: u32) -> Result<ValidatedUrl, HttpError> {
    ValidatedUrl::new(format!(
        "{LISTING_URL_BASE}{}/.json?limit={limit}&show=all",
        collection.as_str()
    ))
}

/// Body of a successful listing response; transport failures and non-2xx
/// statuses become [`SourceError::Fetch`].
pub fn listing_body(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<Vec<u8>, SourceError> {
    let mut response = result.map_err(|e| SourceError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::HttpStatus {
            status: u16::from(status),
        }
        .into());
    }

    response.take_body().ok_or_else(|| HttpError::EmptyBody.into())
}
