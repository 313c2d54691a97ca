//! Error types for URL resolution and transport operations.

use std::time::Duration;

/// Error type for URL parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("invalid url: {0}")]
    Parse(#[from] url::ParseError),

    #[error("relative reference requires a base: {0}")]
    RelativeWithoutBase(String),
}

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The caller supplied no URL. Raised before any network dispatch.
    #[error("a url is required")]
    MissingUrl,

    #[error(transparent)]
    Url(#[from] UrlError),

    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("jsonp error: {0}")]
    Jsonp(String),
}
