//! Fetch error type for retry classification.

use thiserror::Error;

/// Error returned by a single GET attempt (curl failure, HTTP error or a
/// body rejected by the caller's check).
/// Classified before deciding whether another attempt is worth it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, malformed URL, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The body arrived but is not a readable image.
    #[error("undecodable image: {0}")]
    Decode(String),
    /// The reference could not be turned into a fetchable URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
