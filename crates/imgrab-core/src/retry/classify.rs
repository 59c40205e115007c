//! Classify fetch failures into retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        ErrorKind::Permanent
    } else {
        ErrorKind::Transient
    }
}

/// Classify a failed attempt. Every non-2xx status and every body that does
/// not decode as an image is worth another try.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(_) | FetchError::Decode(_) => ErrorKind::Transient,
        FetchError::InvalidUrl(_) => ErrorKind::Permanent,
    }
}
