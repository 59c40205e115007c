//! Retry and backoff policy for image fetches.
//!
//! This module encapsulates error classification (transient vs permanent
//! failures) and exponential backoff decisions so the fetcher
//! and any future caller share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
