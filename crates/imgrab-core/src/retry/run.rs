//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// The closure receives the 1-based attempt number. On retryable failure,
/// sleeps for the backoff duration then tries again; the last error is
/// returned once the budget is spent.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, f: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    run_with_retry_sleeping(policy, f, std::thread::sleep)
}

fn run_with_retry_sleeping<T, F, S>(
    policy: &RetryPolicy,
    mut f: F,
    mut sleep: S,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
