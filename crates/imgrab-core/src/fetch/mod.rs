//! Single-URL HTTP GET with retry and backoff.
//!
//! Each call runs on the current thread with its own curl Easy handle; call
//! from `spawn_blocking` if used from async code.

mod agent;

pub use agent::{default_user_agents, AgentChooser, FixedAgent, RandomAgent};

use std::sync::Arc;
use std::time::Duration;

use crate::retry::{run_with_retry, FetchError, RetryPolicy};

/// Caller-side validation of a fetched body. An `Err` counts as a failed
/// attempt and goes through the same retry policy as transport errors.
pub type BodyCheck<'a> = dyn Fn(&[u8]) -> Result<(), FetchError> + 'a;

/// Fetches the full body of one URL. Implementations retry internally and
/// only report the terminal outcome.
pub trait Fetch: Send + Sync {
    /// Fetch `url`, treating a body that fails `check` like any other failed
    /// attempt.
    fn fetch_checked(&self, url: &str, check: &BodyCheck<'_>) -> Result<Vec<u8>, FetchError>;

    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_checked(url, &|_| Ok(()))
    }
}

/// libcurl-backed fetcher with per-attempt timeout, rotating User-Agent and
/// exponential backoff between attempts.
#[derive(Clone)]
pub struct CurlFetcher {
    policy: RetryPolicy,
    timeout: Duration,
    user_agents: Arc<[String]>,
    chooser: Arc<dyn AgentChooser>,
}

impl CurlFetcher {
    pub fn new(policy: RetryPolicy, timeout: Duration, user_agents: Vec<String>) -> Self {
        Self {
            policy,
            timeout,
            user_agents: user_agents.into(),
            chooser: Arc::new(RandomAgent),
        }
    }

    /// Replace the User-Agent chooser (e.g. with `FixedAgent` in tests).
    pub fn with_chooser(mut self, chooser: Arc<dyn AgentChooser>) -> Self {
        self.chooser = chooser;
        self
    }

    fn pick_user_agent(&self) -> Option<&str> {
        if self.user_agents.is_empty() {
            return None;
        }
        let i = self.chooser.choose(self.user_agents.len());
        self.user_agents.get(i).map(String::as_str)
    }

    /// One GET. Non-2xx responses are errors.
    fn get_once(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(ua) = user_agent {
            easy.useragent(ua)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}

impl Fetch for CurlFetcher {
    fn fetch_checked(&self, url: &str, check: &BodyCheck<'_>) -> Result<Vec<u8>, FetchError> {
        let user_agent = self.pick_user_agent();
        let body = run_with_retry(&self.policy, |attempt| {
            self.get_once(url, user_agent)
                .and_then(|body| check(&body).map(|()| body))
                .map_err(|e| {
                    tracing::error!(url, attempt, error = %e, "fetch attempt failed");
                    e
                })
        })?;
        tracing::info!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

impl std::fmt::Debug for CurlFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlFetcher")
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .field("user_agents", &self.user_agents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            backoff_base: 2,
            backoff_unit: Duration::from_millis(1),
        }
    }

    #[test]
    fn picks_agent_through_chooser() {
        let f = CurlFetcher::new(
            RetryPolicy::default(),
            Duration::from_secs(1),
            vec!["a".into(), "b".into()],
        )
        .with_chooser(Arc::new(FixedAgent(1)));
        assert_eq!(f.pick_user_agent(), Some("b"));
    }

    #[test]
    fn empty_agent_pool_sends_no_header() {
        let f = CurlFetcher::new(RetryPolicy::default(), Duration::from_secs(1), Vec::new());
        assert_eq!(f.pick_user_agent(), None);
    }

    #[test]
    fn malformed_url_fails_without_retry() {
        let f = CurlFetcher::new(fast_policy(), Duration::from_secs(1), default_user_agents());
        let err = f.fetch("ht!tp://::").unwrap_err();
        assert!(matches!(err, FetchError::Curl(_)));
    }

    #[test]
    fn refused_connection_is_a_terminal_error() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let f = CurlFetcher::new(fast_policy(), Duration::from_secs(2), default_user_agents());
        let err = f.fetch(&format!("http://127.0.0.1:{port}/a.png")).unwrap_err();
        assert!(matches!(err, FetchError::Curl(_)));
    }
}
