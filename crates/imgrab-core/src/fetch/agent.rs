//! User-Agent selection.
//!
//! Rotating the User-Agent keeps naive bot filters from rejecting every
//! request. The choice is injected so tests can pin it.

/// Picks an index into a pool of `count` User-Agent strings. `count` is never 0.
pub trait AgentChooser: Send + Sync {
    fn choose(&self, count: usize) -> usize;
}

/// Uniform random choice backed by `fastrand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAgent;

impl AgentChooser for RandomAgent {
    fn choose(&self, count: usize) -> usize {
        fastrand::usize(..count)
    }
}

/// Always the same slot (clamped to the pool).
#[derive(Debug, Clone, Copy)]
pub struct FixedAgent(pub usize);

impl AgentChooser for FixedAgent {
    fn choose(&self, count: usize) -> usize {
        self.0.min(count - 1)
    }
}

/// Desktop Chrome strings used when the config does not list any.
pub fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
    ]
}
