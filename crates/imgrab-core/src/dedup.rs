//! Per-crawl set of content fingerprints.
//!
//! Workers share one `DedupSet`; the check and the insert happen under a
//! single lock acquisition so two workers holding identical bytes can never
//! both be admitted. Which of them wins is a race.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::fingerprint::Fingerprint;

#[derive(Debug, Default)]
pub struct DedupSet {
    seen: Mutex<HashSet<Fingerprint>>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time these bytes are seen (and records them),
    /// `false` for every later duplicate.
    pub fn try_admit(&self, data: &[u8]) -> bool {
        self.try_admit_fingerprint(Fingerprint::of_bytes(data))
    }

    pub fn try_admit_fingerprint(&self, fp: Fingerprint) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(fp)
    }

    pub fn contains(&self, data: &[u8]) -> bool {
        let fp = Fingerprint::of_bytes(data);
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&fp)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    #[test]
    fn first_admission_wins() {
        let set = DedupSet::new();
        assert!(set.is_empty());
        assert!(set.try_admit(b"img"));
        assert!(!set.try_admit(b"img"));
        assert!(set.try_admit(b"other"));
        assert_eq!(set.len(), 2);
        assert!(set.contains(b"img"));
    }

    #[test]
    fn racing_workers_admit_identical_bytes_once() {
        let set = DedupSet::new();
        let admitted = AtomicUsize::new(0);
        let barrier = Barrier::new(8);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    barrier.wait();
                    if set.try_admit(b"same bytes") {
                        admitted.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });
        assert_eq!(admitted.load(Ordering::Relaxed), 1);
        assert_eq!(set.len(), 1);
    }
}
