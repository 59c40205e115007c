//! Cap on admitted images per crawl.
//!
//! Workers reserve a slot before persisting an image; the reservation is a
//! compare-and-swap so concurrent admissions can never push the count past
//! the cap. The reserved slot number doubles as the file index.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct AdmissionCounter {
    cap: usize,
    admitted: AtomicUsize,
}

impl AdmissionCounter {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            admitted: AtomicUsize::new(0),
        }
    }

    pub fn admitted(&self) -> usize {
        self.admitted.load(Ordering::Acquire)
    }

    pub fn is_full(&self) -> bool {
        self.admitted() >= self.cap
    }

    /// Reserve the next slot. Returns its zero-based index, or `None` once
    /// the cap is reached.
    pub fn try_reserve(&self) -> Option<usize> {
        let mut current = self.admitted.load(Ordering::Relaxed);
        loop {
            if current >= self.cap {
                return None;
            }
            match self.admitted.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Some(current),
                Err(actual) => current = actual,
            }
        }
    }
}
