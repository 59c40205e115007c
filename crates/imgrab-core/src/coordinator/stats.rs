//! Per-crawl counters and the caller-facing outcome.

use std::path::PathBuf;

use crate::filter::Rejection;

/// What happened to one dispatched candidate.
#[derive(Debug)]
pub(crate) enum JobOutcome {
    Admitted { index: usize, file_name: String },
    FetchFailed,
    Rejected(Rejection),
    Duplicate,
    OverCap,
    StagingFailed(std::io::Error),
}

/// Counts of candidate outcomes for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Resolved, distinct candidate URLs queued.
    pub candidates: usize,
    /// Jobs actually picked up by a worker.
    pub dispatched: usize,
    pub admitted: usize,
    pub fetch_failed: usize,
    pub rejected_decode: usize,
    pub rejected_small: usize,
    pub duplicates: usize,
    /// Accepted and unique, but arrived after the cap was reached.
    pub discarded_over_cap: usize,
}

impl CrawlStats {
    /// Queued candidates that were never dispatched (cap reached or crawl faulted).
    pub fn not_dispatched(&self) -> usize {
        self.candidates.saturating_sub(self.dispatched)
    }

    pub(crate) fn record(&mut self, outcome: &JobOutcome) {
        self.dispatched += 1;
        match outcome {
            JobOutcome::Admitted { .. } => self.admitted += 1,
            JobOutcome::FetchFailed => self.fetch_failed += 1,
            JobOutcome::Rejected(Rejection::Decode(_)) => self.rejected_decode += 1,
            JobOutcome::Rejected(Rejection::TooSmall { .. }) => self.rejected_small += 1,
            JobOutcome::Duplicate => self.duplicates += 1,
            JobOutcome::OverCap => self.discarded_over_cap += 1,
            JobOutcome::StagingFailed(_) => {}
        }
    }
}

/// A produced archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub archive_path: PathBuf,
    /// Number of entries in the archive (== `stats.admitted`).
    pub images: usize,
    pub stats: CrawlStats,
}

/// Successful end of a crawl: either an archive or an explicit "nothing
/// qualified". Failures are `Err(CrawlError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Archive(CrawlReport),
    NoImages(CrawlStats),
}

impl CrawlOutcome {
    pub fn stats(&self) -> &CrawlStats {
        match self {
            CrawlOutcome::Archive(r) => &r.stats,
            CrawlOutcome::NoImages(s) => s,
        }
    }

    pub fn archive_path(&self) -> Option<&std::path::Path> {
        match self {
            CrawlOutcome::Archive(r) => Some(&r.archive_path),
            CrawlOutcome::NoImages(_) => None,
        }
    }
}
