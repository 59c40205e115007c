//! Download coordinator.
//!
//! Owns one crawl from start to finish: validates the base URL, acquires a
//! staging area, fans the resolved candidates out to a bounded worker pool,
//! enforces the image cap, packages the survivors and removes the staging
//! area on every exit path.
//!
//! Per-candidate failures (fetch, decode, size, duplicate) only exclude that
//! candidate. Only setup, staging and packaging faults fail the crawl.

mod admission;
mod stats;
mod worker;

pub use admission::AdmissionCounter;
pub use stats::{CrawlOutcome, CrawlReport, CrawlStats};
pub use worker::image_file_name;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::candidates::{parse_base_url, resolve_candidates};
use crate::config::CrawlerConfig;
use crate::dedup::DedupSet;
use crate::fetch::{CurlFetcher, Fetch};
use crate::filter::ImageFilter;
use crate::packager::{self, PackError};
use crate::staging::StagingArea;

/// Default number of concurrent fetch workers.
pub const DEFAULT_WORKERS: usize = 5;
/// Default cap on admitted images per crawl.
pub const DEFAULT_MAX_IMAGES: usize = 50;

/// A crawl that could not complete. Distinct from `CrawlOutcome::NoImages`.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("base URL must be an absolute http(s) URL: {0}")]
    InvalidBaseUrl(String),
    #[error("staging area: {0}")]
    Staging(#[source] io::Error),
    #[error("packaging: {0}")]
    Packaging(#[from] PackError),
    #[error("a crawl worker panicked")]
    WorkerPanicked,
}

/// Lifecycle of one crawl, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Init,
    Dispatching,
    Collecting,
    Packaging,
    Done,
    Failed,
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrawlPhase::Init => "init",
            CrawlPhase::Dispatching => "dispatching",
            CrawlPhase::Collecting => "collecting",
            CrawlPhase::Packaging => "packaging",
            CrawlPhase::Done => "done",
            CrawlPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn enter_phase(phase: CrawlPhase) {
    tracing::debug!(phase = %phase, "crawl phase");
}

#[derive(Clone)]
pub struct Coordinator {
    fetcher: Arc<dyn Fetch>,
    filter: ImageFilter,
    workers: usize,
    work_dir: PathBuf,
}

impl Coordinator {
    pub fn new(fetcher: Arc<dyn Fetch>, filter: ImageFilter, workers: usize, work_dir: PathBuf) -> Self {
        Self {
            fetcher,
            filter,
            workers: workers.max(1),
            work_dir,
        }
    }

    /// Coordinator with a `CurlFetcher` built from `cfg`.
    pub fn from_config(cfg: &CrawlerConfig) -> Self {
        let retry = cfg.retry_config();
        let fetcher = CurlFetcher::new(retry.policy(), retry.timeout(), cfg.user_agents.clone());
        Self::new(Arc::new(fetcher), cfg.image_filter(), cfg.workers, cfg.work_dir())
    }

    pub fn fetcher(&self) -> &dyn Fetch {
        self.fetcher.as_ref()
    }

    /// Run one crawl with a fresh dedup set.
    pub fn run(
        &self,
        base_url: &str,
        candidates: &[String],
        max_images: usize,
    ) -> Result<CrawlOutcome, CrawlError> {
        self.run_with(base_url, candidates, max_images, &DedupSet::new())
    }

    /// Run one crawl against a caller-supplied dedup set. Blocks until every
    /// dispatched job has resolved and the staging area is gone.
    pub fn run_with(
        &self,
        base_url: &str,
        candidates: &[String],
        max_images: usize,
        dedup: &DedupSet,
    ) -> Result<CrawlOutcome, CrawlError> {
        enter_phase(CrawlPhase::Init);
        let base = parse_base_url(base_url)
            .ok_or_else(|| CrawlError::InvalidBaseUrl(base_url.to_string()))?;
        let staging = StagingArea::create(&self.work_dir).map_err(|e| {
            enter_phase(CrawlPhase::Failed);
            CrawlError::Staging(e)
        })?;

        if !dedup.is_empty() {
            tracing::debug!(known = dedup.len(), "crawl starts with known fingerprints");
        }
        let result = self.execute(&base, candidates, max_images, dedup, &staging);
        let closed = staging.close();

        let outcome = match (result, closed) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(outcome), Err(e)) => {
                tracing::error!(error = %e, "could not remove staging area");
                if let Some(archive) = outcome.archive_path() {
                    let _ = std::fs::remove_file(archive);
                }
                Err(CrawlError::Staging(e))
            }
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(e)) => {
                tracing::error!(error = %e, "could not remove staging area");
                Err(err)
            }
        };

        match &outcome {
            Ok(o) => {
                enter_phase(CrawlPhase::Done);
                let s = o.stats();
                tracing::info!(
                    base = %base,
                    candidates = s.candidates,
                    dispatched = s.dispatched,
                    admitted = s.admitted,
                    fetch_failed = s.fetch_failed,
                    rejected_small = s.rejected_small,
                    rejected_decode = s.rejected_decode,
                    duplicates = s.duplicates,
                    over_cap = s.discarded_over_cap,
                    "crawl finished"
                );
            }
            Err(e) => {
                enter_phase(CrawlPhase::Failed);
                tracing::error!(base = %base, error = %e, "crawl failed");
            }
        }
        outcome
    }

    /// Async wrapper: runs the blocking crawl on tokio's blocking pool.
    pub async fn run_async(
        &self,
        base_url: String,
        candidates: Vec<String>,
        max_images: usize,
    ) -> Result<CrawlOutcome, CrawlError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.run(&base_url, &candidates, max_images))
            .await
            .map_err(|_| CrawlError::WorkerPanicked)?
    }

    fn execute(
        &self,
        base: &Url,
        candidates: &[String],
        max_images: usize,
        dedup: &DedupSet,
        staging: &StagingArea,
    ) -> Result<CrawlOutcome, CrawlError> {
        let jobs = resolve_candidates(base, candidates);
        let mut stats = CrawlStats {
            candidates: jobs.len(),
            ..CrawlStats::default()
        };
        let admissions = AdmissionCounter::new(max_images);
        let shared = worker::Shared {
            fetcher: self.fetcher.as_ref(),
            filter: &self.filter,
            dedup,
            admissions: &admissions,
            staging,
        };

        enter_phase(CrawlPhase::Dispatching);
        worker::run_pool(&shared, jobs, self.workers, &mut stats)?;

        if stats.admitted == 0 {
            return Ok(CrawlOutcome::NoImages(stats));
        }

        enter_phase(CrawlPhase::Packaging);
        let archive_path = packager::pack(staging.path(), &staging.archive_path())?;
        Ok(CrawlOutcome::Archive(CrawlReport {
            archive_path,
            images: stats.admitted,
            stats,
        }))
    }
}

impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("filter", &self.filter)
            .field("workers", &self.workers)
            .field("work_dir", &self.work_dir)
            .finish()
    }
}
