//! Bounded worker pool: each worker pulls one URL at a time from a shared
//! queue and runs fetch -> filter -> dedup -> reserve -> persist before
//! taking the next. Outcomes stream back over a channel to the collector.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};

use url::Url;

use super::admission::AdmissionCounter;
use super::stats::{CrawlStats, JobOutcome};
use super::CrawlError;
use crate::dedup::DedupSet;
use crate::fetch::Fetch;
use crate::filter::{ImageFilter, ImageInfo, Rejection};
use crate::retry::FetchError;
use crate::staging::StagingArea;

/// Everything a worker needs, borrowed for the lifetime of the pool.
pub(super) struct Shared<'a> {
    pub fetcher: &'a dyn Fetch,
    pub filter: &'a ImageFilter,
    pub dedup: &'a DedupSet,
    pub admissions: &'a AdmissionCounter,
    pub staging: &'a StagingArea,
}

/// Staged file name for the image in admission slot `index`.
pub fn image_file_name(index: usize, info: &ImageInfo) -> String {
    format!("image_{index:04}.{}", info.extension())
}

/// Run all `jobs` with at most `workers` threads and fold their outcomes into
/// `stats`. Returns only after every worker has joined.
///
/// Workers stop taking new jobs once the admission cap is full or a staging
/// write failed; jobs already running are drained either way.
pub(super) fn run_pool(
    shared: &Shared<'_>,
    jobs: Vec<Url>,
    workers: usize,
    stats: &mut CrawlStats,
) -> Result<(), CrawlError> {
    if jobs.is_empty() {
        return Ok(());
    }
    let num_workers = workers.max(1).min(jobs.len());
    let queue = Mutex::new(VecDeque::from(jobs));
    let faulted = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<(Url, JobOutcome)>();
    let mut staging_error: Option<io::Error> = None;

    let panicked = std::thread::scope(|s| {
        let queue = &queue;
        let faulted = &faulted;
        let handles: Vec<_> = (0..num_workers)
            .map(|_| {
                let tx = tx.clone();
                s.spawn(move || worker_loop(shared, queue, faulted, tx))
            })
            .collect();
        drop(tx);

        super::enter_phase(super::CrawlPhase::Collecting);
        for (url, outcome) in rx {
            stats.record(&outcome);
            match outcome {
                JobOutcome::Admitted { index, file_name } => {
                    tracing::debug!(url = %url, index, file = %file_name, "admitted");
                }
                JobOutcome::StagingFailed(e) => {
                    tracing::error!(url = %url, error = %e, "staging write failed");
                    staging_error.get_or_insert(e);
                }
                other => tracing::debug!(url = %url, outcome = ?other, "candidate excluded"),
            }
        }

        handles
            .into_iter()
            .map(|h| h.join())
            .filter(Result::is_err)
            .count()
    });

    if panicked > 0 {
        tracing::error!(workers = panicked, "crawl worker panicked");
        return Err(CrawlError::WorkerPanicked);
    }
    if let Some(e) = staging_error {
        return Err(CrawlError::Staging(e));
    }
    Ok(())
}

fn worker_loop(
    shared: &Shared<'_>,
    queue: &Mutex<VecDeque<Url>>,
    faulted: &AtomicBool,
    tx: Sender<(Url, JobOutcome)>,
) {
    loop {
        if shared.admissions.is_full() || faulted.load(Ordering::Acquire) {
            break;
        }
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        let Some(url) = next else {
            break;
        };
        let outcome = process(shared, &url);
        if matches!(outcome, JobOutcome::StagingFailed(_)) {
            faulted.store(true, Ordering::Release);
        }
        if tx.send((url, outcome)).is_err() {
            break;
        }
    }
}

/// One candidate, start to finish. Never fails the crawl by itself; staging
/// failures are reported as an outcome and escalated by the collector.
fn process(shared: &Shared<'_>, url: &Url) -> JobOutcome {
    // Undecodable bodies are retried like transport errors; small images are not.
    let decodes = |body: &[u8]| match shared.filter.accept(body) {
        Err(Rejection::Decode(msg)) => Err(FetchError::Decode(msg)),
        _ => Ok(()),
    };
    let bytes = match shared.fetcher.fetch_checked(url.as_str(), &decodes) {
        Ok(b) => b,
        Err(FetchError::Decode(msg)) => return JobOutcome::Rejected(Rejection::Decode(msg)),
        Err(_) => return JobOutcome::FetchFailed,
    };
    let info = match shared.filter.accept(&bytes) {
        Ok(info) => info,
        Err(r) => return JobOutcome::Rejected(r),
    };
    if shared.admissions.is_full() {
        return JobOutcome::OverCap;
    }
    if !shared.dedup.try_admit(&bytes) {
        return JobOutcome::Duplicate;
    }
    let Some(index) = shared.admissions.try_reserve() else {
        return JobOutcome::OverCap;
    };
    let file_name = image_file_name(index, &info);
    match shared.staging.write_file(&file_name, &bytes) {
        Ok(_) => JobOutcome::Admitted { index, file_name },
        Err(e) => JobOutcome::StagingFailed(e),
    }
}
