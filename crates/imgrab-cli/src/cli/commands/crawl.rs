//! `imgrab crawl <url>` – crawl a page and save its images as a zip.
//!
//! Three outcomes: archive saved (exit 0), no qualifying images (exit 2),
//! crawl failed (exit 1). Failure details go to the log only.

use anyhow::{Context, Result};
use imgrab_core::candidates::extract_candidates;
use imgrab_core::config::CrawlerConfig;
use imgrab_core::{Coordinator, CrawlOutcome};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::page::{load_page_source, parse_page_url};

/// Exit code for "crawl ran but nothing qualified".
pub const EXIT_NO_IMAGES: u8 = 2;

#[derive(Debug, Clone)]
pub struct CrawlArgs {
    pub url: String,
    pub output: PathBuf,
    pub max_images: Option<usize>,
    pub min_size: Option<u32>,
    pub workers: Option<usize>,
    pub page_source: Option<PathBuf>,
}

impl CrawlArgs {
    /// Config with command-line overrides applied.
    pub fn apply(&self, cfg: &CrawlerConfig) -> CrawlerConfig {
        let mut cfg = cfg.clone();
        if let Some(n) = self.max_images {
            cfg.max_images = n;
        }
        if let Some(px) = self.min_size {
            cfg.min_width = px;
            cfg.min_height = px;
        }
        if let Some(n) = self.workers {
            cfg.workers = n;
        }
        cfg
    }
}

pub async fn run_crawl(cfg: &CrawlerConfig, args: CrawlArgs) -> Result<ExitCode> {
    let base = parse_page_url(&args.url)?;
    let cfg = args.apply(cfg);
    let coordinator = Coordinator::from_config(&cfg);

    let source = match load_page_source(&coordinator, &base, args.page_source.as_deref()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(url = %base, "{:#}", e);
            eprintln!("Crawl failed: the page could not be loaded.");
            return Ok(ExitCode::FAILURE);
        }
    };
    let candidates = extract_candidates(&source);
    tracing::info!(url = %base, candidates = candidates.len(), "page scanned");

    match coordinator
        .run_async(base.to_string(), candidates, cfg.max_images)
        .await
    {
        Ok(CrawlOutcome::Archive(report)) => {
            if let Err(e) = save_archive(&report.archive_path, &args.output) {
                tracing::error!(output = %args.output.display(), "{:#}", e);
                eprintln!("Crawl failed; see the log for details.");
                return Ok(ExitCode::FAILURE);
            }
            println!(
                "Saved {} image(s) to {}",
                report.images,
                args.output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Ok(CrawlOutcome::NoImages(_)) => {
            println!("No images found to download.");
            Ok(ExitCode::from(EXIT_NO_IMAGES))
        }
        Err(e) => {
            tracing::error!(url = %base, error = %e, "crawl failed");
            eprintln!("Crawl failed; see the log for details.");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Deliver the archive to `dest`. On failure the work archive is removed so
/// nothing is left behind in the work dir.
fn save_archive(archive: &Path, dest: &Path) -> Result<()> {
    deliver(archive, dest).map_err(|e| {
        if let Err(rm) = fs::remove_file(archive) {
            tracing::warn!(path = %archive.display(), error = %rm, "could not remove work archive");
        }
        e
    })
}

/// Move the finished archive to `dest`, copying when a rename is not possible
/// (e.g. the work dir is on another filesystem).
fn deliver(archive: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    if fs::rename(archive, dest).is_ok() {
        return Ok(());
    }
    fs::copy(archive, dest).with_context(|| format!("write {}", dest.display()))?;
    if let Err(e) = fs::remove_file(archive) {
        tracing::warn!(path = %archive.display(), error = %e, "could not remove work archive");
    }
    Ok(())
}
