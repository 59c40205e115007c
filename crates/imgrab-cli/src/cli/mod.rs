//! CLI for the imgrab image crawler.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgrab_core::config;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_candidates, run_crawl, run_fingerprint, CrawlArgs};

/// Top-level CLI for the imgrab image crawler.
#[derive(Debug, Parser)]
#[command(name = "imgrab")]
#[command(about = "imgrab: download a page's large images into one zip", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl a page and save its qualifying images as a zip archive.
    Crawl {
        /// Page URL (http or https). Relative image references resolve against it.
        url: String,

        /// Where to write the archive.
        #[arg(short, long, default_value = "images.zip", value_name = "FILE")]
        output: PathBuf,

        /// Maximum number of images to keep (default from config: 50).
        #[arg(long, value_name = "N")]
        max_images: Option<usize>,

        /// Minimum width and height in pixels (default from config: 800).
        #[arg(long, value_name = "PX")]
        min_size: Option<u32>,

        /// Concurrent downloads (default from config: 5).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Read the page source from a file (e.g. saved from a browser after
        /// scripts ran) instead of fetching URL.
        #[arg(long, value_name = "FILE")]
        page_source: Option<PathBuf>,
    },

    /// List the resolved image candidates found on a page.
    Candidates {
        /// Page URL (http or https).
        url: String,

        /// Read the page source from a file instead of fetching URL.
        #[arg(long, value_name = "FILE")]
        page_source: Option<PathBuf>,
    },

    /// Print the content fingerprint used for duplicate detection.
    Fingerprint {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Crawl {
                url,
                output,
                max_images,
                min_size,
                workers,
                page_source,
            } => {
                let args = CrawlArgs {
                    url,
                    output,
                    max_images,
                    min_size,
                    workers,
                    page_source,
                };
                run_crawl(&cfg, args).await
            }
            CliCommand::Candidates { url, page_source } => {
                run_candidates(&cfg, &url, page_source.as_deref()).await?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::Fingerprint { path } => {
                run_fingerprint(&path).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

#[cfg(test)]
mod tests;
