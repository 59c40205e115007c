//! `imgrab candidates <url>` – list resolved image candidates.

use anyhow::Result;
use imgrab_core::candidates::{extract_candidates, resolve_candidates};
use imgrab_core::config::CrawlerConfig;
use imgrab_core::Coordinator;
use std::path::Path;

use super::page::{load_page_source, parse_page_url};

pub async fn run_candidates(cfg: &CrawlerConfig, url: &str, page_source: Option<&Path>) -> Result<()> {
    let base = parse_page_url(url)?;
    let coordinator = Coordinator::from_config(cfg);
    let source = load_page_source(&coordinator, &base, page_source).await?;
    let raw = extract_candidates(&source);
    let resolved = resolve_candidates(&base, &raw);
    if resolved.is_empty() {
        println!("No image candidates found.");
    }
    for u in resolved {
        println!("{u}");
    }
    Ok(())
}
