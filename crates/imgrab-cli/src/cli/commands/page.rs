//! Page source loading shared by `crawl` and `candidates`.

use anyhow::{Context, Result};
use imgrab_core::candidates::{fetch_page_source, parse_base_url};
use imgrab_core::Coordinator;
use std::path::Path;
use url::Url;

/// Validate a user-supplied page URL.
pub fn parse_page_url(url: &str) -> Result<Url> {
    if !url.starts_with("http") {
        anyhow::bail!("please enter a valid http(s) URL");
    }
    parse_base_url(url).context("please enter a valid http(s) URL")
}

/// Read the page source from `file` if given, otherwise fetch `url` on the
/// blocking pool with the coordinator's fetcher.
pub async fn load_page_source(
    coordinator: &Coordinator,
    url: &Url,
    file: Option<&Path>,
) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("read page source {}", path.display()));
    }
    let coordinator = coordinator.clone();
    let url = url.to_string();
    tokio::task::spawn_blocking(move || fetch_page_source(coordinator.fetcher(), &url))
        .await
        .context("page fetch task join")?
        .context("could not fetch the page")
}
