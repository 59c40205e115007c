//! Candidate image URL discovery and resolution.
//!
//! Rendering a page (running its scripts, scrolling to trigger lazy loading)
//! happens elsewhere; this module works on whatever page source it is given.
//! For each `<img>` the first non-empty of these is taken:
//! the URL of the last `data-srcset` entry, `data-src`, `src`.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::fetch::Fetch;
use crate::retry::FetchError;

/// Raw candidate references from `<img>` tags, in document order.
/// Tags with no usable attribute are skipped.
pub fn extract_candidates(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(candidate_for)
        .collect()
}

fn candidate_for(img: ElementRef<'_>) -> Option<String> {
    let el = img.value();
    let from_srcset = el
        .attr("data-srcset")
        .and_then(|v| v.split(',').next_back())
        .and_then(|entry| entry.split_whitespace().next())
        .filter(|s| !s.is_empty());
    from_srcset
        .or_else(|| el.attr("data-src").map(str::trim).filter(|s| !s.is_empty()))
        .or_else(|| el.attr("src").map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

/// Parse a base URL, requiring an absolute http(s) URL.
pub fn parse_base_url(base: &str) -> Option<Url> {
    let url = Url::parse(base.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Resolve candidates against `base`: blank entries, unresolvable references,
/// non-http(s) results (`data:`, `javascript:`, ...) and repeats of an
/// already-resolved URL are dropped. Order is preserved.
pub fn resolve_candidates(base: &Url, candidates: &[String]) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for raw in candidates {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let url = match base.join(raw) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!(candidate = raw, error = %e, "unresolvable candidate");
                continue;
            }
        };
        if !matches!(url.scheme(), "http" | "https") {
            tracing::debug!(candidate = raw, "skipping non-http candidate");
            continue;
        }
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    out
}

/// Fetch a page's source through the same fetcher (and retry policy) used
/// for images. Non-UTF-8 bytes are replaced.
pub fn fetch_page_source(fetcher: &dyn Fetch, page_url: &str) -> Result<String, FetchError> {
    let url = parse_base_url(page_url)
        .ok_or_else(|| FetchError::InvalidUrl(page_url.to_string()))?;
    let body = fetcher.fetch(url.as_str())?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
