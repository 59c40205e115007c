//! CLI command handlers. Each command is in its own file.

mod candidates;
mod crawl;
mod fingerprint;
mod page;

pub use candidates::run_candidates;
pub use crawl::{run_crawl, CrawlArgs};
pub use fingerprint::run_fingerprint;
