pub mod config;
pub mod logging;

pub mod candidates;
pub mod coordinator;
pub mod dedup;
pub mod fetch;
pub mod filter;
pub mod fingerprint;
pub mod packager;
pub mod retry;
pub mod staging;

pub use coordinator::{Coordinator, CrawlError, CrawlOutcome, CrawlReport, CrawlStats};
