//! Fingerprint command: print the dedup fingerprint of a file.

use anyhow::Result;
use imgrab_core::fingerprint::Fingerprint;
use std::path::Path;

pub async fn run_fingerprint(path: &Path) -> Result<()> {
    let fp = Fingerprint::of_path(path)?;
    println!("{}  {}", fp, path.display());
    Ok(())
}
