//! Content fingerprints used as the dedup key.
//!
//! MD5 is weak as a cryptographic hash but more than enough to tell two
//! downloaded images apart.

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// 128-bit digest of raw image bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    pub fn of_bytes(data: &[u8]) -> Self {
        Self::from_hasher(Md5::new_with_prefix(data))
    }

    /// Fingerprint a file on disk, reading in chunks to keep memory bounded.
    pub fn of_path(path: &Path) -> Result<Self> {
        let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut hasher = Md5::new();
        let mut buf = vec![0u8; BUF_SIZE];
        loop {
            let n = f
                .read(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self::from_hasher(hasher))
    }

    fn from_hasher(hasher: Md5) -> Self {
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
