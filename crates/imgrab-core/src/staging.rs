//! Per-crawl staging directory.
//!
//! `StagingArea` owns a uniquely named directory under the work dir. It is
//! removed recursively by `close` or, on any path that skips `close`
//! (early return, panic), by `Drop`. Workers write distinct file names into
//! it concurrently; removal must only happen after they joined.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::TempDir;

/// Suffix used for archives and other outputs while they are being written.
pub const TEMP_SUFFIX: &str = ".part";

#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    name: String,
}

impl StagingArea {
    /// Create `<work_dir>/crawl_<unix_secs>_<random>`, creating `work_dir` if needed.
    pub fn create(work_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(work_dir)?;
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let dir = tempfile::Builder::new()
            .prefix(&format!("crawl_{secs}_"))
            .tempdir_in(work_dir)?;
        let name = dir
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("crawl_{secs}"));
        tracing::debug!(path = %dir.path().display(), "staging area created");
        Ok(Self { dir, name })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory name; also the stem of the archive built from it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the archive for this crawl goes: next to the staging dir,
    /// `<work_dir>/<name>.zip`.
    pub fn archive_path(&self) -> PathBuf {
        let parent = self.path().parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{}.zip", self.name))
    }

    /// Write one file. Fails if `file_name` already exists, so two workers can
    /// never silently overwrite each other.
    pub fn write_file(&self, file_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.path().join(file_name);
        let mut f = File::options().write(true).create_new(true).open(&path)?;
        f.write_all(data)?;
        Ok(path)
    }

    /// Remove the directory and everything in it, reporting failures.
    pub fn close(self) -> io::Result<()> {
        let path = self.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!(path = %path.display(), "staging area removed");
        Ok(())
    }
}

/// Path for an in-progress output: appends `.part` (e.g. `a.zip` -> `a.zip.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
