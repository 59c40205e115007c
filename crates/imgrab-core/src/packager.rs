//! Bundle the staging directory into one zip archive.
//!
//! Entries are the staged files' names only (flat, no directory entries),
//! written in name order. The archive is written to `<archive>.part` and
//! renamed into place once complete.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::staging::temp_path;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("archive I/O: {0}")]
    Io(#[from] io::Error),
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Regular files directly inside `dir`, sorted by file name.
pub fn staged_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Write every staged file into a zip at `archive_path` and return that path.
/// On failure the partial archive is removed.
pub fn pack(staging_dir: &Path, archive_path: &Path) -> Result<PathBuf, PackError> {
    let part = temp_path(archive_path);
    let written = write_archive(staging_dir, &part).and_then(|count| {
        fs::rename(&part, archive_path)?;
        Ok(count)
    });
    match written {
        Ok(count) => {
            tracing::info!(
                archive = %archive_path.display(),
                entries = count,
                "archive written"
            );
            Ok(archive_path.to_path_buf())
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}

fn write_archive(staging_dir: &Path, part: &Path) -> Result<usize, PackError> {
    let files = staged_files(staging_dir)?;
    let file = File::create(part)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for src in &files {
        let Some(name) = src.file_name() else {
            continue;
        };
        zip.start_file(name.to_string_lossy(), options)?;
        let mut f = File::open(src)?;
        io::copy(&mut f, &mut zip)?;
    }

    let file = zip.finish()?;
    file.sync_all()?;
    Ok(files.len())
}
