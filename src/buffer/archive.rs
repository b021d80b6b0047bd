//! Archive detection and extraction
//!
//! Datasets are often shipped compressed. Supported formats:
//!
//! - `.tar`
//! - `.tar.gz` / `.tgz`
//! - `.gz` (single compressed file)
//!
//! Anything else is not treated as an archive and is read as-is.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Archive container type, detected from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Tar,
    TarGz,
    Gz,
}

impl ArchiveKind {
    /// Guess the archive type from the path's extension(s)
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else if name.ends_with(".gz") {
            Some(ArchiveKind::Gz)
        } else {
            None
        }
    }

    /// Unpack `archive` into `dest`
    pub fn unpack(self, archive: &Path, dest: &Path) -> io::Result<()> {
        let file = BufReader::new(File::open(archive)?);

        match self {
            ArchiveKind::Tar => tar::Archive::new(file).unpack(dest),
            ArchiveKind::TarGz => tar::Archive::new(GzDecoder::new(file)).unpack(dest),
            ArchiveKind::Gz => {
                let name = archive
                    .file_stem()
                    .map(|s| s.to_os_string())
                    .unwrap_or_else(|| "data".into());
                let mut out = File::create(dest.join(name))?;
                io::copy(&mut GzDecoder::new(file), &mut out)?;
                Ok(())
            }
        }
    }
}

/// Find the biggest regular file anywhere under `dir`
///
/// Returns `None` if the tree holds no regular file at all.
pub fn largest_file(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut best: Option<(PathBuf, u64)> = None;
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                let size = entry.metadata()?.len();
                if best.as_ref().map_or(true, |(_, s)| size > *s) {
                    best = Some((entry.path(), size));
                }
            }
        }
    }

    Ok(best.map(|(path, _)| path))
}
