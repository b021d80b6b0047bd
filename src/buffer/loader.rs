//! Dataset loading
//!
//! Resolves the source file (extracting archives into a scoped temporary
//! directory), reads it line by line and, for real-rate replay, parses and
//! sorts by the leading timestamp.

use super::archive::{largest_file, ArchiveKind};
use super::LineBuffer;
use crate::error::ReplayError;
use crate::util::format::si_prefix;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tracing::{info, warn};

/// Load the dataset at `path` into a [`LineBuffer`]
///
/// With `real_rate` set, lines are timestamped and sorted, and a buffer with
/// no timestamped line at all is rejected.
pub fn load(path: &Path, real_rate: bool) -> Result<LineBuffer> {
    // Keep the extraction directory alive until the file has been read
    let (_scratch, source) = resolve_source(path)?;

    let contents = fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    let buffer = if real_rate {
        let parse_start = Instant::now();
        let buffer = LineBuffer::with_timestamps(contents.lines());
        info!(
            "realrate: dates parsed in {:.3} s",
            parse_start.elapsed().as_secs_f64()
        );

        let timestamped = buffer.timestamped_count();
        if timestamped == 0 {
            return Err(ReplayError::NoTimestampedLines(path.display().to_string()).into());
        }
        if timestamped < buffer.len() {
            info!(
                "realrate: {} of {} lines have no parseable timestamp",
                buffer.len() - timestamped,
                buffer.len()
            );
        }
        buffer
    } else {
        LineBuffer::from_lines(contents.lines())
    };

    let len_bytes = buffer.byte_len();
    info!(
        "Read {} lines ({} B ≈ {})",
        buffer.len(),
        len_bytes,
        si_prefix(len_bytes as f64, "B")
    );

    Ok(buffer)
}

/// Work out which file to read
///
/// Returns the scratch directory (if an archive was extracted) together with
/// the path of the file to read.
fn resolve_source(path: &Path) -> Result<(Option<TempDir>, PathBuf)> {
    let Some(kind) = ArchiveKind::detect(path) else {
        return Ok((None, path.to_path_buf()));
    };

    let scratch = TempDir::new().context("Failed to create extraction directory")?;

    if let Err(e) = kind.unpack(path, scratch.path()) {
        warn!(
            "Could not extract {} as {:?} ({}), reading it as a plain file",
            path.display(),
            kind,
            e
        );
        return Ok((None, path.to_path_buf()));
    }
    info!("Extracted {} ({:?})", path.display(), kind);

    let biggest = largest_file(scratch.path())
        .with_context(|| format!("Failed to scan extracted {}", path.display()))?
        .ok_or_else(|| ReplayError::NoFilesFound(path.display().to_string()))?;

    info!("Reading from {}...", biggest.display());
    Ok((Some(scratch), biggest))
}
