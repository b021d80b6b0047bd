//! Domain errors
//!
//! Application code mostly works with `anyhow::Result`; these are the failures
//! callers may want to match on.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    /// Command line combination that cannot be served
    #[error("{0}")]
    Usage(String),

    /// Archive extracted fine but held no regular file
    #[error("No files found in {0}")]
    NoFilesFound(String),

    /// Real-rate replay needs at least one line with a leading timestamp
    #[error("no timestamped lines found in {0}")]
    NoTimestampedLines(String),

    /// Gamma parameters must both be strictly positive and finite
    #[error("invalid {name} distribution: mean={mean}, stdev={stdev} (both must be > 0)")]
    InvalidDistribution {
        name: &'static str,
        mean: f64,
        stdev: f64,
    },

    /// Request head we could not make sense of
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ReplayError {
    /// True when the error means the peer went away mid-stream
    pub fn is_disconnect(&self) -> bool {
        match self {
            ReplayError::Io(e) => is_disconnect(e),
            _ => false,
        }
    }
}

/// Classify an IO error as a client disconnect
pub fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_kinds() {
        assert!(is_disconnect(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(is_disconnect(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_disconnect(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }

    #[test]
    fn test_replay_error_disconnect() {
        let err = ReplayError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(err.is_disconnect());
        assert!(!ReplayError::NoFilesFound("x".into()).is_disconnect());
    }

    #[test]
    fn test_no_files_message() {
        let err = ReplayError::NoFilesFound("data.tar.gz".into());
        assert_eq!(err.to_string(), "No files found in data.tar.gz");
    }
}
