/// Errors surfaced by the scanner.
///
/// Only a bad scan root is fatal for a full walk. Unreadable directories
/// further down are recorded on their [`Entry`](crate::model::Entry) and the
/// walk carries on; [`ScanError::ReadDir`] is returned solely by
/// [`Scanner::load_dir`](crate::scanner::Scanner::load_dir).
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The root path could not be resolved or stat'ed.
    #[error("cannot scan {}: {source}", .path.display())]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The root path exists but is not a directory.
    #[error("cannot scan {}: not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A single-directory lazy load failed.
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The walker pool could not be started.
    #[error("failed to start scanner pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// The background scan ended without delivering its result.
    #[error("scanner thread exited without a result")]
    ScannerGone,
}
