/// Scan progress reporting: lock-free counters the walker bumps and any
/// thread may poll while the scan is in flight.
///
/// Counters are not synchronised with tree construction: a snapshot can
/// show totals still moving while the final tree is being aggregated.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub dirs_scanned: u64,
    pub files_found: u64,
    pub bytes_total: u64,
}

/// Per-scanner atomic counters. Reset at the start of every scan.
#[derive(Debug, Default)]
pub(crate) struct ProgressCounters {
    dirs_scanned: AtomicU64,
    files_found: AtomicU64,
    bytes_total: AtomicU64,
}

impl ProgressCounters {
    pub(crate) fn reset(&self) {
        self.dirs_scanned.store(0, Ordering::Relaxed);
        self.files_found.store(0, Ordering::Relaxed);
        self.bytes_total.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn dir_scanned(&self) {
        self.dirs_scanned.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn file_found(&self, bytes: u64) {
        self.files_found.fetch_add(1, Ordering::Relaxed);
        self.bytes_total.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            dirs_scanned: self.dirs_scanned.load(Ordering::Relaxed),
            files_found: self.files_found.load(Ordering::Relaxed),
            bytes_total: self.bytes_total.load(Ordering::Relaxed),
        }
    }
}
