/// Scanner module: orchestrates filesystem scanning.
///
/// Provides three entry points over the same walker:
/// - [`Scanner::scan`]: background scan; the finished [`Tree`] (or a fatal
///   error) arrives exactly once through the returned [`ScanHandle`].
/// - [`Scanner::scan_sync`]: the same walk, blocking the caller.
/// - [`Scanner::load_dir`]: single-level lazy expansion of a directory
///   left unloaded by a depth-limited scan.
///
/// [`Scanner::progress`] can be polled from any thread while a scan runs.
pub mod filter;
pub mod progress;
mod semaphore;
mod walk;

pub use progress::ScanProgress;

use crate::error::ScanError;
use crate::model::{aggregate, Entry, Tree};
use filter::NameFilter;
use progress::ProgressCounters;
use semaphore::Semaphore;
use walk::{build_child, list_dir, Walker};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Stack for walk and aggregation threads. Every directory level nests a
/// few rayon frames; this leaves room for trees nested deeper than any path
/// the OS accepts (PATH_MAX 4096 allows roughly 2048 levels).
const WALK_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerOptions {
    /// Maximum simultaneous directory listings. 0 = twice the number of CPUs.
    pub workers: usize,

    /// Directories at this depth are left unloaded. 0 = unlimited.
    pub max_depth: usize,

    /// Names to skip, compared case-insensitively and as globs.
    /// Empty = [`filter::DEFAULT_IGNORE_PATTERNS`].
    pub ignore_patterns: Vec<String>,

    /// Include dotfiles and dot-directories.
    pub show_hidden: bool,
}

/// Cooperative cancellation signal shared between a caller and a walk.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the walk to stop as soon as possible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A configured scanner. Cheap to clone; clones share the progress counters.
#[derive(Clone)]
pub struct Scanner {
    shared: Arc<Shared>,
}

struct Shared {
    workers: usize,
    max_depth: usize,
    filter: NameFilter,
    counters: ProgressCounters,
}

/// Handle to a background scan.
///
/// Single consumer: the result is handed out once, by whichever of
/// [`try_result`](Self::try_result), [`wait_timeout`](Self::wait_timeout) or
/// [`wait`](Self::wait) sees it first. Dropping the handle abandons the
/// result; call [`cancel`](Self::cancel) first to stop the walk early.
pub struct ScanHandle {
    result_rx: Receiver<Result<Tree, ScanError>>,
    cancel_flag: CancelFlag,
    delivered: bool,
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop. The partial tree is still delivered.
    pub fn cancel(&self) {
        self.cancel_flag.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.is_cancelled()
    }

    /// Non-blocking poll. `None` while the scan is running and after the
    /// result has been taken.
    pub fn try_result(&mut self) -> Option<Result<Tree, ScanError>> {
        if self.delivered {
            return None;
        }
        match self.result_rx.try_recv() {
            Ok(result) => Some(self.deliver(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(self.deliver(Err(ScanError::ScannerGone))),
        }
    }

    /// Block for at most `timeout`.
    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<Result<Tree, ScanError>> {
        if self.delivered {
            return None;
        }
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(self.deliver(result)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                Some(self.deliver(Err(ScanError::ScannerGone)))
            }
        }
    }

    /// Block until the scan finishes.
    pub fn wait(mut self) -> Result<Tree, ScanError> {
        if self.delivered {
            return Err(ScanError::ScannerGone);
        }
        let result = self
            .result_rx
            .recv()
            .unwrap_or(Err(ScanError::ScannerGone));
        self.deliver(result)
    }

    fn deliver(&mut self, result: Result<Tree, ScanError>) -> Result<Tree, ScanError> {
        self.delivered = true;
        result
    }
}

impl Scanner {
    pub fn new(options: ScannerOptions) -> Self {
        let workers = if options.workers == 0 {
            num_cpus::get() * 2
        } else {
            options.workers
        };

        Self {
            shared: Arc::new(Shared {
                workers,
                max_depth: options.max_depth,
                filter: NameFilter::new(&options.ignore_patterns, options.show_hidden),
                counters: ProgressCounters::default(),
            }),
        }
    }

    /// Current counters of the running (or last) scan.
    pub fn progress(&self) -> ScanProgress {
        self.shared.counters.snapshot()
    }

    /// Start a scan on a background thread and return immediately.
    ///
    /// Issuing a second `scan` before the first finishes starts an
    /// independent walk; the caller decides which result to keep. Both walks
    /// report into the same progress counters.
    pub fn scan(&self, root: impl Into<PathBuf>) -> ScanHandle {
        let root = root.into();
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let cancel_flag = CancelFlag::new();

        let scanner = self.clone();
        let cancel = cancel_flag.clone();
        let spawned = thread::Builder::new()
            .name("fsnview-scanner".into())
            .spawn(move || {
                let result = scanner.scan_sync(&root, &cancel);
                let _ = result_tx.send(result);
            });

        // A failed spawn drops the sender; the handle then reports
        // `ScannerGone`.
        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("Failed to spawn scanner thread: {err}");
                None
            }
        };

        ScanHandle {
            result_rx,
            cancel_flag,
            delivered: false,
            _thread: thread,
        }
    }

    /// Walk `root` and aggregate the result, blocking the caller.
    ///
    /// Only a root that cannot be resolved, stat'ed, or is not a directory
    /// is an error. Cancellation returns whatever was built so far.
    pub fn scan_sync(&self, root: impl AsRef<Path>, cancel: &CancelFlag) -> Result<Tree, ScanError> {
        let start = Instant::now();
        let shared = &*self.shared;
        shared.counters.reset();

        let root = root.as_ref();
        let root_path = std::path::absolute(root).map_err(|source| ScanError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;
        let meta = fs::metadata(&root_path).map_err(|source| ScanError::InvalidRoot {
            path: root_path.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory(root_path));
        }

        info!("Starting scan of {}", root_path.display());

        let mut root_entry = Entry::new_dir(root_display_name(&root_path), root_path.clone(), 0);
        root_entry.modified = meta.modified().ok();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .thread_name(|i| format!("fsnview-walk-{i}"))
            .stack_size(WALK_STACK_SIZE)
            .build()?;

        let walker = Walker {
            filter: &shared.filter,
            counters: &shared.counters,
            semaphore: Semaphore::new(shared.workers),
            cancel,
            max_depth: shared.max_depth,
        };
        pool.install(|| walker.walk_dir(&mut root_entry));

        debug!(
            "Walk of {} finished in {:?}. Running aggregation...",
            root_path.display(),
            start.elapsed()
        );

        // Aggregation recurses once per level too, so it runs on the same
        // large stacks as the walk.
        let tree = pool.install(|| aggregate(root_entry));

        if cancel.is_cancelled() {
            info!(
                "Scan of {} cancelled after {:?}; keeping partial tree ({} files)",
                root_path.display(),
                start.elapsed(),
                tree.file_count
            );
        } else {
            info!(
                "Scan complete: {} files, {} dirs, {} bytes, {} errors in {:?}",
                tree.file_count,
                tree.dir_count,
                tree.total_size,
                tree.errors.len(),
                start.elapsed()
            );
        }

        Ok(tree)
    }

    /// List one directory's immediate children on demand.
    ///
    /// No-op for non-directories and directories that are already loaded.
    /// Children are sorted largest-first and the directory's own size becomes
    /// the sum of its immediate children. Ancestors keep the sizes computed
    /// by the full scan, so they drift from the true sum after a lazy load.
    ///
    /// On failure the error is recorded on the entry, which is still marked
    /// loaded (with no children) so it is not retried on every expand.
    /// Directories the full walk could not read stay unloaded, so this is
    /// their retry; success clears the earlier error.
    pub fn load_dir(&self, entry: &mut Entry) -> Result<(), ScanError> {
        if !entry.is_dir() || entry.loaded {
            return Ok(());
        }

        let listing = match list_dir(&entry.path) {
            Ok(listing) => listing,
            Err(source) => {
                warn!("Cannot load {}: {source}", entry.path.display());
                entry.error = Some(source.to_string());
                entry.children.clear();
                entry.loaded = true;
                return Err(ScanError::ReadDir {
                    path: entry.path.clone(),
                    source,
                });
            }
        };

        let depth = entry.depth + 1;
        let mut children: Vec<Entry> = listing
            .iter()
            .filter_map(|dir_entry| {
                let name = dir_entry.file_name();
                let name = name.to_string_lossy();
                if self.shared.filter.should_skip(&name) {
                    None
                } else {
                    Some(build_child(dir_entry, &name, depth))
                }
            })
            .collect();

        children.sort_by(|a, b| b.size.cmp(&a.size));

        entry.size = children.iter().fold(0u64, |acc, c| acc.saturating_add(c.size));
        entry.children = children;
        entry.error = None;
        entry.loaded = true;

        debug!(
            "Lazy-loaded {} ({} entries, {} bytes)",
            entry.path.display(),
            entry.children.len(),
            entry.size
        );
        Ok(())
    }
}

/// Display name for the scan root: its last component, or the whole path
/// for filesystem roots such as `/` or `C:\`.
fn root_display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workers_scale_with_cpus() {
        let scanner = Scanner::new(ScannerOptions::default());
        assert_eq!(scanner.shared.workers, num_cpus::get() * 2);

        let scanner = Scanner::new(ScannerOptions {
            workers: 3,
            ..Default::default()
        });
        assert_eq!(scanner.shared.workers, 3);
    }

    #[test]
    fn test_root_display_name() {
        assert_eq!(root_display_name(Path::new("/home/user/projects")), "projects");
        assert_eq!(root_display_name(Path::new("/")), "/");
    }

    #[test]
    fn test_cancel_flag_shared_between_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_load_dir_ignores_files_and_loaded_dirs() {
        let scanner = Scanner::new(ScannerOptions::default());

        let mut file = Entry::new_file("f", PathBuf::from("/nonexistent-fsnview/f"), 5, 1);
        assert!(scanner.load_dir(&mut file).is_ok());
        assert!(!file.loaded);

        let mut dir = Entry::new_dir("d", PathBuf::from("/nonexistent-fsnview/d"), 1);
        dir.loaded = true;
        assert!(scanner.load_dir(&mut dir).is_ok());
        assert!(dir.error.is_none());
    }

    #[test]
    fn test_load_dir_failure_marks_loaded() {
        let scanner = Scanner::new(ScannerOptions::default());
        let mut dir = Entry::new_dir("gone", PathBuf::from("/nonexistent-fsnview/gone"), 1);

        let err = scanner.load_dir(&mut dir).unwrap_err();
        assert!(matches!(err, ScanError::ReadDir { .. }));
        assert!(dir.loaded);
        assert!(dir.children.is_empty());
        assert!(dir.error.is_some());
    }

    #[test]
    fn test_walk_failure_is_retried_by_load_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("later");
        let mut dir = Entry::new_dir("later", path.clone(), 1);

        let filter = NameFilter::new(&[], false);
        let counters = ProgressCounters::default();
        let cancel = CancelFlag::new();
        let walker = Walker {
            filter: &filter,
            counters: &counters,
            semaphore: Semaphore::new(1),
            cancel: &cancel,
            max_depth: 0,
        };
        walker.walk_dir(&mut dir);
        assert!(dir.error.is_some());
        assert!(!dir.loaded);
        assert!(dir.children.is_empty());
        assert_eq!(counters.snapshot().dirs_scanned, 1);

        fs::create_dir(&path).unwrap();
        fs::write(path.join("x.bin"), [0u8; 12]).unwrap();
        let scanner = Scanner::new(ScannerOptions::default());
        scanner.load_dir(&mut dir).unwrap();
        assert!(dir.loaded);
        assert!(dir.error.is_none());
        assert_eq!(dir.children.len(), 1);
        assert_eq!(dir.size, 12);
    }

    #[test]
    fn test_options_deserialise_with_defaults() {
        let opts: ScannerOptions = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.workers, 0);
        assert!(opts.ignore_patterns.is_empty());
        assert!(!opts.show_hidden);
    }
}
