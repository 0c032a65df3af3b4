/// Scan result container and the bottom-up aggregation pass.
///
/// The scanner hands over a raw entry forest whose directory sizes are still
/// zero and whose children are in discovery order. [`aggregate`] walks it
/// once, children before parents, and fixes up sizes, ordering, and the
/// global statistics.
use super::entry::Entry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// A read failure recorded somewhere in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryError {
    pub path: PathBuf,
    pub message: String,
}

/// The complete result of one full scan.
#[derive(Debug, Clone)]
pub struct Tree {
    pub root: Entry,

    /// When aggregation finished.
    pub scanned_at: DateTime<Utc>,

    /// Equal to `root.size` at aggregation time. Later lazy loads may change
    /// sizes inside the tree without updating this value.
    pub total_size: u64,

    /// Every non-directory entry reachable from the root.
    pub file_count: u64,

    /// Every directory reachable from the root, the root included.
    pub dir_count: u64,

    /// Largest `depth` of any entry.
    pub max_depth: usize,

    /// Per-entry read failures in walk order.
    pub errors: Vec<EntryError>,
}

/// Compute sizes, ordering, and statistics for a freshly scanned root.
///
/// For every directory: aggregate its children first, set its size to
/// their sum, and sort them largest-first. The sort is stable, so entries
/// of equal size keep their discovery order.
pub fn aggregate(mut root: Entry) -> Tree {
    let mut totals = Totals::default();
    totals.visit(&mut root);

    Tree {
        total_size: root.size,
        root,
        scanned_at: Utc::now(),
        file_count: totals.file_count,
        dir_count: totals.dir_count,
        max_depth: totals.max_depth,
        errors: totals.errors,
    }
}

/// Running counters for one aggregation pass.
#[derive(Default)]
struct Totals {
    file_count: u64,
    dir_count: u64,
    max_depth: usize,
    errors: Vec<EntryError>,
}

impl Totals {
    fn visit(&mut self, entry: &mut Entry) {
        if entry.is_dir() {
            self.dir_count += 1;
            let mut total: u64 = 0;
            for child in entry.children.iter_mut() {
                self.visit(child);
                total = total.saturating_add(child.size);
            }
            entry.size = total;
            // `sort_by` is stable: ties keep discovery order.
            entry.children.sort_by(|a, b| b.size.cmp(&a.size));
        } else {
            self.file_count += 1;
        }

        self.max_depth = self.max_depth.max(entry.depth);

        if let Some(message) = &entry.error {
            self.errors.push(EntryError {
                path: entry.path.clone(),
                message: message.clone(),
            });
        }
    }
}
