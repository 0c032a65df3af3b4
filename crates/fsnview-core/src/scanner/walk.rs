/// Recursive directory walker: one logical task per directory.
///
/// Each directory is listed under a semaphore permit; the permit is dropped
/// as soon as the listing returns, then the child directories are walked in
/// parallel with rayon's fork-join. Task count therefore grows with the
/// number of directories while raw `read_dir` concurrency stays bounded.
///
/// Entries are built outside the permit: per-entry `stat` calls do not
/// hold a listing slot.
use super::filter::NameFilter;
use super::progress::ProgressCounters;
use super::semaphore::Semaphore;
use super::CancelFlag;
use crate::model::{Entry, EntryKind};
use rayon::prelude::*;
use std::fs::{self, DirEntry};
use std::io;
use std::path::Path;
use tracing::warn;

pub(crate) struct Walker<'a> {
    pub(crate) filter: &'a NameFilter,
    pub(crate) counters: &'a ProgressCounters,
    pub(crate) semaphore: Semaphore,
    pub(crate) cancel: &'a CancelFlag,
    /// 0 = unlimited.
    pub(crate) max_depth: usize,
}

impl Walker<'_> {
    /// Populate `dir` and everything below it.
    ///
    /// Returns early, leaving `dir` unloaded, when the depth limit is hit or
    /// cancellation is seen. An unreadable directory keeps its error message
    /// and also stays unloaded, with no children.
    pub(crate) fn walk_dir(&self, dir: &mut Entry) {
        if self.max_depth > 0 && dir.depth >= self.max_depth {
            return;
        }
        if self.cancel.is_cancelled() {
            return;
        }

        let listing = {
            let _permit = self.semaphore.acquire();
            list_dir(&dir.path)
        };
        self.counters.dir_scanned();

        let listing = match listing {
            Ok(listing) => listing,
            Err(err) => {
                warn!("Cannot read {}: {err}", dir.path.display());
                // Left unloaded so a later lazy load can retry.
                dir.error = Some(err.to_string());
                return;
            }
        };

        let mut children = Vec::with_capacity(listing.len());
        for dir_entry in &listing {
            if self.cancel.is_cancelled() {
                return;
            }

            let name = dir_entry.file_name();
            let name = name.to_string_lossy();
            if self.filter.should_skip(&name) {
                continue;
            }

            let child = build_child(dir_entry, &name, dir.depth + 1);
            if !child.is_dir() {
                let bytes = if child.kind == EntryKind::File { child.size } else { 0 };
                self.counters.file_found(bytes);
            }
            children.push(child);
        }

        children
            .par_iter_mut()
            .filter(|child| child.is_dir())
            .for_each(|child| self.walk_dir(child));

        dir.children = children;
        dir.loaded = true;
    }
}

/// Read a directory's raw listing in one go.
pub(crate) fn list_dir(path: &Path) -> io::Result<Vec<DirEntry>> {
    fs::read_dir(path)?.collect()
}

/// Classify one listing entry and fill in what its metadata tells us.
///
/// Symlinks report their target's size and timestamp; a broken link falls
/// back to the link's own timestamp and size zero. Directories are returned
/// unloaded. Metadata failures leave size and timestamp empty rather than
/// failing the scan.
pub(crate) fn build_child(dir_entry: &DirEntry, name: &str, depth: usize) -> Entry {
    let path = dir_entry.path();
    let file_type = dir_entry.file_type();

    let kind = match &file_type {
        Ok(ft) if ft.is_symlink() => EntryKind::Symlink,
        Ok(ft) if ft.is_dir() => EntryKind::Directory,
        Ok(ft) if ft.is_file() => EntryKind::File,
        _ => EntryKind::Other,
    };

    let mut child = Entry::new(name, path, kind, depth);

    match kind {
        EntryKind::Symlink => match fs::metadata(&child.path) {
            Ok(target) => {
                child.size = target.len();
                child.modified = target.modified().ok();
            }
            Err(_) => {
                child.modified = fs::symlink_metadata(&child.path)
                    .and_then(|meta| meta.modified())
                    .ok();
            }
        },
        EntryKind::File => {
            if let Ok(meta) = dir_entry.metadata() {
                child.size = meta.len();
                child.modified = meta.modified().ok();
            }
        }
        EntryKind::Directory | EntryKind::Other => {
            child.modified = dir_entry.metadata().and_then(|meta| meta.modified()).ok();
        }
    }

    child
}
