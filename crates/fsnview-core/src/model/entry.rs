/// A single scanned filesystem object.
///
/// Entries form an owned tree: a directory holds its children directly in a
/// `Vec<Entry>`. The scanner is the only writer. Layout and rendering borrow
/// the tree immutably, so the borrow checker keeps a lazy load from racing a
/// reader of the same subtree.
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// What kind of filesystem object an [`Entry`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    /// Lowercase label, as shown in inspection panels.
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One file, directory, symlink, or special node.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Final path component only.
    pub name: CompactString,

    /// Absolute path.
    pub path: PathBuf,

    pub kind: EntryKind,

    /// Logical size in bytes. For directories this is the recursive sum of
    /// everything below, filled in by [`aggregate`](super::aggregate) or by a
    /// lazy load (which only sums the immediate children).
    pub size: u64,

    /// Last-modified timestamp, if the filesystem reported one.
    pub modified: Option<SystemTime>,

    /// Directory contents, largest first. Always empty for non-directories
    /// and for directories that are not yet `loaded`.
    pub children: Vec<Entry>,

    /// Distance from the scan root (root = 0).
    pub depth: usize,

    /// Read failure for this entry, if any. The entry stays in the tree so
    /// the failure is visible where it happened.
    pub error: Option<String>,

    /// `true` once this directory's children have been listed.
    pub loaded: bool,
}

impl Entry {
    /// Create an entry with no size, timestamp, or children.
    pub fn new(name: impl Into<CompactString>, path: PathBuf, kind: EntryKind, depth: usize) -> Self {
        Self {
            name: name.into(),
            path,
            kind,
            size: 0,
            modified: None,
            children: Vec::new(),
            depth,
            error: None,
            loaded: false,
        }
    }

    /// Create an unloaded directory entry.
    pub fn new_dir(name: impl Into<CompactString>, path: PathBuf, depth: usize) -> Self {
        Self::new(name, path, EntryKind::Directory, depth)
    }

    /// Create a regular file entry of the given size.
    pub fn new_file(name: impl Into<CompactString>, path: PathBuf, size: u64, depth: usize) -> Self {
        let mut entry = Self::new(name, path, EntryKind::File, depth);
        entry.size = size;
        entry
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Extension including the leading dot (`".txt"`), or `""`.
    pub fn extension(&self) -> String {
        if self.is_dir() {
            return String::new();
        }
        Path::new(self.name.as_str())
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Number of non-directory entries in this subtree.
    ///
    /// A non-directory counts itself.
    pub fn file_count(&self) -> u64 {
        self.count_where(|entry| !entry.is_dir())
    }

    /// Number of directories in this subtree, including `self`.
    pub fn dir_count(&self) -> u64 {
        self.count_where(Entry::is_dir)
    }

    fn count_where(&self, matches: impl Fn(&Entry) -> bool) -> u64 {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(entry) = stack.pop() {
            if matches(entry) {
                count += 1;
            }
            stack.extend(entry.children.iter());
        }
        count
    }

    /// Find the entry at `path` in this subtree.
    pub fn find(&self, path: &Path) -> Option<&Entry> {
        let mut current = self;
        loop {
            if current.path == path {
                return Some(current);
            }
            if !path.starts_with(&current.path) {
                return None;
            }
            current = current.children.iter().find(|c| path.starts_with(&c.path))?;
        }
    }

    /// Mutable variant of [`find`](Self::find), used to hand a directory to
    /// [`Scanner::load_dir`](crate::scanner::Scanner::load_dir).
    pub fn find_mut(&mut self, path: &Path) -> Option<&mut Entry> {
        let mut current = self;
        loop {
            if current.path == path {
                return Some(current);
            }
            if !path.starts_with(&current.path) {
                return None;
            }
            let index = current.children.iter().position(|c| path.starts_with(&c.path))?;
            current = &mut current.children[index];
        }
    }
}
