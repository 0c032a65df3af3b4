/// On-demand detail for a single entry.
///
/// Not part of the scan pipeline: an inspection panel calls
/// [`Entry::inspect`] when the user asks about one node, which costs one
/// fresh `lstat` plus a walk of the already-scanned subtree.
use super::entry::Entry;
use serde::Serialize;
use std::fs::Metadata;
use std::time::SystemTime;

/// Snapshot of an entry's metadata for display.
#[derive(Debug, Clone, Serialize)]
pub struct InspectInfo {
    pub name: String,
    pub path: String,
    pub kind: &'static str,
    /// Extension with leading dot. Empty for directories.
    pub extension: String,
    pub size: u64,
    /// `ls`-style permission string, e.g. `-rwxr-xr-x`. Empty if the entry
    /// could not be stat'ed.
    pub permissions: String,
    #[serde(skip)]
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    /// Recursive file count. Zero unless the directory is loaded.
    pub file_count: u64,
    /// Recursive directory count, excluding the entry itself. Zero unless the
    /// directory is loaded.
    pub dir_count: u64,
    /// Direct children currently known.
    pub child_count: usize,
    pub loaded: bool,
}

impl Entry {
    /// Gather detailed information about this entry.
    pub fn inspect(&self) -> InspectInfo {
        let permissions = std::fs::symlink_metadata(&self.path)
            .map(|meta| permission_string(&meta))
            .unwrap_or_default();

        let mut info = InspectInfo {
            name: self.name.to_string(),
            path: self.path.to_string_lossy().into_owned(),
            kind: self.kind.label(),
            extension: String::new(),
            size: self.size,
            permissions,
            modified: self.modified,
            is_dir: self.is_dir(),
            file_count: 0,
            dir_count: 0,
            child_count: 0,
            loaded: self.loaded,
        };

        if self.is_dir() {
            info.child_count = self.children.len();
            if self.loaded {
                info.file_count = self.file_count();
                info.dir_count = self.dir_count() - 1;
            }
        } else {
            info.extension = self.extension();
        }

        info
    }
}

#[cfg(unix)]
fn permission_string(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format_mode(meta.permissions().mode())
}

#[cfg(not(unix))]
fn permission_string(meta: &Metadata) -> String {
    if meta.permissions().readonly() {
        format_mode(0o444)
    } else {
        format_mode(0o666)
    }
}

/// Render the low nine permission bits as `-rwxrwxrwx`.
///
/// The leading slot is always `-`; the entry kind is reported separately.
fn format_mode(mode: u32) -> String {
    const FLAGS: [char; 3] = ['r', 'w', 'x'];
    let mut out = String::with_capacity(10);
    out.push('-');
    for bit in (0..9).rev() {
        if mode & (1 << bit) != 0 {
            out.push(FLAGS[2 - bit % 3]);
        } else {
            out.push('-');
        }
    }
    out
}
