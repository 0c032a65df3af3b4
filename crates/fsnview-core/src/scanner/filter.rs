/// Name-based entry filtering shared by the full walk and lazy loads.
///
/// A filtered name produces no entry at all: nothing is counted, nothing is
/// recursed into, and nothing contributes to any ancestor's size.
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;

/// Names skipped when no ignore list is configured: VCS metadata,
/// dependency caches, OS bookkeeping, and pseudo-filesystems.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    ".DS_Store",
    "Thumbs.db",
    "$RECYCLE.BIN",
    "System Volume Information",
    "proc",
    "sys",
    "dev",
    ".Trash",
    ".Spotlight-V100",
    ".fseventsd",
    ".DocumentRevisions-V100",
    ".TemporaryItems",
];

/// Compiled ignore list plus the hidden-file rule.
#[derive(Debug)]
pub(crate) struct NameFilter {
    /// Lowercased patterns for the case-insensitive exact comparison.
    exact: Vec<String>,
    globs: GlobSet,
    show_hidden: bool,
}

impl NameFilter {
    /// An empty `patterns` list selects [`DEFAULT_IGNORE_PATTERNS`].
    pub(crate) fn new(patterns: &[String], show_hidden: bool) -> Self {
        let patterns: Vec<String> = if patterns.is_empty() {
            DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect()
        } else {
            patterns.to_vec()
        };

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => warn!("Ignoring invalid ignore pattern {pattern:?}: {err}"),
            }
        }
        let globs = builder.build().unwrap_or_else(|err| {
            warn!("Failed to compile ignore patterns: {err}");
            GlobSet::empty()
        });

        Self {
            exact: patterns.iter().map(|p| p.to_lowercase()).collect(),
            globs,
            show_hidden,
        }
    }

    /// `true` if an entry with this name must not appear in the tree.
    pub(crate) fn should_skip(&self, name: &str) -> bool {
        if !self.show_hidden && name.starts_with('.') {
            return true;
        }
        let lower = name.to_lowercase();
        self.exact.iter().any(|p| *p == lower) || self.globs.is_match(name)
    }
}
