/// Layout engine: turns an aggregated tree into positioned 3D boxes.
///
/// Two interchangeable algorithms sit behind [`compute`]:
/// - [`Mode::MapV`]: squarified treemap, each box extruded by size and
///   nested content stacked on top of its parent.
/// - [`Mode::TreeV`]: pedestal tree: directories are ground-level pedestals
///   with their files gridded on top and child directories in a row behind.
///
/// Layout is synchronous and stateless: no I/O, no caching between calls.
/// Every call builds a fresh [`LayoutNode`] tree that borrows the entries it
/// describes.
pub mod export;
pub mod pedestal;
pub mod treemap;

pub use export::PlacedBox;
pub use treemap::{squarify, Rect2D};

use crate::color::{Palette, Rgba};
use crate::model::{Entry, Tree};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which layout algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Squarified treemap with 3D extrusion.
    #[default]
    MapV,
    /// Hierarchical pedestal tree.
    TreeV,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MapV => "MapV",
            Self::TreeV => "TreeV",
        })
    }
}

/// Layout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub mode: Mode,

    /// Deepest level laid out. 0 = unlimited.
    pub max_depth: usize,

    /// Gap between sibling boxes as a fraction of the parent rectangle.
    pub padding_ratio: f32,

    /// Multiplier for the size-to-height mapping.
    pub height_scale: f32,

    pub min_height: f32,

    pub max_height: f32,

    /// Directories whose content is shown. `None` shows every directory.
    /// Owned by the caller's interaction state; not persisted.
    #[serde(skip)]
    pub expanded_paths: Option<HashSet<PathBuf>>,

    pub palette: Palette,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::for_mode(Mode::default())
    }
}

impl LayoutOptions {
    /// Defaults for the given algorithm.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            max_depth: 0,
            padding_ratio: 0.02,
            height_scale: 1.0,
            min_height: 0.1,
            max_height: 20.0,
            expanded_paths: None,
            palette: Palette::default(),
        }
    }

    /// `true` if the directory at `path` should show its content.
    #[inline]
    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded_paths
            .as_ref()
            .map_or(true, |expanded| expanded.contains(path))
    }

    #[inline]
    fn within_depth(&self, depth: usize) -> bool {
        self.max_depth == 0 || depth <= self.max_depth
    }
}

/// Centre or extent in scene units. Y is up; the ground plane is XZ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A positioned box for one entry.
#[derive(Debug, Clone)]
pub struct LayoutNode<'a> {
    pub entry: &'a Entry,
    /// Centre of the box.
    pub position: Vec3,
    /// Width (X), height (Y), depth (Z).
    pub size: Vec3,
    pub color: Rgba,
    pub children: Vec<LayoutNode<'a>>,
    pub depth: usize,
}

impl<'a> LayoutNode<'a> {
    /// Box with no children.
    pub(crate) fn leaf(entry: &'a Entry, position: Vec3, size: Vec3, color: Rgba, depth: usize) -> Self {
        Self {
            entry,
            position,
            size,
            color,
            children: Vec::new(),
            depth,
        }
    }

    /// Y coordinate of the box's top face.
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y + self.size.y / 2.0
    }

    /// Number of boxes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Boxes collected in pre-order with parent links, then linked into a tree
/// in one backward sweep. Lets both layouts walk arbitrarily deep trees with
/// an explicit work stack instead of recursion.
///
/// Index 0 is the root. A node must be pushed after its parent, and
/// siblings in the order they should appear.
pub(crate) struct NodeArena<'a> {
    root: LayoutNode<'a>,
    /// Every non-root node, at `index - 1`.
    nodes: Vec<Option<LayoutNode<'a>>>,
    parents: Vec<usize>,
}

impl<'a> NodeArena<'a> {
    pub(crate) fn new(root: LayoutNode<'a>) -> Self {
        Self {
            root,
            nodes: Vec::new(),
            parents: Vec::new(),
        }
    }

    /// Add a node under `parent` and return its index.
    pub(crate) fn push(&mut self, node: LayoutNode<'a>, parent: usize) -> usize {
        self.nodes.push(Some(node));
        self.parents.push(parent);
        self.nodes.len()
    }

    /// Move every node into its parent's `children`.
    pub(crate) fn assemble(mut self) -> LayoutNode<'a> {
        // Children always have larger indices than their parent, so a node
        // is complete by the time the sweep reaches it. Siblings arrive
        // last-first and are reversed once their parent is complete.
        for slot in (0..self.nodes.len()).rev() {
            let Some(mut node) = self.nodes[slot].take() else {
                continue;
            };
            node.children.reverse();
            match self.parents[slot] {
                0 => self.root.children.push(node),
                parent => {
                    if let Some(Some(parent)) = self.nodes.get_mut(parent - 1) {
                        parent.children.push(node);
                    }
                }
            }
        }
        self.root.children.reverse();
        self.root
    }
}

/// Lay out a scanned tree. `None` in, `None` out.
pub fn compute<'a>(tree: Option<&'a Tree>, options: &LayoutOptions) -> Option<LayoutNode<'a>> {
    tree.map(|tree| compute_entry(&tree.root, options))
}

/// Lay out the subtree under `root`, e.g. after navigating into a directory.
pub fn compute_entry<'a>(root: &'a Entry, options: &LayoutOptions) -> LayoutNode<'a> {
    match options.mode {
        Mode::MapV => treemap::layout(root, options),
        Mode::TreeV => pedestal::layout(root, options),
    }
}

/// Map a byte size to a box height on a log scale:
/// `clamp(log2(KB + 1) × height_scale, min_height, max_height)`.
///
/// Monotonic in `size`; zero maps to `min_height`.
pub fn scale_height(size: u64, options: &LayoutOptions) -> f32 {
    if size == 0 {
        return options.min_height;
    }
    let kb = size as f64 / 1024.0;
    let height = (kb + 1.0).log2() as f32 * options.height_scale;
    // Not `f32::clamp`: a misconfigured min > max must not panic.
    height.max(options.min_height).min(options.max_height)
}

/// Directory colour: the error colour if it could not be read.
pub(crate) fn dir_color(entry: &Entry, palette: &Palette) -> Rgba {
    if entry.error.is_some() {
        palette.error
    } else {
        palette.directory
    }
}
