/// Pedestal tree layout (`TreeV`).
///
/// Every directory is a flat pedestal on the ground. Its files stand on top
/// in a near-square grid; its child directories sit in a row further back
/// along −Z, centred under the parent.
///
/// Two passes: [`measure`] computes each subtree's horizontal extent
/// bottom-up into a flat list of [`Bounds`] in directory pre-order, then a
/// [`Placer`] walks entries and bounds together to assign positions. Both
/// passes use explicit work stacks, so tree depth is bounded by memory only.
use super::{dir_color, LayoutNode, LayoutOptions, NodeArena, Vec3};
use crate::color::color_from_size;
use crate::model::{Entry, EntryKind};

const FILE_SIZE: f32 = 0.5;
const FILE_SPACING: f32 = 0.1;
const FILE_HEIGHT: f32 = 0.1;

/// Smallest pedestal side; also the footprint of a collapsed directory.
const DIR_MIN_SIZE: f32 = 0.7;
const DIR_SPACING: f32 = 0.5;
const DIR_HEIGHT: f32 = 0.1;

/// Gap between a pedestal's back edge and its child row.
const DIR_RECESS: f32 = 5.0;

/// Horizontal footprint of a directory subtree.
#[derive(Debug, Clone)]
struct Bounds {
    /// Width along X reserved for this subtree, spacing included.
    extent: f32,
    /// The directory's own pedestal dimensions.
    pedestal: Vec3,
    /// Summed extents of the child row.
    row: f32,
    /// Indices of the laid-out child directories, in child order.
    children: Vec<usize>,
}

/// A child directory whose box has not been built yet.
struct Pending<'a> {
    parent: usize,
    dir: &'a Entry,
    position: Vec3,
    bounds: usize,
}

pub(crate) fn layout<'a>(root: &'a Entry, options: &LayoutOptions) -> LayoutNode<'a> {
    let origin = Vec3::new(0.0, DIR_HEIGHT / 2.0, 0.0);
    if !root.is_dir() {
        return file_box(root, origin, 0, options);
    }

    let bounds = measure(root, options);
    let mut placer = Placer {
        arena: NodeArena::new(dir_box(root, origin, &bounds[0], options)),
        bounds,
        options,
        pending: Vec::new(),
    };
    placer.place_content(root, origin, 0, 0);
    while let Some(next) = placer.pending.pop() {
        let node = dir_box(next.dir, next.position, &placer.bounds[next.bounds], options);
        let index = placer.arena.push(node, next.parent);
        placer.place_content(next.dir, next.position, index, next.bounds);
    }
    placer.arena.assemble()
}

/// Pedestal width and depth for `file_count` files on a near-square grid.
fn pedestal_footprint(file_count: usize) -> (f32, f32) {
    if file_count == 0 {
        return (DIR_MIN_SIZE, DIR_MIN_SIZE);
    }
    let side = grid_side(file_count);
    let rows = file_count.div_ceil(side);
    let span = |cells: usize| cells as f32 * FILE_SIZE + (cells + 1) as f32 * FILE_SPACING;
    (span(side).max(DIR_MIN_SIZE), span(rows).max(DIR_MIN_SIZE))
}

/// Columns in the file grid: `ceil(sqrt(n))`.
fn grid_side(file_count: usize) -> usize {
    ((file_count as f64).sqrt().ceil() as usize).max(1)
}

fn is_last_level(entry: &Entry, options: &LayoutOptions) -> bool {
    options.max_depth > 0 && entry.depth >= options.max_depth
}

/// Footprints for every laid-out directory under `root`, in pre-order.
/// Index 0 is `root`.
fn measure(root: &Entry, options: &LayoutOptions) -> Vec<Bounds> {
    let mut bounds: Vec<Bounds> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut stack: Vec<(&Entry, Option<usize>)> = vec![(root, None)];

    while let Some((dir, parent)) = stack.pop() {
        let index = bounds.len();
        if let Some(parent) = parent {
            bounds[parent].children.push(index);
        }
        parents.push(parent);

        // Collapsed directories keep the minimum footprint whatever they hold.
        let expanded = options.is_expanded(&dir.path);
        let pedestal = if expanded {
            let files = dir.children.iter().filter(|c| !c.is_dir()).count();
            let (width, depth) = pedestal_footprint(files);
            Vec3::new(width, DIR_HEIGHT, depth)
        } else {
            Vec3::new(DIR_MIN_SIZE, DIR_HEIGHT, DIR_MIN_SIZE)
        };
        bounds.push(Bounds {
            extent: 0.0,
            pedestal,
            row: 0.0,
            children: Vec::new(),
        });

        if expanded && !is_last_level(dir, options) {
            let subdirs = dir.children.iter().rev().filter(|c| c.is_dir());
            stack.extend(subdirs.map(|c| (c, Some(index))));
        }
    }

    // Children sit after their parent, so one backward pass sees every row
    // complete before the parent needs it.
    for index in (0..bounds.len()).rev() {
        let extent = bounds[index].pedestal.x.max(bounds[index].row) + DIR_SPACING;
        bounds[index].extent = extent;
        if let Some(parent) = parents[index] {
            bounds[parent].row += extent;
        }
    }
    bounds
}

struct Placer<'a, 'o> {
    arena: NodeArena<'a>,
    bounds: Vec<Bounds>,
    options: &'o LayoutOptions,
    pending: Vec<Pending<'a>>,
}

impl<'a> Placer<'a, '_> {
    /// Place the files on the pedestal of the directory at arena `index` and
    /// queue its child directories.
    fn place_content(&mut self, dir: &'a Entry, position: Vec3, index: usize, bounds: usize) {
        if !self.options.is_expanded(&dir.path) {
            return;
        }
        let pedestal = self.bounds[bounds].pedestal;

        // Files: row-major grid on the pedestal's top face.
        let files: Vec<&Entry> = dir.children.iter().filter(|c| !c.is_dir()).collect();
        if !files.is_empty() {
            let side = grid_side(files.len());
            let pitch = FILE_SIZE + FILE_SPACING;
            let first = FILE_SIZE / 2.0 + FILE_SPACING;
            let start_x = position.x - pedestal.x / 2.0 + first;
            let start_z = position.z - pedestal.z / 2.0 + first;
            let y = position.y + pedestal.y / 2.0 + FILE_HEIGHT / 2.0;
            let largest = files.iter().map(|f| f.size).max().unwrap_or(0);

            for (i, &file) in files.iter().enumerate() {
                let col = (i % side) as f32;
                let row = (i / side) as f32;
                let at = Vec3::new(start_x + col * pitch, y, start_z + row * pitch);
                self.arena.push(file_box(file, at, largest, self.options), index);
            }
        }

        // Directories: one row behind the pedestal, centred on the parent's X.
        let z = position.z - (pedestal.z / 2.0 + DIR_RECESS);
        let mut x = position.x - self.bounds[bounds].row / 2.0;
        let subdirs = dir.children.iter().filter(|c| c.is_dir());
        let mut row = Vec::new();
        for (sub, &sub_bounds) in subdirs.zip(&self.bounds[bounds].children) {
            let extent = self.bounds[sub_bounds].extent;
            row.push(Pending {
                parent: index,
                dir: sub,
                position: Vec3::new(x + extent / 2.0, position.y, z),
                bounds: sub_bounds,
            });
            x += extent;
        }
        self.pending.extend(row.into_iter().rev());
    }
}

fn dir_box<'a>(dir: &'a Entry, position: Vec3, bounds: &Bounds, options: &LayoutOptions) -> LayoutNode<'a> {
    LayoutNode::leaf(
        dir,
        position,
        bounds.pedestal,
        dir_color(dir, &options.palette),
        dir.depth,
    )
}

fn file_box<'a>(file: &'a Entry, position: Vec3, largest: u64, options: &LayoutOptions) -> LayoutNode<'a> {
    let color = if file.kind == EntryKind::Symlink {
        options.palette.symlink
    } else {
        color_from_size(file.size, largest, &options.palette)
    };
    LayoutNode::leaf(
        file,
        position,
        Vec3::new(FILE_SIZE, FILE_HEIGHT, FILE_SIZE),
        color,
        file.depth,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Mode;
    use crate::model::{aggregate, EntryKind};
    use std::collections::HashSet;
    use std::path::PathBuf;

    const EPS: f32 = 1e-4;

    fn options() -> LayoutOptions {
        LayoutOptions::for_mode(Mode::TreeV)
    }

    fn files(parent: &str, count: usize, depth: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| {
                let name = format!("f{i}.dat");
                let path = PathBuf::from(parent).join(&name);
                Entry::new_file(name, path, 100 * (i as u64 + 1), depth)
            })
            .collect()
    }

    fn dir(path: &str, depth: usize, children: Vec<Entry>) -> Entry {
        let path = PathBuf::from(path);
        let name = path.file_name().map_or("/".into(), |n| n.to_string_lossy().into_owned());
        let mut entry = Entry::new_dir(name, path, depth);
        entry.children = children;
        entry.loaded = true;
        entry
    }

    // ── Footprints ──────────────────────────────────────────────────

    #[test]
    fn test_pedestal_footprint() {
        assert_eq!(pedestal_footprint(0), (DIR_MIN_SIZE, DIR_MIN_SIZE));
        // One file: 0.5 + 2 × 0.1 = 0.7.
        let (w, d) = pedestal_footprint(1);
        assert!((w - 0.7).abs() < EPS && (d - 0.7).abs() < EPS);
        // Five files: 3 columns, 2 rows.
        let (w, d) = pedestal_footprint(5);
        assert!((w - 1.9).abs() < EPS, "width {w}");
        assert!((d - 1.3).abs() < EPS, "depth {d}");
    }

    // ── Placement ───────────────────────────────────────────────────

    #[test]
    fn test_single_empty_directory() {
        let tree = aggregate(dir("/r", 0, Vec::new()));
        let root = layout(&tree.root, &options());

        assert_eq!(root.entry.kind, EntryKind::Directory);
        assert!(root.children.is_empty());
        assert!((root.position.y - DIR_HEIGHT / 2.0).abs() < EPS);
        assert!((root.size.x - DIR_MIN_SIZE).abs() < EPS);
    }

    #[test]
    fn test_files_stand_on_pedestal() {
        let tree = aggregate(dir("/r", 0, files("/r", 7, 1)));
        let root = layout(&tree.root, &options());

        assert_eq!(root.children.len(), 7);
        let top = root.top();
        let (min_x, max_x) = (root.position.x - root.size.x / 2.0, root.position.x + root.size.x / 2.0);
        let (min_z, max_z) = (root.position.z - root.size.z / 2.0, root.position.z + root.size.z / 2.0);
        for f in &root.children {
            assert!(f.position.y - f.size.y / 2.0 >= top - EPS);
            assert!(f.position.x - f.size.x / 2.0 >= min_x - EPS);
            assert!(f.position.x + f.size.x / 2.0 <= max_x + EPS);
            assert!(f.position.z - f.size.z / 2.0 >= min_z - EPS);
            assert!(f.position.z + f.size.z / 2.0 <= max_z + EPS);
        }
    }

    #[test]
    fn test_subdirectories_row_behind_parent() {
        let a = dir("/r/a", 1, files("/r/a", 2, 2));
        let b = dir("/r/b", 1, files("/r/b", 1, 2));
        let tree = aggregate(dir("/r", 0, vec![a, b]));
        let root = layout(&tree.root, &options());

        let subs: Vec<_> = root.children.iter().filter(|n| n.entry.is_dir()).collect();
        assert_eq!(subs.len(), 2);
        assert!((subs[0].position.x - subs[1].position.x).abs() > EPS);
        for sub in &subs {
            assert!(sub.position.z < root.position.z - DIR_RECESS);
            assert!((sub.position.y - root.position.y).abs() < EPS);
        }
        // Row is centred on the parent.
        let mid = (subs[0].position.x + subs[1].position.x) / 2.0;
        let left_extent = subs[0].size.x;
        assert!(mid.abs() < left_extent + DIR_SPACING);
    }

    #[test]
    fn test_sibling_subtrees_do_not_overlap() {
        let wide = dir("/r/wide", 1, files("/r/wide", 30, 2));
        let narrow = dir("/r/narrow", 1, files("/r/narrow", 1, 2));
        let tree = aggregate(dir("/r", 0, vec![wide, narrow]));
        let root = layout(&tree.root, &options());

        let subs: Vec<_> = root.children.iter().filter(|n| n.entry.is_dir()).collect();
        let (left, right) = if subs[0].position.x < subs[1].position.x {
            (subs[0], subs[1])
        } else {
            (subs[1], subs[0])
        };
        assert!(left.position.x + left.size.x / 2.0 < right.position.x - right.size.x / 2.0);
    }

    #[test]
    fn test_collapsed_footprint_ignores_content() {
        let small = dir("/r/small", 1, files("/r/small", 1, 2));
        let large = dir("/r/large", 1, files("/r/large", 40, 2));
        let tree = aggregate(dir("/r", 0, vec![small, large]));
        let opts = LayoutOptions {
            expanded_paths: Some(HashSet::from([PathBuf::from("/r")])),
            ..options()
        };
        let root = layout(&tree.root, &opts);

        let subs: Vec<_> = root.children.iter().filter(|n| n.entry.is_dir()).collect();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].size, subs[1].size);
        assert_eq!(subs[0].size, Vec3::new(DIR_MIN_SIZE, DIR_HEIGHT, DIR_MIN_SIZE));
        assert!(subs.iter().all(|s| s.children.is_empty()));
    }

    #[test]
    fn test_max_depth_stops_directory_row() {
        let deep = dir("/r/a/b", 2, files("/r/a/b", 3, 3));
        let a = dir("/r/a", 1, vec![deep]);
        let tree = aggregate(dir("/r", 0, vec![a]));
        let opts = LayoutOptions {
            max_depth: 1,
            ..options()
        };
        let root = layout(&tree.root, &opts);

        let a = &root.children[0];
        assert_eq!(a.entry.name, "a");
        assert!(a.children.is_empty(), "no directories placed beyond max depth");
    }

    #[test]
    fn test_file_colours_follow_sibling_size() {
        let tree = aggregate(dir("/r", 0, files("/r", 3, 1)));
        let opts = options();
        let root = layout(&tree.root, &opts);

        // Largest sibling sits at the red end of the ramp.
        let largest = root.children.iter().max_by_key(|n| n.entry.size).unwrap();
        assert_eq!(largest.color, color_from_size(300, 300, &opts.palette));
    }

    #[test]
    fn test_symlink_uses_symlink_colour() {
        let mut link = Entry::new("link", PathBuf::from("/r/link"), EntryKind::Symlink, 1);
        link.size = 300;
        let tree = aggregate(dir("/r", 0, vec![link, files("/r", 1, 1).remove(0)]));
        let opts = options();
        let root = layout(&tree.root, &opts);

        let link = root.children.iter().find(|n| n.entry.name == "link").unwrap();
        let file = root.children.iter().find(|n| n.entry.name == "f0.dat").unwrap();
        assert_eq!(link.color, opts.palette.symlink);
        assert_ne!(file.color, opts.palette.symlink);
    }

    #[test]
    fn test_deep_chain_keeps_order_and_depth() {
        let deepest = format!("/r{}", "/d".repeat(12));
        let mut current = dir(&deepest, 12, files(&deepest, 2, 13));
        for depth in (1..12).rev() {
            let path = format!("/r{}", "/d".repeat(depth));
            let mut children = files(&path, 1, depth + 1);
            children.push(current);
            current = dir(&path, depth, children);
        }
        let tree = aggregate(dir("/r", 0, vec![current]));
        let root = layout(&tree.root, &options());

        assert_eq!(root.node_count(), 1 + 12 + 11 + 2);
        let mut node = &root;
        let mut level = 0;
        while let Some(sub) = node.children.iter().find(|n| n.entry.is_dir()) {
            // Files come before the directory row.
            assert!(node.children.last().is_some_and(|n| n.entry.is_dir()));
            assert_eq!(sub.depth, level + 1);
            assert!(sub.position.z < node.position.z);
            node = sub;
            level += 1;
        }
        assert_eq!(level, 12);
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_non_directory_root() {
        let lone = Entry::new_file("solo", PathBuf::from("/solo"), 10, 0);
        let node = layout(&lone, &options());
        assert!(node.children.is_empty());
        assert_eq!(node.size, Vec3::new(FILE_SIZE, FILE_HEIGHT, FILE_SIZE));
        assert_eq!(node.color, options().palette.file);
    }
}
