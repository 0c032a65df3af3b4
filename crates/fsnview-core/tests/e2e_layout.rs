/// Scan a real directory, then lay it out in both modes.
use fsnview_core::layout::{compute_entry, squarify, Rect2D};
use fsnview_core::{compute, CancelFlag, LayoutNode, LayoutOptions, Mode, Scanner, ScannerOptions};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn scan(root: &Path) -> fsnview_core::Tree {
    Scanner::new(ScannerOptions::default())
        .scan_sync(root, &CancelFlag::new())
        .unwrap()
}

/// `root/a/a/.../a/leaf.bin`, `levels` directories below `root`. Returns
/// the deepest directory.
fn build_deep_chain(root: &Path, levels: usize) -> PathBuf {
    let mut dir = root.to_path_buf();
    for _ in 0..levels {
        dir.push("a");
        fs::create_dir(&dir).unwrap();
    }
    write_bytes(&dir.join("leaf.bin"), 64);
    dir
}

/// Undo [`build_deep_chain`] one level at a time, so cleanup never holds
/// more than one directory open.
fn remove_deep_chain(root: &Path, mut dir: PathBuf) {
    fs::remove_file(dir.join("leaf.bin")).unwrap();
    while dir != root {
        fs::remove_dir(&dir).unwrap();
        dir.pop();
    }
}

fn find<'n, 'a>(node: &'n LayoutNode<'a>, name: &str) -> Option<&'n LayoutNode<'a>> {
    if node.entry.name == name {
        return Some(node);
    }
    node.children.iter().find_map(|c| find(c, name))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn file_sizes_map_to_proportional_areas() {
    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("one.bin"), 1000);
    write_bytes(&tmp.path().join("two.bin"), 2000);

    let tree = scan(tmp.path());
    let weights: Vec<u64> = tree.root.children.iter().map(|c| c.size).collect();
    let rects = squarify(&weights, Rect2D::new(0.0, 0.0, 10.0, 10.0));

    let ratio = rects[0].area() / rects[1].area();
    assert!((ratio - 2.0).abs() < 0.01, "area ratio {ratio}");
}

#[test]
fn both_modes_place_every_visible_entry() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("src/nested")).unwrap();
    write_bytes(&root.join("src/lib.rs"), 3000);
    write_bytes(&root.join("src/nested/mod.rs"), 1500);
    write_bytes(&root.join("README"), 200);

    let tree = scan(root);
    let entries = (tree.file_count + tree.dir_count) as usize;

    for mode in [Mode::MapV, Mode::TreeV] {
        let layout = compute(Some(&tree), &LayoutOptions::for_mode(mode)).unwrap();
        assert_eq!(layout.node_count(), entries, "{mode}");
        assert!(std::ptr::eq(layout.entry, &tree.root));

        for placed in layout.flatten() {
            assert!(placed.size.x > 0.0 && placed.size.y > 0.0 && placed.size.z > 0.0);
            assert!(placed.position.x.is_finite() && placed.position.z.is_finite());
        }
    }
}

#[test]
fn treev_files_stand_on_their_pedestal() {
    let tmp = TempDir::new().unwrap();
    for i in 0..6 {
        write_bytes(&tmp.path().join(format!("f{i}")), 100 * (i + 1));
    }

    let tree = scan(tmp.path());
    let layout = compute(Some(&tree), &LayoutOptions::for_mode(Mode::TreeV)).unwrap();

    assert_eq!(layout.children.len(), 6);
    for file in &layout.children {
        assert!(file.position.y - file.size.y / 2.0 >= layout.top() - 1e-4);
    }
}

#[test]
fn collapsed_directories_show_no_content() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("big")).unwrap();
    fs::create_dir_all(root.join("small")).unwrap();
    for i in 0..20 {
        write_bytes(&root.join(format!("big/{i}.dat")), 4096);
    }
    write_bytes(&root.join("small/only.dat"), 10);

    let tree = scan(root);
    for mode in [Mode::MapV, Mode::TreeV] {
        let options = LayoutOptions {
            expanded_paths: Some(HashSet::from([tree.root.path.clone()])),
            ..LayoutOptions::for_mode(mode)
        };
        let layout = compute(Some(&tree), &options).unwrap();

        let big = find(&layout, "big").unwrap();
        let small = find(&layout, "small").unwrap();
        assert!(big.children.is_empty(), "{mode}");
        assert!(small.children.is_empty(), "{mode}");
        if mode == Mode::TreeV {
            assert_eq!(big.size, small.size);
        }
    }
}

#[test]
fn subtree_layout_after_lazy_load() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    write_bytes(&root.join("a/b/c/deep.bin"), 500);
    write_bytes(&root.join("a/b/mid.bin"), 300);

    let scanner = Scanner::new(ScannerOptions {
        max_depth: 2,
        ..Default::default()
    });
    let mut tree = scanner.scan_sync(root, &CancelFlag::new()).unwrap();

    let b_path = tree.root.path.join("a/b");
    let b = tree.root.find_mut(&b_path).unwrap();
    assert!(!b.loaded);
    scanner.load_dir(b).unwrap();

    let b = tree.root.find(&b_path).unwrap();
    let layout = compute_entry(b, &LayoutOptions::default());
    // c (unloaded) and mid.bin.
    assert_eq!(layout.children.len(), 2);
    assert!(find(&layout, "mid.bin").is_some());
    assert!(find(&layout, "deep.bin").is_none());
}

#[cfg(target_os = "linux")]
#[test]
fn deep_nesting_scans_and_lays_out() {
    const LEVELS: usize = 1500;
    let tmp = TempDir::new().unwrap();
    let deepest = build_deep_chain(tmp.path(), LEVELS);

    let tree = scan(tmp.path());
    assert!(tree.errors.is_empty());
    assert_eq!(tree.file_count, 1);
    assert_eq!(tree.dir_count, LEVELS as u64 + 1);
    assert_eq!(tree.max_depth, LEVELS + 1);
    assert_eq!(tree.total_size, 64);

    let leaf = tree.root.find(&deepest.join("leaf.bin")).unwrap();
    assert_eq!(leaf.depth, LEVELS + 1);

    for mode in [Mode::MapV, Mode::TreeV] {
        let layout = compute(Some(&tree), &LayoutOptions::for_mode(mode)).unwrap();
        assert_eq!(layout.node_count(), LEVELS + 2, "{mode}");

        let boxes = layout.flatten();
        assert_eq!(boxes.len(), LEVELS + 2, "{mode}");
        let depths_in_order = boxes.iter().enumerate().all(|(i, b)| b.depth == i);
        assert!(depths_in_order, "{mode}: chain flattened out of order");
        assert_eq!(boxes[LEVELS + 1].name, "leaf.bin");
    }

    remove_deep_chain(tmp.path(), deepest);
}
