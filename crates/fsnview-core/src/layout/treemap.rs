/// Squarified treemap with height extrusion (`MapV`).
///
/// The root occupies a fixed 30×30 ground square centred on the origin.
/// Each directory's rectangle is shrunk by a padding inset and split among
/// its children with the squarify algorithm (Bruls, Huizing, van Wijk);
/// children are then stacked on top of their parent's box.
use super::{dir_color, scale_height, LayoutNode, LayoutOptions, NodeArena, Vec3};
use crate::color::color_from_age;
use crate::model::{Entry, EntryKind};

/// Side length of the root's ground square.
const GROUND_SIZE: f32 = 30.0;

/// Axis-aligned rectangle on the ground plane. `x`/`y` is the min corner;
/// `y` maps to scene Z.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect2D {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect2D {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    /// Shrink by `inset` on every side, never below zero extent.
    fn inset(&self, inset: f32) -> Self {
        Self {
            x: self.x + inset,
            y: self.y + inset,
            w: (self.w - 2.0 * inset).max(0.0),
            h: (self.h - 2.0 * inset).max(0.0),
        }
    }
}

/// A box waiting to be placed.
struct Slot<'a> {
    entry: &'a Entry,
    rect: Rect2D,
    depth: usize,
    /// Y of the surface the box stands on.
    base_y: f32,
}

pub(crate) fn layout<'a>(root: &'a Entry, options: &LayoutOptions) -> LayoutNode<'a> {
    let half = GROUND_SIZE / 2.0;
    let ground = Rect2D::new(-half, -half, GROUND_SIZE, GROUND_SIZE);
    let (root_node, children) = place(
        Slot {
            entry: root,
            rect: ground,
            depth: 0,
            base_y: 0.0,
        },
        options,
    );

    let mut arena = NodeArena::new(root_node);
    let mut pending: Vec<(usize, Slot<'a>)> =
        children.into_iter().rev().map(|slot| (0, slot)).collect();
    while let Some((parent, slot)) = pending.pop() {
        let (node, children) = place(slot, options);
        let index = arena.push(node, parent);
        pending.extend(children.into_iter().rev().map(|slot| (index, slot)));
    }
    arena.assemble()
}

/// Build the box for `slot` and the slots of its visible children.
fn place<'a>(slot: Slot<'a>, options: &LayoutOptions) -> (LayoutNode<'a>, Vec<Slot<'a>>) {
    let Slot {
        entry,
        rect,
        depth,
        base_y,
    } = slot;

    let expanded = entry.is_dir() && options.is_expanded(&entry.path);
    let height = if entry.is_dir() && !expanded {
        options.min_height
    } else {
        scale_height(entry.size, options)
    };

    let color = match entry.kind {
        EntryKind::Directory => dir_color(entry, &options.palette),
        EntryKind::Symlink => options.palette.symlink,
        EntryKind::File | EntryKind::Other => color_from_age(entry.modified, &options.palette),
    };

    let keep = 1.0 - options.padding_ratio;
    let node = LayoutNode::leaf(
        entry,
        Vec3::new(rect.x + rect.w / 2.0, base_y + height / 2.0, rect.y + rect.h / 2.0),
        Vec3::new(rect.w * keep, height, rect.h * keep),
        color,
        depth,
    );

    if !expanded || entry.children.is_empty() || !options.within_depth(depth + 1) {
        return (node, Vec::new());
    }

    let inner = rect.inset(rect.w * options.padding_ratio);

    // Sized children first so zero-byte entries collect at the end of the
    // last strip. Each half is already largest-first.
    let ordered: Vec<&Entry> = entry
        .children
        .iter()
        .filter(|c| c.size > 0)
        .chain(entry.children.iter().filter(|c| c.size == 0))
        .collect();
    let weights: Vec<u64> = ordered.iter().map(|c| c.size).collect();
    let rects = squarify(&weights, inner);

    let child_base = base_y + height;
    let children = ordered
        .into_iter()
        .zip(rects)
        .map(|(child, child_rect)| Slot {
            entry: child,
            rect: child_rect,
            depth: depth + 1,
            base_y: child_base,
        })
        .collect();
    (node, children)
}

/// Split `rect` into one rectangle per weight, areas proportional to the
/// weights, with aspect ratios kept close to 1.
///
/// Results are returned in input order. Zero weights are floored to 1 so
/// every item still gets a (tiny) rectangle. A degenerate `rect` yields
/// zero-size rectangles at its corner.
pub fn squarify(weights: &[u64], rect: Rect2D) -> Vec<Rect2D> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total: f64 = weights.iter().map(|&w| w.max(1) as f64).sum();
    let total_area = f64::from(rect.w) * f64::from(rect.h);

    // (input index, target area), largest first. Stable for equal weights.
    let mut items: Vec<(usize, f64)> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| (i, w.max(1) as f64 / total * total_area))
        .collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut out = vec![Rect2D::new(rect.x, rect.y, 0.0, 0.0); weights.len()];
    let mut remaining = rect;
    let mut start = 0;

    while start < items.len() {
        let short_side = f64::from(remaining.w.min(remaining.h));
        let mut end = start + 1;
        let mut row_area = items[start].1;

        while end < items.len() {
            let current = worst_aspect_ratio(&items[start..end], row_area, short_side);
            let grown = worst_aspect_ratio(&items[start..=end], row_area + items[end].1, short_side);
            if grown > current {
                break;
            }
            row_area += items[end].1;
            end += 1;
        }

        remaining = layout_row(&items[start..end], row_area, remaining, &mut out);
        start = end;
    }

    out
}

/// Largest aspect ratio in a row laid along a side of length `short_side`.
fn worst_aspect_ratio(row: &[(usize, f64)], row_area: f64, short_side: f64) -> f64 {
    if row.is_empty() || row_area <= 0.0 || short_side <= 0.0 {
        return f64::MAX;
    }
    let side_sq = short_side * short_side;
    let area_sq = row_area * row_area;
    row.iter()
        .map(|&(_, area)| (side_sq * area / area_sq).max(area_sq / (side_sq * area)))
        .fold(0.0, f64::max)
}

/// Place one row along the shorter side of `rect` and return what is left.
fn layout_row(row: &[(usize, f64)], row_area: f64, rect: Rect2D, out: &mut [Rect2D]) -> Rect2D {
    if rect.w <= 0.0 || rect.h <= 0.0 || row_area <= 0.0 {
        for &(i, _) in row {
            out[i] = Rect2D::new(rect.x, rect.y, 0.0, 0.0);
        }
        return rect;
    }

    if rect.w < rect.h {
        // Horizontal strip across the top.
        let strip = row_area / f64::from(rect.w);
        let mut x = rect.x;
        for &(i, area) in row {
            let w = (area / strip) as f32;
            out[i] = Rect2D::new(x, rect.y, w, strip as f32);
            x += w;
        }
        let strip = strip as f32;
        Rect2D::new(rect.x, rect.y + strip, rect.w, (rect.h - strip).max(0.0))
    } else {
        // Vertical strip down the left.
        let strip = row_area / f64::from(rect.h);
        let mut y = rect.y;
        for &(i, area) in row {
            let h = (area / strip) as f32;
            out[i] = Rect2D::new(rect.x, y, strip as f32, h);
            y += h;
        }
        let strip = strip as f32;
        Rect2D::new(rect.x + strip, rect.y, (rect.w - strip).max(0.0), rect.h)
    }
}
