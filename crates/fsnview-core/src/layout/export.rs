/// Flat, serialisable view of a layout for renderers and `--json` output.
use super::{LayoutNode, Vec3};
use crate::color::Rgba;
use crate::model::EntryKind;
use serde::Serialize;

/// One positioned box, detached from the entry tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBox {
    pub path: String,
    pub name: String,
    pub kind: EntryKind,
    pub depth: usize,
    pub size_bytes: u64,
    pub position: Vec3,
    pub size: Vec3,
    pub color: Rgba,
}

impl LayoutNode<'_> {
    /// Every box in this subtree, parents before children.
    pub fn flatten(&self) -> Vec<PlacedBox> {
        let mut out = Vec::with_capacity(self.node_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(PlacedBox {
                path: node.entry.path.to_string_lossy().into_owned(),
                name: node.entry.name.to_string(),
                kind: node.entry.kind,
                depth: node.depth,
                size_bytes: node.entry.size,
                position: node.position,
                size: node.size,
                color: node.color,
            });
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Flattened layout as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.flatten())
    }
}
