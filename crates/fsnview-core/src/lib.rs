/// fsnview Core: scanning, aggregation, and spatial layout.
///
/// This crate contains all business logic with zero rendering dependencies.
/// A renderer, picker, or CLI reads the [`model::Tree`] and
/// [`layout::LayoutNode`] values it produces and never writes back into them.
///
/// # Modules
///
/// - [`model`]: Entry tree, aggregate statistics, inspection, size formatting.
/// - [`scanner`]: Concurrent directory walk with progress and lazy expansion.
/// - [`layout`]: Squarified treemap and pedestal-tree 3D layouts.
/// - [`color`]: Palettes and age/size colour ramps used by the layouts.
/// - [`error`]: Fatal scan errors.
pub mod color;
pub mod error;
pub mod layout;
pub mod model;
pub mod scanner;

pub use error::ScanError;
pub use layout::{compute, LayoutNode, LayoutOptions, Mode};
pub use model::{aggregate, Entry, EntryKind, Tree};
pub use scanner::{CancelFlag, ScanHandle, ScanProgress, Scanner, ScannerOptions};
