/// Data model for the scanned filesystem tree.
///
/// Re-exports the entry type, the aggregated tree, and supporting types.
pub mod entry;
pub mod inspect;
pub mod size;
pub mod tree;

pub use entry::{Entry, EntryKind};
pub use inspect::InspectInfo;
pub use tree::{aggregate, EntryError, Tree};
