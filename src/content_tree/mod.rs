//! Content tree module
//!
//! Rebuilds the page hierarchy of a flat export from the nested bullet list
//! in its index document, and derives the flat-name to hierarchical-path
//! mapping used to rewrite cross references.

mod builder;
mod mapping;
mod tree;

pub use builder::*;
pub use mapping::RenameMapping;
pub use tree::{ContentTree, DocumentTreeNode, NodeId, PreOrder};
