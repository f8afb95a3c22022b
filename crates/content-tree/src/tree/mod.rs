//! The node model, the adapter contract and its implementations
//!
//! Every source format is projected into the same [`Node`] model by a
//! [`ContentAdapter`]. Trees are never materialized as a whole: a consumer
//! asks for the children of the node it expands.

mod factory;
pub mod filesystem;
pub mod hierarchical;
mod node;
mod provider;
pub mod structured;
mod structured_path;
mod traits;

pub use factory::{AdapterFactory, AdapterKind};
pub use filesystem::{FileData, FileSystemAdapter};
pub use hierarchical::HierarchicalFileAdapter;
pub use node::{node_type, Node, NodeData, Payload};
pub use provider::TreeNodeProvider;
pub use structured::StructuredFileAdapter;
pub use traits::{ContentAdapter, TraversalOrder, TreeTraversal, TreeWalker, WalkEntry};

/// Re-export common types for convenience
pub mod prelude {
    pub use super::{
        node_type, AdapterFactory, AdapterKind, ContentAdapter, FileData, FileSystemAdapter,
        HierarchicalFileAdapter, Node, NodeData, Payload, StructuredFileAdapter, TraversalOrder,
        TreeNodeProvider, TreeTraversal, TreeWalker, WalkEntry,
    };
}
