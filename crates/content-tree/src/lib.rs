//! Content Tree
//!
//! A library for presenting the nested contents of heterogeneous data sources
//! (MAT files, HDF5-style hierarchical files and directories) as one uniform,
//! lazily expanded tree.
//!
//! # Core Concepts
//!
//! - **Node**: name, path, type tag and payload of one tree entry
//! - **ContentAdapter**: format-specific strategy that opens a source and
//!   computes children on demand
//! - **AdapterFactory**: picks the adapter for a path
//! - **TreeNodeProvider**: binds one adapter for a consuming viewer
//!
//! # Example
//!
//! ```no_run
//! use content_tree::prelude::*;
//! use std::path::Path;
//!
//! let path = Path::new("./src");
//! let mut adapter = AdapterFactory::new().create_adapter(path).expect("unsupported");
//! adapter.open(path).expect("failed to open");
//!
//! // Children are computed only when walked
//! for entry in adapter.walk(TraversalOrder::PreOrder).max_depth(Some(2)) {
//!     println!("{:indent$}{}", "", entry.node, indent = entry.depth * 2);
//! }
//! adapter.close();
//! ```

pub mod config;
pub mod error;
pub mod outline;
pub mod tree;

pub use config::{BrowserConfig, StructOptions};
pub use error::{Error, NoAdapterError, OpenError, ReadError, Result, UnsupportedTypeError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{BrowserConfig, StructOptions};
    pub use crate::error::{NoAdapterError, OpenError, ReadError, UnsupportedTypeError};
    pub use crate::outline::{render_outline, OutlineOptions};
    pub use crate::tree::prelude::*;
}
