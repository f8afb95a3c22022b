// Hierarchical container access for Content Tree
// Groups, datasets and attributes behind a backend-neutral source trait.
// Metadata is read up front, dataset contents only on request.

mod error;
mod info;
mod memory;
mod source;

#[cfg(feature = "hdf5")]
mod hdf5_source;

pub use error::HierarchyError;
pub use info::{join_path, AttributeInfo, DatasetInfo, GroupInfo, ObjectInfo, ROOT_PATH};
pub use memory::MemoryHierarchy;
pub use source::{open_file, HierarchySource};

#[cfg(feature = "hdf5")]
pub use hdf5_source::Hdf5Source;
