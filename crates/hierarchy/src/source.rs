use std::path::Path;

use values::Value;

use crate::{HierarchyError, ObjectInfo};

/// Read access to an open hierarchical container
///
/// Implementations hold the open file (or in-memory tree). Metadata calls
/// must not read bulk dataset contents.
pub trait HierarchySource {
    /// Metadata of the group or dataset at `path`
    ///
    /// Group metadata includes all nested groups, datasets and attributes.
    fn info(&self, path: &str) -> Result<ObjectInfo, HierarchyError>;

    /// Read the full contents of the dataset at `path`
    fn read_dataset(&self, path: &str) -> Result<Value, HierarchyError>;
}

/// Open a hierarchical file from disk with the compiled-in backend
#[cfg(feature = "hdf5")]
pub fn open_file(path: &Path) -> Result<Box<dyn HierarchySource>, HierarchyError> {
    Ok(Box::new(crate::Hdf5Source::open(path)?))
}

/// Open a hierarchical file from disk with the compiled-in backend
#[cfg(not(feature = "hdf5"))]
pub fn open_file(path: &Path) -> Result<Box<dyn HierarchySource>, HierarchyError> {
    Err(HierarchyError::BackendUnavailable(
        path.display().to_string(),
    ))
}
