use thiserror::Error;

/// Errors raised by hierarchical sources
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("no object at {0}")]
    NotFound(String),

    #[error("{0} is not a dataset")]
    NotADataset(String),

    #[error("dataset {path} could not be read: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("unsupported datatype {datatype} at {path}")]
    UnsupportedType { path: String, datatype: String },

    #[error("no hierarchical backend available for {0} (built without the `hdf5` feature)")]
    BackendUnavailable(String),

    #[error("backend error: {0}")]
    Backend(String),
}
