//! Error taxonomy
//!
//! Structural failures (`OpenError`, `UnsupportedTypeError`, `NoAdapterError`)
//! propagate to the caller. `ReadError` is per node and recoverable: adapters
//! turn it into `NodeData::Empty` in `ContentAdapter::node_data`.

use std::io;
use std::path::PathBuf;

use hierarchy::HierarchyError;
use mat::MatError;
use thiserror::Error;

use crate::config::ConfigError;

/// A source could not be bound to an adapter
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot load {path:?}: {source}")]
    Structured {
        path: PathBuf,
        #[source]
        source: MatError,
    },

    #[error("cannot open {path:?}: {source}")]
    Hierarchical {
        path: PathBuf,
        #[source]
        source: HierarchyError,
    },
}

fn describe_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{}", extension)
    }
}

/// No adapter handles the locator's extension
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported file type {}", describe_extension(.extension))]
pub struct UnsupportedTypeError {
    /// Lowercase extension without the leading dot; empty if there is none
    pub extension: String,
}

/// The data behind one node could not be resolved
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("no source is open")]
    NotOpen,

    #[error("node {0} carries no readable payload")]
    NoPayload(String),

    #[error("cannot stat {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Source {
        path: String,
        #[source]
        source: HierarchyError,
    },

    #[error("object {parent} holding attribute {name} not found")]
    MissingParent { parent: String, name: String },

    #[error("attribute {name} not found on {parent}")]
    MissingAttribute { parent: String, name: String },

    #[error("{0} does not address a value")]
    Unresolved(String),
}

/// A provider was queried before an adapter was bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
#[error("no adapter is bound to the provider")]
pub struct NoAdapterError;

/// Any content-tree failure
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedTypeError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    NoAdapter(#[from] NoAdapterError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
