//! Node model shared by every adapter

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use hierarchy::{DatasetInfo, GroupInfo};
use values::Value;

use crate::tree::FileData;

/// Type tags that are not the natural type name of a value or an extension
pub mod node_type {
    pub const DIRECTORY: &str = "directory";
    /// Extensionless file
    pub const FILE: &str = "file";
    pub const GROUP: &str = "group";
    pub const DATASET: &str = "dataset";
    pub const ATTRIBUTE: &str = "attribute";
    /// Synthetic dimension vector of an array
    pub const SIZE: &str = "size";
    /// Synthetic element type name of an array
    pub const CLASS: &str = "class";
}

/// What a node carries: a value in memory or a descriptor to fetch it
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    /// A value held in memory
    Value(Arc<Value>),
    /// Metadata of a group
    Group(Arc<GroupInfo>),
    /// Metadata of a dataset; the contents are read on demand
    Dataset(Arc<DatasetInfo>),
    /// An attribute, named by its owner's path and its own name
    Attribute { owner: String, name: String },
    /// A filesystem entry
    Path(PathBuf),
}

/// One entry of the tree
///
/// Nodes are value snapshots. Two nodes are the same node when all four
/// parts compare equal, so a regenerated child equals the one handed out
/// before.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Display label
    pub name: String,
    /// Locator within the source, derived from the parent path and the
    /// child's identity
    pub path: String,
    /// Type tag; decides whether and how the node expands
    pub node_type: String,
    pub payload: Payload,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        node_type: impl Into<String>,
        payload: Payload,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            node_type: node_type.into(),
            payload,
        }
    }

    /// The in-memory value, if the payload holds one
    pub fn value(&self) -> Option<&Arc<Value>> {
        match &self.payload {
            Payload::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.node_type)
    }
}

/// Data resolved for a node
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NodeData {
    /// Nothing to show; also the result of a failed read
    #[default]
    Empty,
    Value(Arc<Value>),
    Group(Arc<GroupInfo>),
    File(FileData),
}

impl NodeData {
    pub fn is_empty(&self) -> bool {
        matches!(self, NodeData::Empty)
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeData::Empty => write!(f, "(no data)"),
            NodeData::Value(value) => write!(f, "{}", value),
            NodeData::Group(group) => write!(
                f,
                "group with {} groups, {} datasets, {} attributes",
                group.groups.len(),
                group.datasets.len(),
                group.attributes.len()
            ),
            NodeData::File(data) => write!(f, "{}", data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let value = Arc::new(Value::scalar(1.0));
        let a = Node::new("a", "s.a", "double", Payload::Value(value.clone()));
        let b = Node::new("a", "s.a", "double", Payload::Value(Arc::new(Value::scalar(1.0))));
        assert_eq!(a, b);

        let c = Node::new("a", "s.a", "double", Payload::Value(Arc::new(Value::scalar(2.0))));
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let node = Node::new("data", "/data", node_type::DATASET, Payload::None);
        assert_eq!(node.to_string(), "data [dataset]");
        assert_eq!(NodeData::Empty.to_string(), "(no data)");
        assert_eq!(
            NodeData::Value(Arc::new(Value::text("hi"))).to_string(),
            "'hi'"
        );
    }

    #[test]
    fn test_snapshot_independence() {
        let original = Node::new("x", "x", "double", Payload::None);
        let mut copy = original.clone();
        copy.name.push_str("_renamed");
        assert_eq!(original.name, "x");
    }
}
