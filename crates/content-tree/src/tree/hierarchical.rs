//! HDF5-style adapter for groups, datasets and attributes
//!
//! Only metadata is read when the source is opened. Dataset contents are
//! read when a dataset node's data is requested.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hierarchy::{join_path, AttributeInfo, GroupInfo, HierarchySource, ObjectInfo, ROOT_PATH};
use log::{debug, info};

use crate::error::{OpenError, ReadError};
use crate::tree::{node_type, AdapterKind, ContentAdapter, Node, NodeData, Payload};

struct OpenSource {
    label: String,
    source: Box<dyn HierarchySource>,
    root: Arc<GroupInfo>,
}

/// Browses a hierarchical container
#[derive(Default)]
pub struct HierarchicalFileAdapter {
    open: Option<OpenSource>,
}

impl fmt::Debug for HierarchicalFileAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalFileAdapter")
            .field("source", &self.open.as_ref().map(|o| o.label.as_str()))
            .finish()
    }
}

fn attribute_nodes(owner_path: &str, attributes: &[AttributeInfo]) -> Vec<Node> {
    attributes
        .iter()
        .map(|attr| {
            Node::new(
                format!("@{}", attr.name),
                format!("{}#{}", owner_path, attr.name),
                node_type::ATTRIBUTE,
                Payload::Attribute {
                    owner: owner_path.to_string(),
                    name: attr.name.clone(),
                },
            )
        })
        .collect()
}

impl HierarchicalFileAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to an already opened source, labelled `label` in the tree
    pub fn open_source(
        &mut self,
        label: impl Into<String>,
        source: Box<dyn HierarchySource>,
    ) -> Result<(), OpenError> {
        self.close();

        let label = label.into();
        let hierarchical = |source| OpenError::Hierarchical {
            path: PathBuf::from(&label),
            source,
        };
        let root = match source.info(ROOT_PATH).map_err(hierarchical)? {
            ObjectInfo::Group(root) => root,
            ObjectInfo::Dataset(_) => {
                return Err(hierarchical(hierarchy::HierarchyError::NotFound(
                    ROOT_PATH.to_string(),
                )));
            }
        };

        info!(
            "Opened {} ({} groups, {} datasets at top level)",
            label,
            root.groups.len(),
            root.datasets.len()
        );
        self.open = Some(OpenSource {
            label,
            source,
            root,
        });
        Ok(())
    }

    fn source(&self) -> Result<&OpenSource, ReadError> {
        self.open.as_ref().ok_or(ReadError::NotOpen)
    }

    fn read_attribute(&self, parent: &str, name: &str) -> Result<NodeData, ReadError> {
        let open = self.source()?;
        let missing_parent = || ReadError::MissingParent {
            parent: parent.to_string(),
            name: name.to_string(),
        };

        // The root's metadata is kept from `open`; other owners are fetched again
        let owner = if parent == ROOT_PATH {
            ObjectInfo::Group(open.root.clone())
        } else {
            open.source.info(parent).map_err(|_| missing_parent())?
        };

        let attribute = owner
            .attributes()
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| ReadError::MissingAttribute {
                parent: parent.to_string(),
                name: name.to_string(),
            })?;
        Ok(NodeData::Value(Arc::new(attribute.value.clone())))
    }
}

impl ContentAdapter for HierarchicalFileAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Hierarchical
    }

    fn open(&mut self, locator: &Path) -> Result<(), OpenError> {
        self.close();

        let source = hierarchy::open_file(locator).map_err(|source| OpenError::Hierarchical {
            path: locator.to_path_buf(),
            source,
        })?;
        let label = locator
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| locator.display().to_string());
        self.open_source(label, source)
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn root(&self) -> Vec<Node> {
        self.open
            .iter()
            .map(|open| {
                Node::new(
                    open.label.clone(),
                    ROOT_PATH,
                    node_type::GROUP,
                    Payload::Group(open.root.clone()),
                )
            })
            .collect()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let children: Vec<Node> = match &node.payload {
            Payload::Group(group) => {
                let groups = group.groups.iter().map(|g| {
                    Node::new(
                        g.name.clone(),
                        join_path(&node.path, &g.name),
                        node_type::GROUP,
                        Payload::Group(g.clone()),
                    )
                });
                let datasets = group.datasets.iter().map(|d| {
                    Node::new(
                        d.name.clone(),
                        join_path(&node.path, &d.name),
                        node_type::DATASET,
                        Payload::Dataset(d.clone()),
                    )
                });
                groups
                    .chain(datasets)
                    .chain(attribute_nodes(&node.path, &group.attributes))
                    .collect()
            }
            Payload::Dataset(dataset) => attribute_nodes(&node.path, &dataset.attributes),
            _ => Vec::new(),
        };
        debug!("Expanded {} ({} children)", node.path, children.len());
        children
    }

    fn has_children(&self, node: &Node) -> bool {
        match &node.payload {
            Payload::Group(group) => !group.is_empty(),
            Payload::Dataset(dataset) => !dataset.attributes.is_empty(),
            _ => false,
        }
    }

    fn try_node_data(&self, node: &Node) -> Result<NodeData, ReadError> {
        match &node.payload {
            Payload::Group(group) => Ok(NodeData::Group(group.clone())),
            Payload::Dataset(_) => {
                let open = self.source()?;
                let value = open
                    .source
                    .read_dataset(&node.path)
                    .map_err(|source| ReadError::Source {
                        path: node.path.clone(),
                        source,
                    })?;
                Ok(NodeData::Value(Arc::new(value)))
            }
            Payload::Attribute { owner, name } => self.read_attribute(owner, name),
            _ => Err(ReadError::NoPayload(node.path.clone())),
        }
    }

    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            info!("Closed {}", open.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeTraversal;
    use hierarchy::{HierarchyError, MemoryHierarchy};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;
    use values::Value;

    // Counts metadata fetches made after opening
    struct Counting {
        inner: MemoryHierarchy,
        calls: Rc<Cell<usize>>,
    }

    impl HierarchySource for Counting {
        fn info(&self, path: &str) -> Result<ObjectInfo, HierarchyError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.info(path)
        }

        fn read_dataset(&self, path: &str) -> Result<Value, HierarchyError> {
            self.inner.read_dataset(path)
        }
    }

    fn sample() -> MemoryHierarchy {
        MemoryHierarchy::new()
            .with_group("/g1")
            .with_group("/g2")
            .with_dataset("/data", Value::row(vec![1.0, 2.0, 3.0]))
            .with_attribute("/", "version", Value::scalar(2.0))
            .with_attribute("/data", "units", Value::text("m"))
            .with_attribute("/g1", "note", Value::text("first"))
            .with_unreadable_dataset("/g2/broken", &[100, 100], "float64")
    }

    fn open(source: impl HierarchySource + 'static) -> HierarchicalFileAdapter {
        let mut adapter = HierarchicalFileAdapter::new();
        adapter.open_source("sample.h5", Box::new(source)).unwrap();
        adapter
    }

    fn find(adapter: &HierarchicalFileAdapter, path: &str) -> Node {
        adapter
            .find_by_path(path)
            .unwrap_or_else(|| panic!("{} not found", path))
    }

    fn summary(nodes: &[Node]) -> Vec<(&str, &str, &str)> {
        nodes
            .iter()
            .map(|n| (n.name.as_str(), n.path.as_str(), n.node_type.as_str()))
            .collect()
    }

    #[test]
    fn test_root() {
        let adapter = open(sample());
        let roots = adapter.root();
        assert_eq!(summary(&roots), vec![("sample.h5", "/", "group")]);
        assert!(adapter.has_children(&roots[0]));
    }

    #[test]
    fn test_group_children_order() {
        let adapter = open(sample());
        let children = adapter.children(&adapter.root()[0]);
        assert_eq!(
            summary(&children),
            vec![
                ("g1", "/g1", "group"),
                ("g2", "/g2", "group"),
                ("data", "/data", "dataset"),
                ("@version", "/#version", "attribute"),
            ]
        );
    }

    #[test]
    fn test_dataset_children_are_attributes() {
        let adapter = open(sample());
        let data = find(&adapter, "/data");
        assert!(adapter.has_children(&data));
        let children = adapter.children(&data);
        assert_eq!(
            summary(&children),
            vec![("@units", "/data#units", "attribute")]
        );
        assert!(!adapter.has_children(&children[0]));
        assert!(adapter.children(&children[0]).is_empty());
    }

    #[test]
    fn test_dataset_read() {
        let adapter = open(sample());
        let data = find(&adapter, "/data");
        assert_eq!(
            adapter.node_data(&data),
            NodeData::Value(Arc::new(Value::row(vec![1.0, 2.0, 3.0])))
        );
    }

    #[test]
    fn test_failed_read_is_empty() {
        let adapter = open(sample());
        let broken = find(&adapter, "/g2/broken");
        assert!(matches!(
            adapter.try_node_data(&broken),
            Err(ReadError::Source { .. })
        ));
        assert_eq!(adapter.node_data(&broken), NodeData::Empty);
    }

    #[test]
    fn test_attribute_reads() {
        let calls = Rc::new(Cell::new(0));
        let adapter = open(Counting {
            inner: sample(),
            calls: calls.clone(),
        });
        assert_eq!(calls.get(), 1);

        let root_attr = find(&adapter, "/#version");
        assert_eq!(
            adapter.node_data(&root_attr),
            NodeData::Value(Arc::new(Value::scalar(2.0)))
        );
        assert_eq!(calls.get(), 1);

        let nested = find(&adapter, "/g1#note");
        assert_eq!(
            adapter.node_data(&nested),
            NodeData::Value(Arc::new(Value::text("first")))
        );
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_attribute_name_with_separator() {
        let adapter = open(
            MemoryHierarchy::new()
                .with_dataset("/data", Value::scalar(1.0))
                .with_attribute("/data", "a#b", Value::text("hashed"))
                .with_attribute("/data", "b", Value::text("plain")),
        );
        let data = find(&adapter, "/data");
        let attrs = adapter.children(&data);
        assert_eq!(
            summary(&attrs),
            vec![
                ("@a#b", "/data#a#b", "attribute"),
                ("@b", "/data#b", "attribute"),
            ]
        );
        assert_eq!(
            adapter.node_data(&attrs[0]),
            NodeData::Value(Arc::new(Value::text("hashed")))
        );
        assert_eq!(
            adapter.node_data(&attrs[1]),
            NodeData::Value(Arc::new(Value::text("plain")))
        );
    }

    #[test]
    fn test_missing_attribute() {
        let adapter = open(sample());
        let ghost = Node::new(
            "@ghost",
            "/g1#ghost",
            node_type::ATTRIBUTE,
            Payload::Attribute {
                owner: "/g1".to_string(),
                name: "ghost".to_string(),
            },
        );
        assert!(matches!(
            adapter.try_node_data(&ghost),
            Err(ReadError::MissingAttribute { .. })
        ));

        let orphan = Node::new(
            "@a",
            "/nope#a",
            node_type::ATTRIBUTE,
            Payload::Attribute {
                owner: "/nope".to_string(),
                name: "a".to_string(),
            },
        );
        assert!(matches!(
            adapter.try_node_data(&orphan),
            Err(ReadError::MissingParent { .. })
        ));
        assert_eq!(adapter.node_data(&orphan), NodeData::Empty);
    }

    #[test]
    fn test_group_data_is_metadata() {
        let adapter = open(sample());
        let root = adapter.root().remove(0);
        let NodeData::Group(group) = adapter.node_data(&root) else {
            panic!("expected group metadata");
        };
        assert_eq!(group.groups.len(), 2);
    }

    #[test]
    fn test_empty_group() {
        let adapter = open(MemoryHierarchy::new().with_group("/empty"));
        let empty = find(&adapter, "/empty");
        assert!(!adapter.has_children(&empty));
        assert!(adapter.children(&empty).is_empty());
    }

    #[test]
    fn test_close() {
        let mut adapter = open(sample());
        let data = find(&adapter, "/data");
        adapter.close();
        adapter.close();
        assert!(adapter.root().is_empty());
        assert!(matches!(
            adapter.try_node_data(&data),
            Err(ReadError::NotOpen)
        ));
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn test_open_without_backend() {
        let mut adapter = open(sample());
        let err = adapter.open(Path::new("data.h5")).unwrap_err();
        assert!(matches!(
            err,
            OpenError::Hierarchical {
                source: HierarchyError::BackendUnavailable(_),
                ..
            }
        ));
        assert!(!adapter.is_open());
    }
}
