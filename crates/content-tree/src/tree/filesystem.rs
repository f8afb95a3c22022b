//! Directory adapter

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, info, trace, warn};
use path_clean::PathClean;

use crate::error::{OpenError, ReadError};
use crate::tree::{node_type, AdapterKind, ContentAdapter, Node, NodeData, Payload};

/// Metadata for filesystem nodes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileData {
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    pub readonly: bool,
    /// Lowercase file extension (if any)
    pub extension: Option<String>,
}

impl FileData {
    fn from_metadata(path: &Path, metadata: &fs::Metadata) -> Self {
        Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
            is_dir: metadata.is_dir(),
            readonly: metadata.permissions().readonly(),
            extension: if metadata.is_dir() {
                None
            } else {
                lowercase_extension(path)
            },
        }
    }
}

impl fmt::Display for FileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir {
            write!(f, "directory")
        } else {
            write!(f, "{} bytes", self.size)?;
            if self.readonly {
                write!(f, ", read-only")?;
            }
            Ok(())
        }
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn entry_node(path: PathBuf, is_dir: bool) -> Node {
    let node_type = if is_dir {
        node_type::DIRECTORY.to_string()
    } else {
        lowercase_extension(&path).unwrap_or_else(|| node_type::FILE.to_string())
    };
    let locator = path.to_string_lossy().into_owned();
    Node::new(
        display_name(&path),
        locator,
        node_type,
        Payload::Path(path),
    )
}

/// Returns true if the listing yields an entry `children` would keep
fn has_readable_entry<T>(entries: impl IntoIterator<Item = io::Result<T>>) -> bool {
    entries.into_iter().filter_map(Result::ok).next().is_some()
}

/// Browses a directory tree
///
/// Directory listings are read each time a node is expanded, so the tree
/// reflects the filesystem at the time of the call.
#[derive(Debug, Default)]
pub struct FileSystemAdapter {
    root: Option<PathBuf>,
}

impl FileSystemAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound directory
    pub fn root_path(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of `node` relative to the bound directory
    pub fn relative_path(&self, node: &Node) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        let Payload::Path(path) = &node.payload else {
            return None;
        };
        pathdiff::diff_paths(path, root)
    }

    fn directory(node: &Node) -> Option<&Path> {
        match &node.payload {
            Payload::Path(path) if node.node_type == node_type::DIRECTORY => Some(path),
            _ => None,
        }
    }
}

impl ContentAdapter for FileSystemAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::FileSystem
    }

    fn open(&mut self, locator: &Path) -> Result<(), OpenError> {
        self.close();

        let path = locator.to_path_buf().clean();
        let metadata = fs::metadata(&path).map_err(|source| OpenError::Io {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(OpenError::NotADirectory(path));
        }

        info!("Opened directory {}", path.display());
        self.root = Some(path);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.root.is_some()
    }

    fn root(&self) -> Vec<Node> {
        self.root
            .iter()
            .map(|path| entry_node(path.clone(), true))
            .collect()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let Some(dir) = Self::directory(node) else {
            return Vec::new();
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot list {}: {}", dir.display(), err);
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping entry in {}: {}", dir.display(), err);
                    continue;
                }
            };
            // Symlinks are not followed, so link cycles cannot recurse
            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            trace!("Listed {}", path.display());
            children.push(entry_node(path, is_dir));
        }

        // Sort children: directories first, then files, alphabetically within each group
        children.sort_by(|a, b| {
            let a_dir = a.node_type == node_type::DIRECTORY;
            let b_dir = b.node_type == node_type::DIRECTORY;
            b_dir.cmp(&a_dir).then_with(|| a.name.cmp(&b.name))
        });

        debug!("Expanded {} ({} entries)", dir.display(), children.len());
        children
    }

    fn has_children(&self, node: &Node) -> bool {
        Self::directory(node)
            .and_then(|dir| fs::read_dir(dir).ok())
            .map(has_readable_entry)
            .unwrap_or(false)
    }

    fn try_node_data(&self, node: &Node) -> Result<NodeData, ReadError> {
        let Payload::Path(path) = &node.payload else {
            return Err(ReadError::NoPayload(node.path.clone()));
        };
        let metadata = fs::metadata(path).map_err(|source| ReadError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(NodeData::File(FileData::from_metadata(path, &metadata)))
    }

    fn close(&mut self) {
        if let Some(root) = self.root.take() {
            info!("Closed directory {}", root.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{TraversalOrder, TreeTraversal};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_tree() -> (TempDir, FileSystemAdapter) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        // Create test structure:
        // root/
        //   file1.TXT
        //   README
        //   dir1/
        //     file2.txt
        //     dir2/
        //       file3.csv

        fs::write(root.join("file1.TXT"), "content1").unwrap();
        fs::write(root.join("README"), "readme").unwrap();
        fs::create_dir(root.join("dir1")).unwrap();
        fs::write(root.join("dir1/file2.txt"), "content2").unwrap();
        fs::create_dir(root.join("dir1/dir2")).unwrap();
        fs::write(root.join("dir1/dir2/file3.csv"), "a,b").unwrap();

        let mut adapter = FileSystemAdapter::new();
        adapter.open(root).unwrap();
        (temp, adapter)
    }

    #[test]
    fn test_root() {
        let (temp, adapter) = create_test_tree();
        let roots = adapter.root();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].node_type, "directory");
        assert_eq!(
            roots[0].name,
            temp.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn test_children_types_and_order() {
        let (_temp, adapter) = create_test_tree();
        let root = adapter.root().remove(0);
        let children: Vec<_> = adapter
            .children(&root)
            .into_iter()
            .map(|n| (n.name, n.node_type))
            .collect();
        assert_eq!(
            children,
            vec![
                ("dir1".to_string(), "directory".to_string()),
                ("README".to_string(), "file".to_string()),
                ("file1.TXT".to_string(), "txt".to_string()),
            ]
        );
    }

    #[test]
    fn test_files_are_leaves() {
        let (_temp, adapter) = create_test_tree();
        let root = adapter.root().remove(0);
        let file = adapter
            .children(&root)
            .into_iter()
            .find(|n| n.node_type == "txt")
            .unwrap();
        assert!(!adapter.has_children(&file));
        assert!(adapter.children(&file).is_empty());
    }

    #[test]
    fn test_relative_path() {
        let (_temp, adapter) = create_test_tree();
        let file3 = adapter
            .walk(TraversalOrder::PreOrder)
            .find(|e| e.node.name == "file3.csv")
            .unwrap();
        assert_eq!(file3.depth, 3);
        assert_eq!(
            adapter.relative_path(&file3.node).unwrap(),
            Path::new("dir1").join("dir2").join("file3.csv")
        );
    }

    #[test]
    fn test_node_data() {
        let (_temp, adapter) = create_test_tree();
        let file = adapter
            .walk(TraversalOrder::PreOrder)
            .find(|e| e.node.name == "file2.txt")
            .unwrap()
            .node;
        let NodeData::File(data) = adapter.node_data(&file) else {
            panic!("expected file metadata");
        };
        assert_eq!(data.size, 8);
        assert!(!data.is_dir);
        assert_eq!(data.extension.as_deref(), Some("txt"));
    }

    #[test]
    fn test_open_normalizes_path() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        let mut adapter = FileSystemAdapter::new();
        adapter.open(&temp.path().join("sub").join("..")).unwrap();
        assert_eq!(adapter.root_path(), Some(temp.path()));
    }

    #[test]
    fn test_unreadable_entries_are_not_children() {
        let failing = vec![Err::<(), _>(io::Error::from(io::ErrorKind::PermissionDenied))];
        assert!(!has_readable_entry(failing));
        assert!(has_readable_entry(vec![
            Err(io::Error::from(io::ErrorKind::PermissionDenied)),
            Ok(()),
        ]));
        assert!(!has_readable_entry(Vec::<io::Result<()>>::new()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let (temp, adapter) = create_test_tree();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("dir1/loop")).unwrap();

        let link = adapter
            .walk(TraversalOrder::PreOrder)
            .find(|e| e.node.name == "loop")
            .unwrap()
            .node;
        assert_ne!(link.node_type, "directory");
        assert!(!adapter.has_children(&link));
        assert_eq!(adapter.walk(TraversalOrder::PreOrder).count(), 8);
    }

    #[test]
    fn test_open_rejects_file() {
        let (temp, mut adapter) = create_test_tree();
        let err = adapter.open(&temp.path().join("README")).unwrap_err();
        assert!(matches!(err, OpenError::NotADirectory(_)));
        assert!(!adapter.is_open());
        assert!(adapter.root().is_empty());
    }
}
