//! The adapter contract and traversal utilities

use std::collections::VecDeque;
use std::path::Path;

use log::warn;

use crate::error::{OpenError, ReadError};
use crate::tree::{AdapterKind, Node, NodeData};

/// A format-specific strategy that projects one open source into nodes
///
/// An adapter owns at most one open source. `open` replaces the previous
/// source and `close` releases it. Queries on an unbound adapter return
/// empty results.
///
/// Children are computed on every call from the node's payload and path;
/// nothing is cached beyond what the adapter loaded at `open`.
///
/// # Example
///
/// ```no_run
/// use content_tree::prelude::*;
/// use std::path::Path;
///
/// fn print_level<A: ContentAdapter + ?Sized>(adapter: &A) {
///     for root in adapter.root() {
///         for child in adapter.children(&root) {
///             println!("{} {}", child, adapter.has_children(&child));
///         }
///     }
/// }
///
/// let mut adapter = FileSystemAdapter::new();
/// adapter.open(Path::new(".")).unwrap();
/// print_level(&adapter);
/// ```
pub trait ContentAdapter {
    /// Which adapter this is
    fn kind(&self) -> AdapterKind;

    /// Bind the adapter to the source at `locator`
    ///
    /// The previous source is released first; on failure the adapter is
    /// left unbound.
    fn open(&mut self, locator: &Path) -> Result<(), OpenError>;

    /// Returns true if a source is bound
    fn is_open(&self) -> bool;

    /// Top-level nodes, or nothing if no source is open
    fn root(&self) -> Vec<Node>;

    /// Direct children of `node`, in display order
    fn children(&self, node: &Node) -> Vec<Node>;

    /// Returns true if `children` would return at least one node
    fn has_children(&self, node: &Node) -> bool {
        !self.children(node).is_empty()
    }

    /// Resolve the node's payload into data
    fn try_node_data(&self, node: &Node) -> Result<NodeData, ReadError>;

    /// Resolve the node's payload, reporting failures as `NodeData::Empty`
    fn node_data(&self, node: &Node) -> NodeData {
        match self.try_node_data(node) {
            Ok(data) => data,
            Err(err) => {
                warn!("No data for {}: {}", node.path, err);
                NodeData::Empty
            }
        }
    }

    /// Release the open source; does nothing if none is open
    fn close(&mut self);
}

/// Traversal order for walking the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Visit parent before children (top-down)
    PreOrder,
    /// Visit children before parent (bottom-up)
    PostOrder,
    /// Visit level by level (breadth-first)
    BreadthFirst,
}

/// A node visited by a walk, with its depth below the starting level
#[derive(Debug, Clone, PartialEq)]
pub struct WalkEntry {
    pub depth: usize,
    pub node: Node,
}

/// Extension trait providing traversal and search on top of the adapter queries
///
/// Implemented for every adapter, including `dyn ContentAdapter`.
pub trait TreeTraversal: ContentAdapter {
    /// Walk the whole tree from the root nodes
    fn walk(&self, order: TraversalOrder) -> TreeWalker<'_, Self> {
        TreeWalker::new(self, self.root(), order)
    }

    /// Walk the subtree below `start`, `start` included
    fn walk_from(&self, start: Node, order: TraversalOrder) -> TreeWalker<'_, Self> {
        TreeWalker::new(self, vec![start], order)
    }

    /// Find the node whose path is exactly `path`
    ///
    /// Only nodes whose own path occurs in `path` are expanded.
    fn find_by_path(&self, path: &str) -> Option<Node> {
        let mut stack: Vec<Node> = self.root();
        stack.reverse();

        while let Some(node) = stack.pop() {
            if node.path == path {
                return Some(node);
            }
            if !path.contains(node.path.as_str()) {
                continue;
            }
            let children = self.children(&node);
            stack.extend(children.into_iter().rev());
        }
        None
    }
}

// Blanket implementation for all adapters
impl<T: ContentAdapter + ?Sized> TreeTraversal for T {}

#[derive(Debug)]
struct Frame {
    entry: WalkEntry,
    expanded: bool,
}

/// Iterator that expands nodes as it goes
///
/// Children are requested from the adapter only when the walk reaches
/// their parent.
pub struct TreeWalker<'a, A: ContentAdapter + ?Sized> {
    adapter: &'a A,
    order: TraversalOrder,
    max_depth: Option<usize>,
    pending: VecDeque<Frame>,
}

impl<'a, A: ContentAdapter + ?Sized> TreeWalker<'a, A> {
    /// Create a walker over `starts` and their descendants
    pub fn new(adapter: &'a A, starts: Vec<Node>, order: TraversalOrder) -> Self {
        let mut pending: VecDeque<Frame> = starts
            .into_iter()
            .map(|node| Frame {
                entry: WalkEntry { depth: 0, node },
                expanded: false,
            })
            .collect();

        // Depth-first orders pop from the back
        if !matches!(order, TraversalOrder::BreadthFirst) {
            pending.make_contiguous().reverse();
        }

        Self {
            adapter,
            order,
            max_depth: None,
            pending,
        }
    }

    /// Do not expand nodes at `depth` or deeper; `None` walks everything
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    fn descends(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth < max)
    }

    fn children_of(&self, entry: &WalkEntry) -> Vec<Frame> {
        if !self.descends(entry.depth) {
            return Vec::new();
        }
        self.adapter
            .children(&entry.node)
            .into_iter()
            .map(|node| Frame {
                entry: WalkEntry {
                    depth: entry.depth + 1,
                    node,
                },
                expanded: false,
            })
            .collect()
    }

    fn next_preorder(&mut self) -> Option<WalkEntry> {
        let current = self.pending.pop_back()?;

        // Push in reverse so the first child is visited next
        for child in self.children_of(&current.entry).into_iter().rev() {
            self.pending.push_back(child);
        }

        Some(current.entry)
    }

    fn next_postorder(&mut self) -> Option<WalkEntry> {
        loop {
            let last = self.pending.back()?;
            if last.expanded {
                return self.pending.pop_back().map(|frame| frame.entry);
            }

            let children = self.children_of(&last.entry);
            if let Some(last) = self.pending.back_mut() {
                last.expanded = true;
            }
            for child in children.into_iter().rev() {
                self.pending.push_back(child);
            }
        }
    }

    fn next_breadthfirst(&mut self) -> Option<WalkEntry> {
        let current = self.pending.pop_front()?;
        let children = self.children_of(&current.entry);
        self.pending.extend(children);
        Some(current.entry)
    }
}

impl<'a, A: ContentAdapter + ?Sized> Iterator for TreeWalker<'a, A> {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            TraversalOrder::PreOrder => self.next_preorder(),
            TraversalOrder::PostOrder => self.next_postorder(),
            TraversalOrder::BreadthFirst => self.next_breadthfirst(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Payload;
    use std::cell::Cell;
    use std::collections::HashMap;

    // Fixed tree keyed by path, counting `children` calls
    struct TestAdapter {
        children: HashMap<String, Vec<String>>,
        calls: Cell<usize>,
        open: bool,
    }

    impl TestAdapter {
        fn new() -> Self {
            let mut children = HashMap::new();
            children.insert("root".to_string(), vec!["root/dir1".to_string(), "root/file1".to_string()]);
            children.insert("root/dir1".to_string(), vec!["root/dir1/file2".to_string()]);
            Self {
                children,
                calls: Cell::new(0),
                open: true,
            }
        }

        fn node(path: &str) -> Node {
            let name = path.rsplit('/').next().unwrap_or(path);
            Node::new(name, path, "test", Payload::None)
        }
    }

    impl ContentAdapter for TestAdapter {
        fn kind(&self) -> AdapterKind {
            AdapterKind::FileSystem
        }

        fn open(&mut self, _locator: &Path) -> Result<(), OpenError> {
            self.open = true;
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn root(&self) -> Vec<Node> {
            vec![Self::node("root")]
        }

        fn children(&self, node: &Node) -> Vec<Node> {
            self.calls.set(self.calls.get() + 1);
            self.children
                .get(&node.path)
                .map(|paths| paths.iter().map(|p| Self::node(p)).collect())
                .unwrap_or_default()
        }

        fn try_node_data(&self, node: &Node) -> Result<NodeData, ReadError> {
            Err(ReadError::NoPayload(node.path.clone()))
        }

        fn close(&mut self) {
            self.open = false;
        }
    }

    fn paths(entries: impl Iterator<Item = WalkEntry>) -> Vec<String> {
        entries.map(|e| e.node.path).collect()
    }

    #[test]
    fn test_preorder() {
        let adapter = TestAdapter::new();
        assert_eq!(
            paths(adapter.walk(TraversalOrder::PreOrder)),
            vec!["root", "root/dir1", "root/dir1/file2", "root/file1"]
        );
    }

    #[test]
    fn test_postorder() {
        let adapter = TestAdapter::new();
        assert_eq!(
            paths(adapter.walk(TraversalOrder::PostOrder)),
            vec!["root/dir1/file2", "root/dir1", "root/file1", "root"]
        );
    }

    #[test]
    fn test_breadthfirst() {
        let adapter = TestAdapter::new();
        let entries: Vec<_> = adapter.walk(TraversalOrder::BreadthFirst).collect();
        let depths: Vec<_> = entries.iter().map(|e| e.depth).collect();
        assert_eq!(
            paths(entries.into_iter()),
            vec!["root", "root/dir1", "root/file1", "root/dir1/file2"]
        );
        assert_eq!(depths, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_max_depth_stops_expansion() {
        let adapter = TestAdapter::new();
        let walked = paths(adapter.walk(TraversalOrder::PreOrder).max_depth(Some(1)));
        assert_eq!(walked, vec!["root", "root/dir1", "root/file1"]);
        // only the root was expanded
        assert_eq!(adapter.calls.get(), 1);

        let only_root = paths(adapter.walk(TraversalOrder::PostOrder).max_depth(Some(0)));
        assert_eq!(only_root, vec!["root"]);
    }

    #[test]
    fn test_lazy_walk() {
        let adapter = TestAdapter::new();
        let mut walk = adapter.walk(TraversalOrder::PreOrder);
        walk.next();
        assert_eq!(adapter.calls.get(), 1);
    }

    #[test]
    fn test_find_by_path() {
        let adapter = TestAdapter::new();
        let found = adapter.find_by_path("root/dir1/file2").unwrap();
        assert_eq!(found.name, "file2");
        // root and dir1 are the only nodes on the way
        assert_eq!(adapter.calls.get(), 2);
        assert!(adapter.find_by_path("root/missing").is_none());
    }

    #[test]
    fn test_node_data_swallows_errors() {
        let adapter = TestAdapter::new();
        let node = TestAdapter::node("root");
        assert!(adapter.try_node_data(&node).is_err());
        assert_eq!(adapter.node_data(&node), NodeData::Empty);
    }

    #[test]
    fn test_dyn_adapter_walk() {
        let adapter: Box<dyn ContentAdapter> = Box::new(TestAdapter::new());
        assert_eq!(adapter.walk(TraversalOrder::PreOrder).count(), 4);
    }
}
