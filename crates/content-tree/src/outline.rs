//! Indented text rendering of a tree

use std::fmt::Write;

use crate::tree::{ContentAdapter, TraversalOrder, TreeTraversal};

/// Options for [`render_outline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutlineOptions {
    /// Deepest level to expand; `None` expands everything
    pub max_depth: Option<usize>,
    /// Append a one-line preview of each node's data
    pub show_data: bool,
}

/// Render the adapter's tree, one node per line
///
/// Expandable nodes are marked `+`, leaves `-`:
///
/// ```text
/// + s [struct]
///   - a [double]
///   - b [char]
/// ```
pub fn render_outline<A: ContentAdapter + ?Sized>(adapter: &A, options: &OutlineOptions) -> String {
    let mut out = String::new();
    for entry in adapter
        .walk(TraversalOrder::PreOrder)
        .max_depth(options.max_depth)
    {
        let marker = if adapter.has_children(&entry.node) {
            '+'
        } else {
            '-'
        };
        let _ = write!(
            out,
            "{:indent$}{} {}",
            "",
            marker,
            entry.node,
            indent = entry.depth * 2
        );
        if options.show_data {
            let _ = write!(out, " = {}", adapter.node_data(&entry.node));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::StructuredFileAdapter;
    use values::{StructArray, Value};

    fn adapter() -> StructuredFileAdapter {
        let s = Value::Struct(StructArray::scalar([
            ("a".to_string(), Value::scalar(1.0)),
            ("b".to_string(), Value::text("x")),
        ]));
        let mut adapter = StructuredFileAdapter::new();
        adapter.open_variables("test.mat", [("s".to_string(), s)]);
        adapter
    }

    #[test]
    fn test_outline() {
        let text = render_outline(&adapter(), &OutlineOptions::default());
        insta::assert_snapshot!(text.trim_end(), @r###"
        + s [struct]
          - a [double]
          - b [char]
        "###);
    }

    #[test]
    fn test_outline_depth_and_data() {
        let options = OutlineOptions {
            max_depth: Some(0),
            show_data: true,
        };
        let text = render_outline(&adapter(), &options);
        assert_eq!(text, "+ s [struct] = struct with fields a, b\n");
    }

    #[test]
    fn test_outline_closed_adapter() {
        let mut adapter = adapter();
        adapter.close();
        assert_eq!(render_outline(&adapter, &OutlineOptions::default()), "");
    }
}
