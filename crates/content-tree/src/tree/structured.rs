//! MAT file adapter
//!
//! The whole file is loaded at `open`. Children are derived from the runtime
//! shape of each value:
//!
//! | value                         | children                               |
//! |-------------------------------|----------------------------------------|
//! | scalar struct                 | fields, `s.field`                      |
//! | small struct array (split)    | elements `s_1`.., `s(1)`..             |
//! | other struct array            | fields collected into cells, `s.field` |
//! | cell array                    | elements, `c{1}` or `c{2,1}`           |
//! | non-scalar numeric or logical | `Size` and `Class`                     |
//! | anything else                 | none                                   |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use mat::MatFile;
use values::{format_subscript, subscripts_to_linear, CellArray, StructArray, Value};

use crate::config::StructOptions;
use crate::error::{OpenError, ReadError};
use crate::tree::structured_path::{self, Query, Step};
use crate::tree::{node_type, AdapterKind, ContentAdapter, Node, NodeData, Payload};

/// Value of `field` as shown below a struct node
///
/// Struct arrays that are not split show each field collected across all
/// elements.
fn field_value(s: &StructArray, field: &str) -> Option<Arc<Value>> {
    if s.numel() == 1 {
        s.field(0, field).cloned()
    } else {
        s.collect_field(field).map(|cell| Arc::new(Value::Cell(cell)))
    }
}

fn cell_element(cell: &CellArray, subs: &[usize]) -> Option<Arc<Value>> {
    let linear = subscripts_to_linear(&cell.dims, subs)?;
    cell.elements.get(linear).cloned()
}

fn struct_element(s: &StructArray, subs: &[usize]) -> Option<Arc<Value>> {
    let linear = subscripts_to_linear(&s.dims, subs)?;
    s.element(linear).map(|e| Arc::new(Value::Struct(e)))
}

fn size_value(value: &Value) -> Value {
    Value::row(value.dims().iter().map(|&d| d as f64).collect())
}

fn class_value(value: &Value) -> Value {
    Value::text(value.class_name())
}

fn value_node(name: String, path: String, value: Arc<Value>) -> Node {
    let node_type = value.class_name().to_string();
    Node::new(name, path, node_type, Payload::Value(value))
}

/// Browses the variables of a MAT file
#[derive(Debug, Default)]
pub struct StructuredFileAdapter {
    options: StructOptions,
    source: Option<PathBuf>,
    variables: Vec<(String, Arc<Value>)>,
}

impl StructuredFileAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StructOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &StructOptions {
        &self.options
    }

    /// Change how struct arrays are presented; applies to nodes expanded afterwards
    pub fn set_options(&mut self, options: StructOptions) {
        self.options = options;
    }

    /// Bind to variables already in memory; `label` stands in for the file path
    pub fn open_variables(
        &mut self,
        label: impl Into<PathBuf>,
        variables: impl IntoIterator<Item = (String, Value)>,
    ) {
        self.close();
        self.variables = variables
            .into_iter()
            .map(|(name, value)| (name, Arc::new(value)))
            .collect();
        self.source = Some(label.into());
    }

    /// The value addressed by a node path such as `s.a{2}(1).b` or `size(x)`
    pub fn resolve(&self, path: &str) -> Result<Arc<Value>, ReadError> {
        if self.source.is_none() {
            return Err(ReadError::NotOpen);
        }
        let unresolved = || ReadError::Unresolved(path.to_string());
        let parsed = structured_path::parse(path).ok_or_else(unresolved)?;

        let mut current = self
            .variables
            .iter()
            .find(|(name, _)| *name == parsed.variable)
            .map(|(_, value)| value.clone())
            .ok_or_else(unresolved)?;

        for step in &parsed.steps {
            let next = match (step, current.as_ref()) {
                (Step::Field(field), Value::Struct(s)) => field_value(s, field),
                (Step::Brace(subs), Value::Cell(cell)) => cell_element(cell, subs),
                (Step::Paren(subs), Value::Struct(s)) => struct_element(s, subs),
                _ => None,
            };
            current = next.ok_or_else(unresolved)?;
        }

        Ok(match parsed.query {
            Some(Query::Size) => Arc::new(size_value(&current)),
            Some(Query::Class) => Arc::new(class_value(&current)),
            None => current,
        })
    }

    fn struct_children(&self, node: &Node, s: &StructArray) -> Vec<Node> {
        if self.options.splits(s.numel()) {
            return (0..s.numel())
                .filter_map(|i| {
                    let element = s.element(i)?;
                    Some(value_node(
                        format!("{}_{}", node.name, i + 1),
                        format!("{}({})", node.path, i + 1),
                        Arc::new(Value::Struct(element)),
                    ))
                })
                .collect();
        }

        s.fields
            .iter()
            .filter_map(|field| {
                let value = field_value(s, field)?;
                Some(value_node(
                    field.clone(),
                    format!("{}.{}", node.path, field),
                    value,
                ))
            })
            .collect()
    }

    fn cell_children(node: &Node, cell: &CellArray) -> Vec<Node> {
        cell.elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let index = format_subscript(&cell.dims, i);
                value_node(
                    format!("{}{{{}}}", node.name, index),
                    format!("{}{{{}}}", node.path, index),
                    element.clone(),
                )
            })
            .collect()
    }

    fn array_children(node: &Node, value: &Value) -> Vec<Node> {
        vec![
            Node::new(
                "Size",
                format!("size({})", node.path),
                node_type::SIZE,
                Payload::Value(Arc::new(size_value(value))),
            ),
            Node::new(
                "Class",
                format!("class({})", node.path),
                node_type::CLASS,
                Payload::Value(Arc::new(class_value(value))),
            ),
        ]
    }

    fn is_synthetic(node: &Node) -> bool {
        node.node_type == node_type::SIZE || node.node_type == node_type::CLASS
    }
}

impl ContentAdapter for StructuredFileAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Structured
    }

    fn open(&mut self, locator: &Path) -> Result<(), OpenError> {
        self.close();

        let file = MatFile::open(locator).map_err(|source| OpenError::Structured {
            path: locator.to_path_buf(),
            source,
        })?;
        info!(
            "Loaded {} variables from {} ({})",
            file.variables.len(),
            locator.display(),
            file.description
        );
        self.open_variables(locator, file.variables);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.source.is_some()
    }

    fn root(&self) -> Vec<Node> {
        self.variables
            .iter()
            .map(|(name, value)| value_node(name.clone(), name.clone(), value.clone()))
            .collect()
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        if Self::is_synthetic(node) {
            return Vec::new();
        }
        let Some(value) = node.value() else {
            return Vec::new();
        };

        let children = match value.as_ref() {
            Value::Struct(s) => self.struct_children(node, s),
            Value::Cell(cell) => Self::cell_children(node, cell),
            v if v.is_array() && !v.is_scalar() => Self::array_children(node, v),
            _ => Vec::new(),
        };
        debug!("Expanded {} ({} children)", node.path, children.len());
        children
    }

    fn has_children(&self, node: &Node) -> bool {
        if Self::is_synthetic(node) {
            return false;
        }
        match node.value().map(|v| v.as_ref()) {
            Some(Value::Struct(s)) => self.options.splits(s.numel()) || !s.fields.is_empty(),
            Some(Value::Cell(cell)) => !cell.elements.is_empty(),
            Some(v) => v.is_array() && !v.is_scalar(),
            None => false,
        }
    }

    fn try_node_data(&self, node: &Node) -> Result<NodeData, ReadError> {
        match node.value() {
            Some(value) => Ok(NodeData::Value(value.clone())),
            None => Err(ReadError::NoPayload(node.path.clone())),
        }
    }

    fn close(&mut self) {
        if let Some(source) = self.source.take() {
            info!("Closed {}", source.display());
        }
        self.variables.clear();
    }
}
