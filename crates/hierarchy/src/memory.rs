//! In-memory hierarchical source

use std::collections::HashMap;
use std::sync::Arc;

use values::{Dims, Value};

use crate::{join_path, AttributeInfo, DatasetInfo, GroupInfo, HierarchyError, HierarchySource, ObjectInfo};

/// A hierarchical container held entirely in memory
///
/// Built with the `with_*` methods; missing intermediate groups are created
/// on the way. Datasets may be registered without data to model read failures.
///
/// # Example
///
/// ```
/// use hierarchy::{HierarchySource, MemoryHierarchy, ObjectInfo};
/// use values::Value;
///
/// let source = MemoryHierarchy::new()
///     .with_dataset("/results/gain", Value::row(vec![1.0, 2.0]))
///     .with_attribute("/results", "units", Value::text("dB"));
///
/// match source.info("/results").unwrap() {
///     ObjectInfo::Group(group) => assert_eq!(group.datasets.len(), 1),
///     ObjectInfo::Dataset(_) => unreachable!(),
/// }
/// ```
#[derive(Debug)]
pub struct MemoryHierarchy {
    root: GroupInfo,
    data: HashMap<String, Option<Value>>,
}

impl Default for MemoryHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((parent, name)) => (parent, name),
        None => ("/", path),
    }
}

fn ensure_group<'a>(root: &'a mut GroupInfo, path: &str) -> &'a mut GroupInfo {
    let mut current = root;
    for part in path.split('/').filter(|p| !p.is_empty()) {
        let index = match current.groups.iter().position(|g| g.name == part) {
            Some(index) => index,
            None => {
                let child = GroupInfo::new(join_path(&current.path, part));
                current.groups.push(Arc::new(child));
                current.groups.len() - 1
            }
        };
        current = Arc::make_mut(&mut current.groups[index]);
    }
    current
}

impl MemoryHierarchy {
    pub fn new() -> Self {
        Self {
            root: GroupInfo::new("/"),
            data: HashMap::new(),
        }
    }

    /// Add a (possibly nested) group
    pub fn with_group(mut self, path: &str) -> Self {
        ensure_group(&mut self.root, path);
        self
    }

    /// Add a dataset holding `value`
    pub fn with_dataset(self, path: &str, value: Value) -> Self {
        let shape = value.dims();
        let datatype = value.class_name().to_string();
        self.insert_dataset(path, shape, datatype, Some(value))
    }

    /// Add a dataset whose contents cannot be read
    pub fn with_unreadable_dataset(self, path: &str, shape: &[usize], datatype: &str) -> Self {
        self.insert_dataset(path, shape.iter().copied().collect(), datatype.to_string(), None)
    }

    /// Attach an attribute to the group or dataset at `object_path`
    pub fn with_attribute(mut self, object_path: &str, name: &str, value: Value) -> Self {
        let attribute = AttributeInfo::from_value(name, value);
        let (parent, object) = split_parent(object_path);
        let group = ensure_group(&mut self.root, parent);
        if let Some(dataset) = group.datasets.iter_mut().find(|d| d.name == object) {
            Arc::make_mut(dataset).attributes.push(attribute);
            return self;
        }
        ensure_group(&mut self.root, object_path)
            .attributes
            .push(attribute);
        self
    }

    fn insert_dataset(
        mut self,
        path: &str,
        shape: Dims,
        datatype: String,
        value: Option<Value>,
    ) -> Self {
        let (parent, name) = split_parent(path);
        let group = ensure_group(&mut self.root, parent);
        let dataset = DatasetInfo {
            name: name.to_string(),
            path: join_path(&group.path, name),
            shape,
            datatype,
            attributes: Vec::new(),
        };
        let key = dataset.path.clone();
        group.datasets.retain(|d| d.name != name);
        group.datasets.push(Arc::new(dataset));
        self.data.insert(key, value);
        self
    }
}

impl HierarchySource for MemoryHierarchy {
    fn info(&self, path: &str) -> Result<ObjectInfo, HierarchyError> {
        self.root
            .find(path)
            .ok_or_else(|| HierarchyError::NotFound(path.to_string()))
    }

    fn read_dataset(&self, path: &str) -> Result<Value, HierarchyError> {
        match self.data.get(path) {
            Some(Some(value)) => Ok(value.clone()),
            Some(None) => Err(HierarchyError::Unreadable {
                path: path.to_string(),
                reason: "no data stored".to_string(),
            }),
            None => match self.root.find(path) {
                Some(ObjectInfo::Group(_)) => Err(HierarchyError::NotADataset(path.to_string())),
                _ => Err(HierarchyError::NotFound(path.to_string())),
            },
        }
    }
}
