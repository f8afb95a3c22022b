//! Structural metadata of a hierarchical container

use std::sync::Arc;

use values::{Dims, Value};

/// Path of the top-level group
pub const ROOT_PATH: &str = "/";

/// Join a parent object path and a child name with `/`
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Name of an attribute and its (small) value
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    pub name: String,
    /// Datatype description, e.g. `float64` or `string`
    pub datatype: String,
    pub shape: Dims,
    pub value: Value,
}

impl AttributeInfo {
    /// Describe an attribute from its value
    pub fn from_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            datatype: value.class_name().to_string(),
            shape: value.dims(),
            value,
        }
    }
}

/// Metadata of a dataset: everything but the data itself
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub name: String,
    pub path: String,
    pub shape: Dims,
    pub datatype: String,
    pub attributes: Vec<AttributeInfo>,
}

/// Metadata of a group, including all nested objects
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    pub name: String,
    pub path: String,
    pub groups: Vec<Arc<GroupInfo>>,
    pub datasets: Vec<Arc<DatasetInfo>>,
    pub attributes: Vec<AttributeInfo>,
}

impl GroupInfo {
    /// An empty group at `path`
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty())
            .unwrap_or(ROOT_PATH)
            .to_string();
        Self {
            name,
            path,
            groups: Vec::new(),
            datasets: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.datasets.is_empty() && self.attributes.is_empty()
    }

    pub fn group(&self, name: &str) -> Option<&Arc<GroupInfo>> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn dataset(&self, name: &str) -> Option<&Arc<DatasetInfo>> {
        self.datasets.iter().find(|d| d.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Find a nested object by absolute path
    pub fn find(&self, path: &str) -> Option<ObjectInfo> {
        let rest = path.strip_prefix(self.path.as_str())?;
        if !(rest.is_empty() || rest.starts_with('/') || self.path.ends_with('/')) {
            return None;
        }
        let relative = rest.trim_start_matches('/');
        if relative.is_empty() {
            return Some(ObjectInfo::Group(Arc::new(self.clone())));
        }

        let mut current = self;
        let mut parts = relative.split('/').filter(|p| !p.is_empty()).peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                if let Some(group) = current.group(part) {
                    return Some(ObjectInfo::Group(group.clone()));
                }
                return current
                    .dataset(part)
                    .map(|d| ObjectInfo::Dataset(d.clone()));
            }
            current = current.group(part)?;
        }
        None
    }
}

/// Metadata of either kind of addressable object
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectInfo {
    Group(Arc<GroupInfo>),
    Dataset(Arc<DatasetInfo>),
}

impl ObjectInfo {
    pub fn path(&self) -> &str {
        match self {
            ObjectInfo::Group(g) => &g.path,
            ObjectInfo::Dataset(d) => &d.path,
        }
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        match self {
            ObjectInfo::Group(g) => &g.attributes,
            ObjectInfo::Dataset(d) => &d.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "a"), "/a");
        assert_eq!(join_path("/a", "b"), "/a/b");
    }

    #[test]
    fn test_group_name_from_path() {
        assert_eq!(GroupInfo::new("/").name, "/");
        assert_eq!(GroupInfo::new("/a/b").name, "b");
    }
}
