//! HDF5 files through the `hdf5` bindings

use std::path::Path;
use std::sync::Arc;

use hdf5::types::{FixedAscii, FixedUnicode, FloatSize, IntSize, TypeDescriptor, VarLenUnicode};
use log::{debug, info, warn};
use smallvec::smallvec;
use values::{CellArray, Dims, NumericClass, Value};

use crate::{AttributeInfo, DatasetInfo, GroupInfo, HierarchyError, HierarchySource, ObjectInfo};

fn backend(err: hdf5::Error) -> HierarchyError {
    HierarchyError::Backend(err.to_string())
}

fn basename(path: &str) -> String {
    path.rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("/")
        .to_string()
}

fn int_bits(size: IntSize) -> usize {
    match size {
        IntSize::U1 => 8,
        IntSize::U2 => 16,
        IntSize::U4 => 32,
        IntSize::U8 => 64,
    }
}

fn describe(descriptor: &TypeDescriptor) -> String {
    match descriptor {
        TypeDescriptor::Integer(size) => format!("int{}", int_bits(*size)),
        TypeDescriptor::Unsigned(size) => format!("uint{}", int_bits(*size)),
        TypeDescriptor::Float(FloatSize::U4) => "float32".to_string(),
        TypeDescriptor::Float(FloatSize::U8) => "float64".to_string(),
        TypeDescriptor::Boolean => "bool".to_string(),
        TypeDescriptor::VarLenAscii
        | TypeDescriptor::VarLenUnicode
        | TypeDescriptor::FixedAscii(_)
        | TypeDescriptor::FixedUnicode(_) => "string".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

fn value_dims(shape: &[usize]) -> Dims {
    match shape {
        [] => smallvec![1, 1],
        [n] => smallvec![1, *n],
        _ => shape.iter().copied().collect(),
    }
}

// Longer fixed-length strings are truncated on read
const FIXED_STRING_CAPACITY: usize = 1024;

/// One string becomes a char value, several a cell of them
fn text_value<S: AsRef<str>>(dims: Dims, strings: &[S]) -> Value {
    match strings {
        [single] => Value::text(single.as_ref()),
        _ => {
            let elements = strings
                .iter()
                .map(|s| Arc::new(Value::text(s.as_ref())))
                .collect();
            Value::Cell(CellArray::new(dims, elements))
        }
    }
}

/// Read a dataset or attribute into a `Value`
fn read_container(container: &hdf5::Container, path: &str) -> Result<Value, HierarchyError> {
    let dims = value_dims(&container.shape());
    let descriptor = container
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map_err(backend)?;

    let unreadable = |err: hdf5::Error| HierarchyError::Unreadable {
        path: path.to_string(),
        reason: err.to_string(),
    };

    let value = match descriptor {
        TypeDescriptor::Float(_) => {
            let data = container.read_raw::<f64>().map_err(unreadable)?;
            Value::numeric(NumericClass::Double, dims, data)
        }
        TypeDescriptor::Integer(_) => {
            let data = container.read_raw::<i64>().map_err(unreadable)?;
            Value::numeric(
                NumericClass::Int64,
                dims,
                data.into_iter().map(|v| v as f64).collect(),
            )
        }
        TypeDescriptor::Unsigned(_) => {
            let data = container.read_raw::<u64>().map_err(unreadable)?;
            Value::numeric(
                NumericClass::UInt64,
                dims,
                data.into_iter().map(|v| v as f64).collect(),
            )
        }
        TypeDescriptor::Boolean => {
            let data = container.read_raw::<bool>().map_err(unreadable)?;
            Value::logical(dims, data)
        }
        TypeDescriptor::VarLenUnicode | TypeDescriptor::VarLenAscii => {
            let strings = container.read_raw::<VarLenUnicode>().map_err(unreadable)?;
            text_value(dims, &strings)
        }
        TypeDescriptor::FixedAscii(_) => {
            let strings = container
                .read_raw::<FixedAscii<FIXED_STRING_CAPACITY>>()
                .map_err(unreadable)?;
            text_value(dims, &strings)
        }
        TypeDescriptor::FixedUnicode(_) => {
            let strings = container
                .read_raw::<FixedUnicode<FIXED_STRING_CAPACITY>>()
                .map_err(unreadable)?;
            text_value(dims, &strings)
        }
        other => {
            return Err(HierarchyError::UnsupportedType {
                path: path.to_string(),
                datatype: describe(&other),
            })
        }
    };
    Ok(value)
}

fn attributes(location: &hdf5::Location) -> Result<Vec<AttributeInfo>, HierarchyError> {
    let owner = location.name();
    let mut out = Vec::new();
    for name in location.attr_names().map_err(backend)? {
        let attr = location.attr(&name).map_err(backend)?;
        let path = format!("{}#{}", owner, name);
        let datatype = attr
            .dtype()
            .and_then(|dtype| dtype.to_descriptor())
            .map(|d| describe(&d))
            .map_err(backend)?;
        let value = read_container(&attr, &path).unwrap_or_else(|err| {
            warn!("Attribute {} left undecoded: {}", path, err);
            Value::Opaque {
                class_name: datatype.clone(),
            }
        });
        out.push(AttributeInfo {
            name,
            datatype,
            shape: attr.shape().into_iter().collect(),
            value,
        });
    }
    Ok(out)
}

fn dataset_info(dataset: &hdf5::Dataset) -> Result<DatasetInfo, HierarchyError> {
    let path = dataset.name();
    let datatype = dataset
        .dtype()
        .and_then(|dtype| dtype.to_descriptor())
        .map(|d| describe(&d))
        .map_err(backend)?;
    Ok(DatasetInfo {
        name: basename(&path),
        shape: dataset.shape().into_iter().collect(),
        datatype,
        attributes: attributes(dataset)?,
        path,
    })
}

fn group_info(group: &hdf5::Group) -> Result<GroupInfo, HierarchyError> {
    let mut info = GroupInfo::new(group.name());
    for child in group.groups().map_err(backend)? {
        info.groups.push(Arc::new(group_info(&child)?));
    }
    for dataset in group.datasets().map_err(backend)? {
        info.datasets.push(Arc::new(dataset_info(&dataset)?));
    }
    info.attributes = attributes(group)?;
    Ok(info)
}

/// An open HDF5 file
pub struct Hdf5Source {
    file: hdf5::File,
}

impl Hdf5Source {
    /// Open an HDF5 file read-only
    pub fn open(path: &Path) -> Result<Self, HierarchyError> {
        let file = hdf5::File::open(path).map_err(backend)?;
        info!("Opened HDF5 file {}", path.display());
        Ok(Self { file })
    }
}

impl HierarchySource for Hdf5Source {
    fn info(&self, path: &str) -> Result<ObjectInfo, HierarchyError> {
        debug!("Fetching metadata for {}", path);
        if let Ok(group) = self.file.group(path) {
            return Ok(ObjectInfo::Group(Arc::new(group_info(&group)?)));
        }
        match self.file.dataset(path) {
            Ok(dataset) => Ok(ObjectInfo::Dataset(Arc::new(dataset_info(&dataset)?))),
            Err(_) => Err(HierarchyError::NotFound(path.to_string())),
        }
    }

    fn read_dataset(&self, path: &str) -> Result<Value, HierarchyError> {
        debug!("Reading dataset {}", path);
        let dataset = self
            .file
            .dataset(path)
            .map_err(|_| HierarchyError::NotFound(path.to_string()))?;
        read_container(&dataset, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_fixed_length_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.h5");
        {
            let file = hdf5::File::create(&path).unwrap();
            let names: Vec<FixedAscii<8>> = ["alpha", "beta"]
                .iter()
                .map(|s| FixedAscii::from_ascii(s).unwrap())
                .collect();
            file.new_dataset_builder()
                .with_data(names.as_slice())
                .create("names")
                .unwrap();
            let label = [FixedUnicode::<16>::from_str("gain ±").unwrap()];
            file.new_attr_builder()
                .with_data(label.as_slice())
                .create("label")
                .unwrap();
        }

        let source = Hdf5Source::open(&path).unwrap();
        let names = source.read_dataset("/names").unwrap();
        assert_eq!(
            names,
            Value::Cell(CellArray::new(
                smallvec![1, 2],
                vec![Arc::new(Value::text("alpha")), Arc::new(Value::text("beta"))],
            ))
        );

        let ObjectInfo::Group(root) = source.info("/").unwrap() else {
            panic!("root is not a group");
        };
        assert_eq!(root.attributes[0].name, "label");
        assert_eq!(root.attributes[0].datatype, "string");
        assert_eq!(root.attributes[0].value, Value::text("gain ±"));
    }
}
