use std::fmt;
use std::sync::Arc;

use smallvec::smallvec;

use crate::dims::{dims_string, numel, Dims};
use crate::NumericClass;

/// A numeric array, real part plus optional imaginary part
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub class: NumericClass,
    pub dims: Dims,
    pub real: Vec<f64>,
    pub imag: Option<Vec<f64>>,
}

impl NumericArray {
    pub fn new(class: NumericClass, dims: Dims, real: Vec<f64>) -> Self {
        Self {
            class,
            dims,
            real,
            imag: None,
        }
    }

    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }
}

/// A logical (boolean) array
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalArray {
    pub dims: Dims,
    pub data: Vec<bool>,
}

/// A character array; `text` holds the characters in column-major order
#[derive(Debug, Clone, PartialEq)]
pub struct CharArray {
    pub dims: Dims,
    pub text: String,
}

/// A cell array: a container of arbitrary values
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    pub dims: Dims,
    pub elements: Vec<Arc<Value>>,
}

impl CellArray {
    pub fn new(dims: Dims, elements: Vec<Arc<Value>>) -> Self {
        Self { dims, elements }
    }

    /// A `1xN` cell holding the given values
    pub fn row(values: impl IntoIterator<Item = Value>) -> Self {
        let elements: Vec<_> = values.into_iter().map(Arc::new).collect();
        Self {
            dims: smallvec![1, elements.len()],
            elements,
        }
    }
}

/// A struct array (or an object when `class_name` is set)
///
/// `elements[i][f]` is the value of field `fields[f]` in element `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    pub class_name: Option<String>,
    pub dims: Dims,
    pub fields: Vec<String>,
    pub elements: Vec<Vec<Arc<Value>>>,
}

impl StructArray {
    /// A `1x1` struct with the given fields, in order
    pub fn scalar(fields: impl IntoIterator<Item = (String, Value)>) -> Self {
        let (names, values): (Vec<_>, Vec<_>) = fields
            .into_iter()
            .map(|(name, value)| (name, Arc::new(value)))
            .unzip();
        Self {
            class_name: None,
            dims: smallvec![1, 1],
            fields: names,
            elements: vec![values],
        }
    }

    /// A `1xN` struct array built from scalar structs sharing the same fields
    pub fn row(fields: Vec<String>, elements: Vec<Vec<Value>>) -> Self {
        Self {
            class_name: None,
            dims: smallvec![1, elements.len()],
            fields,
            elements: elements
                .into_iter()
                .map(|e| e.into_iter().map(Arc::new).collect())
                .collect(),
        }
    }

    pub fn numel(&self) -> usize {
        self.elements.len()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Value of `name` in element `index` (0-based)
    pub fn field(&self, index: usize, name: &str) -> Option<&Arc<Value>> {
        let f = self.field_index(name)?;
        self.elements.get(index)?.get(f)
    }

    /// Element `index` (0-based) as a `1x1` struct
    pub fn element(&self, index: usize) -> Option<StructArray> {
        let values = self.elements.get(index)?.clone();
        Some(Self {
            class_name: self.class_name.clone(),
            dims: smallvec![1, 1],
            fields: self.fields.clone(),
            elements: vec![values],
        })
    }

    /// The values of one field across all elements, shaped like the struct array
    pub fn collect_field(&self, name: &str) -> Option<CellArray> {
        let f = self.field_index(name)?;
        let elements = self
            .elements
            .iter()
            .filter_map(|element| element.get(f).cloned())
            .collect();
        Some(CellArray::new(self.dims.clone(), elements))
    }
}

/// A sparse matrix in coordinate form (0-based row/column indices)
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
    pub dims: Dims,
    pub logical: bool,
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
    pub real: Vec<f64>,
    pub imag: Option<Vec<f64>>,
}

impl SparseArray {
    pub fn nnz(&self) -> usize {
        self.real.len()
    }
}

/// A value loaded from a data source
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Numeric(NumericArray),
    Logical(LogicalArray),
    Char(CharArray),
    Cell(CellArray),
    Struct(StructArray),
    Sparse(SparseArray),
    /// A value whose contents are not decoded (function handles, opaque objects)
    Opaque { class_name: String },
}

impl Value {
    /// A `1x1` double
    pub fn scalar(value: f64) -> Self {
        Value::Numeric(NumericArray::new(
            NumericClass::Double,
            smallvec![1, 1],
            vec![value],
        ))
    }

    /// A `1xN` double row vector
    pub fn row(values: Vec<f64>) -> Self {
        Value::Numeric(NumericArray::new(
            NumericClass::Double,
            smallvec![1, values.len()],
            values,
        ))
    }

    /// A numeric array of the given class and shape
    pub fn numeric(class: NumericClass, dims: Dims, real: Vec<f64>) -> Self {
        Value::Numeric(NumericArray::new(class, dims, real))
    }

    /// The empty `0x0` double
    pub fn empty() -> Self {
        Value::numeric(NumericClass::Double, smallvec![0, 0], Vec::new())
    }

    /// A `1xN` char row
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Value::Char(CharArray {
            dims: smallvec![1, text.chars().count()],
            text,
        })
    }

    pub fn logical(dims: Dims, data: Vec<bool>) -> Self {
        Value::Logical(LogicalArray { dims, data })
    }

    /// Natural type name of the value
    pub fn class_name(&self) -> &str {
        match self {
            Value::Numeric(array) => array.class.name(),
            Value::Logical(_) => "logical",
            Value::Char(_) => "char",
            Value::Cell(_) => "cell",
            Value::Struct(s) => s.class_name.as_deref().unwrap_or("struct"),
            Value::Sparse(s) if s.logical => "logical",
            Value::Sparse(_) => "double",
            Value::Opaque { class_name } => class_name,
        }
    }

    pub fn dims(&self) -> Dims {
        match self {
            Value::Numeric(a) => a.dims.clone(),
            Value::Logical(a) => a.dims.clone(),
            Value::Char(a) => a.dims.clone(),
            Value::Cell(a) => a.dims.clone(),
            Value::Struct(a) => a.dims.clone(),
            Value::Sparse(a) => a.dims.clone(),
            Value::Opaque { .. } => smallvec![1, 1],
        }
    }

    pub fn numel(&self) -> usize {
        numel(&self.dims())
    }

    pub fn is_scalar(&self) -> bool {
        self.numel() == 1
    }

    /// Numeric, logical and sparse values are plain arrays of elements
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Value::Numeric(_) | Value::Logical(_) | Value::Sparse(_)
        )
    }
}

fn format_complex(re: f64, im: f64) -> String {
    if im < 0.0 {
        format!("{}-{}i", re, -im)
    } else {
        format!("{}+{}i", re, im)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = dims_string(&self.dims());
        match self {
            Value::Numeric(a) if a.real.len() == 1 => {
                match a.imag.as_deref().and_then(<[f64]>::first) {
                    Some(&im) => write!(f, "{}", format_complex(a.real[0], im)),
                    None => write!(f, "{}", a.real[0]),
                }
            }
            Value::Numeric(a) if a.is_complex() => write!(f, "{} complex {}", dims, a.class),
            Value::Numeric(a) => write!(f, "{} {}", dims, a.class),
            Value::Logical(a) if a.data.len() == 1 => write!(f, "{}", a.data[0]),
            Value::Logical(_) => write!(f, "{} logical", dims),
            Value::Char(c) if c.dims.first().copied().unwrap_or(0) <= 1 => {
                write!(f, "'{}'", c.text)
            }
            Value::Char(_) => write!(f, "{} char", dims),
            Value::Cell(_) => write!(f, "{} cell", dims),
            Value::Struct(s) => {
                let kind = s.class_name.as_deref().unwrap_or("struct");
                if s.numel() == 1 {
                    write!(f, "{}", kind)?;
                } else {
                    write!(f, "{} {} array", dims, kind)?;
                }
                if s.fields.is_empty() {
                    write!(f, " with no fields")
                } else {
                    write!(f, " with fields {}", s.fields.join(", "))
                }
            }
            Value::Sparse(s) => {
                write!(f, "{} sparse {}", dims, self.class_name())?;
                match s.nnz() {
                    1 => write!(f, " (1 nonzero)"),
                    n => write!(f, " ({} nonzeros)", n),
                }
            }
            Value::Opaque { class_name } => write!(f, "{} object", class_name),
        }
    }
}
