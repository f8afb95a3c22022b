use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use flate2::read::ZlibDecoder;
use log::{debug, trace};
use values::{
    checked_numel, dims_string, CellArray, CharArray, Dims, NumericArray, NumericClass,
    SparseArray, StructArray, Value,
};

use crate::element::*;
use crate::MatError;

const HEADER_LEN: usize = 128;
const TEXT_LEN: usize = 116;
const VERSION_5: u16 = 0x0100;

/// A MAT file loaded into memory
#[derive(Debug, Clone, PartialEq)]
pub struct MatFile {
    /// The descriptive header text
    pub description: String,
    /// Top-level variables in file order
    pub variables: Vec<(String, Value)>,
}

impl MatFile {
    /// Read and parse a MAT file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MatError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Parsing MAT file {} ({} bytes)", path.display(), bytes.len());
        Self::parse(&bytes)
    }

    /// Parse a complete MAT file held in memory
    pub fn parse(bytes: &[u8]) -> Result<Self, MatError> {
        if bytes.len() < HEADER_LEN {
            return Err(MatError::TooShort(bytes.len()));
        }

        let endian = match [bytes[126], bytes[127]] {
            [b'I', b'M'] => Endian::Little,
            [b'M', b'I'] => Endian::Big,
            other => return Err(MatError::BadEndianIndicator(other)),
        };

        let version = endian.u16(&bytes[124..126]);
        if version != VERSION_5 {
            return Err(MatError::UnsupportedVersion(version));
        }

        let description = String::from_utf8_lossy(&bytes[..TEXT_LEN])
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string();
        if !description.starts_with("MATLAB") {
            return Err(MatError::NotMatFile);
        }

        let mut variables = Vec::new();
        let mut reader = ElementReader::new(&bytes[HEADER_LEN..], endian);
        while !reader.is_empty() {
            let element = reader.next_element()?;
            match element.data_type {
                MI_MATRIX => push_variable(&mut variables, parse_matrix(element.data, endian)?),
                MI_COMPRESSED => {
                    let inflated = inflate(element.data)?;
                    let mut inner = ElementReader::new(&inflated, endian);
                    while !inner.is_empty() {
                        let element = inner.next_element()?;
                        if element.data_type == MI_MATRIX {
                            push_variable(&mut variables, parse_matrix(element.data, endian)?);
                        }
                    }
                }
                other => trace!("Skipping top-level element of type {}", other),
            }
        }

        debug!("Loaded {} variables", variables.len());
        Ok(Self {
            description,
            variables,
        })
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Variable names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }
}

// Unnamed top-level matrices hold subsystem data, not user variables
fn push_variable(variables: &mut Vec<(String, Value)>, (name, value): (String, Value)) {
    if name.is_empty() {
        trace!("Skipping unnamed top-level matrix");
    } else {
        variables.push((name, value));
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>, MatError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(MatError::Decompress)?;
    Ok(out)
}

fn element_count(dims: &[usize]) -> Result<usize, MatError> {
    checked_numel(dims).ok_or_else(|| {
        MatError::Invalid(format!("dimensions {} overflow", dims_string(dims)))
    })
}

fn numeric_class(class: u8) -> Option<NumericClass> {
    Some(match class {
        MX_DOUBLE => NumericClass::Double,
        MX_SINGLE => NumericClass::Single,
        MX_INT8 => NumericClass::Int8,
        MX_UINT8 => NumericClass::UInt8,
        MX_INT16 => NumericClass::Int16,
        MX_UINT16 => NumericClass::UInt16,
        MX_INT32 => NumericClass::Int32,
        MX_UINT32 => NumericClass::UInt32,
        MX_INT64 => NumericClass::Int64,
        MX_UINT64 => NumericClass::UInt64,
        _ => return None,
    })
}

/// Parse the body of an miMATRIX element into its name and value
fn parse_matrix(data: &[u8], endian: Endian) -> Result<(String, Value), MatError> {
    // empty matrices inside cells and structs are written with no body
    if data.is_empty() {
        return Ok((String::new(), Value::empty()));
    }

    let mut r = ElementReader::new(data, endian);

    let flags_el = r.next_element()?;
    flags_el.expect_type(MI_UINT32, "array flags")?;
    if flags_el.data.len() < 8 {
        return Err(MatError::Invalid("array flags shorter than 8 bytes".into()));
    }
    let flags = endian.u32(&flags_el.data[0..4]);
    let class = (flags & 0xff) as u8;
    let complex = flags & FLAG_COMPLEX != 0;
    let logical = flags & FLAG_LOGICAL != 0;

    let dims: Dims = r.next_element()?.to_indices(endian)?.into_iter().collect();
    let name = r.next_element()?.to_name();

    let value = match class {
        MX_CELL => {
            // element count is untrusted; grow as elements are read
            let mut elements = Vec::new();
            for _ in 0..element_count(&dims)? {
                let el = r.next_element()?;
                el.expect_type(MI_MATRIX, "cell element")?;
                elements.push(Arc::new(parse_matrix(el.data, endian)?.1));
            }
            Value::Cell(CellArray::new(dims, elements))
        }
        MX_STRUCT => Value::Struct(parse_struct(&mut r, dims, None, endian)?),
        MX_OBJECT => {
            let class_name = r.next_element()?.to_name();
            Value::Struct(parse_struct(&mut r, dims, Some(class_name), endian)?)
        }
        MX_CHAR => {
            let text = if r.is_empty() {
                String::new()
            } else {
                r.next_element()?.to_text(endian)?
            };
            Value::Char(CharArray { dims, text })
        }
        MX_SPARSE => Value::Sparse(parse_sparse(&mut r, dims, complex, logical, endian)?),
        MX_FUNCTION => Value::Opaque {
            class_name: "function_handle".to_string(),
        },
        MX_OPAQUE => {
            // type system name, then the class name
            let class_name = r
                .next_element()
                .and_then(|_| r.next_element())
                .map(|el| el.to_name())
                .unwrap_or_else(|_| "opaque".to_string());
            Value::Opaque { class_name }
        }
        other => {
            let class = numeric_class(other)
                .ok_or_else(|| MatError::Invalid(format!("unknown array class {}", other)))?;
            parse_numeric(&mut r, dims, class, complex, logical, endian)?
        }
    };

    Ok((name, value))
}

fn parse_numeric(
    r: &mut ElementReader<'_>,
    dims: Dims,
    class: NumericClass,
    complex: bool,
    logical: bool,
    endian: Endian,
) -> Result<Value, MatError> {
    let expected = element_count(&dims)?;
    let real = if r.is_empty() {
        Vec::new()
    } else {
        r.next_element()?.to_f64s(endian)?
    };
    if real.len() != expected {
        return Err(MatError::Invalid(format!(
            "expected {} elements, found {}",
            expected,
            real.len()
        )));
    }

    if logical {
        return Ok(Value::logical(
            dims,
            real.into_iter().map(|v| v != 0.0).collect(),
        ));
    }

    let imag = if complex {
        let imag = r.next_element()?.to_f64s(endian)?;
        if imag.len() != expected {
            return Err(MatError::Invalid(format!(
                "expected {} imaginary elements, found {}",
                expected,
                imag.len()
            )));
        }
        Some(imag)
    } else {
        None
    };

    Ok(Value::Numeric(NumericArray {
        class,
        dims,
        real,
        imag,
    }))
}

fn parse_struct(
    r: &mut ElementReader<'_>,
    dims: Dims,
    class_name: Option<String>,
    endian: Endian,
) -> Result<StructArray, MatError> {
    let name_len = r
        .next_element()?
        .to_indices(endian)?
        .first()
        .copied()
        .unwrap_or(0);
    let names_el = r.next_element()?;
    let fields: Vec<String> = if name_len == 0 {
        Vec::new()
    } else {
        names_el
            .data
            .chunks(name_len)
            .map(|chunk| {
                let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                String::from_utf8_lossy(&chunk[..end]).into_owned()
            })
            .collect()
    };

    let count = element_count(&dims)?;
    let mut elements = Vec::new();
    for _ in 0..count {
        let mut values = Vec::with_capacity(fields.len());
        for _ in 0..fields.len() {
            let el = r.next_element()?;
            el.expect_type(MI_MATRIX, "struct field")?;
            values.push(Arc::new(parse_matrix(el.data, endian)?.1));
        }
        elements.push(values);
    }

    Ok(StructArray {
        class_name,
        dims,
        fields,
        elements,
    })
}

fn parse_sparse(
    r: &mut ElementReader<'_>,
    dims: Dims,
    complex: bool,
    logical: bool,
    endian: Endian,
) -> Result<SparseArray, MatError> {
    let ir = r.next_element()?.to_indices(endian)?;
    let jc = r.next_element()?.to_indices(endian)?;
    let ncols = dims.get(1).copied().unwrap_or(0);
    if jc.len() <= ncols {
        return Err(MatError::Invalid(format!(
            "sparse column index has {} entries for {} columns",
            jc.len(),
            ncols
        )));
    }

    let nnz = jc[ncols];
    if ir.len() < nnz {
        return Err(MatError::Invalid(format!(
            "sparse row index has {} entries for {} nonzeros",
            ir.len(),
            nnz
        )));
    }

    let mut cols = Vec::with_capacity(nnz);
    for c in 0..ncols {
        cols.extend(std::iter::repeat(c).take(jc[c + 1].saturating_sub(jc[c])));
    }

    let mut real = if r.is_empty() {
        vec![1.0; nnz]
    } else {
        r.next_element()?.to_f64s(endian)?
    };
    check_nonzeros("real", real.len(), nnz)?;
    real.truncate(nnz);

    let imag = if complex {
        let mut imag = r.next_element()?.to_f64s(endian)?;
        check_nonzeros("imaginary", imag.len(), nnz)?;
        imag.truncate(nnz);
        Some(imag)
    } else {
        None
    };

    Ok(SparseArray {
        dims,
        logical,
        rows: ir[..nnz].to_vec(),
        cols,
        real,
        imag,
    })
}

fn check_nonzeros(part: &str, found: usize, nnz: usize) -> Result<(), MatError> {
    if found < nnz {
        return Err(MatError::Invalid(format!(
            "sparse {} data has {} entries for {} nonzeros",
            part, found, nnz
        )));
    }
    Ok(())
}
