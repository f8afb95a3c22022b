//! Minimal level-5 writer for building MAT fixtures in tests
//!
//! Numeric data is always stored as doubles; the reader converts storage
//! types back to the declared class. Names of up to four bytes use the
//! small-element form, as MATLAB writes them.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use values::{NumericClass, Value};

use crate::element::*;

/// Builds a level-5 MAT file in memory
pub struct MatWriter {
    buf: Vec<u8>,
    endian: Endian,
    compress: bool,
}

impl Default for MatWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MatWriter {
    /// Little-endian writer
    pub fn new() -> Self {
        Self::with_endian(Endian::Little)
    }

    /// Big-endian writer (`MI` byte order indicator)
    pub fn big_endian() -> Self {
        Self::with_endian(Endian::Big)
    }

    fn with_endian(endian: Endian) -> Self {
        let mut buf = Vec::with_capacity(256);
        let mut text = b"MATLAB 5.0 MAT-file, written by the content-tree test suite".to_vec();
        text.resize(116, b' ');
        buf.extend_from_slice(&text);
        buf.extend_from_slice(&[0; 8]);
        buf.extend_from_slice(&u16_bytes(endian, 0x0100));
        buf.extend_from_slice(match endian {
            Endian::Little => b"IM",
            Endian::Big => b"MI",
        });
        Self {
            buf,
            endian,
            compress: false,
        }
    }

    /// Wrap every variable in a zlib-compressed element
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    /// Append a named variable
    pub fn add(&mut self, name: &str, value: &Value) -> io::Result<&mut Self> {
        let e = self.endian;
        let mut matrix = Vec::new();
        element(e, &mut matrix, MI_MATRIX, &encode_matrix(e, name, value));

        if self.compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&matrix)?;
            let deflated = encoder.finish()?;
            self.buf.extend_from_slice(&u32_bytes(e, MI_COMPRESSED));
            self.buf
                .extend_from_slice(&u32_bytes(e, deflated.len() as u32));
            self.buf.extend_from_slice(&deflated);
        } else {
            self.buf.extend_from_slice(&matrix);
        }
        Ok(self)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_to(self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.finish())
    }
}

fn u16_bytes(e: Endian, v: u16) -> [u8; 2] {
    match e {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    }
}

fn u32_bytes(e: Endian, v: u32) -> [u8; 4] {
    match e {
        Endian::Little => v.to_le_bytes(),
        Endian::Big => v.to_be_bytes(),
    }
}

fn element(e: Endian, buf: &mut Vec<u8>, data_type: u32, data: &[u8]) {
    buf.extend_from_slice(&u32_bytes(e, data_type));
    buf.extend_from_slice(&u32_bytes(e, data.len() as u32));
    buf.extend_from_slice(data);
    while buf.len() % 8 != 0 {
        buf.push(0);
    }
}

fn small_element(e: Endian, buf: &mut Vec<u8>, data_type: u32, data: &[u8]) {
    let mut packed = [0u8; 4];
    packed[..data.len()].copy_from_slice(data);
    // the 16-bit byte count and type share one word; both halves follow the file order
    let tag = ((data.len() as u32) << 16) | data_type;
    buf.extend_from_slice(&u32_bytes(e, tag));
    buf.extend_from_slice(&packed);
}

fn doubles(e: Endian, values: &[f64]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| match e {
            Endian::Little => v.to_le_bytes(),
            Endian::Big => v.to_be_bytes(),
        })
        .collect()
}

fn int32s(e: Endian, values: impl IntoIterator<Item = usize>) -> Vec<u8> {
    values
        .into_iter()
        .flat_map(|v| u32_bytes(e, v as i32 as u32))
        .collect()
}

fn class_code(class: NumericClass) -> u8 {
    match class {
        NumericClass::Double => MX_DOUBLE,
        NumericClass::Single => MX_SINGLE,
        NumericClass::Int8 => MX_INT8,
        NumericClass::UInt8 => MX_UINT8,
        NumericClass::Int16 => MX_INT16,
        NumericClass::UInt16 => MX_UINT16,
        NumericClass::Int32 => MX_INT32,
        NumericClass::UInt32 => MX_UINT32,
        NumericClass::Int64 => MX_INT64,
        NumericClass::UInt64 => MX_UINT64,
    }
}

fn header(
    e: Endian,
    buf: &mut Vec<u8>,
    class: u8,
    flags: u32,
    nzmax: usize,
    dims: &[usize],
    name: &str,
) {
    let mut words = Vec::with_capacity(8);
    words.extend_from_slice(&u32_bytes(e, class as u32 | flags));
    words.extend_from_slice(&u32_bytes(e, nzmax as u32));
    element(e, buf, MI_UINT32, &words);
    element(e, buf, MI_INT32, &int32s(e, dims.iter().copied()));
    if (1..=4).contains(&name.len()) {
        small_element(e, buf, MI_INT8, name.as_bytes());
    } else {
        element(e, buf, MI_INT8, name.as_bytes());
    }
}

fn encode_matrix(e: Endian, name: &str, value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    match value {
        Value::Numeric(array) => {
            let flags = if array.imag.is_some() { FLAG_COMPLEX } else { 0 };
            header(e, &mut buf, class_code(array.class), flags, 0, &array.dims, name);
            element(e, &mut buf, MI_DOUBLE, &doubles(e, &array.real));
            if let Some(imag) = &array.imag {
                element(e, &mut buf, MI_DOUBLE, &doubles(e, imag));
            }
        }
        Value::Logical(array) => {
            header(e, &mut buf, MX_UINT8, FLAG_LOGICAL, 0, &array.dims, name);
            let bytes: Vec<u8> = array.data.iter().map(|&b| b as u8).collect();
            element(e, &mut buf, MI_UINT8, &bytes);
        }
        Value::Char(chars) => {
            header(e, &mut buf, MX_CHAR, 0, 0, &chars.dims, name);
            let units: Vec<u8> = chars
                .text
                .encode_utf16()
                .flat_map(|u| u16_bytes(e, u))
                .collect();
            element(e, &mut buf, MI_UINT16, &units);
        }
        Value::Cell(cell) => {
            header(e, &mut buf, MX_CELL, 0, 0, &cell.dims, name);
            for item in &cell.elements {
                element(e, &mut buf, MI_MATRIX, &encode_matrix(e, "", item));
            }
        }
        Value::Struct(s) => {
            let class = if s.class_name.is_some() { MX_OBJECT } else { MX_STRUCT };
            header(e, &mut buf, class, 0, 0, &s.dims, name);
            if let Some(class_name) = &s.class_name {
                element(e, &mut buf, MI_INT8, class_name.as_bytes());
            }
            const NAME_LEN: usize = 32;
            small_element(e, &mut buf, MI_INT32, &u32_bytes(e, NAME_LEN as u32));
            let mut names = Vec::with_capacity(NAME_LEN * s.fields.len());
            for field in &s.fields {
                let mut padded = field.as_bytes().to_vec();
                padded.resize(NAME_LEN, 0);
                names.extend_from_slice(&padded);
            }
            element(e, &mut buf, MI_INT8, &names);
            for values in &s.elements {
                for item in values {
                    element(e, &mut buf, MI_MATRIX, &encode_matrix(e, "", item));
                }
            }
        }
        Value::Sparse(sparse) => {
            let mut flags = 0;
            if sparse.imag.is_some() {
                flags |= FLAG_COMPLEX;
            }
            if sparse.logical {
                flags |= FLAG_LOGICAL;
            }
            header(e, &mut buf, MX_SPARSE, flags, sparse.nnz(), &sparse.dims, name);
            let ncols = sparse.dims.get(1).copied().unwrap_or(0);
            let mut jc = vec![0usize; ncols + 1];
            for &col in &sparse.cols {
                jc[col + 1] += 1;
            }
            for c in 0..ncols {
                jc[c + 1] += jc[c];
            }
            element(e, &mut buf, MI_INT32, &int32s(e, sparse.rows.iter().copied()));
            element(e, &mut buf, MI_INT32, &int32s(e, jc));
            element(e, &mut buf, MI_DOUBLE, &doubles(e, &sparse.real));
            if let Some(imag) = &sparse.imag {
                element(e, &mut buf, MI_DOUBLE, &doubles(e, imag));
            }
        }
        Value::Opaque { .. } => {
            header(e, &mut buf, MX_FUNCTION, 0, 0, &[1, 1], name);
        }
    }
    buf
}
