//! Tagged data elements
//!
//! Every element starts with an 8-byte tag (data type, byte count) followed
//! by its data padded to an 8-byte boundary. Elements of at most 4 bytes may
//! use the packed "small data element" form, where the byte count lives in
//! the upper half of the first tag word and the data in the second.

use crate::MatError;

pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;
pub(crate) const MI_UTF32: u32 = 18;

pub(crate) const MX_CELL: u8 = 1;
pub(crate) const MX_STRUCT: u8 = 2;
pub(crate) const MX_OBJECT: u8 = 3;
pub(crate) const MX_CHAR: u8 = 4;
pub(crate) const MX_SPARSE: u8 = 5;
pub(crate) const MX_DOUBLE: u8 = 6;
pub(crate) const MX_SINGLE: u8 = 7;
pub(crate) const MX_INT8: u8 = 8;
pub(crate) const MX_UINT8: u8 = 9;
pub(crate) const MX_INT16: u8 = 10;
pub(crate) const MX_UINT16: u8 = 11;
pub(crate) const MX_INT32: u8 = 12;
pub(crate) const MX_UINT32: u8 = 13;
pub(crate) const MX_INT64: u8 = 14;
pub(crate) const MX_UINT64: u8 = 15;
pub(crate) const MX_FUNCTION: u8 = 16;
pub(crate) const MX_OPAQUE: u8 = 17;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
pub(crate) const FLAG_LOGICAL: u32 = 0x0200;

/// Byte order of a MAT file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    fn bytes<const N: usize>(c: &[u8]) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&c[..N]);
        out
    }

    pub fn u16(self, c: &[u8]) -> u16 {
        let b = Self::bytes::<2>(c);
        match self {
            Endian::Little => u16::from_le_bytes(b),
            Endian::Big => u16::from_be_bytes(b),
        }
    }

    pub fn u32(self, c: &[u8]) -> u32 {
        let b = Self::bytes::<4>(c);
        match self {
            Endian::Little => u32::from_le_bytes(b),
            Endian::Big => u32::from_be_bytes(b),
        }
    }

    pub fn u64(self, c: &[u8]) -> u64 {
        let b = Self::bytes::<8>(c);
        match self {
            Endian::Little => u64::from_le_bytes(b),
            Endian::Big => u64::from_be_bytes(b),
        }
    }
}

/// A single data element borrowed from the file buffer
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    pub data_type: u32,
    pub data: &'a [u8],
    pub offset: usize,
}

impl<'a> Element<'a> {
    pub fn expect_type(&self, data_type: u32, expected: &'static str) -> Result<(), MatError> {
        if self.data_type == data_type {
            Ok(())
        } else {
            Err(MatError::UnexpectedType {
                expected,
                found: self.data_type,
            })
        }
    }

    /// Decode the element's numeric data as `f64`s, whatever its storage type
    pub fn to_f64s(&self, endian: Endian) -> Result<Vec<f64>, MatError> {
        let d = self.data;
        let values = match self.data_type {
            MI_INT8 => d.iter().map(|&b| b as i8 as f64).collect(),
            MI_UINT8 => d.iter().map(|&b| b as f64).collect(),
            MI_INT16 => d
                .chunks_exact(2)
                .map(|c| endian.u16(c) as i16 as f64)
                .collect(),
            MI_UINT16 => d.chunks_exact(2).map(|c| endian.u16(c) as f64).collect(),
            MI_INT32 => d
                .chunks_exact(4)
                .map(|c| endian.u32(c) as i32 as f64)
                .collect(),
            MI_UINT32 => d.chunks_exact(4).map(|c| endian.u32(c) as f64).collect(),
            MI_INT64 => d
                .chunks_exact(8)
                .map(|c| endian.u64(c) as i64 as f64)
                .collect(),
            MI_UINT64 => d.chunks_exact(8).map(|c| endian.u64(c) as f64).collect(),
            MI_SINGLE => d
                .chunks_exact(4)
                .map(|c| f32::from_bits(endian.u32(c)) as f64)
                .collect(),
            MI_DOUBLE => d
                .chunks_exact(8)
                .map(|c| f64::from_bits(endian.u64(c)))
                .collect(),
            other => {
                return Err(MatError::UnexpectedType {
                    expected: "numeric data",
                    found: other,
                })
            }
        };
        Ok(values)
    }

    /// Decode integer data (dimensions, sparse indices, field name length)
    pub fn to_indices(&self, endian: Endian) -> Result<Vec<usize>, MatError> {
        self.to_f64s(endian)?
            .into_iter()
            .map(|v| {
                if v < 0.0 {
                    Err(MatError::Invalid(format!(
                        "negative index {} at offset {}",
                        v, self.offset
                    )))
                } else {
                    Ok(v as usize)
                }
            })
            .collect()
    }

    /// Decode character data in any of the encodings a char array may use
    pub fn to_text(&self, endian: Endian) -> Result<String, MatError> {
        let d = self.data;
        let text = match self.data_type {
            MI_UTF8 | MI_INT8 | MI_UINT8 => String::from_utf8_lossy(d).into_owned(),
            MI_UTF16 | MI_UINT16 | MI_INT16 => {
                let units: Vec<u16> = d.chunks_exact(2).map(|c| endian.u16(c)).collect();
                char::decode_utf16(units)
                    .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            MI_UTF32 | MI_UINT32 | MI_INT32 => d
                .chunks_exact(4)
                .map(|c| char::from_u32(endian.u32(c)).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
            other => {
                return Err(MatError::UnexpectedType {
                    expected: "character data",
                    found: other,
                })
            }
        };
        Ok(text)
    }

    /// Decode a NUL-padded name
    pub fn to_name(&self) -> String {
        let end = self
            .data
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.data.len());
        String::from_utf8_lossy(&self.data[..end]).into_owned()
    }
}

/// Sequential reader over a buffer of data elements
pub(crate) struct ElementReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ElementReader<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], MatError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(MatError::Truncated { offset: self.pos })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn align(&mut self) {
        let rem = self.pos % 8;
        if rem != 0 {
            self.pos = (self.pos + 8 - rem).min(self.data.len());
        }
    }

    /// Read the next element
    pub fn next_element(&mut self) -> Result<Element<'a>, MatError> {
        let offset = self.pos;
        let first = self.endian.u32(self.take(4)?);

        if first >> 16 != 0 {
            let nbytes = (first >> 16) as usize;
            if nbytes > 4 {
                return Err(MatError::Invalid(format!(
                    "small data element of {} bytes at offset {}",
                    nbytes, offset
                )));
            }
            let packed = self.take(4)?;
            return Ok(Element {
                data_type: first & 0xffff,
                data: &packed[..nbytes],
                offset,
            });
        }

        let nbytes = self.endian.u32(self.take(4)?) as usize;
        let data = self.take(nbytes)?;
        // compressed elements are written back to back without padding
        if first != MI_COMPRESSED {
            self.align();
        }
        Ok(Element {
            data_type: first,
            data,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_element() {
        // type miINT32, 4 bytes, value 32
        let mut buf = Vec::new();
        buf.extend_from_slice(&((4u32 << 16) | MI_INT32).to_le_bytes());
        buf.extend_from_slice(&32i32.to_le_bytes());

        let mut reader = ElementReader::new(&buf, Endian::Little);
        let el = reader.next_element().unwrap();
        assert_eq!(el.data_type, MI_INT32);
        assert_eq!(el.to_indices(Endian::Little).unwrap(), vec![32]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_padded_element() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MI_INT8.to_be_bytes());
        buf.extend_from_slice(&5u32.to_be_bytes());
        buf.extend_from_slice(b"hello\0\0\0");
        buf.extend_from_slice(&MI_UINT8.to_be_bytes());
        buf.extend_from_slice(&1u32.to_be_bytes());
        buf.extend_from_slice(&[7, 0, 0, 0, 0, 0, 0, 0]);

        let mut reader = ElementReader::new(&buf, Endian::Big);
        assert_eq!(reader.next_element().unwrap().to_name(), "hello");
        let second = reader.next_element().unwrap();
        assert_eq!(second.offset, 16);
        assert_eq!(second.to_f64s(Endian::Big).unwrap(), vec![7.0]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_element() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MI_DOUBLE.to_le_bytes());
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&[0; 8]);

        let mut reader = ElementReader::new(&buf, Endian::Little);
        assert!(matches!(
            reader.next_element(),
            Err(MatError::Truncated { offset: 8 })
        ));
    }

    #[test]
    fn test_text_encodings() {
        let utf16: Vec<u8> = "hé".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let el = Element {
            data_type: MI_UINT16,
            data: &utf16,
            offset: 0,
        };
        assert_eq!(el.to_text(Endian::Little).unwrap(), "hé");

        let el = Element {
            data_type: MI_DOUBLE,
            data: &[],
            offset: 0,
        };
        assert!(el.to_text(Endian::Little).is_err());
    }
}
