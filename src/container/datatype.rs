//! Datatypes, dataspaces and attribute values
//!
//! Attributes keep the datatype and dataspace they were written with together
//! with their raw little-endian bytes, so a file written by another producer
//! (32-bit integers, variable-length strings, padded strings) is represented
//! faithfully and can be told apart from the canonical ODIM_H5 encodings.

use crate::error::{OdimError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Padding convention of a fixed-length string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringPadding {
    NullTerminate,
    NullPad,
    SpacePad,
}

/// Storage datatype of an attribute or dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum Datatype {
    /// Integer of `size` bytes
    FixedPoint { size: usize, signed: bool },
    /// IEEE float of `size` bytes (4 or 8)
    FloatingPoint { size: usize },
    /// Fixed-length string, `size` bytes per element
    String { size: usize, padding: StringPadding },
    VariableLengthString,
    /// Enumeration stored as an unsigned integer of `size` bytes indexing `members`
    Enumeration { size: usize, members: Vec<String> },
    /// Object reference
    Reference,
}

impl Datatype {
    pub const REAL64: Datatype = Datatype::FloatingPoint { size: 8 };
    pub const INT64: Datatype = Datatype::FixedPoint {
        size: 8,
        signed: true,
    };
    pub const UINT8: Datatype = Datatype::FixedPoint {
        size: 1,
        signed: false,
    };

    /// Bytes per element, 0 for types without a fixed element size
    pub fn element_size(&self) -> usize {
        match self {
            Datatype::FixedPoint { size, .. }
            | Datatype::FloatingPoint { size }
            | Datatype::String { size, .. }
            | Datatype::Enumeration { size, .. } => *size,
            Datatype::VariableLengthString | Datatype::Reference => 0,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Datatype::String { .. } | Datatype::VariableLengthString
        )
    }

    /// Two-member enumeration named false/true
    pub fn is_boolean(&self) -> bool {
        match self {
            Datatype::Enumeration { members, .. } => {
                members.len() == 2
                    && members[0].eq_ignore_ascii_case("false")
                    && members[1].eq_ignore_ascii_case("true")
            }
            _ => false,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datatype::FixedPoint { size, signed: true } => write!(f, "{}-bit integer", size * 8),
            Datatype::FixedPoint {
                size,
                signed: false,
            } => write!(f, "{}-bit unsigned integer", size * 8),
            Datatype::FloatingPoint { size } => write!(f, "{}-bit real", size * 8),
            Datatype::String { size, .. } => write!(f, "fixed-length string ({} bytes)", size),
            Datatype::VariableLengthString => write!(f, "variable-length string"),
            Datatype::Enumeration { .. } => write!(f, "enumeration"),
            Datatype::Reference => write!(f, "object reference"),
        }
    }
}

/// Shape of an attribute or dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataspace {
    Scalar,
    Simple(Vec<u64>),
}

impl Dataspace {
    pub fn rank(&self) -> usize {
        match self {
            Dataspace::Scalar => 0,
            Dataspace::Simple(dims) => dims.len(),
        }
    }

    /// Number of elements (1 for a scalar)
    pub fn element_count(&self) -> Result<usize> {
        match self {
            Dataspace::Scalar => Ok(1),
            Dataspace::Simple(dims) => dims
                .iter()
                .try_fold(1u64, |count, dim| count.checked_mul(*dim))
                .and_then(|count| usize::try_from(count).ok())
                .ok_or_else(|| OdimError::DataspaceOverflow { dims: dims.clone() }),
        }
    }
}

/// Decoded attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    F64(f64),
    I64(i64),
    StringArray(Vec<String>),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
}

impl AttrValue {
    /// Numeric elements as reals, `None` for text
    pub fn to_reals(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::F64(v) => Some(vec![*v]),
            AttrValue::I64(v) => Some(vec![*v as f64]),
            AttrValue::F64Array(v) => Some(v.clone()),
            AttrValue::I64Array(v) => Some(v.iter().map(|x| *x as f64).collect()),
            AttrValue::String(_) | AttrValue::StringArray(_) => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            AttrValue::StringArray(_) | AttrValue::F64Array(_) | AttrValue::I64Array(_)
        )
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(items: &[T]) -> String {
            items
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(",")
        }
        match self {
            AttrValue::String(s) => write!(f, "{}", s),
            AttrValue::F64(v) => write!(f, "{}", v),
            AttrValue::I64(v) => write!(f, "{}", v),
            AttrValue::StringArray(v) => write!(f, "{}", join(v)),
            AttrValue::F64Array(v) => write!(f, "{}", join(v)),
            AttrValue::I64Array(v) => write!(f, "{}", join(v)),
        }
    }
}

/// Attribute as stored in a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub datatype: Datatype,
    pub dataspace: Dataspace,
    pub raw: Vec<u8>,
}

impl Attribute {
    /// Encode `value` using the canonical ODIM_H5 representation: 64-bit reals,
    /// 64-bit signed integers and null-terminated strings sized to their content.
    pub fn canonical(value: &AttrValue) -> Self {
        match value {
            AttrValue::String(s) => {
                let mut raw = s.as_bytes().to_vec();
                raw.push(0);
                Attribute {
                    datatype: Datatype::String {
                        size: raw.len(),
                        padding: StringPadding::NullTerminate,
                    },
                    dataspace: Dataspace::Scalar,
                    raw,
                }
            }
            AttrValue::F64(v) => Attribute {
                datatype: Datatype::REAL64,
                dataspace: Dataspace::Scalar,
                raw: v.to_le_bytes().to_vec(),
            },
            AttrValue::I64(v) => Attribute {
                datatype: Datatype::INT64,
                dataspace: Dataspace::Scalar,
                raw: v.to_le_bytes().to_vec(),
            },
            AttrValue::F64Array(values) => Attribute {
                datatype: Datatype::REAL64,
                dataspace: Dataspace::Simple(vec![values.len() as u64]),
                raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            },
            AttrValue::I64Array(values) => Attribute {
                datatype: Datatype::INT64,
                dataspace: Dataspace::Simple(vec![values.len() as u64]),
                raw: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
            },
            AttrValue::StringArray(values) => {
                let size = values.iter().map(|s| s.len()).max().unwrap_or(0) + 1;
                let mut raw = Vec::with_capacity(size * values.len());
                for s in values {
                    raw.extend_from_slice(s.as_bytes());
                    raw.resize(raw.len() + size - s.len(), 0);
                }
                Attribute {
                    datatype: Datatype::String {
                        size,
                        padding: StringPadding::NullTerminate,
                    },
                    dataspace: Dataspace::Simple(vec![values.len() as u64]),
                    raw,
                }
            }
        }
    }

    /// Canonical fixed-length string
    pub fn string(value: &str) -> Self {
        Self::canonical(&AttrValue::String(value.to_string()))
    }

    /// Canonical 64-bit real
    pub fn real(value: f64) -> Self {
        Self::canonical(&AttrValue::F64(value))
    }

    /// Canonical 64-bit integer
    pub fn integer(value: i64) -> Self {
        Self::canonical(&AttrValue::I64(value))
    }

    /// Encode `value` with an explicit datatype and dataspace.
    ///
    /// Used for attributes that are not canonically encoded, e.g. the 32-bit
    /// integers or variable-length strings written by some producers.
    pub fn encode(datatype: Datatype, dataspace: Dataspace, value: &AttrValue) -> Result<Self> {
        let count = dataspace.element_count()?;
        let mismatch = |what: &str| OdimError::WrongType {
            path: value.to_string(),
            expected: what.to_string(),
        };

        let raw = match &datatype {
            Datatype::FixedPoint { size, signed } => {
                let values = integer_elements(value).ok_or_else(|| mismatch("an integer value"))?;
                check_count(values.len(), count)?;
                let mut raw = Vec::with_capacity(size * count);
                for v in values {
                    raw.extend(encode_integer(v, *size, *signed)?);
                }
                raw
            }
            Datatype::Enumeration { size, members } => {
                let values = integer_elements(value).ok_or_else(|| mismatch("an integer value"))?;
                check_count(values.len(), count)?;
                let mut raw = Vec::with_capacity(size * count);
                for v in values {
                    if v < 0 || v as usize >= members.len() {
                        return Err(mismatch("an enumeration index"));
                    }
                    raw.extend(encode_integer(v, *size, false)?);
                }
                raw
            }
            Datatype::FloatingPoint { size } => {
                let values = value.to_reals().ok_or_else(|| mismatch("a real value"))?;
                check_count(values.len(), count)?;
                let mut raw = Vec::with_capacity(size * count);
                for v in values {
                    match size {
                        4 => raw.extend_from_slice(&(v as f32).to_le_bytes()),
                        8 => raw.extend_from_slice(&v.to_le_bytes()),
                        other => {
                            return Err(OdimError::Unsupported(format!(
                                "{}-byte floating point",
                                other
                            )))
                        }
                    }
                }
                raw
            }
            Datatype::String { size, padding } => {
                let values = string_elements(value).ok_or_else(|| mismatch("a string value"))?;
                check_count(values.len(), count)?;
                let fill = match padding {
                    StringPadding::SpacePad => b' ',
                    _ => 0,
                };
                let mut raw = Vec::with_capacity(size * count);
                for s in values {
                    let needed = match padding {
                        StringPadding::NullTerminate => s.len() + 1,
                        _ => s.len(),
                    };
                    if needed > *size {
                        return Err(mismatch(&format!("a string of at most {} bytes", size)));
                    }
                    raw.extend_from_slice(s.as_bytes());
                    raw.resize(raw.len() + *size - s.len(), fill);
                }
                raw
            }
            Datatype::VariableLengthString | Datatype::Reference => {
                let values = string_elements(value).ok_or_else(|| mismatch("a string value"))?;
                check_count(values.len(), count)?;
                let mut raw = Vec::new();
                for s in values {
                    raw.extend_from_slice(s.as_bytes());
                    raw.push(0);
                }
                raw
            }
        };

        Ok(Attribute {
            datatype,
            dataspace,
            raw,
        })
    }

    /// Decode the raw bytes without any standard-compliance checks
    pub fn decode(&self, path: &str) -> Result<AttrValue> {
        let corrupt = |reason: String| OdimError::BadEncoding {
            path: path.to_string(),
            reason,
        };
        let count = self
            .dataspace
            .element_count()
            .map_err(|e| corrupt(e.to_string()))?;
        let scalar = self.dataspace.rank() == 0;

        match &self.datatype {
            Datatype::FixedPoint { size, signed } => {
                let values = self.chunks(*size, count).map_err(corrupt)?;
                let values = values
                    .iter()
                    .map(|chunk| decode_integer(chunk, *signed))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(corrupt)?;
                Ok(integers(values, scalar))
            }
            Datatype::Enumeration { size, .. } => {
                let values = self.chunks(*size, count).map_err(corrupt)?;
                let values = values
                    .iter()
                    .map(|chunk| decode_integer(chunk, false))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(corrupt)?;
                Ok(integers(values, scalar))
            }
            Datatype::FloatingPoint { size } => {
                let chunks = self.chunks(*size, count).map_err(corrupt)?;
                let mut values = Vec::with_capacity(count);
                for chunk in chunks {
                    let v = match *size {
                        4 => f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64,
                        8 => {
                            let mut bytes = [0u8; 8];
                            bytes.copy_from_slice(chunk);
                            f64::from_le_bytes(bytes)
                        }
                        other => return Err(corrupt(format!("{}-byte floating point", other))),
                    };
                    values.push(v);
                }
                if scalar {
                    Ok(AttrValue::F64(values[0]))
                } else {
                    Ok(AttrValue::F64Array(values))
                }
            }
            Datatype::String { size, padding } => {
                let chunks = self.chunks(*size, count).map_err(corrupt)?;
                let values: Vec<String> = chunks
                    .iter()
                    .map(|chunk| fixed_string_content(chunk, *padding))
                    .collect();
                Ok(strings(values, scalar))
            }
            Datatype::VariableLengthString | Datatype::Reference => {
                let mut values: Vec<String> = self
                    .raw
                    .split(|b| *b == 0)
                    .map(|s| String::from_utf8_lossy(s).into_owned())
                    .collect();
                // trailing terminator leaves one empty piece behind
                values.pop();
                if values.len() != count {
                    return Err(corrupt(format!(
                        "expected {} strings, found {}",
                        count,
                        values.len()
                    )));
                }
                Ok(strings(values, scalar))
            }
        }
    }

    /// Reason why this attribute is not encoded the way ODIM_H5 requires
    /// strings to be encoded, if any.
    pub fn encoding_issue(&self) -> Option<String> {
        match &self.datatype {
            Datatype::VariableLengthString => {
                Some("variable-length string, fixed-length string expected".to_string())
            }
            Datatype::String { size, padding } if self.dataspace.rank() == 0 => {
                let content = fixed_string_content(&self.raw, *padding);
                if content.len() + 1 != *size {
                    Some(format!(
                        "string size is {} bytes, content '{}' needs {} bytes including terminator",
                        size,
                        content,
                        content.len() + 1
                    ))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn chunks(&self, size: usize, count: usize) -> std::result::Result<Vec<&[u8]>, String> {
        if size == 0 || self.raw.len() != size * count {
            return Err(format!(
                "{} raw bytes do not hold {} elements of {} bytes",
                self.raw.len(),
                count,
                size
            ));
        }
        Ok(self.raw.chunks(size).collect())
    }
}

fn check_count(found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(OdimError::WrongType {
            path: format!("{} values", found),
            expected: format!("{} values", expected),
        });
    }
    Ok(())
}

fn integer_elements(value: &AttrValue) -> Option<Vec<i64>> {
    let integral = |v: f64| (v.fract() == 0.0).then_some(v as i64);
    match value {
        AttrValue::I64(v) => Some(vec![*v]),
        AttrValue::I64Array(v) => Some(v.clone()),
        AttrValue::F64(v) => integral(*v).map(|i| vec![i]),
        AttrValue::F64Array(v) => v.iter().map(|x| integral(*x)).collect(),
        AttrValue::String(_) | AttrValue::StringArray(_) => None,
    }
}

fn string_elements(value: &AttrValue) -> Option<Vec<String>> {
    match value {
        AttrValue::String(s) => Some(vec![s.clone()]),
        AttrValue::StringArray(v) => Some(v.clone()),
        _ => None,
    }
}

fn encode_integer(value: i64, size: usize, signed: bool) -> Result<Vec<u8>> {
    let out_of_range = || OdimError::WrongType {
        path: value.to_string(),
        expected: format!(
            "within the range of a {}-bit {}integer",
            size * 8,
            if signed { "" } else { "unsigned " }
        ),
    };
    let bytes = match (size, signed) {
        (1, true) => i8::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (2, true) => i16::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (4, true) => i32::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (8, true) => value.to_le_bytes().to_vec(),
        (1, false) => u8::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (2, false) => u16::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (4, false) => u32::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (8, false) => u64::try_from(value).map_err(|_| out_of_range())?.to_le_bytes().to_vec(),
        (other, _) => {
            return Err(OdimError::Unsupported(format!(
                "{}-byte integer",
                other
            )))
        }
    };
    Ok(bytes)
}

fn decode_integer(chunk: &[u8], signed: bool) -> std::result::Result<i64, String> {
    if chunk.len() > 8 {
        return Err(format!("{}-byte integer", chunk.len()));
    }
    let mut buf = [0u8; 8];
    buf[..chunk.len()].copy_from_slice(chunk);
    match (chunk.len(), signed) {
        (1, true) => Ok(chunk[0] as i8 as i64),
        (2, true) => Ok(i16::from_le_bytes([chunk[0], chunk[1]]) as i64),
        (4, true) => Ok(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64),
        (8, true) => Ok(i64::from_le_bytes(buf)),
        (1 | 2 | 4, false) => Ok(u64::from_le_bytes(buf) as i64),
        (8, false) => {
            i64::try_from(u64::from_le_bytes(buf)).map_err(|_| "unsigned value overflows".into())
        }
        (other, _) => Err(format!("{}-byte integer", other)),
    }
}

fn fixed_string_content(chunk: &[u8], padding: StringPadding) -> String {
    let text = match padding {
        StringPadding::NullTerminate | StringPadding::NullPad => {
            let end = chunk.iter().position(|b| *b == 0).unwrap_or(chunk.len());
            &chunk[..end]
        }
        StringPadding::SpacePad => {
            let end = chunk
                .iter()
                .rposition(|b| *b != b' ' && *b != 0)
                .map_or(0, |i| i + 1);
            &chunk[..end]
        }
    };
    String::from_utf8_lossy(text).into_owned()
}

fn integers(values: Vec<i64>, scalar: bool) -> AttrValue {
    if scalar {
        AttrValue::I64(values[0])
    } else {
        AttrValue::I64Array(values)
    }
}

fn strings(mut values: Vec<String>, scalar: bool) -> AttrValue {
    if scalar {
        AttrValue::String(values.swap_remove(0))
    } else {
        AttrValue::StringArray(values)
    }
}
