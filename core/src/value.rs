//! The typed per-VR value model (§3, §4.3).

use crate::sequence::Sequence;
use smallvec::SmallVec;
use std::fmt;

/// An aggregation of one or more homogeneous items in a value. Most DICOM
/// values hold one or two logical items, so a small inline buffer avoids a
/// heap allocation for the common case.
pub type C<T> = SmallVec<[T; 2]>;

/// The category of a stored [`Value`], used by [`crate::Error::CastValue`]
/// to report what was actually found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// No value has been assigned yet.
    Empty,
    /// A list of character strings.
    StringList,
    /// An array of integers.
    IntArray,
    /// An array of floating-point numbers.
    FloatArray,
    /// An opaque run of bytes.
    Binary,
    /// A nested sequence of items.
    Sequence,
}

/// The concrete storage width and signedness of an [`IntArray`] value.
#[derive(Debug, Clone, PartialEq)]
pub enum IntArray {
    /// 16-bit signed (SS).
    I16(C<i16>),
    /// 16-bit unsigned (US).
    U16(C<u16>),
    /// 32-bit signed (SL), also used for AT (tag pairs packed as u32).
    I32(C<i32>),
    /// 32-bit unsigned (UL, OL).
    U32(C<u32>),
    /// 64-bit signed (SV).
    I64(C<i64>),
    /// 64-bit unsigned (UV, OV).
    U64(C<u64>),
}

impl IntArray {
    /// Number of logical values (the VM for this element, when the value is
    /// an integer array).
    pub fn len(&self) -> usize {
        match self {
            IntArray::I16(v) => v.len(),
            IntArray::U16(v) => v.len(),
            IntArray::I32(v) => v.len(),
            IntArray::U32(v) => v.len(),
            IntArray::I64(v) => v.len(),
            IntArray::U64(v) => v.len(),
        }
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a single value, widened to a signed 64-bit integer (§4.3:
    /// "Integer getter widens any stored integer width to 64-bit signed").
    pub fn get_widened(&self, index: usize) -> Option<i64> {
        match self {
            IntArray::I16(v) => v.get(index).map(|x| *x as i64),
            IntArray::U16(v) => v.get(index).map(|x| *x as i64),
            IntArray::I32(v) => v.get(index).map(|x| *x as i64),
            IntArray::U32(v) => v.get(index).map(|x| *x as i64),
            IntArray::I64(v) => v.get(index).copied(),
            IntArray::U64(v) => v.get(index).map(|x| *x as i64),
        }
    }

    /// Number of bytes the array would occupy on the wire, per element
    /// width.
    pub fn byte_len(&self) -> usize {
        match self {
            IntArray::I16(v) => v.len() * 2,
            IntArray::U16(v) => v.len() * 2,
            IntArray::I32(v) => v.len() * 4,
            IntArray::U32(v) => v.len() * 4,
            IntArray::I64(v) => v.len() * 8,
            IntArray::U64(v) => v.len() * 8,
        }
    }
}

/// The concrete storage width of a [`FloatArray`] value.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatArray {
    /// Single precision (FL, OF).
    F32(C<f32>),
    /// Double precision (FD, OD).
    F64(C<f64>),
}

impl FloatArray {
    /// Number of logical values.
    pub fn len(&self) -> usize {
        match self {
            FloatArray::F32(v) => v.len(),
            FloatArray::F64(v) => v.len(),
        }
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a single value, widened to double precision.
    pub fn get_widened(&self, index: usize) -> Option<f64> {
        match self {
            FloatArray::F32(v) => v.get(index).map(|x| *x as f64),
            FloatArray::F64(v) => v.get(index).copied(),
        }
    }

    /// Number of bytes the array would occupy on the wire.
    pub fn byte_len(&self) -> usize {
        match self {
            FloatArray::F32(v) => v.len() * 4,
            FloatArray::F64(v) => v.len() * 8,
        }
    }
}

/// The value held by a [`crate::Element`]: a tagged union over the five
/// categories from §3 (plus an `Empty` state for an element that has not
/// yet been assigned a value).
#[derive(Clone, PartialEq)]
pub enum Value {
    /// No value assigned yet.
    Empty,
    /// String VRs: a list of backslash-separated segments.
    StringList(C<String>),
    /// Integer VRs: AT, SL, SS, UL, US, SV, UV.
    IntArray(IntArray),
    /// Floating point VRs: FL, FD.
    FloatArray(FloatArray),
    /// Binary VRs: OB, OD, OF, OL, OV, OW, UN.
    Binary(Vec<u8>),
    /// SQ: a nested, ordered list of data set items.
    SequenceValue(Sequence),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "Empty"),
            Value::StringList(v) => write!(f, "StringList({v:?})"),
            Value::IntArray(v) => write!(f, "IntArray({v:?})"),
            Value::FloatArray(v) => write!(f, "FloatArray({v:?})"),
            Value::Binary(v) => write!(f, "Binary[{} bytes]", v.len()),
            Value::SequenceValue(s) => write!(f, "SequenceValue({} items)", s.count()),
        }
    }
}

impl Value {
    /// The category of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Empty => ValueType::Empty,
            Value::StringList(_) => ValueType::StringList,
            Value::IntArray(_) => ValueType::IntArray,
            Value::FloatArray(_) => ValueType::FloatArray,
            Value::Binary(_) => ValueType::Binary,
            Value::SequenceValue(_) => ValueType::Sequence,
        }
    }

    /// The Value Multiplicity: the number of logical values held (§3).
    /// `1` for binary and sequence values, `0` for an unassigned element.
    pub fn vm(&self) -> u32 {
        match self {
            Value::Empty => 0,
            Value::StringList(v) => v.len().max(1) as u32,
            Value::IntArray(v) => v.len() as u32,
            Value::FloatArray(v) => v.len() as u32,
            Value::Binary(_) => 1,
            Value::SequenceValue(_) => 1,
        }
    }

    /// The number of bytes this value occupies in its element's encoding.
    /// Returns `None` for sequences, whose wire length is determined by
    /// their child items and framing rather than by the value itself.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Value::Empty => Some(0),
            Value::StringList(v) => {
                let joined_len: usize = v.iter().map(|s| s.len()).sum::<usize>()
                    + v.len().saturating_sub(1); // backslash separators
                Some(joined_len + (joined_len % 2))
            }
            Value::IntArray(v) => Some(v.byte_len()),
            Value::FloatArray(v) => Some(v.byte_len()),
            Value::Binary(v) => Some(v.len()),
            Value::SequenceValue(_) => None,
        }
    }
}
