//! A DICOM data element: `{tag, vr, length, vm, value}` (§3, §4.3).

use crate::error::{CastValueSnafu, Error, Result};
use crate::length::Length;
use crate::sequence::Sequence;
use crate::tag::Tag;
use crate::value::{FloatArray, IntArray, Value, ValueType, C};
use crate::vr::{VrCategory, VR};

/// An owned DICOM data element.
///
/// Setters validate that the element's VR is compatible with the value
/// category being assigned; on failure the element is left unchanged (§4.3,
/// §7: "the target object is left in its previous state").
///
/// Each setter comes in two flavors per the ownership-transfer discipline
/// named in §9's REDESIGN FLAGS: a `..._owned` entry point that adopts a
/// buffer the caller already has, and a plain entry point that copies from
/// a borrowed slice. Both leave the element untouched on failure, so the
/// caller never ends up holding a half-adopted buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: Tag,
    vr: VR,
    value: Value,
}

impl Element {
    /// Create an element with no value assigned yet.
    pub fn empty(tag: Tag, vr: VR) -> Self {
        Element {
            tag,
            vr,
            value: Value::Empty,
        }
    }

    /// Create an element from already-known parts. Does not check whether
    /// `vr` is compatible with `value`'s category; use the setters for a
    /// validated construction path.
    pub fn new(tag: Tag, vr: VR, value: Value) -> Self {
        Element { tag, vr, value }
    }

    /// The element's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The element's value representation.
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The element's value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The serialized size of the value, in bytes, under the element's
    /// encoding. `None` for a sequence, whose size is determined by its
    /// items and item framing rather than by the value alone.
    pub fn length(&self) -> Option<Length> {
        self.value.byte_len().map(|n| Length::defined(n as u32))
    }

    /// The Value Multiplicity: the number of logical values held.
    pub fn vm(&self) -> u32 {
        self.value.vm()
    }

    /// Whether this element holds more than one logical value.
    pub fn is_multi_valued(&self) -> bool {
        self.vm() > 1
    }

    fn require_category(&self, want: VrCategory) -> Result<()> {
        match self.vr.category() {
            Some(cat) if cat == want => Ok(()),
            _ => Err(Error::invalid(format!(
                "VR {} is not compatible with a {:?} value",
                self.vr, want
            ))),
        }
    }

    /// Set a single string value, copying from a borrowed slice. Fails
    /// unless the VR category is `Str`.
    pub fn set_string(&mut self, value: &str) -> Result<()> {
        self.set_string_owned(value.to_owned())
    }

    /// Set a single string value, adopting the given `String`.
    pub fn set_string_owned(&mut self, value: String) -> Result<()> {
        self.require_category(VrCategory::Str)?;
        let mut list = C::new();
        list.push(value);
        self.value = Value::StringList(list);
        Ok(())
    }

    /// Set a multi-valued string, copying each segment. Fails unless the
    /// VR category is `Str` and the VR permits VM > 1.
    pub fn set_string_multi(&mut self, values: &[&str]) -> Result<()> {
        self.set_string_multi_owned(values.iter().map(|s| (*s).to_owned()).collect())
    }

    /// Set a multi-valued string, adopting the given list.
    pub fn set_string_multi_owned(&mut self, values: Vec<String>) -> Result<()> {
        self.require_category(VrCategory::Str)?;
        if values.len() > 1 && !self.vr.allows_multi_value() {
            return Err(Error::invalid(format!(
                "VR {} does not permit a value multiplicity greater than one",
                self.vr
            )));
        }
        self.value = Value::StringList(values.into_iter().collect());
        Ok(())
    }

    /// Set a single integer value. Fails unless the VR category is `Int`.
    pub fn set_integer(&mut self, value: i64) -> Result<()> {
        self.require_category(VrCategory::Int)?;
        self.value = Value::IntArray(pack_int_array(self.vr, &[value]));
        Ok(())
    }

    /// Set a multi-valued numeric array, reinterpreting the given values at
    /// the element width implied by the VR. Fails unless the VR category is
    /// `Int`.
    pub fn set_numeric_multi(&mut self, values: &[i64]) -> Result<()> {
        self.require_category(VrCategory::Int)?;
        if values.len() > 1 && !self.vr.allows_multi_value() {
            return Err(Error::invalid(format!(
                "VR {} does not permit a value multiplicity greater than one",
                self.vr
            )));
        }
        self.value = Value::IntArray(pack_int_array(self.vr, values));
        Ok(())
    }

    /// Set a single floating-point value. Fails unless the VR category is
    /// `Float`.
    pub fn set_floatingpoint(&mut self, value: f64) -> Result<()> {
        self.require_category(VrCategory::Float)?;
        self.value = Value::FloatArray(pack_float_array(self.vr, &[value]));
        Ok(())
    }

    /// Set a multi-valued floating point array. Fails unless the VR
    /// category is `Float`.
    pub fn set_floatingpoint_multi(&mut self, values: &[f64]) -> Result<()> {
        self.require_category(VrCategory::Float)?;
        self.value = Value::FloatArray(pack_float_array(self.vr, values));
        Ok(())
    }

    /// Set a binary value, copying from a borrowed slice. Fails unless the
    /// VR category is `Binary`.
    pub fn set_binary(&mut self, value: &[u8]) -> Result<()> {
        self.set_binary_owned(value.to_vec())
    }

    /// Set a binary value, adopting the given buffer.
    pub fn set_binary_owned(&mut self, value: Vec<u8>) -> Result<()> {
        self.require_category(VrCategory::Binary)?;
        self.value = Value::Binary(value);
        Ok(())
    }

    /// Set a nested sequence value, adopting it. Fails unless `vr` is `SQ`.
    pub fn set_sequence(&mut self, value: Sequence) -> Result<()> {
        self.require_category(VrCategory::Sequence)?;
        self.value = Value::SequenceValue(value);
        Ok(())
    }

    /// Set the value from an untyped byte buffer, interpreted per the
    /// element's VR (§4.3: "untyped byte path used by the parser"). Numeric
    /// bytes are assumed to already be in host byte order; the caller (the
    /// stream parser) is responsible for any endianness swap.
    pub fn set_value_bytes(&mut self, raw: &[u8]) -> Result<()> {
        match self.vr.category() {
            Some(VrCategory::Str) => {
                let text = std::str::from_utf8(raw)
                    .map_err(|_| Error::invalid("value is not valid UTF-8 text"))?
                    .trim_end_matches(['\0', ' ']);
                let values: Vec<String> = if self.vr.allows_multi_value() {
                    text.split('\\').map(|s| s.to_owned()).collect()
                } else {
                    vec![text.to_owned()]
                };
                self.value = Value::StringList(values.into_iter().collect());
                Ok(())
            }
            Some(VrCategory::Int) => {
                let width = self.vr.element_width().unwrap_or(2);
                if raw.len() % width != 0 {
                    return Err(Error::invalid(format!(
                        "value length {} is not a multiple of element width {}",
                        raw.len(),
                        width
                    )));
                }
                self.value = Value::IntArray(unpack_int_array(self.vr, raw));
                Ok(())
            }
            Some(VrCategory::Float) => {
                let width = self.vr.element_width().unwrap_or(4);
                if raw.len() % width != 0 {
                    return Err(Error::invalid(format!(
                        "value length {} is not a multiple of element width {}",
                        raw.len(),
                        width
                    )));
                }
                self.value = Value::FloatArray(unpack_float_array(self.vr, raw));
                Ok(())
            }
            Some(VrCategory::Binary) => {
                self.value = Value::Binary(raw.to_vec());
                Ok(())
            }
            Some(VrCategory::Sequence) | None => Err(Error::invalid(format!(
                "VR {} cannot be assigned from a raw byte buffer",
                self.vr
            ))),
        }
    }

    /// Retrieve one logical string value. Fails if the category is not
    /// `Str` or `index` is out of range.
    pub fn get_value_string(&self, index: usize) -> Result<&str> {
        match &self.value {
            Value::StringList(values) => values
                .get(index)
                .map(String::as_str)
                .ok_or_else(|| Error::invalid(format!("string index {index} out of range"))),
            other => CastValueSnafu {
                requested: "string",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Retrieve one logical integer value, widened to signed 64-bit.
    pub fn get_value_integer(&self, index: usize) -> Result<i64> {
        match &self.value {
            Value::IntArray(values) => values
                .get_widened(index)
                .ok_or_else(|| Error::invalid(format!("integer index {index} out of range"))),
            other => CastValueSnafu {
                requested: "integer",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Retrieve one logical floating-point value, widened to double
    /// precision.
    pub fn get_value_floatingpoint(&self, index: usize) -> Result<f64> {
        match &self.value {
            Value::FloatArray(values) => values
                .get_widened(index)
                .ok_or_else(|| Error::invalid(format!("float index {index} out of range"))),
            other => CastValueSnafu {
                requested: "float",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Retrieve the binary value.
    pub fn get_value_binary(&self) -> Result<&[u8]> {
        match &self.value {
            Value::Binary(bytes) => Ok(bytes),
            other => CastValueSnafu {
                requested: "binary",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Retrieve the nested sequence.
    pub fn get_value_sequence(&self) -> Result<&Sequence> {
        match &self.value {
            Value::SequenceValue(seq) => Ok(seq),
            other => CastValueSnafu {
                requested: "sequence",
                got: other.value_type(),
            }
            .fail(),
        }
    }

    /// Render this element for diagnostics: one line, `indent`-prefixed,
    /// tag in `(gggg,eeee)` hex, VR mnemonic, VM, then a truncated value.
    /// Sequences recurse with `indent + 2` (§4.3).
    pub fn print(&self, indent: usize, out: &mut dyn std::fmt::Write) -> std::fmt::Result {
        let pad = " ".repeat(indent);
        match &self.value {
            Value::SequenceValue(seq) => {
                writeln!(out, "{pad}{} {} VM={} SQ ({} items)", self.tag, self.vr, self.vm(), seq.count())?;
                for item in seq.items() {
                    writeln!(out, "{pad}  item:")?;
                    item.foreach(|e| {
                        let _ = e.print(indent + 4, out);
                    });
                }
                Ok(())
            }
            other => {
                let rendered = render_value_preview(other);
                writeln!(
                    out,
                    "{pad}{} {} VM={} {}",
                    self.tag,
                    self.vr,
                    self.vm(),
                    rendered
                )
            }
        }
    }
}

const PREVIEW_LIMIT: usize = 64;

fn render_value_preview(value: &Value) -> String {
    let full = match value {
        Value::Empty => "(no value)".to_string(),
        Value::StringList(v) => v.join("\\"),
        Value::IntArray(v) => format!("{v:?}"),
        Value::FloatArray(v) => format!("{v:?}"),
        Value::Binary(v) => format!("<{} bytes>", v.len()),
        Value::SequenceValue(_) => unreachable!("handled by caller"),
    };
    if full.len() > PREVIEW_LIMIT {
        format!("{}...", &full[..PREVIEW_LIMIT])
    } else {
        full
    }
}

fn pack_int_array(vr: VR, values: &[i64]) -> IntArray {
    match vr {
        VR::SS => IntArray::I16(values.iter().map(|v| *v as i16).collect()),
        VR::US => IntArray::U16(values.iter().map(|v| *v as u16).collect()),
        VR::SL | VR::AT => IntArray::I32(values.iter().map(|v| *v as i32).collect()),
        VR::UL | VR::OL => IntArray::U32(values.iter().map(|v| *v as u32).collect()),
        VR::SV => IntArray::I64(values.to_vec().into_iter().collect()),
        VR::UV | VR::OV => IntArray::U64(values.iter().map(|v| *v as u64).collect()),
        _ => IntArray::I32(values.iter().map(|v| *v as i32).collect()),
    }
}

fn pack_float_array(vr: VR, values: &[f64]) -> FloatArray {
    match vr {
        VR::FL | VR::OF => FloatArray::F32(values.iter().map(|v| *v as f32).collect()),
        _ => FloatArray::F64(values.to_vec().into_iter().collect()),
    }
}

fn unpack_int_array(vr: VR, raw: &[u8]) -> IntArray {
    match vr {
        VR::SS => IntArray::I16(
            raw.chunks_exact(2)
                .map(|c| i16::from_ne_bytes([c[0], c[1]]))
                .collect(),
        ),
        VR::US => IntArray::U16(
            raw.chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                .collect(),
        ),
        VR::SL | VR::AT => IntArray::I32(
            raw.chunks_exact(4)
                .map(|c| i32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        VR::UL | VR::OL => IntArray::U32(
            raw.chunks_exact(4)
                .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        VR::SV => IntArray::I64(
            raw.chunks_exact(8)
                .map(|c| i64::from_ne_bytes(c.try_into().unwrap()))
                .collect(),
        ),
        VR::UV | VR::OV => IntArray::U64(
            raw.chunks_exact(8)
                .map(|c| u64::from_ne_bytes(c.try_into().unwrap()))
                .collect(),
        ),
        _ => IntArray::U16(
            raw.chunks_exact(2)
                .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                .collect(),
        ),
    }
}

fn unpack_float_array(vr: VR, raw: &[u8]) -> FloatArray {
    match vr {
        VR::FL | VR::OF => FloatArray::F32(
            raw.chunks_exact(4)
                .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
                .collect(),
        ),
        _ => FloatArray::F64(
            raw.chunks_exact(8)
                .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
                .collect(),
        ),
    }
}

impl From<ValueType> for &'static str {
    fn from(v: ValueType) -> Self {
        match v {
            ValueType::Empty => "empty",
            ValueType::StringList => "string list",
            ValueType::IntArray => "integer array",
            ValueType::FloatArray => "float array",
            ValueType::Binary => "binary",
            ValueType::Sequence => "sequence",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_setter_rejects_wrong_category() {
        let mut e = Element::empty(Tag(0x0028, 0x0010), VR::US);
        assert!(e.set_string("oops").is_err());
        // left unchanged
        assert_eq!(e.value(), &Value::Empty);
    }

    #[test]
    fn integer_roundtrip_widens_to_i64() {
        let mut e = Element::empty(Tag(0x0028, 0x0010), VR::US);
        e.set_integer(512).unwrap();
        assert_eq!(e.get_value_integer(0).unwrap(), 512);
    }

    #[test]
    fn multi_valued_flag() {
        let mut e = Element::empty(Tag(0x0040, 0x0009), VR::SH);
        e.set_string_multi(&["A", "B"]).unwrap();
        assert!(e.is_multi_valued());
        assert_eq!(e.vm(), 2);
        assert_eq!(e.get_value_string(1).unwrap(), "B");
    }

    #[test]
    fn clone_is_deep() {
        let mut e = Element::empty(Tag(0x0010, 0x0010), VR::PN);
        e.set_string("DOE^JOHN").unwrap();
        let clone = e.clone();
        e.set_string("SMITH^JANE").unwrap();
        assert_eq!(clone.get_value_string(0).unwrap(), "DOE^JOHN");
        assert_eq!(e.get_value_string(0).unwrap(), "SMITH^JANE");
    }

    #[test]
    fn set_value_bytes_dispatches_by_vr() {
        let mut e = Element::empty(Tag(0x0028, 0x0010), VR::US);
        e.set_value_bytes(&512u16.to_ne_bytes()).unwrap();
        assert_eq!(e.get_value_integer(0).unwrap(), 512);
    }
}
