//! Consumes a [`DataSetReader`]'s token stream into an owned
//! [`dicom_core::DataSet`] tree (§4.4, §4.5).
//!
//! PixelData is special-cased at the top level only, per §4.5: the builder
//! records its location and stops, leaving every other top-level attribute
//! already collected intact in the returned data set.

use crate::dataset::{DataSetReader, DataToken};
use dicom_core::error::Result;
use dicom_core::{DataSet, Element, Sequence, Tag, VR};

/// Where the PixelData element's value lives on the wire, recorded instead
/// of read (§4.5, §4.6).
#[derive(Debug, Clone, Copy)]
pub struct PixelDataLocation {
    /// Absolute byte offset of the first value byte.
    pub absolute_offset: u64,
    /// The element's VR (OB, OW, or another binary VR seen on the wire).
    pub vr: VR,
    /// The raw length field as encoded (`0xFFFFFFFF` for undefined).
    pub length_field: u32,
    /// Whether the length field was undefined, meaning the value is a
    /// Basic-Offset-Table-led sequence of fragment items rather than a
    /// contiguous native blob.
    pub is_encapsulated: bool,
}

/// The result of building the top-level data set: the collected elements
/// (every attribute read before PixelData, if PixelData was present) and
/// PixelData's location, if the element was encountered.
pub struct BuiltDataSet {
    pub data_set: DataSet,
    pub pixel_data: Option<PixelDataLocation>,
}

/// Build the main data set, stopping at `(7FE0,0010)` PixelData if present.
pub fn build_top_level(reader: &mut DataSetReader) -> Result<BuiltDataSet> {
    let mut data_set = DataSet::new();
    let pixel_data = loop {
        match reader.next_token()? {
            None => break None,
            Some(DataToken::ElementHeader(header)) => {
                if header.tag == Tag::PIXEL_DATA {
                    let location = PixelDataLocation {
                        absolute_offset: reader.position(),
                        vr: header.vr,
                        length_field: header.len.get().unwrap_or(u32::MAX),
                        is_encapsulated: header.len.is_undefined(),
                    };
                    tracing::debug!(
                        offset = location.absolute_offset,
                        encapsulated = location.is_encapsulated,
                        "stopping at PixelData"
                    );
                    reader.skip_value()?;
                    let placeholder = Element::new(
                        header.tag,
                        header.vr,
                        if header.vr.category() == Some(dicom_core::vr::VrCategory::Binary) {
                            dicom_core::Value::Binary(Vec::new())
                        } else {
                            dicom_core::Value::Empty
                        },
                    );
                    data_set.insert(placeholder)?;
                    break Some(location);
                }
                let raw = reader.read_value()?;
                let mut element = Element::empty(header.tag, header.vr);
                assign_value_bytes(&mut element, &raw, reader.context_byte_order())?;
                data_set.insert(element)?;
            }
            Some(DataToken::SequenceStart(header)) => {
                let seq = build_sequence(reader)?;
                let mut element = Element::empty(header.tag, header.vr);
                element.set_sequence(seq)?;
                data_set.insert(element)?;
            }
            Some(other) => {
                return Err(dicom_core::Error::invalid(format!(
                    "unexpected token at top level of data set: {other:?}"
                )))
            }
        }
    };
    Ok(BuiltDataSet { data_set, pixel_data })
}

/// Build one nested data set (a sequence item's content), consuming tokens
/// until the matching `ItemEnd`.
fn build_item(reader: &mut DataSetReader) -> Result<DataSet> {
    let mut data_set = DataSet::new();
    loop {
        match reader.next_token()? {
            None => {
                return Err(dicom_core::Error::invalid(
                    "data source ended inside a sequence item",
                ))
            }
            Some(DataToken::ItemEnd) => return Ok(data_set),
            Some(DataToken::ElementHeader(header)) => {
                let raw = reader.read_value()?;
                let mut element = Element::empty(header.tag, header.vr);
                assign_value_bytes(&mut element, &raw, reader.context_byte_order())?;
                data_set.insert(element)?;
            }
            Some(DataToken::SequenceStart(header)) => {
                let seq = build_sequence(reader)?;
                let mut element = Element::empty(header.tag, header.vr);
                element.set_sequence(seq)?;
                data_set.insert(element)?;
            }
            Some(other) => {
                return Err(dicom_core::Error::invalid(format!(
                    "unexpected token inside a sequence item: {other:?}"
                )))
            }
        }
    }
}

/// Build a sequence's items, consuming tokens until `SequenceEnd`.
fn build_sequence(reader: &mut DataSetReader) -> Result<Sequence> {
    let mut seq = Sequence::new();
    loop {
        match reader.next_token()? {
            None => {
                return Err(dicom_core::Error::invalid(
                    "data source ended inside a sequence",
                ))
            }
            Some(DataToken::SequenceEnd) => return Ok(seq),
            Some(DataToken::ItemStart { len: _ }) => {
                let item = build_item(reader)?;
                seq.append(item)?;
            }
            Some(other) => {
                return Err(dicom_core::Error::invalid(format!(
                    "unexpected token inside a sequence: {other:?}"
                )))
            }
        }
    }
}

fn assign_value_bytes(
    element: &mut Element,
    raw: &[u8],
    wire_order: crate::context::ByteOrder,
) -> Result<()> {
    let vr = element.vr();
    let mut buf = raw.to_vec();
    if let Some(width) = vr.element_width() {
        crate::byteorder::swap_to_native(&mut buf, width, wire_order);
    }
    element.set_value_bytes(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ByteOrder, EncodingContext};
    use crate::decode::StatefulDecoder;
    use dicom_core::dictionary::{DataDictionary, DictionaryEntry};
    use dicom_core::io::MemorySource;

    struct NullDict;
    impl DataDictionary for NullDict {
        fn by_tag(&self, _tag: Tag) -> Option<&DictionaryEntry> {
            None
        }
        fn by_keyword(&self, _keyword: &str) -> Option<Tag> {
            None
        }
        fn is_encapsulated_transfer_syntax(&self, _uid: &str) -> bool {
            false
        }
    }

    fn explicit_le() -> EncodingContext {
        EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        }
    }

    #[test]
    fn builds_dataset_and_stops_at_pixel_data() {
        // (0008,0060) CS "US", (7FE0,0010) OW undefined... no, native OW len 4
        let mut bytes = vec![0x08, 0x00, 0x60, 0x00, b'C', b'S', 0x02, 0x00, b'U', b'S'];
        // (7FE0,0010) OW, reserved, length 4, then 4 bytes of pixel data
        bytes.extend_from_slice(&[0xE0, 0x7F, 0x10, 0x00, b'O', b'W', 0x00, 0x00]);
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);

        let mut src = MemorySource::new(bytes);
        let dec = StatefulDecoder::new(&mut src, explicit_le()).unwrap();
        let mut reader = DataSetReader::new(dec, &NullDict, None);

        let built = build_top_level(&mut reader).unwrap();
        assert_eq!(
            built
                .data_set
                .get(Tag(0x0008, 0x0060))
                .unwrap()
                .get_value_string(0)
                .unwrap(),
            "US"
        );
        let pixel_data = built.pixel_data.expect("pixel data location recorded");
        assert!(!pixel_data.is_encapsulated);
        assert_eq!(pixel_data.length_field, 4);
        // placeholder stored with zero length, not the actual pixel bytes
        assert_eq!(
            built
                .data_set
                .get(Tag(0x7FE0, 0x0010))
                .unwrap()
                .get_value_binary()
                .unwrap()
                .len(),
            0
        );
    }

    #[test]
    fn builds_nested_sequence_into_tree() {
        let mut bytes = vec![0x40, 0x00, 0x00, 0x01, b'S', b'Q', 0x00, 0x00];
        bytes.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        bytes.extend_from_slice(&[0xFE, 0xFF, 0x00, 0xE0]);
        bytes.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        bytes.extend_from_slice(&[0x40, 0x00, 0x09, 0x00, b'S', b'H', 0x02, 0x00]);
        bytes.extend_from_slice(b"A ");
        bytes.extend_from_slice(&[0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00]);

        let mut src = MemorySource::new(bytes);
        let dec = StatefulDecoder::new(&mut src, explicit_le()).unwrap();
        let mut reader = DataSetReader::new(dec, &NullDict, None);

        let built = build_top_level(&mut reader).unwrap();
        let sq = built
            .data_set
            .get(Tag(0x0040, 0x0100))
            .expect("sequence element present")
            .get_value_sequence()
            .unwrap();
        assert_eq!(sq.count(), 1);
        assert_eq!(
            sq.get(0)
                .unwrap()
                .get(Tag(0x0040, 0x0009))
                .unwrap()
                .get_value_string(0)
                .unwrap(),
            "A"
        );
    }
}
