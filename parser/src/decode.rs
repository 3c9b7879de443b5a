//! The stateful decoder: reads headers and raw value bytes off a
//! [`Source`], tracking the running byte offset used to tag PARSE errors
//! and to compute `bytes_consumed_in_current_container` (§4.5).

use crate::byteorder::{read_u16, read_u32};
use crate::context::EncodingContext;
use crate::header::ElementHeader;
use dicom_core::dictionary::DataDictionary;
use dicom_core::error::{Error, Result};
use dicom_core::io::{Source, Whence};
use dicom_core::{Length, Tag, TagPath, VR};

/// Wraps a [`Source`] with the encoding rules in force and the current
/// absolute byte offset.
pub struct StatefulDecoder<'a> {
    src: &'a mut dyn Source,
    ctx: EncodingContext,
    pos: u64,
}

impl<'a> StatefulDecoder<'a> {
    /// Build a decoder starting at the source's current position.
    pub fn new(src: &'a mut dyn Source, ctx: EncodingContext) -> Result<Self> {
        let pos = src.position()?;
        Ok(StatefulDecoder { src, ctx, pos })
    }

    /// The encoding context in force.
    pub fn context(&self) -> EncodingContext {
        self.ctx
    }

    /// The current absolute byte offset.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move to an absolute offset.
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.src.seek(offset.try_into().map_err(|_| {
            Error::invalid("offset too large to represent as a signed seek target")
        })?, Whence::Set)?;
        self.pos = offset;
        Ok(())
    }

    /// Skip forward `n` bytes without reading them.
    pub fn skip_bytes(&mut self, n: u64) -> Result<()> {
        self.src.seek(n.try_into().map_err(|_| {
            Error::invalid("skip length too large to represent as a signed seek offset")
        })?, Whence::Cur)?;
        self.pos += n;
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let v = read_u16(self.src, self.ctx.byte_order)?;
        self.pos += 2;
        Ok(v)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let v = read_u32(self.src, self.ctx.byte_order)?;
        self.pos += 4;
        Ok(v)
    }

    /// Read exactly `len` bytes as the raw value payload.
    pub fn read_value_bytes(&mut self, len: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len as usize];
        self.src.read_exact(&mut buf)?;
        self.pos += len as u64;
        Ok(buf)
    }

    fn parse_error(&self, message: impl Into<String>, path: &[Tag]) -> Error {
        Error::parse(message, self.pos, path.to_vec())
    }

    /// Read one element or item header (§4.5's "Encoding dispatch").
    ///
    /// Item, Item Delimitation, and Sequence Delimitation markers never
    /// carry a VR field in either encoding: the header is just tag plus a
    /// 4-byte length. Any other tag is decoded per the implicit/explicit
    /// rules in force.
    pub fn read_element_header(
        &mut self,
        dict: &dyn DataDictionary,
        path: &TagPath,
    ) -> Result<ElementHeader> {
        let start = self.pos;
        let group = self.read_u16()?;
        let element = self.read_u16()?;
        let tag = Tag(group, element);

        if tag == Tag::ITEM || tag == Tag::ITEM_DELIMITER || tag == Tag::SEQUENCE_DELIMITER {
            let len = self.read_u32()?;
            return Ok(ElementHeader {
                tag,
                vr: VR::UN,
                len: Length::from(len),
                header_len: (self.pos - start) as u32,
            });
        }

        if self.ctx.explicit_vr {
            let mut vr_bytes = [0u8; 2];
            self.src.read_exact(&mut vr_bytes)?;
            self.pos += 2;
            let vr = VR::from_binary(vr_bytes);
            if vr == VR::ERROR {
                return Err(self.parse_error(
                    format!(
                        "unrecognized VR mnemonic {:?} for tag {tag}",
                        String::from_utf8_lossy(&vr_bytes)
                    ),
                    path,
                ));
            }
            let len = if vr.has_32_bit_length() {
                let mut reserved = [0u8; 2];
                self.src.read_exact(&mut reserved)?;
                self.pos += 2;
                self.read_u32()?
            } else {
                self.read_u16()? as u32
            };
            let len = Length::from(len);
            if len.is_undefined() && !vr.allows_undefined_length() {
                return Err(self.parse_error(
                    format!("VR {} for tag {tag} does not permit an undefined length", vr.mnemonic()),
                    path,
                ));
            }
            Ok(ElementHeader {
                tag,
                vr,
                len,
                header_len: (self.pos - start) as u32,
            })
        } else {
            let vr = dict.default_vr_from_tag(tag);
            let len = Length::from(self.read_u32()?);
            if len.is_undefined() && !vr.allows_undefined_length() {
                return Err(self.parse_error(
                    format!("VR {} for tag {tag} does not permit an undefined length", vr.mnemonic()),
                    path,
                ));
            }
            Ok(ElementHeader {
                tag,
                vr,
                len,
                header_len: (self.pos - start) as u32,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ByteOrder;
    use dicom_core::io::MemorySource;

    struct NullDict;
    impl DataDictionary for NullDict {
        fn by_tag(&self, _tag: Tag) -> Option<&dicom_core::dictionary::DictionaryEntry> {
            None
        }
        fn by_keyword(&self, _keyword: &str) -> Option<Tag> {
            None
        }
        fn is_encapsulated_transfer_syntax(&self, _uid: &str) -> bool {
            false
        }
    }

    #[test]
    fn reads_explicit_short_form_header() {
        // (0008,0060) CS, length 2, value "US"
        let bytes = vec![0x08, 0x00, 0x60, 0x00, b'C', b'S', 0x02, 0x00];
        let mut src = MemorySource::new(bytes);
        let ctx = EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        };
        let mut dec = StatefulDecoder::new(&mut src, ctx).unwrap();
        let header = dec.read_element_header(&NullDict, &vec![]).unwrap();
        assert_eq!(header.tag, Tag(0x0008, 0x0060));
        assert_eq!(header.vr, VR::CS);
        assert_eq!(header.len.get(), Some(2));
        assert_eq!(header.header_len, 8);
    }

    #[test]
    fn reads_explicit_long_form_header() {
        // (7FE0,0010) OB, reserved 0000, length 4
        let bytes = vec![
            0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        ];
        let mut src = MemorySource::new(bytes);
        let ctx = EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        };
        let mut dec = StatefulDecoder::new(&mut src, ctx).unwrap();
        let header = dec.read_element_header(&NullDict, &vec![]).unwrap();
        assert_eq!(header.vr, VR::OB);
        assert_eq!(header.len.get(), Some(4));
        assert_eq!(header.header_len, 12);
    }

    #[test]
    fn reads_item_header_without_vr() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut src = MemorySource::new(bytes);
        let ctx = EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        };
        let mut dec = StatefulDecoder::new(&mut src, ctx).unwrap();
        let header = dec.read_element_header(&NullDict, &vec![]).unwrap();
        assert_eq!(header.tag, Tag::ITEM);
        assert!(header.len.is_undefined());
        assert_eq!(header.header_len, 8);
    }

    #[test]
    fn undefined_length_on_a_vr_that_forbids_it_is_parse_error() {
        // (0008,0000) UC, long form (32-bit length), length 0xFFFFFFFF. UC
        // has a 32-bit length field but, unlike OB/OW/UN/SQ, does not
        // permit the undefined-length sentinel.
        let bytes = vec![
            0x08, 0x00, 0x00, 0x00, b'U', b'C', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        ];
        let mut src = MemorySource::new(bytes);
        let ctx = EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        };
        let mut dec = StatefulDecoder::new(&mut src, ctx).unwrap();
        let err = dec.read_element_header(&NullDict, &vec![]).unwrap_err();
        assert_eq!(err.code(), dicom_core::ErrorCode::Parse);
    }

    #[test]
    fn unknown_explicit_vr_is_parse_error() {
        let bytes = vec![0x08, 0x00, 0x60, 0x00, b'Z', b'Z', 0x02, 0x00];
        let mut src = MemorySource::new(bytes);
        let ctx = EncodingContext {
            byte_order: ByteOrder::LittleEndian,
            explicit_vr: true,
        };
        let mut dec = StatefulDecoder::new(&mut src, ctx).unwrap();
        let err = dec.read_element_header(&NullDict, &vec![]).unwrap_err();
        assert_eq!(err.code(), dicom_core::ErrorCode::Parse);
    }
}
