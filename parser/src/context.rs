//! Resolving a Transfer Syntax UID into the encoding rules the stream
//! parser needs to follow (§4.5): byte order and explicit-vs-implicit VR.

use dicom_core::error::{Error, Result};
use dicom_dictionary_std::uids;

/// Multi-byte integer ordering used by a transfer syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// The encoding rules in force while parsing a data set: byte order and
/// whether each element carries its VR explicitly or the reader must look
/// it up (§4.5's "Encoding dispatch").
///
/// A nested sequence's items are parsed with this same context — a
/// transfer syntax never changes partway through a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingContext {
    pub byte_order: ByteOrder,
    pub explicit_vr: bool,
}

impl EncodingContext {
    /// Explicit VR Little Endian: always used for File Meta Information,
    /// regardless of the main data set's transfer syntax (§4.5).
    pub const FILE_META: EncodingContext = EncodingContext {
        byte_order: ByteOrder::LittleEndian,
        explicit_vr: true,
    };

    /// Resolve a transfer syntax UID into its encoding rules.
    ///
    /// Every transfer syntax that wraps a pixel codec (JPEG, JPEG 2000, RLE,
    /// ...) still encodes its data set header in Explicit VR Little Endian —
    /// only the Pixel Data payload differs, and that payload is returned
    /// undecoded (§1's Non-goals: "no image decompression"). Deflated
    /// Explicit VR Little Endian additionally wraps the post-File-Meta
    /// stream in a raw deflate block; this parser does not inflate it, so
    /// that single transfer syntax is reported as unsupported rather than
    /// silently misparsed.
    pub fn resolve(transfer_syntax_uid: &str) -> Result<EncodingContext> {
        let uid = transfer_syntax_uid.trim_end_matches('\0');
        match uid {
            uids::IMPLICIT_VR_LITTLE_ENDIAN => Ok(EncodingContext {
                byte_order: ByteOrder::LittleEndian,
                explicit_vr: false,
            }),
            uids::EXPLICIT_VR_BIG_ENDIAN => Ok(EncodingContext {
                byte_order: ByteOrder::BigEndian,
                explicit_vr: true,
            }),
            uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN => Err(Error::invalid(format!(
                "transfer syntax {uid} requires deflate decompression, which this reader does not perform"
            ))),
            _ => Ok(EncodingContext {
                byte_order: ByteOrder::LittleEndian,
                explicit_vr: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_vr_resolves_to_implicit_little_endian() {
        let ctx = EncodingContext::resolve(uids::IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert_eq!(ctx.byte_order, ByteOrder::LittleEndian);
        assert!(!ctx.explicit_vr);
    }

    #[test]
    fn explicit_big_endian_resolves() {
        let ctx = EncodingContext::resolve(uids::EXPLICIT_VR_BIG_ENDIAN).unwrap();
        assert_eq!(ctx.byte_order, ByteOrder::BigEndian);
        assert!(ctx.explicit_vr);
    }

    #[test]
    fn compressed_syntax_still_uses_explicit_vr_little_endian() {
        let ctx = EncodingContext::resolve(uids::JPEG2000_LOSSLESS).unwrap();
        assert_eq!(ctx.byte_order, ByteOrder::LittleEndian);
        assert!(ctx.explicit_vr);
    }

    #[test]
    fn deflated_syntax_is_unsupported() {
        assert!(EncodingContext::resolve(uids::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN).is_err());
    }
}
