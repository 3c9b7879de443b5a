//! The decoded header of one data element or item (§4.5).

use dicom_core::{Length, Tag, VR};

/// A data element header: tag, VR, value length, and the number of bytes
/// the header itself occupied on the wire (needed to track
/// `bytes_consumed_in_current_container`, per §4.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementHeader {
    pub tag: Tag,
    pub vr: VR,
    pub len: Length,
    pub header_len: u32,
}

impl ElementHeader {
    /// Whether this header's tag is one of the three delimiter markers
    /// under the `(FFFE,...)` group (Item, Item Delimitation, Sequence
    /// Delimitation).
    pub fn is_delimiter(&self) -> bool {
        self.tag == Tag::ITEM
            || self.tag == Tag::ITEM_DELIMITER
            || self.tag == Tag::SEQUENCE_DELIMITER
    }
}
