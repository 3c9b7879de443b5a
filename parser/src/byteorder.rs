//! Primitive multi-byte reads over a [`dicom_core::io::Source`], and the
//! byte-swap helper used to bring primitive numeric values into host order
//! before they reach [`dicom_core::Element::set_value_bytes`] (§4.5: "Byte
//! order swaps all multi-byte integers in headers and, for primitive
//! numeric VRs, inside values").

use crate::context::ByteOrder;
use dicom_core::error::Result;
use dicom_core::io::Source;

/// Read a 16-bit unsigned integer in the given byte order.
pub fn read_u16(src: &mut dyn Source, order: ByteOrder) -> Result<u16> {
    let mut buf = [0u8; 2];
    src.read_exact(&mut buf)?;
    Ok(match order {
        ByteOrder::LittleEndian => u16::from_le_bytes(buf),
        ByteOrder::BigEndian => u16::from_be_bytes(buf),
    })
}

/// Read a 32-bit unsigned integer in the given byte order.
pub fn read_u32(src: &mut dyn Source, order: ByteOrder) -> Result<u32> {
    let mut buf = [0u8; 4];
    src.read_exact(&mut buf)?;
    Ok(match order {
        ByteOrder::LittleEndian => u32::from_le_bytes(buf),
        ByteOrder::BigEndian => u32::from_be_bytes(buf),
    })
}

/// Whether the host's native byte order matches `order`.
fn matches_native(order: ByteOrder) -> bool {
    match order {
        ByteOrder::LittleEndian => cfg!(target_endian = "little"),
        ByteOrder::BigEndian => cfg!(target_endian = "big"),
    }
}

/// Swap every `element_width`-byte chunk of `raw` in place so that its
/// numeric content matches host order, given it was read in `wire_order`.
/// A no-op when the wire order already matches the host, or when
/// `element_width` is 0 or 1 (single-byte values need no swap).
pub fn swap_to_native(raw: &mut [u8], element_width: usize, wire_order: ByteOrder) {
    if element_width <= 1 || matches_native(wire_order) {
        return;
    }
    for chunk in raw.chunks_exact_mut(element_width) {
        chunk.reverse();
    }
}
