//! Building and resolving the frame index (§4.6, `read_pixeldata`).
//!
//! A native transfer syntax stores all frames as one contiguous blob, so
//! the index is a formula rather than a table. An encapsulated transfer
//! syntax stores frames as Basic-Offset-Table-led fragment items; the
//! index there is the list of fragment byte ranges making up each frame.

use dicom_core::dictionary::DataDictionary;
use dicom_core::error::{Error, Result};
use dicom_core::io::Source;
use dicom_core::{DataSet, Tag};
use dicom_dictionary_std::{tags, StandardDataDictionary};
use dicom_parser::{ByteOrder, EncodingContext, PixelDataLocation, StatefulDecoder};

/// Pixel geometry pulled from the main data set, used both to compute the
/// native frame size and to stamp each returned [`crate::Frame`].
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry {
    pub rows: u16,
    pub columns: u16,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub number_of_frames: u32,
}

impl FrameGeometry {
    pub fn from_data_set(ds: &DataSet) -> Result<Self> {
        let rows = required_u16(ds, tags::ROWS)?;
        let columns = required_u16(ds, tags::COLUMNS)?;
        let samples_per_pixel = required_u16(ds, tags::SAMPLES_PER_PIXEL)?;
        let bits_allocated = required_u16(ds, tags::BITS_ALLOCATED)?;
        let number_of_frames = ds
            .get(tags::NUMBER_OF_FRAMES)
            .and_then(|e| e.get_value_string(0).ok())
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(1);
        Ok(FrameGeometry {
            rows,
            columns,
            samples_per_pixel,
            bits_allocated,
            number_of_frames,
        })
    }

    /// Bytes occupied by one frame in a native (non-encapsulated) blob.
    pub fn native_frame_size(&self) -> u64 {
        let bytes_per_sample = (self.bits_allocated as u64 + 7) / 8;
        self.rows as u64 * self.columns as u64 * self.samples_per_pixel as u64 * bytes_per_sample
    }
}

fn required_u16(ds: &DataSet, tag: Tag) -> Result<u16> {
    ds.get(tag)
        .ok_or_else(|| Error::invalid(format!("missing required attribute {tag}")))?
        .get_value_integer(0)
        .map(|v| v as u16)
}

/// One fragment's value location on the wire.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    offset: u64,
    len: u32,
}

/// How to locate each frame's bytes.
#[derive(Debug, Clone)]
pub enum FrameIndex {
    /// `pixeldata_offset + (n - 1) * frame_size`, `frame_size` bytes.
    Native { pixeldata_offset: u64, frame_size: u64 },
    /// One entry per frame, each a list of fragments to concatenate in
    /// order.
    Encapsulated(Vec<Vec<FragmentRange>>),
}

/// A byte range to read and append when reassembling an encapsulated
/// frame.
#[derive(Debug, Clone, Copy)]
pub struct FragmentRange {
    pub offset: u64,
    pub len: u32,
}

/// Build the frame index for a data set, per §4.6.
pub fn build_frame_index(
    src: &mut dyn Source,
    pixel_data: &PixelDataLocation,
    geometry: &FrameGeometry,
    transfer_syntax_uid: &str,
) -> Result<FrameIndex> {
    let dict = StandardDataDictionary;
    if !dict.is_encapsulated_transfer_syntax(transfer_syntax_uid) {
        return Ok(FrameIndex::Native {
            pixeldata_offset: pixel_data.absolute_offset,
            frame_size: geometry.native_frame_size(),
        });
    }

    let ctx = EncodingContext::resolve(transfer_syntax_uid)?;
    let mut dec = StatefulDecoder::new(src, ctx)?;
    dec.seek_to(pixel_data.absolute_offset)?;
    let path = vec![];

    let bot_header = dec.read_element_header(&dict, &path)?;
    if bot_header.tag != Tag::ITEM {
        return Err(Error::parse(
            "encapsulated PixelData does not start with a Basic Offset Table item",
            dec.position(),
            path,
        ));
    }
    let bot_len = bot_header
        .len
        .get()
        .ok_or_else(|| Error::parse("Basic Offset Table item has undefined length", dec.position(), vec![]))?;
    let bot_bytes = dec.read_value_bytes(bot_len)?;
    let bot_offsets: Vec<u32> = bot_bytes
        .chunks_exact(4)
        .map(|c| match ctx.byte_order {
            ByteOrder::LittleEndian => u32::from_le_bytes([c[0], c[1], c[2], c[3]]),
            ByteOrder::BigEndian => u32::from_be_bytes([c[0], c[1], c[2], c[3]]),
        })
        .collect();

    let fragments_base = dec.position();
    let mut fragments: Vec<(u64, Fragment)> = Vec::new();
    loop {
        let header_offset = dec.position();
        let header = dec.read_element_header(&dict, &path)?;
        if header.tag == Tag::SEQUENCE_DELIMITER {
            break;
        }
        if header.tag != Tag::ITEM {
            return Err(Error::parse(
                format!("expected a fragment item, found {}", header.tag),
                dec.position(),
                vec![],
            ));
        }
        let len = header.len.get().ok_or_else(|| {
            Error::parse("fragment item has undefined length", dec.position(), vec![])
        })?;
        let value_offset = dec.position();
        fragments.push((
            header_offset - fragments_base,
            Fragment { offset: value_offset, len },
        ));
        dec.skip_bytes(len as u64)?;
    }

    if !bot_offsets.is_empty() {
        let mut frames: Vec<Vec<FragmentRange>> = vec![Vec::new(); bot_offsets.len()];
        for (relative_offset, fragment) in &fragments {
            let frame_idx = bot_offsets
                .iter()
                .rposition(|&bot| u64::from(bot) <= *relative_offset)
                .ok_or_else(|| {
                    Error::parse(
                        "fragment precedes every Basic Offset Table entry",
                        fragment.offset,
                        vec![],
                    )
                })?;
            frames[frame_idx].push(FragmentRange {
                offset: fragment.offset,
                len: fragment.len,
            });
        }
        Ok(FrameIndex::Encapsulated(frames))
    } else {
        if fragments.len() as u32 != geometry.number_of_frames {
            return Err(Error::parse(
                format!(
                    "empty Basic Offset Table: {} fragment items does not match NumberOfFrames {}",
                    fragments.len(),
                    geometry.number_of_frames
                ),
                dec.position(),
                vec![],
            ));
        }
        let frames = fragments
            .into_iter()
            .map(|(_, f)| vec![FragmentRange { offset: f.offset, len: f.len }])
            .collect();
        Ok(FrameIndex::Encapsulated(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::Element;
    use dicom_core::VR;
    use dicom_dictionary_std::uids;

    fn ds_with_geometry(rows: u16, columns: u16, spp: u16, bits: u16) -> DataSet {
        let mut ds = DataSet::new();
        let mut e = Element::empty(tags::ROWS, VR::US);
        e.set_integer(rows as i64).unwrap();
        ds.insert(e).unwrap();
        let mut e = Element::empty(tags::COLUMNS, VR::US);
        e.set_integer(columns as i64).unwrap();
        ds.insert(e).unwrap();
        let mut e = Element::empty(tags::SAMPLES_PER_PIXEL, VR::US);
        e.set_integer(spp as i64).unwrap();
        ds.insert(e).unwrap();
        let mut e = Element::empty(tags::BITS_ALLOCATED, VR::US);
        e.set_integer(bits as i64).unwrap();
        ds.insert(e).unwrap();
        ds
    }

    #[test]
    fn native_frame_size_formula() {
        let ds = ds_with_geometry(4, 4, 1, 16);
        let geometry = FrameGeometry::from_data_set(&ds).unwrap();
        assert_eq!(geometry.native_frame_size(), 4 * 4 * 1 * 2);
    }

    #[test]
    fn native_index_is_a_formula_not_a_table() {
        let mut src = dicom_core::io::MemorySource::new(vec![0u8; 64]);
        let geometry = FrameGeometry {
            rows: 2,
            columns: 2,
            samples_per_pixel: 1,
            bits_allocated: 8,
            number_of_frames: 4,
        };
        let location = PixelDataLocation {
            absolute_offset: 0,
            vr: VR::OB,
            length_field: 16,
            is_encapsulated: false,
        };
        let index = build_frame_index(
            &mut src,
            &location,
            &geometry,
            uids::EXPLICIT_VR_LITTLE_ENDIAN,
        )
        .unwrap();
        match index {
            FrameIndex::Native { pixeldata_offset, frame_size } => {
                assert_eq!(pixeldata_offset, 0);
                assert_eq!(frame_size, 4);
            }
            FrameIndex::Encapsulated(_) => panic!("expected native index"),
        }
    }
}
