//! The filehandle state machine (§4.6, C6):
//! `fresh -> meta_read -> metadata_read -> pixeldata_indexed`.
//!
//! Every stage is idempotent: calling it again after it already completed
//! returns the cached result rather than re-parsing.

use std::collections::HashMap;

use dicom_core::error::{Error, Result};
use dicom_core::io::{Source, Whence};
use dicom_core::DataSet;
use dicom_dictionary_std::{tags, StandardDataDictionary};
use dicom_parser::{build_top_level, DataSetReader, EncodingContext, StatefulDecoder};

use crate::frame::Frame;
use crate::frameindex::{build_frame_index, FrameGeometry, FrameIndex};
use crate::meta::{read_file_meta, FileMetaTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    MetaRead,
    MetadataRead,
    PixelDataIndexed,
}

/// An open DICOM Part-10 stream, advancing through the four reading
/// stages on demand.
pub struct Filehandle<S> {
    src: S,
    state: State,
    file_meta: Option<FileMetaTable>,
    data_set_offset: u64,
    metadata: Option<DataSet>,
    pixel_data: Option<dicom_parser::PixelDataLocation>,
    geometry: Option<FrameGeometry>,
    frame_index: Option<FrameIndex>,
    position_table: Option<HashMap<(u32, u32), u32>>,
}

impl<S: Source> Filehandle<S> {
    /// Wrap a source in a fresh filehandle. Nothing is read yet.
    pub fn new(src: S) -> Self {
        Filehandle {
            src,
            state: State::Fresh,
            file_meta: None,
            data_set_offset: 0,
            metadata: None,
            pixel_data: None,
            geometry: None,
            frame_index: None,
            position_table: None,
        }
    }

    /// Parse the File Meta Information group, if not already done.
    pub fn read_file_meta(&mut self) -> Result<&FileMetaTable> {
        if self.state == State::Fresh {
            let result = read_file_meta(&mut self.src)?;
            self.file_meta = Some(result.table);
            self.data_set_offset = result.data_set_offset;
            self.state = State::MetaRead;
        }
        Ok(self.file_meta.as_ref().expect("meta_read guarantees file_meta"))
    }

    /// Parse the main data set, stopping at PixelData, if not already
    /// done.
    pub fn read_metadata(&mut self) -> Result<&DataSet> {
        self.read_file_meta()?;
        if self.state == State::MetaRead {
            let transfer_syntax_uid = self.file_meta.as_ref().unwrap().transfer_syntax_uid.clone();
            let ctx = EncodingContext::resolve(&transfer_syntax_uid)?;
            self.src.seek(self.data_set_offset.try_into().unwrap(), Whence::Set)?;
            let dict = StandardDataDictionary;
            let dec = StatefulDecoder::new(&mut self.src, ctx)?;
            let mut reader = DataSetReader::new(dec, &dict, None);
            let built = build_top_level(&mut reader)?;
            self.metadata = Some(built.data_set);
            self.pixel_data = built.pixel_data;
            self.state = State::MetadataRead;
        }
        Ok(self.metadata.as_ref().expect("metadata_read guarantees metadata"))
    }

    /// Build the frame index, if not already done. A no-op (successfully
    /// yielding zero frames) when the data set carries no PixelData.
    pub fn read_pixeldata(&mut self) -> Result<()> {
        self.read_metadata()?;
        if self.state == State::MetadataRead {
            if let Some(location) = self.pixel_data {
                let metadata = self.metadata.as_ref().unwrap();
                let geometry = FrameGeometry::from_data_set(metadata)?;
                let transfer_syntax_uid =
                    self.file_meta.as_ref().unwrap().transfer_syntax_uid.clone();
                let index =
                    build_frame_index(&mut self.src, &location, &geometry, &transfer_syntax_uid)?;
                self.position_table = build_position_table(metadata, &geometry);
                self.geometry = Some(geometry);
                self.frame_index = Some(index);
            } else {
                tracing::debug!("data set carries no PixelData");
            }
            self.state = State::PixelDataIndexed;
        }
        Ok(())
    }

    /// Number of frames, requiring [`Self::read_pixeldata`] to have run.
    pub fn frame_count(&self) -> Result<u32> {
        self.ensure_indexed()?;
        Ok(match self.frame_index.as_ref() {
            None => 0,
            Some(FrameIndex::Native { frame_size, .. }) => {
                if *frame_size == 0 {
                    0
                } else {
                    self.geometry.unwrap().number_of_frames
                }
            }
            Some(FrameIndex::Encapsulated(frames)) => frames.len() as u32,
        })
    }

    /// Read frame `n` (1-based).
    pub fn read_frame(&mut self, n: u32) -> Result<Frame> {
        self.read_pixeldata()?;
        let count = self.frame_count()?;
        if n == 0 || n > count {
            return Err(Error::invalid(format!(
                "frame number {n} out of range (1..={count})"
            )));
        }
        let geometry = self.geometry.expect("indexed guarantees geometry");
        let transfer_syntax_uid = self.file_meta.as_ref().unwrap().transfer_syntax_uid.clone();
        let data = match self.frame_index.as_ref().unwrap() {
            FrameIndex::Native { pixeldata_offset, frame_size } => {
                let offset = pixeldata_offset + (n as u64 - 1) * frame_size;
                self.src.seek(offset.try_into().unwrap(), Whence::Set)?;
                let mut buf = vec![0u8; *frame_size as usize];
                self.src.read_exact(&mut buf)?;
                buf
            }
            FrameIndex::Encapsulated(frames) => {
                let mut buf = Vec::new();
                for fragment in &frames[(n - 1) as usize] {
                    self.src.seek(fragment.offset.try_into().unwrap(), Whence::Set)?;
                    let mut part = vec![0u8; fragment.len as usize];
                    self.src.read_exact(&mut part)?;
                    buf.extend_from_slice(&part);
                }
                buf
            }
        };
        Ok(Frame::new(
            n,
            geometry.rows,
            geometry.columns,
            geometry.samples_per_pixel,
            geometry.bits_allocated,
            transfer_syntax_uid,
            data,
        ))
    }

    /// Read the frame tiling a given zero-based (column, row) position,
    /// per `(0048,021A)` PlanePositionSlideSequence entries carried by
    /// `(5200,9230)` PerFrameFunctionalGroupsSequence (§4.6).
    pub fn read_frame_position(&mut self, column: u32, row: u32) -> Result<Frame> {
        self.read_pixeldata()?;
        let geometry = self.geometry.expect("indexed guarantees geometry");
        let table = self
            .position_table
            .as_ref()
            .ok_or_else(|| Error::invalid("data set carries no per-frame position table"))?;
        let pixel_col = column as u64 * geometry.columns as u64 + 1;
        let pixel_row = row as u64 * geometry.rows as u64 + 1;
        let key = (pixel_col as u32, pixel_row as u32);
        let frame_number = *table
            .get(&key)
            .ok_or_else(|| Error::invalid(format!("no frame tiles position ({column}, {row})")))?;
        self.read_frame(frame_number)
    }

    fn ensure_indexed(&self) -> Result<()> {
        if self.state != State::PixelDataIndexed {
            return Err(Error::invalid(
                "read_pixeldata must run before frame_count/read_frame",
            ));
        }
        Ok(())
    }
}

fn build_position_table(metadata: &DataSet, geometry: &FrameGeometry) -> Option<HashMap<(u32, u32), u32>> {
    let per_frame = metadata
        .get(tags::PER_FRAME_FUNCTIONAL_GROUPS_SEQUENCE)?
        .get_value_sequence()
        .ok()?;
    let _ = geometry;
    let mut table = HashMap::new();
    for (idx, item) in per_frame.items().iter().enumerate() {
        let plane_position = item
            .get(tags::PLANE_POSITION_SLIDE_SEQUENCE)
            .and_then(|e| e.get_value_sequence().ok())
            .and_then(|seq| seq.get(0));
        let Some(plane_position) = plane_position else {
            continue;
        };
        let col = plane_position
            .get(tags::COLUMN_POSITION_IN_TOTAL_IMAGE_PIXEL_MATRIX)
            .and_then(|e| e.get_value_integer(0).ok());
        let row = plane_position
            .get(tags::ROW_POSITION_IN_TOTAL_IMAGE_PIXEL_MATRIX)
            .and_then(|e| e.get_value_integer(0).ok());
        if let (Some(col), Some(row)) = (col, row) {
            table.insert((col as u32, row as u32), (idx + 1) as u32);
        }
    }
    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::io::MemorySource;

    fn sample_native_file() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&[0x02, 0x00, 0x02, 0x00, b'U', b'I', 0x02, 0x00, b'1', 0x00]);
        let ts = b"1.2.840.10008.1.2.1\0";
        body.extend_from_slice(&[0x02, 0x00, 0x10, 0x00, b'U', b'I']);
        body.extend_from_slice(&(ts.len() as u16).to_le_bytes());
        body.extend_from_slice(ts);

        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]);
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);

        // main data set: Rows=2, Columns=2, SamplesPerPixel=1, BitsAllocated=8,
        // then PixelData OB len 4
        bytes.extend_from_slice(&[0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00]);
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&[0x28, 0x00, 0x11, 0x00, b'U', b'S', 0x02, 0x00]);
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&[0x28, 0x00, 0x02, 0x00, b'U', b'S', 0x02, 0x00]);
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&[0x28, 0x00, 0x00, 0x01, b'U', b'S', 0x02, 0x00]);
        bytes.extend_from_slice(&8u16.to_le_bytes());
        bytes.extend_from_slice(&[0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00]);
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        bytes
    }

    #[test]
    fn state_machine_reaches_pixeldata_indexed() {
        let mut fh = Filehandle::new(MemorySource::new(sample_native_file()));
        fh.read_file_meta().unwrap();
        fh.read_metadata().unwrap();
        fh.read_pixeldata().unwrap();
        assert_eq!(fh.frame_count().unwrap(), 1);
        let frame = fh.read_frame(1).unwrap();
        assert_eq!(frame.data(), &[1, 2, 3, 4]);
        assert_eq!(frame.rows(), 2);
        assert_eq!(frame.columns(), 2);
    }

    #[test]
    fn stages_are_idempotent() {
        let mut fh = Filehandle::new(MemorySource::new(sample_native_file()));
        let ts1 = fh.read_file_meta().unwrap().transfer_syntax_uid.clone();
        let ts2 = fh.read_file_meta().unwrap().transfer_syntax_uid.clone();
        assert_eq!(ts1, ts2);
        fh.read_metadata().unwrap();
        fh.read_metadata().unwrap();
        fh.read_pixeldata().unwrap();
        fh.read_pixeldata().unwrap();
        assert_eq!(fh.frame_count().unwrap(), 1);
    }

    #[test]
    fn out_of_range_frame_number_is_invalid() {
        let mut fh = Filehandle::new(MemorySource::new(sample_native_file()));
        fh.read_pixeldata().unwrap();
        let err = fh.read_frame(2).unwrap_err();
        assert_eq!(err.code(), dicom_core::ErrorCode::Invalid);
    }
}
