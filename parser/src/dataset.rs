//! The token-producing data set reader (§4.5): walks a flat or nested
//! stream of elements, items, and delimiters and yields one [`DataToken`]
//! per structural event. [`crate::builder`] consumes this stream into a
//! [`dicom_core::DataSet`] tree; the pixel data indexer in `dicom-object`
//! consumes it directly to avoid materializing encapsulated fragments.

use crate::decode::StatefulDecoder;
use crate::header::ElementHeader;
use dicom_core::dictionary::DataDictionary;
use dicom_core::error::{Error, Result};
use dicom_core::{Length, Tag, TagPath};

/// One structural event produced while walking a data set.
#[derive(Debug, Clone)]
pub enum DataToken {
    /// A primitive (non-sequence) element header; the value bytes follow
    /// immediately and must be consumed with
    /// [`DataSetReader::read_value`] before advancing.
    ElementHeader(ElementHeader),
    /// An SQ element header; an ordered run of `ItemStart`/`ItemEnd` pairs
    /// follows, closed by `SequenceEnd`.
    SequenceStart(ElementHeader),
    /// The matching close for a `SequenceStart`.
    SequenceEnd,
    /// The start of one sequence item. A nested element stream follows,
    /// closed by `ItemEnd`.
    ItemStart { len: Length },
    /// The matching close for an `ItemStart`.
    ItemEnd,
}

#[derive(Clone, Copy)]
enum Frame {
    /// Bounded by an explicit byte count remaining in the container.
    Bounded(u32),
    /// Bounded by a matching delimiter only.
    Undefined,
}

/// Reads one encoding context's worth of data set content as a flat
/// sequence of [`DataToken`]s, tracking nested sequence/item frames and
/// `bytes_consumed_in_current_container` per frame (§4.5).
///
/// Bounded to a recursion depth of 128 nested sequences, matching the
/// default named in §4.5; exceeding it fails with PARSE rather than
/// overflowing the frame stack.
pub struct DataSetReader<'a, 'b> {
    dec: StatefulDecoder<'a>,
    dict: &'b dyn DataDictionary,
    frames: Vec<Frame>,
    path: TagPath,
    pending_header: Option<ElementHeader>,
    done: bool,
}

const MAX_DEPTH: usize = 128;

impl<'a, 'b> DataSetReader<'a, 'b> {
    /// Build a reader over the root data set, bounded by `root_len` bytes
    /// (or unbounded, for a top-level data set that runs to end-of-source).
    pub fn new(dec: StatefulDecoder<'a>, dict: &'b dyn DataDictionary, root_len: Option<u32>) -> Self {
        DataSetReader {
            dec,
            dict,
            frames: vec![root_len.map(Frame::Bounded).unwrap_or(Frame::Undefined)],
            path: Vec::new(),
            pending_header: None,
            done: false,
        }
    }

    /// The decoder's current absolute byte offset.
    pub fn position(&self) -> u64 {
        self.dec.position()
    }

    /// The byte order in force for this data set's encoding context.
    pub fn context_byte_order(&self) -> crate::context::ByteOrder {
        self.dec.context().byte_order
    }

    fn parse_error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.dec.position(), self.path.clone())
    }

    fn account(&mut self, consumed: u32) -> Result<()> {
        if let Some(Frame::Bounded(remaining)) = self.frames.last_mut() {
            *remaining = remaining.checked_sub(consumed).ok_or_else(|| {
                Error::parse(
                    "element overruns its enclosing container length",
                    self.dec.position(),
                    self.path.clone(),
                )
            })?;
        }
        Ok(())
    }

    fn frame_exhausted(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::Bounded(0)))
    }

    /// Read and return the raw value bytes for the header most recently
    /// yielded as [`DataToken::ElementHeader`]. Must be called before the
    /// next call to [`Self::next_token`].
    pub fn read_value(&mut self) -> Result<Vec<u8>> {
        let header = self
            .pending_header
            .take()
            .ok_or_else(|| Error::invalid("no pending element value to read"))?;
        let len = header.len.get().ok_or_else(|| {
            Error::invalid("cannot read a primitive value with undefined length")
        })?;
        let value = self.dec.read_value_bytes(len)?;
        self.account(len)?;
        Ok(value)
    }

    /// Skip the raw value bytes for the header most recently yielded as
    /// [`DataToken::ElementHeader`] without materializing them (used for
    /// PixelData: §4.5 "stops consuming the value").
    pub fn skip_value(&mut self) -> Result<()> {
        let header = self
            .pending_header
            .take()
            .ok_or_else(|| Error::invalid("no pending element value to skip"))?;
        if let Some(len) = header.len.get() {
            self.dec.skip_bytes(len as u64)?;
            self.account(len)?;
        }
        Ok(())
    }

    /// Produce the next token, or `None` at the end of the root container.
    pub fn next_token(&mut self) -> Result<Option<DataToken>> {
        if self.done {
            return Ok(None);
        }
        if self.pending_header.is_some() {
            return Err(self.parse_error(
                "element value must be consumed before reading the next token",
            ));
        }

        if self.frames.len() > 1 && self.frame_exhausted() {
            self.frames.pop();
            self.path.pop();
            return Ok(Some(DataToken::ItemEnd));
        }
        if self.frames.len() == 1 && self.frame_exhausted() {
            self.done = true;
            return Ok(None);
        }
        if self.frames.is_empty() {
            self.done = true;
            return Ok(None);
        }

        let header = match self.dec.read_element_header(self.dict, &self.path) {
            Ok(h) => h,
            Err(Error::Io { .. }) if self.frames.len() == 1 => {
                // Root-level short read at a container boundary with no
                // explicit length: treat as a clean end-of-stream.
                self.done = true;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        self.account(header.header_len)?;

        if header.tag == Tag::SEQUENCE_DELIMITER {
            if !matches!(self.frames.last(), Some(Frame::Undefined)) {
                return Err(self.parse_error("unexpected sequence delimiter"));
            }
            self.frames.pop();
            self.path.pop();
            return Ok(Some(DataToken::SequenceEnd));
        }
        if header.tag == Tag::ITEM_DELIMITER {
            if !matches!(self.frames.last(), Some(Frame::Undefined)) {
                return Err(self.parse_error("unexpected item delimiter"));
            }
            self.frames.pop();
            self.path.pop();
            return Ok(Some(DataToken::ItemEnd));
        }
        if header.tag == Tag::ITEM {
            self.frames.push(match header.len.get() {
                Some(n) => Frame::Bounded(n),
                None => Frame::Undefined,
            });
            self.path.push(Tag::ITEM);
            if self.frames.len() > MAX_DEPTH {
                return Err(self.parse_error("sequence item nesting exceeds maximum depth"));
            }
            return Ok(Some(DataToken::ItemStart { len: header.len }));
        }

        if header.vr == dicom_core::VR::SQ {
            self.path.push(header.tag);
            self.frames.push(match header.len.get() {
                Some(n) => Frame::Bounded(n),
                None => Frame::Undefined,
            });
            if self.frames.len() > MAX_DEPTH {
                return Err(self.parse_error("sequence nesting exceeds maximum depth"));
            }
            return Ok(Some(DataToken::SequenceStart(header)));
        }

        self.pending_header = Some(header);
        Ok(Some(DataToken::ElementHeader(header)))
    }
}
