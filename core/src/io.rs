//! The IO abstraction (§4.1, C2): a pull-based, seekable byte source with
//! concrete file, memory, and caller-supplied implementations.
//!
//! The parser consumes [`Source`] exclusively; it never assumes the
//! underlying storage is memory-mapped. Per §4.1's contract, seeking to a
//! negative offset or past the end of the source fails with [`Error::Io`],
//! and reading zero bytes succeeds with a count of zero rather than
//! signalling EOF as an error.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read as _, Seek as _, SeekFrom};

/// The reference point for a [`Source::seek`] offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute, from the start of the source.
    Set,
    /// Relative to the current position.
    Cur,
    /// Relative to the end of the source.
    End,
}

/// A seekable byte source. Implementations own their underlying resource;
/// dropping one closes it (§4.8: "Destroying the filehandle closes the
/// IO").
pub trait Source {
    /// Read up to `buf.len()` bytes, returning the number actually read.
    /// `0` means end-of-source, not an error. Partial reads are permitted.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Move the source's position and return the new absolute offset.
    /// Fails if the resulting position would be negative or past the end
    /// of the source.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64>;

    /// The current absolute position, equivalent to `seek(0, Cur)`.
    fn position(&mut self) -> Result<u64> {
        self.seek(0, Whence::Cur)
    }

    /// Read exactly `buf.len()` bytes, failing with [`Error::Io`] on a
    /// short read.
    fn read_exact(&mut self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.read(buf)? {
                0 => {
                    return Err(Error::from(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected end of source",
                    )))
                }
                n => buf = &mut buf[n..],
            }
        }
        Ok(())
    }
}

/// A source backed by an open file descriptor.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    /// Open the file at `path`.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(FileSource { file, len })
    }

    /// Adopt an already-open file.
    pub fn from_file(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(FileSource { file, len })
    }
}

impl Source for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.file.read(buf)?)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let target = resolve_offset(offset, whence, self.len, self.file.stream_position()?)?;
        Ok(self.file.seek(SeekFrom::Start(target))?)
    }
}

/// A source backed by an in-memory buffer.
pub struct MemorySource {
    data: Vec<u8>,
    pos: u64,
}

impl MemorySource {
    /// Adopt a buffer, taking ownership.
    pub fn new(data: Vec<u8>) -> Self {
        MemorySource { data, pos: 0 }
    }

    /// Copy a buffer from a borrowed slice.
    pub fn from_slice(data: &[u8]) -> Self {
        MemorySource::new(data.to_vec())
    }
}

impl Source for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = &self.data[self.pos as usize..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let target = resolve_offset(offset, whence, self.data.len() as u64, self.pos)?;
        self.pos = target;
        Ok(target)
    }
}

/// A caller-supplied source, backed by closures rather than a fixed
/// concrete type. Stands in for the four-function-pointer-plus-handle
/// vtable of the original C interface (§9's REDESIGN FLAGS: a capability
/// interface in place of opaque-pointer polymorphism).
pub struct CallbackSource {
    read_fn: Box<dyn FnMut(&mut [u8]) -> Result<usize>>,
    seek_fn: Box<dyn FnMut(i64, Whence) -> Result<u64>>,
}

impl CallbackSource {
    /// Construct a source from a read closure and a seek closure.
    pub fn new(
        read_fn: impl FnMut(&mut [u8]) -> Result<usize> + 'static,
        seek_fn: impl FnMut(i64, Whence) -> Result<u64> + 'static,
    ) -> Self {
        CallbackSource {
            read_fn: Box::new(read_fn),
            seek_fn: Box::new(seek_fn),
        }
    }
}

impl Source for CallbackSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (self.read_fn)(buf)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        (self.seek_fn)(offset, whence)
    }
}

fn resolve_offset(offset: i64, whence: Whence, len: u64, current: u64) -> Result<u64> {
    let base: i64 = match whence {
        Whence::Set => 0,
        Whence::Cur => current
            .try_into()
            .map_err(|_| Error::invalid("current position overflows a signed offset"))?,
        Whence::End => len
            .try_into()
            .map_err(|_| Error::invalid("source length overflows a signed offset"))?,
    };
    let target = base
        .checked_add(offset)
        .ok_or_else(|| Error::from(io::Error::new(io::ErrorKind::InvalidInput, "seek overflow")))?;
    if target < 0 || target as u64 > len {
        return Err(Error::from(io::Error::new(
            io::ErrorKind::InvalidInput,
            "seek target out of range",
        )));
    }
    Ok(target as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_reads_and_seeks() {
        let mut src = MemorySource::new(vec![1, 2, 3, 4, 5]);
        let mut buf = [0u8; 2];
        assert_eq!(src.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(src.seek(0, Whence::End).unwrap(), 5);
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn seek_past_end_fails() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        assert!(src.seek(10, Whence::Set).is_err());
    }

    #[test]
    fn seek_negative_fails() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        assert!(src.seek(-1, Whence::Set).is_err());
    }

    #[test]
    fn zero_length_read_succeeds() {
        let mut src = MemorySource::new(vec![1, 2, 3]);
        let mut buf: [u8; 0] = [];
        assert_eq!(src.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn callback_source_delegates() {
        let data = vec![9u8, 8, 7];
        let pos = std::cell::RefCell::new(0usize);
        let mut src = CallbackSource::new(
            {
                let data = data.clone();
                move |buf: &mut [u8]| {
                    let mut p = pos.borrow_mut();
                    let n = (data.len() - *p).min(buf.len());
                    buf[..n].copy_from_slice(&data[*p..*p + n]);
                    *p += n;
                    Ok(n)
                }
            },
            |_offset, _whence| Err(Error::invalid("seek not supported")),
        );
        let mut buf = [0u8; 3];
        assert_eq!(src.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [9, 8, 7]);
    }
}
