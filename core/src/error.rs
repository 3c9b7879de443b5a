//! The structured error carrier (§4.7, §7).
//!
//! Every fallible operation in this crate and its sibling crates returns a
//! `Result<T, Error>` whose `Error` exposes a `code()` drawn from the four
//! values in §7's table, plus a human-readable `Display` message. Unlike the
//! C original this mirrors, there is no global/out-parameter error slot:
//! propagation is handled by `?`, so "first error wins" falls out naturally
//! from short-circuiting rather than needing to be enforced by hand.

use crate::tag::{Tag, TagPath};
use crate::value::ValueType;
use snafu::Snafu;
use std::io;

/// The four error categories from §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    /// Out of memory.
    NoMem = 1,
    /// Bad arguments, VR mismatch, out-of-range index, or mutation of a
    /// locked container.
    Invalid = 2,
    /// Malformed DICOM stream.
    Parse = 3,
    /// Underlying read/seek failure.
    Io = 4,
}

/// The main error type for `dicom-core`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// An allocation could not be satisfied.
    #[snafu(display("out of memory"))]
    NoMem,

    /// Bad arguments, a VR/tag mismatch, an out-of-range index, or an
    /// attempt to mutate a locked container.
    #[snafu(display("{message}"))]
    Invalid {
        /// Human-readable detail.
        message: String,
    },

    /// A value could not be read back in the requested representation.
    #[snafu(display("cast error: requested {requested} but value is {got:?}"))]
    CastValue {
        /// The value format requested by the caller.
        requested: &'static str,
        /// The value's actual representation.
        got: ValueType,
    },

    /// Malformed DICOM content, tagged with the byte offset and the stack
    /// of containing tags (§7).
    #[snafu(display("{message} (at offset {offset}{})", format_path(path)))]
    Parse {
        /// Human-readable detail.
        message: String,
        /// Byte offset at which the problem was detected.
        offset: u64,
        /// Containing tags, outermost first.
        path: TagPath,
    },

    /// The underlying IO source failed.
    #[snafu(display("IO error: {source}"))]
    Io {
        /// The underlying error.
        source: io::Error,
    },
}

fn format_path(path: &[Tag]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        let joined = path
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("/");
        format!(", in {joined}")
    }
}

impl Error {
    /// The error's category, per §7.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NoMem => ErrorCode::NoMem,
            Error::Invalid { .. } | Error::CastValue { .. } => ErrorCode::Invalid,
            Error::Parse { .. } => ErrorCode::Parse,
            Error::Io { .. } => ErrorCode::Io,
        }
    }

    /// A short, static summary of the error category.
    pub fn summary(&self) -> &'static str {
        match self.code() {
            ErrorCode::NoMem => "out of memory",
            ErrorCode::Invalid => "invalid operation",
            ErrorCode::Parse => "malformed DICOM stream",
            ErrorCode::Io => "IO error",
        }
    }

    /// Construct an [`Error::Invalid`] with the given message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Invalid {
            message: message.into(),
        }
    }

    /// Construct an [`Error::Parse`] with the given message, offset, and
    /// containing-tag path.
    pub fn parse(message: impl Into<String>, offset: u64, path: TagPath) -> Self {
        Error::Parse {
            message: message.into(),
            offset,
            path,
        }
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::Io { source }
    }
}

/// Type alias for a result from this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_variant() {
        assert_eq!(Error::invalid("bad").code(), ErrorCode::Invalid);
        assert_eq!(
            Error::parse("oops", 128, vec![Tag(0x0008, 0x0000)]).code(),
            ErrorCode::Parse
        );
    }

    #[test]
    fn parse_message_includes_path() {
        let e = Error::parse("bad length", 4, vec![Tag(0x0008, 0x0000)]);
        let msg = e.to_string();
        assert!(msg.contains("0008,0000"));
        assert!(msg.contains('4'));
    }
}
