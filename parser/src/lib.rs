//! A middle-level parser of DICOM data sets (§4.5, C5): decodes a byte
//! stream under a given transfer syntax into [`dicom_core::DataSet`] trees,
//! one container (root data set, sequence, or item) at a time.
//!
//! [`context`] resolves a transfer syntax UID into byte order and
//! explicit/implicit VR rules. [`decode`] reads headers and raw value
//! bytes off a [`dicom_core::io::Source`]. [`dataset`] turns that into a
//! flat token stream that tracks nested sequence/item framing and
//! enforces a bounded recursion depth. [`builder`] consumes the token
//! stream into an owned data set tree, stopping at PixelData the way
//! `dicom-object`'s filehandle expects.

pub mod builder;
pub mod byteorder;
pub mod context;
pub mod dataset;
pub mod decode;
pub mod header;

pub use builder::{build_top_level, BuiltDataSet, PixelDataLocation};
pub use context::{ByteOrder, EncodingContext};
pub use dataset::{DataSetReader, DataToken};
pub use decode::StatefulDecoder;
pub use header::ElementHeader;
