//! A high-level API for reading DICOM Part-10 files (C6-C8): the File Meta
//! Information, the main data set up to PixelData, and individual decoded
//! frames, without materializing the whole PixelData blob in memory.
//!
//! [`Filehandle`] drives the four-stage read: [`meta`] parses the File
//! Meta group, the main data set is parsed with `dicom-parser` directly
//! into a [`dicom_core::DataSet`], [`frameindex`] locates each frame's
//! bytes under its transfer syntax, and [`frame`] carries out one decoded
//! frame at a time.

pub mod filehandle;
pub mod frame;
pub mod frameindex;
pub mod meta;

pub use filehandle::Filehandle;
pub use frame::Frame;
pub use frameindex::{FrameGeometry, FrameIndex, FragmentRange};
pub use meta::{FileMetaReadResult, FileMetaTable};
