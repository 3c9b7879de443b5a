//! Core data types for reading DICOM Part-10 content: attribute tags, value
//! representations, the typed value model, the element/data-set/sequence
//! tree, the pull-based IO abstraction, and the structured error carrier.
//!
//! This crate covers the pieces of the system that have no notion of byte
//! order or transfer syntax; encoding/decoding lives in `dicom-parser`, and
//! the standard attribute table lives in `dicom-dictionary-std`.

pub mod dataset;
pub mod dictionary;
pub mod element;
pub mod error;
pub mod io;
pub mod length;
pub mod sequence;
pub mod tag;
pub mod value;
pub mod vr;

pub use dataset::DataSet;
pub use dictionary::DataDictionary;
pub use element::Element;
pub use error::{Error, ErrorCode, Result};
pub use length::Length;
pub use sequence::Sequence;
pub use tag::{Tag, TagPath};
pub use value::Value;
pub use vr::VR;
