//! Reading the File Meta Information group (§4.5, §4.6: `read_file_meta`).
//!
//! The group is always Explicit VR Little Endian regardless of the main
//! data set's transfer syntax, and is self-delimiting via its own
//! `(0002,0000)` File Meta Information Group Length element.

use dicom_core::error::{Error, Result};
use dicom_core::io::{Source, Whence};
use dicom_core::{DataSet, Tag};
use dicom_dictionary_std::{tags, StandardDataDictionary};
use dicom_parser::{build_top_level, DataSetReader, EncodingContext, StatefulDecoder};

const PREAMBLE_LEN: u64 = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// The relevant subset of the File Meta Information table (PS3.10 §7.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetaTable {
    pub information_group_length: u32,
    pub media_storage_sop_class_uid: Option<String>,
    pub media_storage_sop_instance_uid: Option<String>,
    pub transfer_syntax_uid: String,
    pub implementation_class_uid: Option<String>,
    pub implementation_version_name: Option<String>,
    pub source_application_entity_title: Option<String>,
}

/// The outcome of [`read_file_meta`]: the table itself, and the absolute
/// offset at which the main data set begins.
#[derive(Debug)]
pub struct FileMetaReadResult {
    pub table: FileMetaTable,
    pub data_set_offset: u64,
}

/// Detect the preamble and `DICM` magic code, then parse the File Meta
/// group bounded by its own group length (§4.5's "Preamble & magic" and
/// "File Meta Information").
///
/// If the 128-byte preamble followed by `DICM` is not found, a lenient
/// retry is made assuming no preamble is present at all; if that also
/// fails, a PARSE error is returned.
pub fn read_file_meta(src: &mut dyn Source) -> Result<FileMetaReadResult> {
    let body_start = if has_magic_at(src, PREAMBLE_LEN)? {
        PREAMBLE_LEN + 4
    } else if has_magic_at(src, 0)? {
        tracing::info!("no 128-byte preamble found, retrying from offset 0");
        4
    } else {
        return Err(Error::parse(
            "missing DICM magic code (with or without a 128-byte preamble)",
            0,
            vec![],
        ));
    };
    src.seek(body_start.try_into().unwrap(), Whence::Set)?;

    let dict = StandardDataDictionary;
    let mut dec = StatefulDecoder::new(src, EncodingContext::FILE_META)?;
    let path = vec![];
    let header = dec.read_element_header(&dict, &path)?;
    if header.tag != tags::FILE_META_INFORMATION_GROUP_LENGTH {
        return Err(Error::parse(
            format!(
                "expected (0002,0000) FileMetaInformationGroupLength, found {}",
                header.tag
            ),
            dec.position(),
            path,
        ));
    }
    let len = header
        .len
        .get()
        .ok_or_else(|| Error::parse("group length element has undefined length", dec.position(), vec![]))?;
    let raw = dec.read_value_bytes(len)?;
    if raw.len() != 4 {
        return Err(Error::parse(
            format!("group length value is {} bytes, expected 4", raw.len()),
            dec.position(),
            vec![],
        ));
    }
    let group_length = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);

    let mut reader = DataSetReader::new(dec, &dict, Some(group_length));
    let built = build_top_level(&mut reader)?;
    let data_set_offset = reader.position();

    let table = FileMetaTable::from_data_set(group_length, built.data_set)?;
    tracing::debug!(
        transfer_syntax_uid = %table.transfer_syntax_uid,
        data_set_offset,
        "file meta information read"
    );
    Ok(FileMetaReadResult { table, data_set_offset })
}

fn has_magic_at(src: &mut dyn Source, offset: u64) -> Result<bool> {
    if src.seek(offset.try_into().unwrap(), Whence::Set).is_err() {
        return Ok(false);
    }
    let mut magic = [0u8; 4];
    match src.read_exact(&mut magic) {
        Ok(()) => Ok(&magic == MAGIC),
        Err(_) => Ok(false),
    }
}

impl FileMetaTable {
    fn from_data_set(group_length: u32, ds: DataSet) -> Result<Self> {
        let transfer_syntax_uid = required_string(&ds, tags::TRANSFER_SYNTAX_UID)?;
        Ok(FileMetaTable {
            information_group_length: group_length,
            media_storage_sop_class_uid: optional_string(&ds, tags::MEDIA_STORAGE_SOP_CLASS_UID),
            media_storage_sop_instance_uid: optional_string(
                &ds,
                tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            ),
            transfer_syntax_uid,
            implementation_class_uid: optional_string(&ds, tags::IMPLEMENTATION_CLASS_UID),
            implementation_version_name: optional_string(&ds, tags::IMPLEMENTATION_VERSION_NAME),
            source_application_entity_title: ds
                .get(Tag(0x0002, 0x0016))
                .and_then(|e| e.get_value_string(0).ok())
                .map(|s| s.to_owned()),
        })
    }
}

fn required_string(ds: &DataSet, tag: Tag) -> Result<String> {
    ds.get(tag)
        .ok_or_else(|| Error::parse(format!("missing required File Meta element {tag}"), 0, vec![]))?
        .get_value_string(0)
        .map(|s| s.trim_end_matches('\0').to_owned())
}

fn optional_string(ds: &DataSet, tag: Tag) -> Option<String> {
    ds.get(tag)
        .and_then(|e| e.get_value_string(0).ok())
        .map(|s| s.trim_end_matches('\0').to_owned())
}
