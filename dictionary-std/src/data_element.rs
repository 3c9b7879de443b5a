//! The standard dictionary: a lazily-built registry over [`crate::tags`],
//! implementing [`dicom_core::dictionary::DataDictionary`] (§4.2).

use crate::tags::{Entry, TagRange, ENTRIES};
use crate::uids;
use dicom_core::dictionary::{DataDictionary, DictionaryEntry};
use dicom_core::{Tag, VR};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static DICT: Lazy<Registry> = Lazy::new(Registry::build);

struct Registry {
    table: Vec<DictionaryEntry>,
    by_tag: HashMap<Tag, usize>,
    by_keyword: HashMap<&'static str, Tag>,
    repeating_ggxx: HashMap<Tag, usize>,
    repeating_eexx: HashMap<Tag, usize>,
    group_length_idx: usize,
    private_creator_idx: usize,
}

impl Registry {
    fn build() -> Registry {
        let mut table = Vec::with_capacity(ENTRIES.len() + 2);
        let mut by_tag = HashMap::with_capacity(ENTRIES.len());
        let mut by_keyword = HashMap::with_capacity(ENTRIES.len());
        let mut repeating_ggxx = HashMap::new();
        let mut repeating_eexx = HashMap::new();

        for entry in ENTRIES {
            let idx = table.len();
            table.push(to_dictionary_entry(entry));
            by_keyword.insert(entry.keyword, entry.range.base());
            match entry.range {
                TagRange::Single(tag) => {
                    by_tag.insert(tag, idx);
                }
                TagRange::Group100(tag) => {
                    repeating_ggxx.insert(tag, idx);
                }
                TagRange::Element100(tag) => {
                    repeating_eexx.insert(tag, idx);
                }
            }
        }

        let group_length_idx = table.len();
        table.push(DictionaryEntry {
            keyword: "GenericGroupLength",
            default_vr: VR::UL,
            permitted_vrs: &[VR::UL],
        });
        let private_creator_idx = table.len();
        table.push(DictionaryEntry {
            keyword: "PrivateCreator",
            default_vr: VR::LO,
            permitted_vrs: &[VR::LO],
        });

        Registry {
            table,
            by_tag,
            by_keyword,
            repeating_ggxx,
            repeating_eexx,
            group_length_idx,
            private_creator_idx,
        }
    }

    fn lookup(&self, tag: Tag) -> Option<&DictionaryEntry> {
        if let Some(&idx) = self.by_tag.get(&tag) {
            return Some(&self.table[idx]);
        }
        let group_trimmed = Tag(tag.group() & 0xFF00, tag.element());
        if let Some(&idx) = self.repeating_ggxx.get(&group_trimmed) {
            return Some(&self.table[idx]);
        }
        let elem_trimmed = Tag(tag.group(), tag.element() & 0xFF00);
        if let Some(&idx) = self.repeating_eexx.get(&elem_trimmed) {
            return Some(&self.table[idx]);
        }
        if tag.is_private() && (0x0010..=0x00FF).contains(&tag.element()) {
            return Some(&self.table[self.private_creator_idx]);
        }
        if tag.element() == 0x0000 {
            return Some(&self.table[self.group_length_idx]);
        }
        None
    }
}

fn to_dictionary_entry(entry: &Entry) -> DictionaryEntry {
    DictionaryEntry {
        keyword: entry.keyword,
        default_vr: entry.vr,
        permitted_vrs: entry.permitted,
    }
}

/// The standard attribute dictionary: a zero-sized handle onto a
/// lazily-initialized, process-wide registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StandardDataDictionary;

impl DataDictionary for StandardDataDictionary {
    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        DICT.lookup(tag)
    }

    fn by_keyword(&self, keyword: &str) -> Option<Tag> {
        DICT.by_keyword.get(keyword).copied()
    }

    fn is_encapsulated_transfer_syntax(&self, uid: &str) -> bool {
        uids::is_encapsulated(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_common_attributes() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x0010, 0x0010)).unwrap();
        assert_eq!(entry.keyword, "PatientName");
        assert_eq!(entry.default_vr, VR::PN);
    }

    #[test]
    fn unknown_tag_returns_none() {
        let dict = StandardDataDictionary;
        assert!(dict.by_tag(Tag(0x9999, 0x9999)).is_none());
    }

    #[test]
    fn repeating_overlay_group_resolves() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x60EE, 0x3000)).unwrap();
        assert_eq!(entry.keyword, "OverlayData");
    }

    #[test]
    fn group_length_fallback() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x0009, 0x0000)).unwrap();
        assert_eq!(entry.keyword, "GenericGroupLength");
    }

    #[test]
    fn private_creator_fallback() {
        let dict = StandardDataDictionary;
        let entry = dict.by_tag(Tag(0x0009, 0x0010)).unwrap();
        assert_eq!(entry.keyword, "PrivateCreator");
    }

    #[test]
    fn default_vr_from_tag_falls_back_to_un() {
        let dict = StandardDataDictionary;
        assert_eq!(dict.default_vr_from_tag(Tag(0x9999, 0x9999)), VR::UN);
    }

    #[test]
    fn vr_permitted_for_tag() {
        let dict = StandardDataDictionary;
        assert!(dict.vr_permitted_for_tag(VR::OW, Tag(0x7FE0, 0x0010)));
        assert!(!dict.vr_permitted_for_tag(VR::PN, Tag(0x7FE0, 0x0010)));
    }
}
