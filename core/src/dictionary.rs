//! The dictionary capability interface (§4.2, C1): pure lookups over a
//! compiled-in table of tag/VR/keyword metadata. The concrete table lives
//! in a sibling crate; this module only fixes the trait it must implement.

use crate::tag::Tag;
use crate::vr::VR;

/// A single dictionary entry: the keyword and default VR associated with a
/// public tag, plus the permitted VRs when an element may legally carry
/// more than one (retired tags sometimes do).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The tag's keyword, e.g. `"PatientName"`.
    pub keyword: &'static str,
    /// The VR assigned to this tag when none is given on the wire
    /// (implicit VR transfer syntaxes).
    pub default_vr: VR,
    /// Every VR this tag may legally carry.
    pub permitted_vrs: &'static [VR],
}

/// A compiled-in metadata table, queried exclusively through pure lookups
/// (§4.2: "no mutation after construction").
pub trait DataDictionary {
    /// Look up an entry by tag. Unknown tags return `None` — the sentinel
    /// named in §4.2.
    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry>;

    /// Look up a tag by its keyword.
    fn by_keyword(&self, keyword: &str) -> Option<Tag>;

    /// The VR mnemonic's corresponding [`VR`], or [`VR::ERROR`] for an
    /// unrecognized two-letter code.
    fn vr_from_mnemonic(&self, mnemonic: &str) -> VR {
        mnemonic.parse().unwrap_or(VR::ERROR)
    }

    /// The two-letter mnemonic for a [`VR`].
    fn mnemonic_from_vr(&self, vr: VR) -> &'static str {
        vr.mnemonic()
    }

    /// The keyword registered for `tag`, if any.
    fn keyword_from_tag(&self, tag: Tag) -> Option<&'static str> {
        self.by_tag(tag).map(|e| e.keyword)
    }

    /// The tag registered for `keyword`, if any.
    fn tag_from_keyword(&self, keyword: &str) -> Option<Tag> {
        self.by_keyword(keyword)
    }

    /// The VR a tag receives under implicit VR encoding, or [`VR::UN`] for
    /// an unrecognized tag (§4.2, §4.5: unknown implicit-VR elements fall
    /// back to UN).
    fn default_vr_from_tag(&self, tag: Tag) -> VR {
        self.by_tag(tag).map(|e| e.default_vr).unwrap_or(VR::UN)
    }

    /// Whether `vr` is a legal representation for `tag`. Unknown tags
    /// accept any VR, since no constraint is on record for them.
    fn vr_permitted_for_tag(&self, vr: VR, tag: Tag) -> bool {
        match self.by_tag(tag) {
            Some(entry) => entry.permitted_vrs.contains(&vr),
            None => true,
        }
    }

    /// Whether `uid` names a transfer syntax whose Pixel Data is
    /// encapsulated (fragmented, compressed) rather than a native
    /// contiguous pixel blob.
    fn is_encapsulated_transfer_syntax(&self, uid: &str) -> bool;
}
