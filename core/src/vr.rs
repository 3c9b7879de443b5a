//! The DICOM Value Representation enumeration and its encoding properties.

use std::fmt;
use std::str::{from_utf8, FromStr};

/// The category a VR's value belongs to, used to validate element setters
/// and getters (§4.3).
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum VrCategory {
    /// Character-string based values, possibly backslash-separated.
    Str,
    /// Fixed-width signed or unsigned integers.
    Int,
    /// Fixed-width IEEE floating point numbers.
    Float,
    /// Opaque binary data.
    Binary,
    /// A nested sequence of items.
    Sequence,
}

/// A tagged enumeration of the 33 DICOM value representations, plus an
/// `ERROR` sentinel for unrecognized mnemonics (§3).
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
#[allow(missing_docs)]
pub enum VR {
    AE,
    AS,
    AT,
    CS,
    DA,
    DS,
    DT,
    FL,
    FD,
    IS,
    LO,
    LT,
    OB,
    OD,
    OF,
    OL,
    OV,
    OW,
    PN,
    SH,
    SL,
    SQ,
    SS,
    ST,
    SV,
    TM,
    UC,
    UI,
    UL,
    UN,
    UR,
    US,
    UT,
    UV,
    /// Sentinel for an unrecognized or malformed VR mnemonic.
    ERROR,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    /// Unrecognized input yields [`VR::ERROR`].
    pub fn from_binary(chars: [u8; 2]) -> VR {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
            .unwrap_or(VR::ERROR)
    }

    /// Retrieve a string representation of this VR.
    pub fn mnemonic(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
            ERROR => "??",
        }
    }

    /// The category of value this VR represents (§3, §4.3 setter rules).
    pub fn category(self) -> Option<VrCategory> {
        use VrCategory::*;
        use VR::*;
        match self {
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT => {
                Some(Str)
            }
            AT | SL | SS | UL | US | SV | UV => Some(Int),
            FL | FD => Some(Float),
            OB | OD | OF | OL | OV | OW | UN => Some(Binary),
            SQ => Some(Sequence),
            ERROR => None,
        }
    }

    /// Whether explicit VR encoding represents this VR's length with a
    /// 4-byte field (preceded by two reserved bytes), as opposed to 2 bytes
    /// (§4.5).
    pub fn has_32_bit_length(self) -> bool {
        use VR::*;
        matches!(
            self,
            OB | OD | OF | OL | OV | OW | SQ | SV | UC | UN | UR | UT | UV
        )
    }

    /// Whether this VR permits the undefined length sentinel
    /// `0xFFFF_FFFF` (only binary/sequence VRs with 32-bit lengths do, per
    /// §4.5: sequences and encapsulated OB pixel data).
    pub fn allows_undefined_length(self) -> bool {
        matches!(self, VR::SQ | VR::OB | VR::OW | VR::UN)
    }

    /// Whether this VR is allowed to carry more than one logical value
    /// (VM > 1), i.e. it is not one of the "singular" text VRs.
    pub fn allows_multi_value(self) -> bool {
        !matches!(self, VR::LT | VR::ST | VR::UT | VR::SQ)
    }

    /// The size in bytes of one element of this VR's primitive array form.
    /// Returns `None` for VRs without a fixed element width (string and
    /// binary-blob VRs are read as whole byte runs instead).
    pub fn element_width(self) -> Option<usize> {
        use VR::*;
        match self {
            AT | SL | UL | FL | OL | OF => Some(4),
            SS | US | OW => Some(2),
            FD | SV | UV | OV | OD => Some(8),
            _ => None,
        }
    }
}

impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OV" => Ok(OV),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "SV" => Ok(SV),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            "UV" => Ok(UV),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mnemonic() {
        assert_eq!(VR::from_str("PN").unwrap(), VR::PN);
        assert_eq!(VR::PN.mnemonic(), "PN");
    }

    #[test]
    fn unknown_mnemonic_is_error_sentinel() {
        assert_eq!(VR::from_binary(*b"ZZ"), VR::ERROR);
    }

    #[test]
    fn explicit_length_width_matches_spec_list() {
        for vr in [
            VR::OB,
            VR::OD,
            VR::OF,
            VR::OL,
            VR::OV,
            VR::OW,
            VR::SQ,
            VR::SV,
            VR::UC,
            VR::UN,
            VR::UR,
            VR::UT,
            VR::UV,
        ] {
            assert!(vr.has_32_bit_length(), "{vr} should use 32-bit length");
        }
        assert!(!VR::CS.has_32_bit_length());
    }
}
