//! Transfer syntax UIDs relevant to Part-10 file reading, and the
//! membership test over which ones carry encapsulated Pixel Data (§4.2).

/// Implicit VR Little Endian: Default Transfer Syntax for DICOM.
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
/// Explicit VR Little Endian.
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
/// Encapsulated Uncompressed Explicit VR Little Endian.
pub const ENCAPSULATED_UNCOMPRESSED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.98";
/// Deflated Explicit VR Little Endian.
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
/// Explicit VR Big Endian (retired).
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
/// JPEG Baseline (Process 1).
pub const JPEG_BASELINE8_BIT: &str = "1.2.840.10008.1.2.4.50";
/// JPEG Extended (Process 2 & 4).
pub const JPEG_EXTENDED12_BIT: &str = "1.2.840.10008.1.2.4.51";
/// JPEG Lossless, Non-Hierarchical, First-Order Prediction.
pub const JPEG_LOSSLESS_SV1: &str = "1.2.840.10008.1.2.4.70";
/// JPEG-LS Lossless Image Compression.
pub const JPEGLS_LOSSLESS: &str = "1.2.840.10008.1.2.4.80";
/// JPEG-LS Lossy (Near-Lossless) Image Compression.
pub const JPEGLS_NEAR_LOSSLESS: &str = "1.2.840.10008.1.2.4.81";
/// JPEG 2000 Image Compression (Lossless Only).
pub const JPEG2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";
/// JPEG 2000 Image Compression.
pub const JPEG2000: &str = "1.2.840.10008.1.2.4.91";
/// RLE Lossless.
pub const RLE_LOSSLESS: &str = "1.2.840.10008.1.2.5";
/// High-Throughput JPEG 2000 Image Compression (Lossless Only).
pub const HTJ2K_LOSSLESS: &str = "1.2.840.10008.1.2.4.201";
/// High-Throughput JPEG 2000 with RPCL Options (Lossless Only).
pub const HTJ2K_LOSSLESS_RPCL: &str = "1.2.840.10008.1.2.4.202";
/// High-Throughput JPEG 2000 Image Compression.
pub const HTJ2K: &str = "1.2.840.10008.1.2.4.203";

/// Whether `uid` names a transfer syntax with encapsulated Pixel Data.
/// Trailing NUL padding (as can appear in a raw File Meta UI value) is
/// stripped before comparison. Per spec: Implicit/Explicit VR Little
/// Endian, Explicit VR Big Endian, and Deflated Explicit VR Little Endian
/// are native; everything starting with `1.2.840.10008.1.2.4.` plus RLE
/// Lossless (`1.2.840.10008.1.2.5`) is encapsulated, including codecs not
/// individually named as constants above (e.g. future/MPEG variants under
/// the `.4.` branch) — a prefix check rather than an allowlist, so an
/// unrecognized codec under that branch is still indexed as encapsulated
/// instead of silently misread as one contiguous native blob.
pub fn is_encapsulated(uid: &str) -> bool {
    let trimmed = uid.trim_end_matches('\0');
    trimmed.starts_with("1.2.840.10008.1.2.4.") || trimmed == RLE_LOSSLESS
}
