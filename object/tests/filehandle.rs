//! End-to-end reads against a real file on disk, exercising `FileSource`
//! rather than the in-memory source the unit tests use.

use std::io::Write;

use dicom_core::io::FileSource;
use dicom_object::Filehandle;

fn native_two_frame_file() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&[0x02, 0x00, 0x02, 0x00, b'U', b'I', 0x02, 0x00, b'1', 0x00]);
    let ts = b"1.2.840.10008.1.2.1\0";
    body.extend_from_slice(&[0x02, 0x00, 0x10, 0x00, b'U', b'I']);
    body.extend_from_slice(&(ts.len() as u16).to_le_bytes());
    body.extend_from_slice(ts);

    let mut bytes = vec![0u8; 128];
    bytes.extend_from_slice(b"DICM");
    bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]);
    bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&body);

    // Rows=2, Columns=2, SamplesPerPixel=1, BitsAllocated=8, NumberOfFrames=2
    bytes.extend_from_slice(&[0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00]);
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&[0x28, 0x00, 0x11, 0x00, b'U', b'S', 0x02, 0x00]);
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&[0x28, 0x00, 0x02, 0x00, b'U', b'S', 0x02, 0x00]);
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&[0x28, 0x00, 0x00, 0x01, b'U', b'S', 0x02, 0x00]);
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(&[0x28, 0x00, 0x08, 0x00, b'I', b'S', 0x02, 0x00]);
    bytes.extend_from_slice(b"2 ");
    // PixelData OB, 8 bytes: frame 1 then frame 2, 4 bytes each
    bytes.extend_from_slice(&[0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00]);
    bytes.extend_from_slice(&8u32.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    bytes
}

#[test]
fn reads_two_native_frames_from_a_real_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&native_two_frame_file()).unwrap();
    file.flush().unwrap();

    let src = FileSource::open(file.path()).unwrap();
    let mut fh = Filehandle::new(src);

    let meta = fh.read_file_meta().unwrap();
    assert_eq!(meta.transfer_syntax_uid, "1.2.840.10008.1.2.1");

    fh.read_pixeldata().unwrap();
    assert_eq!(fh.frame_count().unwrap(), 2);

    let frame1 = fh.read_frame(1).unwrap();
    assert_eq!(frame1.data(), &[1, 2, 3, 4]);
    let frame2 = fh.read_frame(2).unwrap();
    assert_eq!(frame2.data(), &[5, 6, 7, 8]);
}
