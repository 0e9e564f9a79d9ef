//! Tests for the MRC codec

use std::io::Cursor;

use ndarray::{array, Array2};

use super::*;
use crate::error::{Error, FormatError};
use crate::models::{VolumeShape, MRC_HEADER_LEN};

/// Header with the given leading words and a recognisable tail.
fn raw_header(words: [u32; 10]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(MRC_HEADER_LEN);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes.resize(MRC_HEADER_LEN, 0xAB);
    bytes
}

fn frame_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

// ========================================================================
// Header
// ========================================================================

#[test]
fn test_read_header_decodes_leading_words() {
    let bytes = raw_header([5, 4, 3, 2, 0, 0, 0, 5, 4, 3]);
    let mut cursor = Cursor::new(bytes);

    let (header, consumed) = read_header(&mut cursor).unwrap();
    assert_eq!(consumed, 1024);
    assert_eq!(cursor.position(), 1024);
    assert_eq!((header.cols, header.rows, header.frames), (5, 4, 3));
    assert_eq!(header.mode, MODE_FLOAT32);
    assert_eq!(header.sampling, [5, 4, 3]);

    let shape = header.shape().unwrap();
    assert_eq!(shape, VolumeShape::new(3, 4, 5).unwrap());
}

#[test]
fn test_read_header_is_little_endian() {
    let mut bytes = vec![0u8; MRC_HEADER_LEN];
    // cols = 0x0102 stored little-endian
    bytes[0] = 0x02;
    bytes[1] = 0x01;
    let (header, _) = read_header(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(header.cols, 0x0102);
}

#[test]
fn test_read_header_truncated() {
    let bytes = raw_header([2, 2, 1, 2, 0, 0, 0, 2, 2, 1]);
    let err = read_header(&mut Cursor::new(&bytes[..1000])).unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::TruncatedHeader { got: 1000 })
    ));
}

#[test]
fn test_header_zero_dimension_is_rejected() {
    let bytes = raw_header([2, 0, 1, 2, 0, 0, 0, 0, 0, 0]);
    let (header, _) = read_header(&mut Cursor::new(bytes)).unwrap();
    assert!(header.shape().is_err());
}

#[test]
fn test_encode_decode_header() {
    let shape = VolumeShape::new(7, 3, 9).unwrap();
    let header = MrcHeader::for_float_volume(shape);

    let mut out = Vec::new();
    assert_eq!(write_header(&mut out, &header).unwrap(), 1024);
    assert_eq!(out.len(), 1024);
    assert_eq!(&out[208..212], b"MAP ");

    let (decoded, _) = read_header(&mut Cursor::new(out)).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(decoded.shape().unwrap(), shape);
}

// ========================================================================
// Frames
// ========================================================================

#[test]
fn test_reader_yields_frames_in_order() {
    let mut bytes = raw_header([2, 2, 2, 2, 0, 0, 0, 2, 2, 2]);
    bytes.extend(frame_bytes(&[1.0, 2.0, 3.0, 4.0]));
    bytes.extend(frame_bytes(&[5.0, 6.0, 7.0, 8.0]));

    let mut reader = MrcReader::new(Cursor::new(bytes)).unwrap();
    let (i0, f0) = reader.next_frame().unwrap().unwrap();
    let (i1, f1) = reader.next_frame().unwrap().unwrap();
    assert!(reader.next_frame().unwrap().is_none());

    assert_eq!(i0, 0);
    assert_eq!(i1, 1);
    // Row-major: the second value is row 0, column 1.
    assert_eq!(f0, array![[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(f1, array![[5.0, 6.0], [7.0, 8.0]]);
}

#[test]
fn test_reader_truncated_frame() {
    let mut bytes = raw_header([2, 2, 2, 2, 0, 0, 0, 2, 2, 2]);
    bytes.extend(frame_bytes(&[1.0, 2.0, 3.0, 4.0]));
    bytes.extend(frame_bytes(&[5.0, 6.0]));

    let mut reader = MrcReader::new(Cursor::new(bytes)).unwrap();
    assert!(reader.next_frame().unwrap().is_some());
    let err = reader.next_frame().unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::TruncatedFrame {
            index: 1,
            expected: 16
        })
    ));
}

#[test]
fn test_open_rejects_short_file_before_any_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.mrc");
    let mut bytes = raw_header([2, 2, 3, 2, 0, 0, 0, 2, 2, 3]);
    bytes.extend(frame_bytes(&[1.0; 8]));
    std::fs::write(&path, bytes).unwrap();

    let err = MrcReader::open(&path).err().unwrap();
    assert!(matches!(
        err,
        Error::Format(FormatError::TruncatedVolume {
            expected: 1072,
            actual: 1056
        })
    ));
}

#[test]
fn test_open_rejects_overflowing_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hostile.mrc");
    std::fs::write(&path, raw_header([u32::MAX, u32::MAX, 1, 2, 0, 0, 0, 0, 0, 0])).unwrap();

    let err = MrcReader::open(&path).err().unwrap();
    assert!(matches!(
        err,
        Error::Format(FormatError::InvalidShape {
            frames: 1,
            rows: 4294967295,
            cols: 4294967295,
        })
    ));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_open_huge_declared_frame_is_truncated_volume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.mrc");
    std::fs::write(&path, raw_header([400_000, 400_000, 1, 2, 0, 0, 0, 0, 0, 0])).unwrap();

    let err = MrcReader::open(&path).err().unwrap();
    assert!(matches!(
        err,
        Error::Format(FormatError::TruncatedVolume {
            expected: 640_000_001_024,
            actual: 1024,
        })
    ));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_stream_with_huge_declared_frame_fails_on_read() {
    let mut bytes = raw_header([400_000, 400_000, 1, 2, 0, 0, 0, 0, 0, 0]);
    bytes.extend(frame_bytes(&[1.0; 16]));

    let mut reader = MrcReader::new(Cursor::new(bytes)).unwrap();
    let err = reader.next_frame().unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::TruncatedFrame {
            index: 0,
            expected: 640_000_000_000,
        })
    ));
}

#[test]
fn test_non_float_mode_is_still_read_as_float32() {
    let mut bytes = raw_header([2, 1, 1, 1, 0, 0, 0, 2, 1, 1]);
    bytes.extend(frame_bytes(&[0.5, 2.0]));

    let mut reader = MrcReader::new(Cursor::new(bytes)).unwrap();
    assert!(!reader.header().is_float32());
    assert_eq!(reader.header().mode, 1);

    let (index, frame) = reader.next_frame().unwrap().unwrap();
    assert_eq!(index, 0);
    assert_eq!(frame, array![[0.5, 2.0]]);
    assert!(reader.next_frame().unwrap().is_none());
}

#[test]
fn test_open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MrcReader::open(dir.path().join("absent.mrc")).err().unwrap();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_writer_then_reader() {
    let shape = VolumeShape::new(2, 2, 3).unwrap();
    let frames = [
        Array2::from_shape_fn((2, 3), |(r, c)| (r * 3 + c) as f32),
        Array2::from_shape_fn((2, 3), |(r, c)| -((r * 3 + c) as f32) - 0.5),
    ];

    let mut writer = MrcWriter::new(Vec::new(), shape).unwrap();
    for frame in &frames {
        writer.write_frame(frame.view()).unwrap();
    }
    let bytes = writer.finish().unwrap();
    assert_eq!(bytes.len() as u64, shape.mrc_file_len());

    let mut reader = MrcReader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.shape(), shape);
    for expected in &frames {
        let (_, frame) = reader.next_frame().unwrap().unwrap();
        assert_eq!(&frame, expected);
    }
}

#[test]
fn test_writer_rejects_wrong_frame_shape() {
    let shape = VolumeShape::new(1, 2, 2).unwrap();
    let mut writer = MrcWriter::new(Vec::new(), shape).unwrap();
    let err = writer
        .write_frame(Array2::<f32>::zeros((3, 2)).view())
        .unwrap_err();
    assert!(matches!(err, Error::Format(FormatError::FrameShape { .. })));
}

#[test]
fn test_writer_finish_requires_all_frames() {
    let shape = VolumeShape::new(2, 1, 1).unwrap();
    let mut writer = MrcWriter::new(Vec::new(), shape).unwrap();
    writer.write_frame(array![[1.0f32]].view()).unwrap();
    let err = writer.finish().unwrap_err();
    assert!(matches!(
        err,
        Error::Format(FormatError::FrameCount {
            declared: 2,
            written: 1
        })
    ));
}
