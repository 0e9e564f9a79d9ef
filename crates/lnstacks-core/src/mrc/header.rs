//! Fixed 1024-byte MRC header.
//!
//! Only the first ten little-endian 32-bit words are decoded. The rest of the
//! header is skipped on read and filled with a minimal MRC2014 layout on
//! write.

use std::io::{ErrorKind, Read, Write};

use crate::error::{FormatError, Result};
use crate::models::{VolumeShape, MRC_HEADER_LEN};

/// Pixel mode for 32-bit IEEE floats.
pub const MODE_FLOAT32: u32 = 2;

/// Words decoded from the start of the header.
const HEADER_WORDS: usize = 10;

/// Word offsets of the fields written beyond the decoded prefix.
const CELL_WORD: usize = 10;
const ANGLE_WORD: usize = 13;
const AXIS_MAP_WORD: usize = 16;
const MAP_WORD: usize = 52;
const MACHINE_STAMP_WORD: usize = 53;

/// Little-endian machine stamp.
const MACHINE_STAMP_LE: [u8; 4] = [0x44, 0x44, 0x00, 0x00];

/// Decoded prefix of an MRC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MrcHeader {
    pub cols: u32,
    pub rows: u32,
    pub frames: u32,
    pub mode: u32,
    /// `ncstart`, `nrstart`, `nsstart`
    pub start: [u32; 3],
    /// `nx`, `ny`, `nz` sampling along each axis
    pub sampling: [u32; 3],
}

impl MrcHeader {
    /// Header for a float32 volume with unit sampling.
    pub fn for_float_volume(shape: VolumeShape) -> Self {
        Self {
            cols: shape.cols,
            rows: shape.rows,
            frames: shape.frames,
            mode: MODE_FLOAT32,
            start: [0; 3],
            sampling: [shape.cols, shape.rows, shape.frames],
        }
    }

    /// Volume dimensions from words 0..3 (cols, rows, frames).
    pub fn shape(&self) -> Result<VolumeShape> {
        VolumeShape::new(self.frames, self.rows, self.cols)
    }

    pub fn is_float32(&self) -> bool {
        self.mode == MODE_FLOAT32
    }

    /// Decode the first forty bytes of `bytes`.
    pub fn decode(bytes: &[u8; MRC_HEADER_LEN]) -> Self {
        let mut words = [0u32; HEADER_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = read_word(bytes, i);
        }
        Self {
            cols: words[0],
            rows: words[1],
            frames: words[2],
            mode: words[3],
            start: [words[4], words[5], words[6]],
            sampling: [words[7], words[8], words[9]],
        }
    }

    /// Encode into a full header block.
    pub fn encode(&self) -> [u8; MRC_HEADER_LEN] {
        let mut bytes = [0u8; MRC_HEADER_LEN];
        let words = [
            self.cols,
            self.rows,
            self.frames,
            self.mode,
            self.start[0],
            self.start[1],
            self.start[2],
            self.sampling[0],
            self.sampling[1],
            self.sampling[2],
        ];
        for (i, word) in words.iter().enumerate() {
            write_word(&mut bytes, i, &word.to_le_bytes());
        }

        // Unit voxel size, orthogonal cell, columns/rows/sections axis order.
        for (i, &n) in self.sampling.iter().enumerate() {
            write_word(&mut bytes, CELL_WORD + i, &(n as f32).to_le_bytes());
            write_word(&mut bytes, ANGLE_WORD + i, &90.0f32.to_le_bytes());
            write_word(&mut bytes, AXIS_MAP_WORD + i, &(i as u32 + 1).to_le_bytes());
        }
        write_word(&mut bytes, MAP_WORD, b"MAP ");
        write_word(&mut bytes, MACHINE_STAMP_WORD, &MACHINE_STAMP_LE);
        bytes
    }
}

/// Read exactly one header block from `reader`.
///
/// Returns the decoded header and the number of bytes consumed, which is
/// always [`MRC_HEADER_LEN`]. Fails with [`FormatError::TruncatedHeader`] when
/// the stream ends early.
pub fn read_header<R: Read>(reader: &mut R) -> Result<(MrcHeader, usize)> {
    let mut bytes = [0u8; MRC_HEADER_LEN];
    let got = read_up_to(reader, &mut bytes)?;
    if got < MRC_HEADER_LEN {
        return Err(FormatError::TruncatedHeader { got }.into());
    }
    Ok((MrcHeader::decode(&bytes), MRC_HEADER_LEN))
}

/// Write `header` as a full block, returning the number of bytes written.
pub fn write_header<W: Write>(writer: &mut W, header: &MrcHeader) -> Result<usize> {
    writer.write_all(&header.encode())?;
    Ok(MRC_HEADER_LEN)
}

fn read_word(bytes: &[u8], index: usize) -> u32 {
    let o = index * 4;
    u32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]])
}

fn write_word(bytes: &mut [u8], index: usize, word: &[u8; 4]) {
    let o = index * 4;
    bytes[o..o + 4].copy_from_slice(word);
}

/// Fill as much of `buf` as the stream allows.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
