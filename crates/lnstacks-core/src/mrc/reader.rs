//! Streaming frame reader for float32 MRC volumes.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ndarray::Array2;

use super::header::{read_header, MrcHeader};
use crate::error::{Error, FormatError, Result};
use crate::models::{VolumeShape, SAMPLE_BYTES};

/// Reads an MRC volume one frame at a time.
///
/// Frames are yielded in file order; only one frame's bytes are held at once.
/// The frame buffer grows with the bytes actually read, so a header that
/// declares more data than the stream holds fails without a large allocation.
pub struct MrcReader<R = BufReader<File>> {
    inner: R,
    header: MrcHeader,
    shape: VolumeShape,
    next_index: u32,
    buf: Vec<u8>,
}

impl MrcReader<BufReader<File>> {
    /// Open an MRC file and validate that it holds every declared frame.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let actual = file.metadata().map_err(|e| Error::io(path, e))?.len();

        let reader = Self::new(BufReader::new(file))?;

        let expected = reader.shape.mrc_file_len();
        if actual < expected {
            return Err(FormatError::TruncatedVolume { expected, actual }.into());
        }
        if actual > expected {
            log::debug!(
                "{}: ignoring {} trailing bytes",
                path.display(),
                actual - expected
            );
        }
        Ok(reader)
    }
}

impl<R: Read> MrcReader<R> {
    /// Decode the header from `inner`, leaving the stream at the first frame.
    pub fn new(mut inner: R) -> Result<Self> {
        let (header, _) = read_header(&mut inner)?;
        let shape = header.shape()?;
        if !header.is_float32() {
            log::warn!(
                "MRC mode {} is not float32; reading samples as float32 anyway",
                header.mode
            );
        }
        Ok(Self {
            inner,
            header,
            shape,
            next_index: 0,
            buf: Vec::new(),
        })
    }

    pub fn header(&self) -> &MrcHeader {
        &self.header
    }

    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    /// Read the next frame, or `None` once every declared frame was read.
    pub fn next_frame(&mut self) -> Result<Option<(u32, Array2<f32>)>> {
        if self.next_index >= self.shape.frames {
            return Ok(None);
        }
        let index = self.next_index;
        let expected = self.shape.frame_bytes();

        self.buf.clear();
        let read = (&mut self.inner)
            .take(expected as u64)
            .read_to_end(&mut self.buf)?;
        if read < expected {
            return Err(FormatError::TruncatedFrame { index, expected }.into());
        }

        let frame = decode_frame(&self.buf, self.shape)?;
        self.next_index += 1;
        Ok(Some((index, frame)))
    }
}

/// Unpack `rows * cols` little-endian float32 samples into a frame.
pub fn decode_frame(bytes: &[u8], shape: VolumeShape) -> Result<Array2<f32>> {
    let samples: Vec<f32> = bytes
        .chunks_exact(SAMPLE_BYTES)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let len = samples.len();
    Array2::from_shape_vec(shape.frame_dim(), samples).map_err(|_| {
        FormatError::FrameShape {
            expected: shape.frame_dim(),
            got: (1, len),
        }
        .into()
    })
}
