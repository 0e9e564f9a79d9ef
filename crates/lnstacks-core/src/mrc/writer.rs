//! Sequential frame writer for float32 MRC volumes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::ArrayView2;

use super::header::{write_header, MrcHeader};
use crate::error::{Error, FormatError, Result};
use crate::models::{VolumeShape, SAMPLE_BYTES};

pub struct MrcWriter<W: Write = BufWriter<File>> {
    inner: W,
    shape: VolumeShape,
    written: u32,
    buf: Vec<u8>,
}

impl MrcWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, shape: VolumeShape) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Self::new(BufWriter::new(file), shape)
    }
}

impl<W: Write> MrcWriter<W> {
    /// Write a float32 header for `shape` and get ready for frame 0.
    pub fn new(mut inner: W, shape: VolumeShape) -> Result<Self> {
        write_header(&mut inner, &MrcHeader::for_float_volume(shape))?;
        Ok(Self {
            inner,
            shape,
            written: 0,
            buf: Vec::with_capacity(shape.frame_bytes()),
        })
    }

    /// Append the next frame as little-endian float32, row-major.
    pub fn write_frame(&mut self, frame: ArrayView2<'_, f32>) -> Result<()> {
        if self.written >= self.shape.frames {
            return Err(FormatError::FrameIndex {
                index: self.written,
                frames: self.shape.frames,
            }
            .into());
        }
        if frame.dim() != self.shape.frame_dim() {
            return Err(FormatError::FrameShape {
                expected: self.shape.frame_dim(),
                got: frame.dim(),
            }
            .into());
        }

        self.buf.clear();
        for &v in frame.iter() {
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
        debug_assert_eq!(self.buf.len(), self.shape.frame_len() * SAMPLE_BYTES);
        self.inner.write_all(&self.buf)?;
        self.written += 1;
        Ok(())
    }

    /// Flush and hand back the sink. Fails unless every frame was written.
    pub fn finish(mut self) -> Result<W> {
        if self.written != self.shape.frames {
            return Err(FormatError::FrameCount {
                declared: self.shape.frames,
                written: self.written,
            }
            .into());
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}
