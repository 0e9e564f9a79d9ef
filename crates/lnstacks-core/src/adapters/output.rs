//! Absorbance output container shared by the HDF5 and MRC adapters.

use std::fs;
use std::path::Path;

use hdf5::{Dataset, File, Group};
use ndarray::{s, Array2, Axis};

use crate::error::{FormatError, Result};
use crate::models::VolumeShape;

pub const ATTR_FRAMES: &str = "Number of Frames";
pub const ATTR_ROWS: &str = "Number of Rows";
pub const ATTR_COLUMNS: &str = "Number of Columns";

/// A freshly created `_ln.hdf5` file with its group and float32 dataset.
///
/// The dataset is chunked one frame per chunk, `(1, rows, cols)`, so each
/// frame write touches exactly one chunk.
pub(crate) struct OutputStack {
    file: File,
    group: Group,
    dataset: Dataset,
    shape: VolumeShape,
    written: u32,
}

impl OutputStack {
    /// Create (or truncate) `path` with group `tree` holding dataset `name`.
    pub fn create(path: &Path, tree: &str, name: &str, shape: VolumeShape) -> Result<Self> {
        let file = File::create(path)?;
        let group = file.create_group(tree)?;

        let (frames, rows, cols) = shape.dims();
        let dataset = group
            .new_dataset::<f32>()
            .shape((frames, rows, cols))
            .chunk((1, rows, cols))
            .create(name)?;

        write_count_attr(&dataset, ATTR_FRAMES, shape.frames)?;
        write_count_attr(&dataset, ATTR_ROWS, shape.rows)?;
        write_count_attr(&dataset, ATTR_COLUMNS, shape.cols)?;

        Ok(Self {
            file,
            group,
            dataset,
            shape,
            written: 0,
        })
    }

    pub fn group(&self) -> &Group {
        &self.group
    }

    /// Write `frame` at `index`. Frames must arrive in increasing order.
    pub fn write_frame(&mut self, index: u32, frame: &Array2<f32>) -> Result<()> {
        if index != self.written || index >= self.shape.frames {
            return Err(FormatError::FrameIndex {
                index,
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

        let i = index as usize;
        let block = frame.view().insert_axis(Axis(0));
        self.dataset.write_slice(block, s![i..i + 1, .., ..])?;
        self.written += 1;
        Ok(())
    }

    /// Check that every frame landed, then flush and close the file.
    pub fn close(self) -> Result<()> {
        let Self {
            file,
            group,
            dataset,
            shape,
            written,
        } = self;

        if written != shape.frames {
            return Err(FormatError::FrameCount {
                declared: shape.frames,
                written,
            }
            .into());
        }

        drop(dataset);
        drop(group);
        file.flush()?;
        file.close()?;
        Ok(())
    }
}

fn write_count_attr(dataset: &Dataset, name: &str, value: u32) -> Result<()> {
    dataset
        .new_attr::<i64>()
        .create(name)?
        .write_scalar(&i64::from(value))?;
    Ok(())
}

/// Remove a partially written output when `result` is an error.
///
/// All HDF5 handles on `output` must already be dropped.
pub(crate) fn remove_on_error<T>(output: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() && output.exists() {
        match fs::remove_file(output) {
            Ok(()) => log::debug!("removed partial output {}", output.display()),
            Err(e) => log::warn!(
                "could not remove partial output {}: {}",
                output.display(),
                e
            ),
        }
    }
    result
}
