//! Data model shared by the codec, adapters and batch orchestrator.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::StackConfig;
use crate::error::{FormatError, Result};

/// Size of the fixed MRC header in bytes.
pub const MRC_HEADER_LEN: usize = 1024;

/// Bytes per float32 sample.
pub const SAMPLE_BYTES: usize = 4;

/// Container format of an input stack, resolved from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackFormat {
    Hdf5,
    Mrc,
    /// Any other extension. Never converted.
    Unsupported,
}

impl StackFormat {
    /// Resolve the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("hdf5") | Some("h5") => StackFormat::Hdf5,
            Some("mrc") => StackFormat::Mrc,
            _ => StackFormat::Unsupported,
        }
    }
}

impl fmt::Display for StackFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackFormat::Hdf5 => write!(f, "HDF5"),
            StackFormat::Mrc => write!(f, "MRC"),
            StackFormat::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// One input volume and where its data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackDescriptor {
    pub path: PathBuf,
    pub format: StackFormat,
    pub tree_name: String,
    pub dataset_name: String,
}

impl StackDescriptor {
    pub fn resolve(path: &Path, config: &StackConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            format: StackFormat::from_path(path),
            tree_name: config.tree.clone(),
            dataset_name: config.dataset.clone(),
        }
    }

    /// `<input-stem>_ln.hdf5`, next to the input.
    pub fn output_path(&self) -> PathBuf {
        output_path_for(&self.path)
    }
}

/// Output location for the absorbance stack derived from `input`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_ln.hdf5", stem))
}

/// Dimensions of a stack: `frames` images of `rows` x `cols` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeShape {
    pub frames: u32,
    pub rows: u32,
    pub cols: u32,
}

impl VolumeShape {
    /// Build a shape, rejecting any zero dimension and any shape whose frame
    /// or MRC file size does not fit the platform's integer types.
    pub fn new(frames: u32, rows: u32, cols: u32) -> Result<Self> {
        let invalid = || FormatError::InvalidShape {
            frames: frames as u64,
            rows: rows as u64,
            cols: cols as u64,
        };
        if frames == 0 || rows == 0 || cols == 0 {
            return Err(invalid().into());
        }

        let frame_bytes = (rows as usize)
            .checked_mul(cols as usize)
            .and_then(|n| n.checked_mul(SAMPLE_BYTES))
            .ok_or_else(invalid)?;
        u64::try_from(frame_bytes)
            .ok()
            .and_then(|b| b.checked_mul(frames as u64))
            .and_then(|n| n.checked_add(MRC_HEADER_LEN as u64))
            .ok_or_else(invalid)?;

        Ok(Self { frames, rows, cols })
    }

    /// Shape from an HDF5 dataset's dimensions `(frames, rows, cols)`.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        let [frames, rows, cols] = dims else {
            return Err(FormatError::Rank { ndim: dims.len() }.into());
        };
        let invalid = || FormatError::InvalidShape {
            frames: *frames as u64,
            rows: *rows as u64,
            cols: *cols as u64,
        };
        let frames = u32::try_from(*frames).map_err(|_| invalid())?;
        let rows = u32::try_from(*rows).map_err(|_| invalid())?;
        let cols = u32::try_from(*cols).map_err(|_| invalid())?;
        Self::new(frames, rows, cols)
    }

    /// Pixels per frame. Cannot overflow: checked in [`VolumeShape::new`].
    pub fn frame_len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Bytes per float32 frame.
    pub fn frame_bytes(&self) -> usize {
        self.frame_len() * SAMPLE_BYTES
    }

    /// `(rows, cols)` as used by ndarray.
    pub fn frame_dim(&self) -> (usize, usize) {
        (self.rows as usize, self.cols as usize)
    }

    /// `(frames, rows, cols)` as used by the HDF5 dataspace.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.frames as usize, self.rows as usize, self.cols as usize)
    }

    /// Minimum length of an MRC file holding this volume.
    pub fn mrc_file_len(&self) -> u64 {
        MRC_HEADER_LEN as u64 + self.frames as u64 * self.frame_bytes() as u64
    }
}

impl fmt::Display for VolumeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.frames, self.rows, self.cols)
    }
}

/// Which metadata categories made it into an output stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopiedMetadata {
    pub rotation_angle: bool,
    pub energy: bool,
    pub pixel_size: bool,
}

/// Result of converting one input path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted {
        input: PathBuf,
        output: PathBuf,
        shape: VolumeShape,
        metadata: CopiedMetadata,
    },
    Skipped {
        input: PathBuf,
        reason: String,
    },
}

impl ConversionOutcome {
    pub fn output(&self) -> Option<&Path> {
        match self {
            ConversionOutcome::Converted { output, .. } => Some(output),
            ConversionOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }
}
