//! LnStacks Core Library
//!
//! Converts tomography transmittance stacks (HDF5 or raw MRC) into absorbance
//! stacks by applying `-ln` to every pixel, frame by frame.

pub mod adapters;
pub mod batch;
pub mod config;
pub mod error;
pub mod exporters;
pub mod models;
pub mod mrc;
pub mod transform;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use adapters::{convert_hdf5, convert_mrc, convert_stack};
pub use batch::{convert_directory, convert_path, BatchOptions, BatchReport, FileReport};
pub use config::{ExportConfig, ExporterKind, StackConfig};
pub use error::{Error, FormatError, Result};
pub use exporters::{ExternalConverter, MrcExporter, NativeMrcExporter};
pub use models::{ConversionOutcome, StackFormat, VolumeShape};
