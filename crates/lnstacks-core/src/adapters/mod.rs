//! Per-file conversion adapters.
//!
//! Each adapter owns exactly one input/output pair for the duration of a
//! call. Handles are released on every return path; a failed conversion
//! leaves no partial `_ln.hdf5` behind.

mod hdf5_stack;
mod metadata;
mod mrc_stack;
mod output;


pub use hdf5_stack::convert_hdf5;
pub use metadata::{MetadataArray, MetadataBundle};
pub use mrc_stack::convert_mrc;
pub use output::{ATTR_COLUMNS, ATTR_FRAMES, ATTR_ROWS};

use std::path::Path;
use std::time::Instant;

use crate::config::StackConfig;
use crate::error::{Error, Result};
use crate::models::{ConversionOutcome, StackDescriptor, StackFormat};

/// Convert one stack file, dispatching on its extension.
///
/// Files that are neither HDF5 nor MRC are skipped with a warning.
pub fn convert_stack(path: &Path, config: &StackConfig) -> Result<ConversionOutcome> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("input stack path is empty".to_string()));
    }
    convert_descriptor(&StackDescriptor::resolve(path, config))
}

/// Convert an already resolved stack.
pub fn convert_descriptor(desc: &StackDescriptor) -> Result<ConversionOutcome> {
    let start = Instant::now();

    let outcome = match desc.format {
        StackFormat::Hdf5 => hdf5_stack::convert_resolved(desc)?,
        StackFormat::Mrc => mrc_stack::convert_resolved(desc)?,
        StackFormat::Unsupported => {
            log::warn!(
                "Skipping {}: not an HDF5 (.hdf5, .h5) or MRC (.mrc) stack",
                desc.path.display()
            );
            return Ok(ConversionOutcome::Skipped {
                input: desc.path.clone(),
                reason: "unsupported extension".to_string(),
            });
        }
    };

    log::info!(
        "Stack {} has been converted ({:.2}s)",
        desc.path.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(outcome)
}
