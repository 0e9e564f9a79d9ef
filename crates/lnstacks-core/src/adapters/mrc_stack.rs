//! Raw MRC transmittance stacks, converted to HDF5 on ingest.

use std::path::Path;

use super::output::{remove_on_error, OutputStack};
use crate::config::StackConfig;
use crate::error::Result;
use crate::models::{ConversionOutcome, CopiedMetadata, StackDescriptor};
use crate::mrc::MrcReader;
use crate::transform::minus_ln_inplace;

/// Convert an MRC volume into `<stem>_ln.hdf5` under `<tree>/<dataset>`.
///
/// MRC carries no angle, energy or pixel-size fields, so no metadata is
/// copied. The file length is checked against the header before any output
/// is created.
pub fn convert_mrc(path: &Path, config: &StackConfig) -> Result<ConversionOutcome> {
    convert_resolved(&StackDescriptor::resolve(path, config))
}

pub(super) fn convert_resolved(desc: &StackDescriptor) -> Result<ConversionOutcome> {
    let mut reader = MrcReader::open(&desc.path)?;
    let shape = reader.shape();
    log::debug!("{}: MRC stack {}", desc.path.display(), shape);

    let output = desc.output_path();
    remove_on_error(&output, write_stack(&mut reader, desc, &output))?;

    Ok(ConversionOutcome::Converted {
        input: desc.path.clone(),
        output,
        shape,
        metadata: CopiedMetadata::default(),
    })
}

fn write_stack(reader: &mut MrcReader, desc: &StackDescriptor, output: &Path) -> Result<()> {
    let shape = reader.shape();
    let mut out = OutputStack::create(output, &desc.tree_name, &desc.dataset_name, shape)?;

    while let Some((index, mut frame)) = reader.next_frame()? {
        minus_ln_inplace(&mut frame);
        out.write_frame(index, &frame)?;
        log::debug!("{}: frame {}/{}", desc.path.display(), index + 1, shape.frames);
    }

    out.close()
}
