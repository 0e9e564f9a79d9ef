//! HDF5 transmittance stacks.

use std::path::Path;

use hdf5::{Dataset, File};
use ndarray::s;

use super::metadata::MetadataBundle;
use super::output::{remove_on_error, OutputStack};
use crate::config::StackConfig;
use crate::error::{Error, Result};
use crate::models::{ConversionOutcome, CopiedMetadata, StackDescriptor, VolumeShape};
use crate::transform::minus_ln_inplace;

/// Convert `<tree>/<dataset>` of an HDF5 file into `<stem>_ln.hdf5`.
///
/// Metadata next to the dataset is copied on a best-effort basis. Frames are
/// read, transformed and written one at a time in index order.
pub fn convert_hdf5(path: &Path, config: &StackConfig) -> Result<ConversionOutcome> {
    convert_resolved(&StackDescriptor::resolve(path, config))
}

pub(super) fn convert_resolved(desc: &StackDescriptor) -> Result<ConversionOutcome> {
    let input = open_input(&desc.path)?;

    if !input.link_exists(&desc.tree_name) {
        return Err(Error::not_found(
            &desc.path,
            format!("group {}", desc.tree_name),
        ));
    }
    let group = input.group(&desc.tree_name)?;

    if !group.link_exists(&desc.dataset_name) {
        return Err(Error::not_found(
            &desc.path,
            format!("dataset {}/{}", desc.tree_name, desc.dataset_name),
        ));
    }
    let source = group.dataset(&desc.dataset_name)?;
    let shape = VolumeShape::from_dims(&source.shape())?;
    log::debug!("{}: HDF5 stack {}", desc.path.display(), shape);

    let metadata = MetadataBundle::extract(&group);

    let output = desc.output_path();
    let copied = remove_on_error(&output, write_stack(&source, shape, &metadata, desc, &output))?;

    Ok(ConversionOutcome::Converted {
        input: desc.path.clone(),
        output,
        shape,
        metadata: copied,
    })
}

fn open_input(path: &Path) -> Result<File> {
    // Report a missing file as I/O rather than as an opaque library error.
    std::fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok(File::open(path)?)
}

fn write_stack(
    source: &Dataset,
    shape: VolumeShape,
    metadata: &MetadataBundle,
    desc: &StackDescriptor,
    output: &Path,
) -> Result<CopiedMetadata> {
    let mut out = OutputStack::create(output, &desc.tree_name, &desc.dataset_name, shape)?;
    let copied = metadata.write_to(out.group());

    for index in 0..shape.frames {
        let mut frame = source.read_slice_2d::<f32, _>(s![index as usize, .., ..])?;
        minus_ln_inplace(&mut frame);
        out.write_frame(index, &frame)?;
        log::debug!("{}: frame {}/{}", desc.path.display(), index + 1, shape.frames);
    }

    out.close()?;
    Ok(copied)
}
