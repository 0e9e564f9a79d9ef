//! MRC re-export of converted stacks.
//!
//! The default exporter shells out to an external image converter once per
//! file; its output is opaque and only the exit status is inspected. The
//! native exporter writes the volume with this crate's MRC codec instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use hdf5::File;
use ndarray::s;

use crate::config::{ExportConfig, ExporterKind, StackConfig};
use crate::error::{Error, Result};
use crate::models::VolumeShape;
use crate::mrc::MrcWriter;

/// Turns a converted `_ln.hdf5` file into an MRC volume.
pub trait MrcExporter: Send + Sync {
    fn name(&self) -> &str;

    /// Export `<tree>/<dataset>` of `hdf5_path`, returning the MRC path.
    fn export(&self, hdf5_path: &Path, stack: &StackConfig) -> Result<PathBuf>;
}

/// `<stem>.mrc` next to the HDF5 file.
pub fn mrc_path_for(hdf5_path: &Path) -> PathBuf {
    hdf5_path.with_extension("mrc")
}

/// Build the exporter selected in `config`.
pub fn build_exporter(config: &ExportConfig) -> Box<dyn MrcExporter> {
    match config.exporter {
        ExporterKind::External => Box::new(ExternalConverter::new(config.program.clone())),
        ExporterKind::Native => Box::new(NativeMrcExporter),
    }
}

/// Invokes `<program> -i <tree>/<dataset>@<file> -o <stem>.mrc [args...]`.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
    args: Vec<String>,
}

impl ExternalConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Extra arguments appended after the output path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self, hdf5_path: &Path, stack: &StackConfig) -> Command {
        let source = format!("{}@{}", stack.dataset_path(), hdf5_path.display());
        let mut cmd = Command::new(&self.program);
        cmd.arg("-i")
            .arg(source)
            .arg("-o")
            .arg(mrc_path_for(hdf5_path))
            .args(&self.args);
        cmd
    }
}

impl MrcExporter for ExternalConverter {
    fn name(&self) -> &str {
        &self.program
    }

    fn export(&self, hdf5_path: &Path, stack: &StackConfig) -> Result<PathBuf> {
        let export_error = |reason: String| Error::Export {
            path: hdf5_path.to_path_buf(),
            reason,
        };

        let output = self
            .command(hdf5_path, stack)
            .output()
            .map_err(|e| export_error(format!("failed to launch {}: {}", self.program, e)))?;

        if !output.status.success() {
            log::debug!(
                "{} stderr: {}",
                self.program,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(export_error(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(mrc_path_for(hdf5_path))
    }
}

/// Writes float32 MRC volumes frame by frame with [`MrcWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMrcExporter;

impl MrcExporter for NativeMrcExporter {
    fn name(&self) -> &str {
        "native"
    }

    fn export(&self, hdf5_path: &Path, stack: &StackConfig) -> Result<PathBuf> {
        let target = mrc_path_for(hdf5_path);
        let result = write_native(hdf5_path, stack, &target);
        if result.is_err() && target.exists() {
            if let Err(e) = fs::remove_file(&target) {
                log::warn!("could not remove partial {}: {}", target.display(), e);
            }
        }
        result.map(|()| target)
    }
}

fn write_native(hdf5_path: &Path, stack: &StackConfig, target: &Path) -> Result<()> {
    let file = File::open(hdf5_path)?;
    let dataset_path = stack.dataset_path();
    if !file.link_exists(&dataset_path) {
        return Err(Error::not_found(hdf5_path, format!("dataset {}", dataset_path)));
    }
    let dataset = file.dataset(&dataset_path)?;
    let shape = VolumeShape::from_dims(&dataset.shape())?;

    let mut writer = MrcWriter::create(target, shape)?;
    for index in 0..shape.frames as usize {
        let frame = dataset.read_slice_2d::<f32, _>(s![index, .., ..])?;
        writer.write_frame(frame.view())?;
    }
    writer.finish()?;
    Ok(())
}
