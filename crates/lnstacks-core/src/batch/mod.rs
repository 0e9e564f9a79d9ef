//! Directory and single-path batch conversion.
//!
//! Every discovered file becomes one independent job on a local rayon pool.
//! Results are collected per file, so one failure never aborts the others.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::adapters::convert_descriptor;
use crate::config::{ExportConfig, StackConfig};
use crate::error::{Error, Result};
use crate::exporters::{build_exporter, mrc_path_for, MrcExporter};
use crate::models::{output_path_for, ConversionOutcome, StackDescriptor, StackFormat};


/// Options shared by every job of a batch.
pub struct BatchOptions {
    pub stack: StackConfig,
    /// Worker count; `None` uses [`default_workers`].
    pub threads: Option<usize>,
    pub convert_to_mrc: bool,
    pub exporter: Box<dyn MrcExporter>,
}

impl BatchOptions {
    pub fn new(stack: StackConfig, export: &ExportConfig) -> Self {
        Self {
            stack,
            threads: None,
            convert_to_mrc: true,
            exporter: build_exporter(export),
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_mrc_export(mut self, enabled: bool) -> Self {
        self.convert_to_mrc = enabled;
        self
    }

    pub fn with_exporter(mut self, exporter: Box<dyn MrcExporter>) -> Self {
        self.exporter = exporter;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new(StackConfig::default(), &ExportConfig::default())
    }
}

/// Result of one input file.
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub result: Result<ConversionOutcome>,
    pub elapsed: Duration,
}

impl FileReport {
    pub fn output(&self) -> Option<&Path> {
        self.result.as_ref().ok().and_then(ConversionOutcome::output)
    }
}

/// Result of one MRC export.
#[derive(Debug)]
pub struct ExportReport {
    pub source: PathBuf,
    pub result: Result<PathBuf>,
}

/// Per-file results in discovery order, followed by export results.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub exports: Vec<ExportReport>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn converted(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(ConversionOutcome::Converted { .. })))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(ConversionOutcome::Skipped { .. })))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.files.iter().filter_map(|f| match &f.result {
            Err(e) => Some((f.input.as_path(), e)),
            Ok(_) => None,
        })
    }

    pub fn failed_exports(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.exports.iter().filter_map(|x| match &x.result {
            Err(e) => Some((x.source.as_path(), e)),
            Ok(_) => None,
        })
    }

    /// True when no conversion and no export failed. Skips do not count.
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none() && self.failed_exports().next().is_none()
    }
}

/// One worker per CPU, leaving one core free.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

fn build_pool(threads: Option<usize>) -> Result<rayon::ThreadPool> {
    let workers = threads.filter(|&n| n > 0).unwrap_or_else(default_workers);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("lnstacks-{}", i))
        .build()
        .map_err(|e| Error::Config(format!("failed to build worker pool: {}", e)))
}

/// Regular files directly inside `dir`, sorted by path.
pub fn discover_stacks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reasons to leave a discovered file alone, indexed like `files`.
///
/// A file that is the `_ln.hdf5` output of another input, or the `_ln.mrc`
/// exported from it, is a product of an earlier run and is left alone. Two
/// inputs sharing a stem would write the same output; the first input (in
/// path order) of a colliding pair wins.
fn plan_skips(files: &[PathBuf]) -> Vec<Option<&'static str>> {
    let convertible = |p: &Path| StackFormat::from_path(p) != StackFormat::Unsupported;
    let outputs: HashSet<PathBuf> = files
        .iter()
        .filter(|p| convertible(p.as_path()))
        .flat_map(|p| {
            let hdf5 = output_path_for(p);
            let mrc = mrc_path_for(&hdf5);
            [hdf5, mrc]
        })
        .collect();

    let mut claimed = HashSet::new();
    files
        .iter()
        .map(|p| {
            if outputs.contains(p) {
                Some("output of another input")
            } else if convertible(p.as_path()) && !claimed.insert(output_path_for(p)) {
                Some("output name collides with another input")
            } else {
                None
            }
        })
        .collect()
}

/// Convert every file directly inside `dir`.
///
/// `on_file` is called from worker threads as each file finishes, with the
/// finished count and the total.
pub fn convert_directory<F>(dir: &Path, options: &BatchOptions, on_file: F) -> Result<BatchReport>
where
    F: Fn(usize, usize, &FileReport) + Sync,
{
    let start = Instant::now();
    let files = discover_stacks(dir)?;
    let skips = plan_skips(&files);
    let pool = build_pool(options.threads)?;
    log::info!(
        "Converting {} files in {} with {} workers",
        files.len(),
        dir.display(),
        pool.current_num_threads()
    );

    let finished = AtomicUsize::new(0);
    let total = files.len();

    let reports: Vec<FileReport> = pool.install(|| {
        files
            .par_iter()
            .zip(skips.par_iter())
            .map(|(input, skip)| {
                let report = match skip {
                    Some(reason) => {
                        log::warn!("Skipping {}: {}", input.display(), reason);
                        FileReport {
                            input: input.clone(),
                            result: Ok(ConversionOutcome::Skipped {
                                input: input.clone(),
                                reason: reason.to_string(),
                            }),
                            elapsed: Duration::ZERO,
                        }
                    }
                    None => convert_one(input, &options.stack),
                };
                let count = finished.fetch_add(1, Ordering::SeqCst) + 1;
                on_file(count, total, &report);
                report
            })
            .collect()
    });

    let exports = if options.convert_to_mrc {
        let sources: Vec<PathBuf> = reports
            .iter()
            .filter_map(|r| r.output().map(Path::to_path_buf))
            .collect();
        pool.install(|| export_all(&sources, options))
    } else {
        Vec::new()
    };

    Ok(BatchReport {
        files: reports,
        exports,
        elapsed: start.elapsed(),
    })
}

/// Convert a single file or every file of a directory.
pub fn convert_path<F>(input: &Path, options: &BatchOptions, on_file: F) -> Result<BatchReport>
where
    F: Fn(usize, usize, &FileReport) + Sync,
{
    if input.is_dir() {
        return convert_directory(input, options, on_file);
    }
    if !input.is_file() {
        return Err(Error::not_found(input, "input file or directory"));
    }

    let start = Instant::now();
    let report = convert_one(input, &options.stack);
    on_file(1, 1, &report);

    let exports = match (options.convert_to_mrc, report.output()) {
        (true, Some(output)) => vec![export_one(output, options)],
        _ => Vec::new(),
    };

    Ok(BatchReport {
        files: vec![report],
        exports,
        elapsed: start.elapsed(),
    })
}

fn convert_one(input: &Path, stack: &StackConfig) -> FileReport {
    let start = Instant::now();
    let result = convert_descriptor(&StackDescriptor::resolve(input, stack));
    if let Err(e) = &result {
        log::error!("Failed to convert {}: {}", input.display(), e);
    }
    FileReport {
        input: input.to_path_buf(),
        result,
        elapsed: start.elapsed(),
    }
}

fn export_all(sources: &[PathBuf], options: &BatchOptions) -> Vec<ExportReport> {
    sources
        .par_iter()
        .map(|source| export_one(source, options))
        .collect()
}

fn export_one(source: &Path, options: &BatchOptions) -> ExportReport {
    let result = options.exporter.export(source, &options.stack);
    match &result {
        Ok(mrc) => log::info!(
            "Exported {} -> {} ({})",
            source.display(),
            mrc.display(),
            options.exporter.name()
        ),
        Err(e) => log::error!("MRC export of {} failed: {}", source.display(), e),
    }
    ExportReport {
        source: source.to_path_buf(),
        result,
    }
}
