//! Settings resolution and console reporting.

use anyhow::{Context, Result};
use lnstacks_core::batch::FileReport;
use lnstacks_core::config::{load_config, load_config_file, LnStacksConfig};
use lnstacks_core::{BatchOptions, BatchReport, ConversionOutcome};

use crate::args::Cli;


/// Load the config file and apply command-line overrides on top.
///
/// An explicit `--config` that cannot be loaded is an error; files found by
/// searching are skipped with a warning instead.
pub fn resolve_settings(cli: &Cli) -> Result<LnStacksConfig> {
    let handle = match &cli.config {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(None),
    };

    for warning in &handle.warnings {
        log::warn!("{}", warning);
    }
    match &handle.source {
        Some(source) => log::debug!("Using config {}", source.display()),
        None => log::debug!("No lnstacks config found; using built-in defaults"),
    }

    Ok(apply_overrides(handle.config, cli))
}

pub fn apply_overrides(mut config: LnStacksConfig, cli: &Cli) -> LnStacksConfig {
    if let Some(tree) = &cli.stack.tree {
        config.stack.tree = tree.clone();
    }
    if let Some(dataset) = &cli.stack.dataset {
        config.stack.dataset = dataset.clone();
    }
    if let Some(exporter) = cli.export.exporter {
        config.export.exporter = exporter.into();
    }
    if let Some(program) = &cli.export.converter {
        config.export.program = program.clone();
    }
    if cli.threads.is_some() {
        config.threads = cli.threads;
    }

    // Flags go through the same checks as file values.
    let mut warnings = config.stack.sanitize();
    warnings.extend(config.export.sanitize());
    for warning in warnings {
        log::warn!("{}", warning);
    }
    config
}

pub fn build_options(config: &LnStacksConfig, convert_to_mrc: bool) -> BatchOptions {
    BatchOptions::new(config.stack.clone(), &config.export)
        .with_threads(config.threads)
        .with_mrc_export(convert_to_mrc)
}

/// One console line for a finished file.
pub fn status_line(count: usize, total: usize, report: &FileReport) -> String {
    let prefix = format!("[{}/{}] {}", count, total, report.input.display());
    match &report.result {
        Ok(ConversionOutcome::Converted { output, shape, .. }) => format!(
            "{} -> {} ({}, {:.2}s)",
            prefix,
            output.display(),
            shape,
            report.elapsed.as_secs_f64()
        ),
        Ok(ConversionOutcome::Skipped { reason, .. }) => format!("{} skipped ({})", prefix, reason),
        Err(e) => format!("{} FAILED: {}", prefix, e),
    }
}

pub fn print_summary(report: &BatchReport) {
    let converted = report.converted().count();
    let skipped = report.skipped().count();
    let failed: Vec<_> = report.failed().collect();
    let failed_exports: Vec<_> = report.failed_exports().collect();
    let total = report.elapsed.as_secs_f64();

    println!("\n========================================");
    println!("CONVERSION COMPLETE");
    println!("========================================");
    println!("  Converted:  {}", converted);
    println!("  Skipped:    {}", skipped);
    println!("  Failed:     {}", failed.len());
    if !report.exports.is_empty() {
        println!(
            "  MRC export: {} ok, {} failed",
            report.exports.len() - failed_exports.len(),
            failed_exports.len()
        );
    }
    println!("  Total time: {:.2}s", total);
    if converted > 0 {
        println!("  Avg time:   {:.2}s per stack", total / converted as f64);
    }

    if !failed.is_empty() || !failed_exports.is_empty() {
        println!("\nErrors:");
        for (path, error) in failed.iter().chain(failed_exports.iter()) {
            println!("  {}: {}", path.display(), error);
        }
    }
}
