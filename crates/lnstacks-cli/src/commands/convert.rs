use anyhow::{bail, Result};
use lnstacks_core::convert_path;

use crate::args::Cli;
use crate::processing::{build_options, print_summary, resolve_settings, status_line};

/// Convert the input file or directory, printing one line per file.
///
/// Fails if the input is missing or any file or MRC export failed.
pub fn cmd_convert(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;
    let options = build_options(&settings, cli.export.convert_to_mrc());
    let is_dir = cli.input.is_dir();

    log::debug!(
        "Stack {} in {}; MRC export {}",
        settings.stack.dataset_path(),
        cli.input.display(),
        if options.convert_to_mrc {
            options.exporter.name()
        } else {
            "disabled"
        }
    );

    let quiet = cli.quiet;
    let report = convert_path(&cli.input, &options, |count, total, file| {
        if !quiet {
            println!("{}", status_line(count, total, file));
        } else if let Some(output) = file.output() {
            println!("{}", output.display());
        }
    })?;

    if is_dir && !quiet {
        print_summary(&report);
    } else {
        for (path, error) in report.failed_exports() {
            eprintln!("{}: {}", path.display(), error);
        }
    }

    let failed = report.failed().count();
    let failed_exports = report.failed_exports().count();
    if failed > 0 || failed_exports > 0 {
        bail!(
            "{} of {} stacks failed to convert, {} MRC exports failed",
            failed,
            report.files.len(),
            failed_exports
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    fn write_mrc(path: &Path, cols: u32, rows: u32, frames: u32, value: f32) {
        let mut bytes = Vec::new();
        for w in [cols, rows, frames, 2, 0, 0, 0, cols, rows, frames] {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes.resize(1024, 0);
        for _ in 0..cols * rows * frames {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        std::fs::write(path, bytes).unwrap();
    }

    fn run(args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("lnstacks").chain(args.iter().copied()))?;
        cmd_convert(&cli)
    }

    #[test]
    fn test_convert_directory_without_export() {
        let dir = tempfile::tempdir().unwrap();
        write_mrc(&dir.path().join("a.mrc"), 2, 2, 1, 1.0);
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();

        run(&["-q", "--mrc", "0", dir.path().to_str().unwrap()]).unwrap();
        assert!(dir.path().join("a_ln.hdf5").is_file());
    }

    #[test]
    fn test_native_export_from_cli() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.mrc");
        write_mrc(&input, 3, 2, 2, 0.5);

        run(&["-q", "--exporter", "native", input.to_str().unwrap()]).unwrap();
        assert!(dir.path().join("a_ln.hdf5").is_file());
        assert!(dir.path().join("a_ln.mrc").is_file());
    }

    #[test]
    fn test_failed_stack_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("short.mrc"), [0u8; 16]).unwrap();

        let err = run(&["-q", "-m", "0", dir.path().to_str().unwrap()]).unwrap_err();
        assert!(err.to_string().contains("1 of 1 stacks failed"));
    }

    #[test]
    fn test_missing_input_fails_command() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.hdf5");
        assert!(run(&["-q", missing.to_str().unwrap()]).is_err());
    }
}
