//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use lnstacks_core::ExporterKind;


#[derive(Parser, Debug)]
#[command(name = "lnstacks")]
#[command(
    version,
    about = "Convert transmittance stacks (HDF5 or MRC) to absorbance with -ln",
    long_about = None
)]
pub struct Cli {
    /// Stack file or directory of stacks
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Number of parallel workers (default: CPUs minus one)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Config file (default: search LNSTACKS_CONFIG, ./config, ., ~/lnstacks)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print output paths and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Where the stack lives inside HDF5 files.
#[derive(Args, Clone, Debug, Default)]
pub struct StackArgs {
    /// HDF5 group holding the stack
    #[arg(long, value_name = "NAME")]
    pub tree: Option<String>,

    /// Dataset name inside the group
    #[arg(long, value_name = "NAME")]
    pub dataset: Option<String>,
}

/// MRC export of converted stacks.
#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    /// Also write each converted stack as MRC (0 disables)
    #[arg(short = 'm', long = "mrc", value_name = "N", default_value_t = 1)]
    pub mrc: i64,

    /// MRC exporter
    #[arg(long, value_enum, value_name = "KIND")]
    pub exporter: Option<ExporterArg>,

    /// Program used by the external exporter
    #[arg(long, value_name = "PROGRAM")]
    pub converter: Option<String>,
}

impl ExportArgs {
    pub fn convert_to_mrc(&self) -> bool {
        self.mrc != 0
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExporterArg {
    /// Run the external image converter
    External,
    /// Write MRC directly
    Native,
}

impl From<ExporterArg> for ExporterKind {
    fn from(arg: ExporterArg) -> Self {
        match arg {
            ExporterArg::External => ExporterKind::External,
            ExporterArg::Native => ExporterKind::Native,
        }
    }
}

impl Cli {
    /// Default log filter; `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
