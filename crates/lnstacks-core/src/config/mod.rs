//! Configuration loading.
//!
//! Settings come from an optional YAML file. Lookup order: an explicit path,
//! the `LNSTACKS_CONFIG` environment variable, `./config/lnstacks.yml`,
//! `./lnstacks.yml`, then `~/lnstacks/lnstacks.yml`. Anything not set falls
//! back to the built-in defaults.

mod defaults;

#[cfg(test)]
mod tests;

pub use defaults::{
    ExportConfig, ExporterKind, StackConfig, DEFAULT_CONVERTER, DEFAULT_DATASET, DEFAULT_TREE,
};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Candidate file names searched on disk.
const CONFIG_FILENAMES: &[&str] = &["lnstacks.yml", "lnstacks.yaml"];

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "LNSTACKS_CONFIG";

/// Complete configuration file structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LnStacksConfig {
    pub stack: StackConfig,
    pub export: ExportConfig,
    /// Worker threads for batch conversion. `None` means all CPUs minus one.
    pub threads: Option<usize>,
}

impl LnStacksConfig {
    fn sanitize(mut self) -> (Self, Vec<String>) {
        let mut warnings = self.stack.sanitize();
        warnings.extend(self.export.sanitize());
        if self.threads == Some(0) {
            warnings.push("threads must be at least 1; using the default".to_string());
            self.threads = None;
        }
        (self, warnings)
    }
}

/// Loaded configuration, its source path and any warnings.
pub struct ConfigHandle {
    pub config: LnStacksConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Parse one config file, failing if it cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<ConfigHandle> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    let config = parse_config(&contents)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    let (config, warnings) = config.sanitize();
    let source = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(ConfigHandle {
        config,
        source: Some(source),
        warnings,
    })
}

/// Search the candidate locations and load the first usable file.
///
/// Unreadable or malformed candidates are recorded as warnings and skipped.
/// When nothing loads, `source` is `None` and the defaults are returned.
pub fn load_config(custom_path: Option<&Path>) -> ConfigHandle {
    let mut warnings = Vec::new();

    for candidate in config_candidates(custom_path) {
        if !candidate.is_file() {
            continue;
        }
        match load_config_file(&candidate) {
            Ok(mut handle) => {
                warnings.append(&mut handle.warnings);
                handle.warnings = warnings;
                return handle;
            }
            Err(err) => warnings.push(err.to_string()),
        }
    }

    ConfigHandle {
        config: LnStacksConfig::default(),
        source: None,
        warnings,
    }
}

pub(crate) fn parse_config(contents: &str) -> std::result::Result<LnStacksConfig, serde_yaml::Error> {
    // An empty document deserializes to unit, not to the defaults.
    if contents.trim().is_empty() {
        return Ok(LnStacksConfig::default());
    }
    serde_yaml::from_str(contents)
}

fn config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home_dir.join("lnstacks").join(name));
        }
    }

    candidates
}
