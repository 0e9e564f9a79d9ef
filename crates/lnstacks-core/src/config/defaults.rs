//! Default configuration values and their sanitization.

use serde::Deserialize;

/// Default name of both the HDF5 group and the dataset inside it.
pub const DEFAULT_TREE: &str = "TomoNormalized";
pub const DEFAULT_DATASET: &str = "TomoNormalized";

/// Default external converter used for MRC re-export.
pub const DEFAULT_CONVERTER: &str = "xmipp_image_convert";

/// Location of the stack inside an HDF5 container.
///
/// Passed explicitly to every adapter call; the same names are used for the
/// output group and dataset.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StackConfig {
    pub tree: String,
    pub dataset: String,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            tree: DEFAULT_TREE.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

impl StackConfig {
    pub fn new(tree: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            tree: tree.into(),
            dataset: dataset.into(),
        }
    }

    /// `"<tree>/<dataset>"`
    pub fn dataset_path(&self) -> String {
        format!("{}/{}", self.tree, self.dataset)
    }

    /// Replace blank names with the defaults, returning a warning per fix.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.tree.trim().is_empty() {
            warnings.push(format!("stack.tree is empty; using {}", DEFAULT_TREE));
            self.tree = DEFAULT_TREE.to_string();
        }
        if self.dataset.trim().is_empty() {
            warnings.push(format!("stack.dataset is empty; using {}", DEFAULT_DATASET));
            self.dataset = DEFAULT_DATASET.to_string();
        }
        warnings
    }
}

/// How `_ln.hdf5` outputs are turned into MRC files.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExporterKind {
    /// Shell out to an external image converter.
    #[default]
    External,
    /// Write the MRC volume with the built-in codec.
    Native,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    pub exporter: ExporterKind,
    /// Program invoked by the external exporter.
    pub program: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterKind::External,
            program: DEFAULT_CONVERTER.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.program.trim().is_empty() {
            warnings.push(format!(
                "export.program is empty; using {}",
                DEFAULT_CONVERTER
            ));
            self.program = DEFAULT_CONVERTER.to_string();
        }
        warnings
    }
}
