//! Tests for configuration loading

use super::*;

#[test]
fn test_defaults() {
    let config = LnStacksConfig::default();
    assert_eq!(config.stack.tree, "TomoNormalized");
    assert_eq!(config.stack.dataset, "TomoNormalized");
    assert_eq!(config.export.exporter, ExporterKind::External);
    assert_eq!(config.export.program, DEFAULT_CONVERTER);
    assert_eq!(config.threads, None);
}

#[test]
fn test_parse_partial_config_keeps_defaults() {
    let config = parse_config("stack:\n  dataset: data\nthreads: 3\n").unwrap();
    assert_eq!(config.stack.tree, "TomoNormalized");
    assert_eq!(config.stack.dataset, "data");
    assert_eq!(config.threads, Some(3));
    assert_eq!(config.export, ExportConfig::default());
}

#[test]
fn test_parse_exporter_kind() {
    let config = parse_config("export:\n  exporter: native\n").unwrap();
    assert_eq!(config.export.exporter, ExporterKind::Native);
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(parse_config("").unwrap(), LnStacksConfig::default());
}

#[test]
fn test_sanitize_blank_names_and_zero_threads() {
    let config = parse_config("stack:\n  tree: ''\nthreads: 0\n").unwrap();
    let (config, warnings) = config.sanitize();
    assert_eq!(config.stack.tree, DEFAULT_TREE);
    assert_eq!(config.threads, None);
    assert_eq!(warnings.len(), 2);
}

#[test]
fn test_load_config_file_reports_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lnstacks.yml");
    std::fs::write(&path, "stack:\n  tree: Absorbance\n").unwrap();

    let handle = load_config_file(&path).unwrap();
    assert_eq!(handle.config.stack.tree, "Absorbance");
    assert!(handle.source.is_some());
}

#[test]
fn test_load_config_file_rejects_bad_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::write(&path, "threads: [not, a, number]\n").unwrap();

    let err = load_config_file(&path).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_load_config_skips_broken_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    std::fs::write(&path, "threads: [1, 2]\n").unwrap();

    // The explicit candidate fails, so the search moves on and records why.
    let handle = load_config(Some(&path));
    assert!(handle
        .warnings
        .iter()
        .any(|w| w.contains("failed to parse")));
}
