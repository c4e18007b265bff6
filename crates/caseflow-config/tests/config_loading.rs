// caseflow-config/tests/config_loading.rs
// ============================================================================
// Integration tests: config file loading, env overrides, and fail-closed
// validation.
// ============================================================================

use std::io::Write;

use caseflow_config::CaseflowConfig;
use caseflow_config::config_schema;
use caseflow_config::config_toml_example;
use tempfile::NamedTempFile;

fn write_example_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config file");
    file.write_all(config_toml_example().as_bytes()).expect("write example config");
    file
}

#[test]
fn example_config_loads_from_disk() {
    let file = write_example_file();
    let config = CaseflowConfig::load(Some(file.path())).expect("example config loads");
    assert_eq!(config.ingress.port, 7443);
    assert_eq!(config.committee.providers.len(), 3);
}

#[test]
fn missing_file_is_an_io_error() {
    let result = CaseflowConfig::load(Some(std::path::Path::new("/nonexistent/caseflow.toml")));
    assert!(result.is_err());
}

#[test]
fn oversized_file_is_rejected() {
    let mut file = NamedTempFile::new().expect("create temp config file");
    let padding = "# ".to_string() + &"x".repeat(2 * 1024 * 1024);
    file.write_all(padding.as_bytes()).expect("write oversized config");
    let result = CaseflowConfig::load(Some(file.path()));
    assert!(result.is_err());
}

#[test]
fn schema_describes_required_external_catalog() {
    let schema = config_schema();
    let required = schema["required"].as_array().expect("required array");
    assert!(required.iter().any(|value| value == "external_catalog"));
}
