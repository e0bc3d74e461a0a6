//! Tests for configuration layering.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use hcetl_cli::config::{ConfigError, EtlConfig, FileConfig, SinkDriver};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn file_config(text: &str) -> FileConfig {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hcetl.toml");
    std::fs::write(&path, text).unwrap();
    FileConfig::from_path(&path).unwrap()
}

#[test]
fn defaults_match_the_reference_layout() {
    let config = EtlConfig::resolve(None, env(&[])).unwrap();
    assert_eq!(config.target.schema, "main");
    assert_eq!(config.target.fact_table, "fact_admissions");
    assert_eq!(config.target.insurance_table, "dim_insurance");
    assert_eq!(config.sink_driver, SinkDriver::Sqlite);
    assert_eq!(config.sink_path, PathBuf::from("healthcare.db"));
    assert_eq!(config.max_field_failures, None);
    assert!(config.parallel_dimensions);
    assert!(config.source.is_none());
}

#[test]
fn file_overrides_defaults() {
    let file = file_config(
        r#"
[source]
path = "data/healthcare_dataset.csv"
separator = ";"

[target]
schema = "warehouse"
patient_table = "patients"

[sink]
driver = "csv"
path = "out"

[normalize]
date_formats = ["%Y/%m/%d"]
max_field_failures = 10
parallel_dimensions = false

[load]
batch_size = 250
max_attempts = 5
backoff_ms = 20
"#,
    );
    let config = EtlConfig::resolve(Some(&file), env(&[])).unwrap();

    assert_eq!(config.source, Some(PathBuf::from("data/healthcare_dataset.csv")));
    assert_eq!(config.separator, b';');
    assert_eq!(config.target.schema, "warehouse");
    assert_eq!(config.target.patient_table, "patients");
    assert_eq!(config.target.fact_table, "fact_admissions");
    assert_eq!(config.sink_driver, SinkDriver::Csv);
    assert_eq!(config.sink_path, PathBuf::from("out"));
    assert_eq!(config.date_formats, vec!["%Y/%m/%d".to_string()]);
    assert_eq!(config.max_field_failures, Some(10));
    assert!(!config.parallel_dimensions);
    assert_eq!(config.batch_size, 250);
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.backoff, Duration::from_millis(20));
}

#[test]
fn environment_overrides_file() {
    let file = file_config("[target]\nschema = \"warehouse\"\n");
    let config = EtlConfig::resolve(
        Some(&file),
        env(&[
            ("HCETL_SCHEMA", "staging"),
            ("HCETL_SOURCE", "env.csv"),
            ("HCETL_SINK_DRIVER", "CSV"),
            ("HCETL_MAX_FIELD_FAILURES", "3"),
            ("HCETL_FACT_TABLE", ""),
        ]),
    )
    .unwrap();

    assert_eq!(config.target.schema, "staging");
    assert_eq!(config.target.fact_table, "fact_admissions");
    assert_eq!(config.source, Some(PathBuf::from("env.csv")));
    assert_eq!(config.sink_driver, SinkDriver::Csv);
    assert_eq!(config.sink_path, PathBuf::from("output"));
    assert_eq!(config.max_field_failures, Some(3));
}

#[test]
fn invalid_environment_values_are_reported() {
    let err = EtlConfig::resolve(None, env(&[("HCETL_MAX_FIELD_FAILURES", "lots")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HCETL_MAX_FIELD_FAILURES"));

    let err = EtlConfig::resolve(None, env(&[("HCETL_SINK_DRIVER", "odbc")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn unknown_file_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hcetl.toml");
    std::fs::write(&path, "[sink]\nserver = \"db.local\"\n").unwrap();
    assert!(matches!(
        FileConfig::from_path(&path),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn missing_source_is_an_error() {
    let config = EtlConfig::default();
    assert!(matches!(config.csv_source(), Err(ConfigError::MissingSource)));
}

#[test]
fn pipeline_options_follow_config() {
    let mut config = EtlConfig::default();
    config.max_field_failures = Some(7);
    config.batch_size = 50;
    config.parallel_dimensions = false;

    let options = config.pipeline_options();

    assert_eq!(options.normalize.max_field_failures, Some(7));
    assert_eq!(options.load.batch_size, 50);
    assert!(!options.parallel_dimensions);
}
