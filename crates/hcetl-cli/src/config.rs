//! Layered run configuration.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file given with
//! `--config`, `HCETL_*` environment variables (a `.env` file in the working
//! directory is loaded first), then command-line flags. Flags are applied by
//! the caller on the resolved [`EtlConfig`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hcetl_core::PipelineOptions;
use hcetl_ingest::{CsvSource, CsvSourceOptions, MAX_CSV_FILE_SIZE};
use hcetl_load::{
    CsvDirSink, LoadOptions, RetryPolicy, Sink, SinkError, SqliteSink, TargetNames,
};
use hcetl_transform::{DEFAULT_DATE_FORMATS, NormalizeOptions};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_SOURCE: &str = "HCETL_SOURCE";
pub const ENV_SCHEMA: &str = "HCETL_SCHEMA";
pub const ENV_FACT_TABLE: &str = "HCETL_FACT_TABLE";
pub const ENV_SINK_DRIVER: &str = "HCETL_SINK_DRIVER";
pub const ENV_SINK_PATH: &str = "HCETL_SINK_PATH";
pub const ENV_MAX_FIELD_FAILURES: &str = "HCETL_MAX_FIELD_FAILURES";

const DEFAULT_SQLITE_PATH: &str = "healthcare.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("no source file configured (pass SOURCE, set {ENV_SOURCE}, or set [source].path)")]
    MissingSource,
}

/// Where loaded tables go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkDriver {
    #[default]
    Sqlite,
    Csv,
}

impl SinkDriver {
    fn parse(key: &str, value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "csv" => Ok(Self::Csv),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                message: "expected 'sqlite' or 'csv'".to_string(),
            }),
        }
    }
}

/// The TOML file layout. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub source: SourceSection,
    pub target: Option<TargetNames>,
    pub sink: SinkSection,
    pub normalize: NormalizeSection,
    pub load: LoadSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    pub path: Option<PathBuf>,
    pub separator: Option<char>,
    pub max_file_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SinkSection {
    pub driver: Option<SinkDriver>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeSection {
    pub date_formats: Option<Vec<String>>,
    pub max_field_failures: Option<usize>,
    pub parallel_dimensions: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSection {
    pub batch_size: Option<usize>,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub source: Option<PathBuf>,
    pub separator: u8,
    pub max_file_size: u64,
    pub target: TargetNames,
    pub sink_driver: SinkDriver,
    /// SQLite database file, or the output directory for the CSV driver.
    pub sink_path: PathBuf,
    pub date_formats: Vec<String>,
    pub max_field_failures: Option<usize>,
    pub parallel_dimensions: bool,
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl Default for EtlConfig {
    fn default() -> Self {
        let load = LoadOptions::default();
        Self {
            source: None,
            separator: b',',
            max_file_size: MAX_CSV_FILE_SIZE,
            target: TargetNames::default(),
            sink_driver: SinkDriver::Sqlite,
            sink_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| (*f).to_string()).collect(),
            max_field_failures: None,
            parallel_dimensions: true,
            batch_size: load.batch_size,
            retry: load.retry,
        }
    }
}

impl EtlConfig {
    /// Loads `.env`, the optional TOML file, and the process environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env file"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }
        let file = config_path.map(FileConfig::from_path).transpose()?;
        Self::resolve(file.as_ref(), |key| std::env::var(key).ok())
    }

    /// Layers a file config and an environment lookup over the defaults.
    pub fn resolve(
        file: Option<&FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(file) = file {
            config.apply_file(file)?;
        }
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply_file(&mut self, file: &FileConfig) -> Result<(), ConfigError> {
        if let Some(path) = &file.source.path {
            self.source = Some(path.clone());
        }
        if let Some(separator) = file.source.separator {
            self.separator = u8::try_from(separator).map_err(|_| ConfigError::InvalidValue {
                key: "source.separator".to_string(),
                value: separator.to_string(),
                message: "separator must be a single-byte character".to_string(),
            })?;
        }
        if let Some(size) = file.source.max_file_size {
            self.max_file_size = size;
        }
        if let Some(target) = &file.target {
            self.target = target.clone();
        }
        if let Some(driver) = file.sink.driver {
            self.set_sink_driver(driver);
        }
        if let Some(path) = &file.sink.path {
            self.sink_path = path.clone();
        }
        if let Some(formats) = &file.normalize.date_formats {
            self.date_formats = formats.clone();
        }
        if file.normalize.max_field_failures.is_some() {
            self.max_field_failures = file.normalize.max_field_failures;
        }
        if let Some(parallel) = file.normalize.parallel_dimensions {
            self.parallel_dimensions = parallel;
        }
        if let Some(batch_size) = file.load.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(attempts) = file.load.max_attempts {
            self.retry.max_attempts = attempts;
        }
        if let Some(backoff) = file.load.backoff_ms {
            self.retry.backoff = Duration::from_millis(backoff);
        }
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = lookup(ENV_SOURCE) {
            self.source = Some(PathBuf::from(path));
        }
        if let Some(schema) = lookup(ENV_SCHEMA) {
            self.target.schema = schema;
        }
        if let Some(table) = lookup(ENV_FACT_TABLE) {
            self.target.fact_table = table;
        }
        if let Some(driver) = lookup(ENV_SINK_DRIVER) {
            self.set_sink_driver(SinkDriver::parse(ENV_SINK_DRIVER, &driver)?);
        }
        if let Some(path) = lookup(ENV_SINK_PATH) {
            self.sink_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_MAX_FIELD_FAILURES) {
            let threshold =
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|err| ConfigError::InvalidValue {
                        key: ENV_MAX_FIELD_FAILURES.to_string(),
                        value: value.clone(),
                        message: err.to_string(),
                    })?;
            self.max_field_failures = Some(threshold);
        }
        Ok(())
    }

    /// Switches driver; a still-default SQLite path becomes an `output` directory for CSV.
    pub fn set_sink_driver(&mut self, driver: SinkDriver) {
        if driver == SinkDriver::Csv && self.sink_path == Path::new(DEFAULT_SQLITE_PATH) {
            self.sink_path = PathBuf::from("output");
        }
        self.sink_driver = driver;
    }

    pub fn csv_source(&self) -> Result<CsvSource, ConfigError> {
        let path = self.source.clone().ok_or(ConfigError::MissingSource)?;
        let options = CsvSourceOptions::default()
            .with_separator(self.separator)
            .with_max_file_size(self.max_file_size);
        Ok(CsvSource::new(path).with_options(options))
    }

    pub fn open_sink(&self) -> Result<Box<dyn Sink>, SinkError> {
        Ok(match self.sink_driver {
            SinkDriver::Sqlite => Box::new(SqliteSink::open(&self.sink_path)?),
            SinkDriver::Csv => Box::new(CsvDirSink::new(&self.sink_path)),
        })
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions::default()
            .with_date_formats(self.date_formats.clone())
            .with_max_field_failures(self.max_field_failures)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            normalize: self.normalize_options(),
            parallel_dimensions: self.parallel_dimensions,
            target: self.target.clone(),
            load: LoadOptions {
                batch_size: self.batch_size,
                retry: self.retry,
            },
            ..PipelineOptions::default()
        }
    }
}
