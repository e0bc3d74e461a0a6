//! CSV extract reading.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::{CsvReadOptions, SerReader};
use tracing::{debug, info};

use crate::Source;
use crate::dataset::RawDataset;
use crate::error::{Result, SourceError};

/// Maximum file size for CSV loading (500 MB default).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Options for reading a CSV extract.
#[derive(Debug, Clone)]
pub struct CsvSourceOptions {
    /// Field separator byte.
    pub separator: u8,
    /// Files above this size are rejected before parsing.
    pub max_file_size: u64,
}

impl Default for CsvSourceOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

impl CsvSourceOptions {
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

/// Reads a CSV file with every column as a string column.
///
/// No type inference happens here: dirty cells such as `"N/A"` in a numeric
/// column must reach the normalizer intact.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvSourceOptions,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: CsvSourceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CsvSourceOptions) -> Self {
        self.options = options;
        self
    }
}

impl Source for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<RawDataset> {
        let start = Instant::now();
        let path = self.path.as_path();
        let size = check_file_size(path, self.options.max_file_size)?;
        validate_encoding(path)?;
        if size == 0 {
            return Err(SourceError::EmptyCsv {
                path: path.to_path_buf(),
            });
        }

        let separator = self.options.separator;
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| opts.with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| SourceError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .finish()
            .map_err(|e| SourceError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        debug!(columns = ?frame.get_column_names(), "csv header");
        info!(
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            duration_ms = start.elapsed().as_millis(),
            "csv extract read"
        );
        Ok(RawDataset::new(frame))
    }
}

/// Check file size before loading.
fn check_file_size(path: &Path, max_size: u64) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| open_error(path, e))?;
    if metadata.len() > max_size {
        return Err(SourceError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(metadata.len())
}

/// Rejects files carrying a UTF-16 byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| SourceError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(SourceError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(SourceError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

fn open_error(path: &Path, error: std::io::Error) -> SourceError {
    if error.kind() == std::io::ErrorKind::NotFound {
        SourceError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        SourceError::FileRead {
            path: path.to_path_buf(),
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn reads_all_columns_as_strings() {
        let file = create_temp_csv(b"Name,Age,Billing Amount\nJane,41,N/A\nJohn,39,12.5\n");
        let raw = CsvSource::new(file.path()).read().unwrap();

        assert_eq!(raw.height(), 2);
        assert_eq!(raw.column_names(), vec!["Name", "Age", "Billing Amount"]);
        let billing = raw.frame().column("Billing Amount").unwrap();
        assert_eq!(billing.str().unwrap().get(0), Some("N/A"));
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let file = create_temp_csv(b"Name,Age\n");
        let raw = CsvSource::new(file.path()).read().unwrap();
        assert_eq!(raw.height(), 0);
        assert_eq!(raw.column_names(), vec!["Name", "Age"]);
    }

    #[test]
    fn zero_byte_file_is_rejected() {
        let file = create_temp_csv(b"");
        let result = CsvSource::new(file.path()).read();
        assert!(matches!(result, Err(SourceError::EmptyCsv { .. })));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = CsvSource::new("/definitely/not/here.csv").read();
        assert!(matches!(result, Err(SourceError::FileNotFound { .. })));
    }

    #[test]
    fn utf16_is_rejected() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'N', 0]);
        let result = validate_encoding(file.path());
        assert!(matches!(
            result,
            Err(SourceError::UnsupportedEncoding { encoding: "UTF-16 LE", .. })
        ));
    }

    #[test]
    fn size_limit_is_enforced() {
        let file = create_temp_csv(b"Name\nJane\n");
        let source = CsvSource::new(file.path())
            .with_options(CsvSourceOptions::default().with_max_file_size(4));
        assert!(matches!(source.read(), Err(SourceError::FileTooLarge { .. })));
    }

    #[test]
    fn semicolon_separator() {
        let file = create_temp_csv(b"Name;Hospital\nJane;General, Hospital\n");
        let source = CsvSource::new(file.path())
            .with_options(CsvSourceOptions::default().with_separator(b';'));
        let raw = source.read().unwrap();
        let hospital = raw.frame().column("Hospital").unwrap();
        assert_eq!(hospital.str().unwrap().get(0), Some("General, Hospital"));
    }
}
