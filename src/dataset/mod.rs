//! NSC Dataset
//!
//! The dataset is read in full once and never mutated afterwards. It exposes
//! the shape and missing-value statistics shown in the dataset overview, a
//! bounded preview, and the distinct values that populate the prediction form.

use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

pub mod categories;
pub mod reader;

pub use categories::{distinct_sorted, CategoryColumns, CategoryOptions};
pub use reader::TextEncoding;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid text encoding on line {line}")]
    Encoding { line: u64 },

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow { line: u64, expected: usize, found: usize },

    #[error("dataset has no header row")]
    Empty,

    #[error("column not found: {0}")]
    MissingColumn(String),
}

/// How the dataset file is decoded and which columns feed the form.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub encoding: TextEncoding,
    pub delimiter: u8,
    pub columns: CategoryColumns,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Latin1,
            delimiter: b',',
            columns: CategoryColumns::default(),
        }
    }
}

#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub total_columns: usize,
    pub missing_values: usize,
}

/// The first rows of the dataset, column order preserved. Missing cells are `null`.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug)]
pub struct Dataset {
    source: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    options: CategoryOptions,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let start = Instant::now();
        let file = File::open(path)?;
        let dataset = Self::from_reader(BufReader::new(file), path.display().to_string(), opts)?;

        info!(
            source = %dataset.source,
            rows = dataset.rows.len(),
            columns = dataset.columns.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(
        input: R,
        source: impl Into<String>,
        opts: &LoadOptions,
    ) -> Result<Self, DatasetError> {
        let table = reader::read_table(input, opts.encoding, opts.delimiter)?;
        let mut dataset = Self {
            source: source.into(),
            columns: table.columns,
            rows: table.rows,
            options: CategoryOptions::default(),
        };

        dataset.options = CategoryOptions {
            sub_divisions: dataset.distinct_values(&opts.columns.sub_division)?,
            connection_types: dataset.distinct_values(&opts.columns.connection_type)?,
            phases: dataset.distinct_values(&opts.columns.phase)?,
        };
        Ok(dataset)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn overview(&self) -> DatasetOverview {
        DatasetOverview {
            total_records: self.rows.len(),
            total_columns: self.columns.len(),
            missing_values: self.rows.iter().flatten().filter(|cell| cell.is_none()).count(),
        }
    }

    pub fn preview(&self, limit: usize) -> PreviewTable {
        PreviewTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    pub fn distinct_values(&self, column: &str) -> Result<Vec<String>, DatasetError> {
        let idx = self.column_index(column)?;
        Ok(distinct_sorted(
            self.rows.iter().filter_map(|row| row[idx].as_deref()),
        ))
    }

    pub fn options(&self) -> &CategoryOptions {
        &self.options
    }

    fn column_index(&self, column: &str) -> Result<usize, DatasetError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DatasetError::MissingColumn(column.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const SAMPLE: &str = "\
APPL_NO,SUB_DIV_ID,CONN_TYPE,APPPHASE,LOAD_KW
1,1101,LT-1,1,2.5
2,903,LT-2,3,
3,1101,HT,3,120
4,NA,LT-1,,4
5,903,LT-1,1,7
";

    pub(crate) fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes(), "sample.csv", &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_overview_counts_missing_cells() {
        let overview = sample().overview();
        assert_eq!(overview.total_records, 5);
        assert_eq!(overview.total_columns, 5);
        assert_eq!(overview.missing_values, 3);
    }

    #[test]
    fn test_options_are_distinct_and_sorted() {
        let ds = sample();
        let options = ds.options();
        assert_eq!(options.sub_divisions, vec!["903", "1101"]);
        assert_eq!(options.connection_types, vec!["HT", "LT-1", "LT-2"]);
        assert_eq!(options.phases, vec!["1", "3"]);
    }

    #[test]
    fn test_preview_is_bounded() {
        let ds = sample();
        let preview = ds.preview(2);
        assert_eq!(preview.columns.len(), 5);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1][4], None);

        assert_eq!(ds.preview(50).rows.len(), 5);
    }

    #[test]
    fn test_missing_category_column() {
        let data = "SUB_DIV_ID,CONN_TYPE\n1,LT\n";
        let err = Dataset::from_reader(data.as_bytes(), "x", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(c) if c == "APPPHASE"));
    }

    #[test]
    fn test_header_only_dataset_has_empty_options() {
        let data = "SUB_DIV_ID,CONN_TYPE,APPPHASE\n";
        let ds = Dataset::from_reader(data.as_bytes(), "x", &LoadOptions::default()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.options().phases.is_empty());
        assert_eq!(ds.overview().missing_values, 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load("/nonexistent/nsc_data.csv", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn test_load_latin1_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"SUB_DIV_ID,CONN_TYPE,APPPHASE\n").unwrap();
        file.write_all(b"Ca\xF1on,LT-1,1\n").unwrap();
        file.flush().unwrap();

        let ds = Dataset::load(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.options().sub_divisions, vec!["Cañon"]);
    }
}
