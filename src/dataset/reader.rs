//! Delimited-text parsing for the NSC dataset.

use serde::{Deserialize, Serialize};
use std::io::Read;

use super::DatasetError;

/// Character encoding of the dataset file.
#[cfg_attr(feature = "swagger", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TextEncoding {
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl TextEncoding {
    /// Decode a single field. `line` is only used for error reporting.
    pub fn decode(self, bytes: &[u8], line: u64) -> Result<String, DatasetError> {
        match self {
            // Every Latin-1 byte maps to the Unicode code point of the same value.
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| DatasetError::Encoding { line }),
        }
    }
}

/// Markers that are read as a missing value, in addition to the empty field.
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(field: &str) -> bool {
    field.is_empty() || NA_MARKERS.contains(&field)
}

#[derive(Debug)]
pub(super) struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

pub(super) fn read_table<R: Read>(
    input: R,
    encoding: TextEncoding,
    delimiter: u8,
) -> Result<RawTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns = reader
        .byte_headers()?
        .iter()
        .map(|h| encoding.decode(h, 1))
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
        return Err(DatasetError::Empty);
    }

    let width = columns.len();
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.len() > width {
            return Err(DatasetError::RaggedRow {
                line,
                expected: width,
                found: record.len(),
            });
        }

        let mut row = Vec::with_capacity(width);
        for field in record.iter() {
            let value = encoding.decode(field, line)?;
            row.push(if is_missing(&value) { None } else { Some(value) });
        }
        row.resize(width, None);
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}
