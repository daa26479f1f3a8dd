//! In-memory dataset held for the active session.
//!
//! A [`Dataset`] is parsed once from a delimited file and never mutated;
//! uploading another file builds a new one. Raw cell text is kept next to
//! the typed values so result tables show cells exactly as uploaded.

use std::{collections::HashSet, io::Read, path::Path};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::{Value, parse_typed_value},
    io_utils,
    schema::{ColumnType, infer_column_types},
};

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
    pub values: Vec<Option<Value>>,
}

impl Column {
    /// Non-missing values paired with their row index.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| value.as_ref().map(|v| (idx, v)))
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    headers: Vec<String>,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn load(path: &Path, delimiter: Option<u8>, encoding: &'static Encoding) -> Result<Self> {
        let delimiter = io_utils::resolve_input_delimiter(path, delimiter);
        let reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
        let dataset = Self::from_csv(reader, encoding, path.display().to_string())
            .with_context(|| format!("Loading dataset from {path:?}"))?;
        info!(
            "Loaded {} row(s) across {} column(s) from {:?}",
            dataset.row_count(),
            dataset.headers.len(),
            path
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        encoding: &'static Encoding,
        source: impl Into<String>,
    ) -> Result<Self> {
        Self::from_csv(
            io_utils::open_csv_reader(reader, delimiter),
            encoding,
            source.into(),
        )
    }

    fn from_csv<R: Read>(
        mut reader: csv::Reader<R>,
        encoding: &'static Encoding,
        source: String,
    ) -> Result<Self> {
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        let mut rows = Vec::new();
        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            rows.push(io_utils::decode_record(&record, encoding)?);
        }
        Self::from_records(headers, rows, source)
    }

    pub fn from_records(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        source: impl Into<String>,
    ) -> Result<Self> {
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            bail!("No columns to parse from file");
        }
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                bail!(
                    "Row {} has {} field(s) but the header declares {}",
                    row_idx + 2,
                    row.len(),
                    headers.len()
                );
            }
        }
        let headers = dedupe_headers(headers);
        let types = infer_column_types(headers.len(), &rows);
        let mut columns = Vec::with_capacity(headers.len());
        for (idx, (name, datatype)) in headers.iter().zip(types).enumerate() {
            let values = rows
                .iter()
                .enumerate()
                .map(|(row_idx, row)| {
                    parse_typed_value(&row[idx], &datatype).with_context(|| {
                        format!("Parsing column '{name}' at row {}", row_idx + 2)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            debug!("Column '{name}' inferred as {datatype}");
            columns.push(Column {
                name: name.clone(),
                datatype,
                values,
            });
        }
        Ok(Self {
            source: source.into(),
            headers,
            columns,
            rows,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn column_names(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn raw_row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Blank headers become `Unnamed: {idx}` and repeated names get `.1`, `.2`,
/// ... suffixes so every column stays addressable by name.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let header = if header.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                header
            };
            let mut candidate = header.clone();
            let mut suffix = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{header}.{suffix}");
                suffix += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    #[test]
    fn from_reader_types_columns_and_keeps_raw_cells() {
        let csv = "name,amount,ordered_at\nAlice,42.50,2024-01-01\nBob,,2024-01-03\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), b',', UTF_8, "inline").unwrap();
        assert_eq!(dataset.column_names(), ["name", "amount", "ordered_at"]);
        assert_eq!(dataset.row_count(), 2);
        let amount = dataset.column("amount").unwrap();
        assert_eq!(amount.datatype, ColumnType::Float);
        assert_eq!(amount.values[0], Some(Value::Float(42.5)));
        assert_eq!(amount.values[1], None);
        assert_eq!(dataset.raw_row(0).unwrap()[1], "42.50");
    }

    #[test]
    fn ragged_rows_fail_the_whole_load() {
        let csv = "a,b\n1,2\n3\n";
        let err = Dataset::from_reader(csv.as_bytes(), b',', UTF_8, "inline").unwrap_err();
        assert!(format!("{err:#}").contains("Reading row 3"));
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = vec!["a".to_string(), "a".to_string(), "a.1".to_string()];
        assert_eq!(dedupe_headers(headers), vec!["a", "a.1", "a.1.1"]);
    }

    #[test]
    fn blank_headers_are_named_by_position() {
        let csv = ",income, \n0,100,x\n1,900,y\n";
        let dataset = Dataset::from_reader(csv.as_bytes(), b',', UTF_8, "inline").unwrap();
        assert_eq!(dataset.column_names(), ["Unnamed: 0", "income", "Unnamed: 2"]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(Dataset::from_reader("".as_bytes(), b',', UTF_8, "inline").is_err());
    }
}
