//! Column types and type inference for uploaded datasets.
//!
//! Every cell of every row takes part in inference, so a column is only
//! typed as numeric when all of its non-missing cells parse as numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{is_placeholder_token, parse_boolean, parse_naive_date, parse_naive_datetime};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Types with a total order usable by max/min and top/bottom selection.
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Date | ColumnType::DateTime
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TypeCandidate {
    non_empty: usize,
    boolean_matches: usize,
    integer_matches: usize,
    float_matches: usize,
    date_matches: usize,
    datetime_matches: usize,
}

impl TypeCandidate {
    pub(crate) fn update(&mut self, value: &str) {
        let trimmed = value.trim();
        if is_placeholder_token(&trimmed.to_ascii_lowercase()) {
            return;
        }
        self.non_empty += 1;

        if parse_boolean(trimmed).is_some() {
            self.boolean_matches += 1;
        }
        if trimmed.parse::<i64>().is_ok() {
            self.integer_matches += 1;
            self.float_matches += 1;
        } else if trimmed.parse::<f64>().is_ok() {
            self.float_matches += 1;
        } else if parse_naive_date(trimmed).is_ok() {
            self.date_matches += 1;
        } else if parse_naive_datetime(trimmed).is_ok() {
            self.datetime_matches += 1;
        }
    }

    pub(crate) fn decide(&self) -> ColumnType {
        let all = |matches: usize| self.non_empty > 0 && matches == self.non_empty;
        if all(self.boolean_matches) {
            ColumnType::Boolean
        } else if all(self.integer_matches) {
            ColumnType::Integer
        } else if all(self.float_matches) {
            ColumnType::Float
        } else if all(self.date_matches) {
            ColumnType::Date
        } else if all(self.datetime_matches) {
            ColumnType::DateTime
        } else {
            ColumnType::String
        }
    }
}

/// Infers one type per column from row-major raw cells.
pub fn infer_column_types(column_count: usize, rows: &[Vec<String>]) -> Vec<ColumnType> {
    let mut candidates = vec![TypeCandidate::default(); column_count];
    for row in rows {
        for (candidate, cell) in candidates.iter_mut().zip(row.iter()) {
            candidate.update(cell);
        }
    }
    candidates.iter().map(TypeCandidate::decide).collect()
}
