use thiserror::Error;

use crate::schema::ColumnType;

/// Failures scoped to a single query. None of these end the session; the
/// session turns each one into a visible message and moves on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Please upload a dataset to begin.")]
    NoDataset,

    #[error("Please enter a query about the dataset.")]
    EmptyQuery,

    #[error("Please specify a valid column for the {operation} query.")]
    UnresolvedColumn { operation: String },

    #[error(
        "Unable to determine the graph type from the query. Please specify a valid graph type or check your query."
    )]
    UnknownIntent,

    #[error("Column '{column}' holds {datatype} values and cannot be used for {operation}.")]
    NonNumericColumn {
        column: String,
        datatype: ColumnType,
        operation: String,
    },

    #[error("Column '{column}' has no values to compute {operation}.")]
    EmptyColumn { column: String, operation: String },

    #[error("Column '{0}' not found in dataset")]
    UnknownColumn(String),

    #[error("A {chart} needs at least two columns but the dataset has {available}.")]
    InsufficientColumns { chart: String, available: usize },

    #[error("The interpretation model is unavailable: {0}")]
    Suggestion(String),
}
