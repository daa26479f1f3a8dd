//! Statistic computation and chart data preparation over a loaded dataset.
//!
//! Every call reads the full in-memory dataset; nothing is cached between
//! queries.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;

use crate::{
    chart::{ChartData, ChartSpec, HISTOGRAM_BINS, histogram, value_counts},
    data::Value,
    dataset::{Column, Dataset},
    error::QueryError,
    intent::IntentKind,
    keywords::ChartType,
    matcher::ResolvedColumns,
    table::Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Extreme {
    Highest,
    Lowest,
}

impl Extreme {
    pub fn label(&self) -> &'static str {
        match self {
            Extreme::Highest => "highest",
            Extreme::Lowest => "lowest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Top,
    Bottom,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        }
    }
}

impl TryFrom<IntentKind> for Extreme {
    type Error = IntentKind;

    fn try_from(kind: IntentKind) -> Result<Self, Self::Error> {
        match kind {
            IntentKind::HighestValue => Ok(Extreme::Highest),
            IntentKind::LowestValue => Ok(Extreme::Lowest),
            other => Err(other),
        }
    }
}

impl TryFrom<IntentKind> for Direction {
    type Error = IntentKind;

    fn try_from(kind: IntentKind) -> Result<Self, Self::Error> {
        match kind {
            IntentKind::TopN => Ok(Direction::Top),
            IntentKind::BottomN => Ok(Direction::Bottom),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeValue {
    pub extreme: Extreme,
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRows {
    pub direction: Direction,
    pub column: String,
    pub n: usize,
    pub row_indices: Vec<usize>,
    pub table: Table,
}

fn lookup<'d>(dataset: &'d Dataset, column: &str) -> Result<&'d Column, QueryError> {
    dataset
        .column(column)
        .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))
}

fn require_orderable(column: &Column, operation: &str) -> Result<(), QueryError> {
    if column.datatype.is_orderable() {
        Ok(())
    } else {
        Err(QueryError::NonNumericColumn {
            column: column.name.clone(),
            datatype: column.datatype,
            operation: operation.to_string(),
        })
    }
}

fn order(a: &Value, b: &Value) -> Ordering {
    a.compare(b).unwrap_or(Ordering::Equal)
}

/// Maximum or minimum of a column's non-missing values.
pub fn extreme_value(
    dataset: &Dataset,
    column: &str,
    extreme: Extreme,
) -> Result<ExtremeValue, QueryError> {
    let column = lookup(dataset, column)?;
    let operation = format!("the {} value", extreme.label());
    // An all-missing column infers as string; report it as empty instead.
    if column.present().next().is_none() {
        return Err(QueryError::EmptyColumn {
            column: column.name.clone(),
            operation,
        });
    }
    require_orderable(column, &operation)?;
    let values = column.present().map(|(_, value)| value);
    let found = match extreme {
        Extreme::Highest => values.max_by(|a, b| order(a, b)),
        Extreme::Lowest => values.min_by(|a, b| order(a, b)),
    };
    let value = found.cloned().ok_or_else(|| QueryError::EmptyColumn {
        column: column.name.clone(),
        operation,
    })?;
    debug!("{} value in '{}' is {}", extreme.label(), column.name, value);
    Ok(ExtremeValue {
        extreme,
        column: column.name.clone(),
        value,
    })
}

/// The `n` rows with the largest (top) or smallest (bottom) values in
/// `column`. Missing values are skipped and ties keep their original row
/// order. The returned table carries every dataset column.
pub fn ranked_rows(
    dataset: &Dataset,
    column: &str,
    n: usize,
    direction: Direction,
) -> Result<RankedRows, QueryError> {
    let column = lookup(dataset, column)?;
    require_orderable(column, &format!("a {} {n} query", direction.label()))?;
    let mut ranked: Vec<(usize, &Value)> = column.present().collect();
    match direction {
        Direction::Top => ranked.sort_by(|a, b| order(b.1, a.1)),
        Direction::Bottom => ranked.sort_by(|a, b| order(a.1, b.1)),
    }
    ranked.truncate(n);
    let row_indices: Vec<usize> = ranked.into_iter().map(|(idx, _)| idx).collect();
    let rows = row_indices
        .iter()
        .filter_map(|idx| dataset.raw_row(*idx).map(<[String]>::to_vec))
        .collect();
    Ok(RankedRows {
        direction,
        column: column.name.clone(),
        n,
        row_indices,
        table: Table::new(dataset.column_names().to_vec(), rows),
    })
}

pub fn highest(dataset: &Dataset, column: &str) -> Result<ExtremeValue, QueryError> {
    extreme_value(dataset, column, Extreme::Highest)
}

pub fn lowest(dataset: &Dataset, column: &str) -> Result<ExtremeValue, QueryError> {
    extreme_value(dataset, column, Extreme::Lowest)
}

pub fn top_n(dataset: &Dataset, column: &str, n: usize) -> Result<RankedRows, QueryError> {
    ranked_rows(dataset, column, n, Direction::Top)
}

pub fn bottom_n(dataset: &Dataset, column: &str, n: usize) -> Result<RankedRows, QueryError> {
    ranked_rows(dataset, column, n, Direction::Bottom)
}

/// Assembles the series a chart needs from already-resolved columns.
pub fn prepare_chart(
    dataset: &Dataset,
    chart: ChartType,
    resolved: &ResolvedColumns,
) -> Result<ChartSpec, QueryError> {
    if chart == ChartType::PieChart {
        let name = resolved.first().ok_or_else(|| QueryError::UnresolvedColumn {
            operation: chart.label().to_string(),
        })?;
        let column = lookup(dataset, name)?;
        let (labels, counts): (Vec<String>, Vec<usize>) =
            value_counts(column).into_iter().unzip();
        return Ok(ChartSpec {
            kind: chart,
            title: format!("{} of {}", chart.title_label(), column.name),
            x_label: column.name.clone(),
            y_label: "count".to_string(),
            data: ChartData::Slices { labels, counts },
        });
    }

    let (x_name, y_name) = resolved.pair().ok_or_else(|| QueryError::InsufficientColumns {
        chart: chart.label().to_string(),
        available: resolved.columns.len(),
    })?;
    let x = lookup(dataset, x_name)?;
    let y = lookup(dataset, y_name)?;
    let title = format!("{} of {} vs {}", chart.title_label(), y.name, x.name);

    if chart == ChartType::Histogram {
        if !x.datatype.is_numeric() {
            return Err(QueryError::NonNumericColumn {
                column: x.name.clone(),
                datatype: x.datatype,
                operation: "a histogram".to_string(),
            });
        }
        let values: Vec<f64> = x.present().filter_map(|(_, v)| v.as_metric()).collect();
        let bins = histogram(&values, HISTOGRAM_BINS);
        return Ok(ChartSpec {
            kind: chart,
            title,
            x_label: x.name.clone(),
            y_label: "count".to_string(),
            data: ChartData::Bins {
                values,
                edges: bins.edges,
                counts: bins.counts,
            },
        });
    }

    Ok(ChartSpec {
        kind: chart,
        title,
        x_label: x.name.clone(),
        y_label: y.name.clone(),
        data: ChartData::Points {
            x: x.values.clone(),
            y: y.values.clone(),
        },
    })
}
