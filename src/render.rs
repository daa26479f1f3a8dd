//! Terminal presentation of answers.
//!
//! Charts are not drawn; the renderer prints the chart heading, axes and a
//! preview of the series. Full chart specs can be exported as JSON for an
//! external plotting tool.

use std::{fmt::Write as _, fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use log::info;

use crate::{
    chart::{ChartData, ChartSpec},
    data::format_number,
    executor::{ExtremeValue, RankedRows},
    session::{Answer, Output},
    table::Table,
};

pub const DEFAULT_PREVIEW_ROWS: usize = 20;

pub fn render_answer(answer: &Answer, max_rows: usize) -> String {
    let mut output = String::new();
    for item in &answer.outputs {
        match item {
            Output::Interpretation { text } => {
                let _ = writeln!(output, "### Interpretation:\n{}", text.trim());
            }
            Output::Value(value) => {
                let _ = writeln!(output, "{}", describe_value(value));
            }
            Output::Rows(rows) => {
                let _ = writeln!(output, "{}", describe_rows(rows));
                output.push_str(&rows.table.render_limited(max_rows));
            }
            Output::Chart(spec) => output.push_str(&render_chart(spec, max_rows)),
            Output::Failure { message, .. } => {
                let _ = writeln!(output, "{message}");
            }
        }
    }
    output
}

pub fn print_answer(answer: &Answer, max_rows: usize) {
    print!("{}", render_answer(answer, max_rows));
}

pub fn describe_value(value: &ExtremeValue) -> String {
    format!(
        "The {} value in column '{}' is {}.",
        value.extreme.label(),
        value.column,
        value.value
    )
}

pub fn describe_rows(rows: &RankedRows) -> String {
    format!(
        "Here are the {} {} values in column '{}':",
        rows.direction.label(),
        rows.n,
        rows.column
    )
}

pub fn render_chart(spec: &ChartSpec, max_rows: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "### Generating a {} based on your query...", spec.kind);
    let _ = writeln!(output, "{}", spec.title);
    let _ = writeln!(output, "x: {}  y: {}", spec.x_label, spec.y_label);
    output.push_str(&series_table(spec).render_limited(max_rows));
    output
}

fn series_table(spec: &ChartSpec) -> Table {
    match &spec.data {
        ChartData::Points { x, y } => {
            let cell = |value: &Option<crate::data::Value>| {
                value.as_ref().map(|v| v.as_display()).unwrap_or_default()
            };
            Table::new(
                vec![spec.x_label.clone(), spec.y_label.clone()],
                x.iter()
                    .zip(y.iter())
                    .map(|(x, y)| vec![cell(x), cell(y)])
                    .collect(),
            )
        }
        ChartData::Bins { edges, counts, .. } => {
            let last = counts.len().saturating_sub(1);
            Table::new(
                vec!["bin".to_string(), "count".to_string()],
                counts
                    .iter()
                    .enumerate()
                    .map(|(idx, count)| {
                        let close = if idx == last { ']' } else { ')' };
                        vec![
                            format!(
                                "[{}, {}{close}",
                                format_number(edges[idx]),
                                format_number(edges[idx + 1])
                            ),
                            count.to_string(),
                        ]
                    })
                    .collect(),
            )
        }
        ChartData::Slices { labels, counts } => {
            let total: usize = counts.iter().sum();
            Table::new(
                vec![spec.x_label.clone(), "count".to_string(), "percent".to_string()],
                labels
                    .iter()
                    .zip(counts)
                    .map(|(label, count)| {
                        let percent = (*count as f64 / total.max(1) as f64) * 100.0;
                        vec![label.clone(), count.to_string(), format!("{percent:.1}%")]
                    })
                    .collect(),
            )
        }
    }
}

/// Writes every chart spec of an answer as a pretty JSON array.
pub fn write_chart_specs(path: &Path, charts: &[&ChartSpec]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Creating chart file {path:?}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), charts).context("Writing chart JSON")?;
    info!("Wrote {} chart spec(s) to {:?}", charts.len(), path);
    Ok(())
}
