//! Keyword table mapping chart types to trigger phrases.
//!
//! Lookup is plain case-insensitive substring containment. Chart types are
//! tried in table order and phrases in insertion order, so the first entry
//! that matches wins.

use std::{collections::HashSet, fmt, str::FromStr};

use anyhow::{Result, anyhow, bail, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartType {
    #[serde(rename = "bar chart")]
    BarChart,
    #[serde(rename = "line chart")]
    LineChart,
    #[serde(rename = "pie chart")]
    PieChart,
    #[serde(rename = "scatter plot")]
    ScatterPlot,
    #[serde(rename = "histogram")]
    Histogram,
}

impl ChartType {
    pub const ALL: [ChartType; 5] = [
        ChartType::BarChart,
        ChartType::LineChart,
        ChartType::PieChart,
        ChartType::ScatterPlot,
        ChartType::Histogram,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartType::BarChart => "bar chart",
            ChartType::LineChart => "line chart",
            ChartType::PieChart => "pie chart",
            ChartType::ScatterPlot => "scatter plot",
            ChartType::Histogram => "histogram",
        }
    }

    /// Pie charts read a single column; every other chart wants an x/y pair.
    pub fn column_arity(&self) -> usize {
        match self {
            ChartType::PieChart => 1,
            _ => 2,
        }
    }

    /// Label with the first letter upper-cased, used in chart titles.
    pub fn title_label(&self) -> String {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChartType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        ChartType::ALL
            .into_iter()
            .find(|chart| {
                chart.label() == normalized
                    || chart.label().split(' ').next() == Some(normalized.as_str())
            })
            .ok_or_else(|| anyhow!("Unknown chart type '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub chart: ChartType,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    /// Builds a table from ordered entries. Phrases are lowercased once here
    /// so lookups only lowercase the input text.
    pub fn new(entries: Vec<KeywordEntry>) -> Result<Self> {
        ensure!(!entries.is_empty(), "Keyword table must define at least one chart type");
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.chart) {
                bail!("Chart type '{}' is listed more than once", entry.chart);
            }
            ensure!(
                !entry.phrases.is_empty(),
                "Chart type '{}' has no trigger phrases",
                entry.chart
            );
            let mut phrases = Vec::with_capacity(entry.phrases.len());
            for phrase in &entry.phrases {
                let lowered = phrase.trim().to_lowercase();
                ensure!(
                    !lowered.is_empty(),
                    "Chart type '{}' has an empty trigger phrase",
                    entry.chart
                );
                phrases.push(lowered);
            }
            normalized.push(KeywordEntry {
                chart: entry.chart,
                phrases,
            });
        }
        Ok(Self {
            entries: normalized,
        })
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn phrases(&self, chart: ChartType) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.chart == chart)
            .map(|entry| entry.phrases.as_slice())
    }

    /// Returns the first chart type with a trigger phrase contained in
    /// `text`. Absence of a match is `None`, never an error.
    pub fn resolve(&self, text: &str) -> Option<ChartType> {
        let lowered = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .phrases
                    .iter()
                    .any(|phrase| lowered.contains(phrase.as_str()))
            })
            .map(|entry| entry.chart)
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        const DEFAULTS: [(ChartType, [&str; 4]); 5] = [
            (
                ChartType::BarChart,
                ["categories", "comparison", "quantities", "bar chart"],
            ),
            (
                ChartType::LineChart,
                ["time series", "trend", "continuous data", "line chart"],
            ),
            (
                ChartType::PieChart,
                ["percentages", "parts of a whole", "segments", "pie chart"],
            ),
            (
                ChartType::ScatterPlot,
                ["correlation", "data points", "x and y axes", "scatter plot"],
            ),
            (
                ChartType::Histogram,
                ["frequency distribution", "bins", "ranges", "histogram"],
            ),
        ];
        Self {
            entries: DEFAULTS
                .iter()
                .map(|(chart, phrases)| KeywordEntry {
                    chart: *chart,
                    phrases: phrases.iter().map(|p| p.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for KeywordTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = Vec::<KeywordEntry>::deserialize(deserializer)?;
        KeywordTable::new(entries).map_err(serde::de::Error::custom)
    }
}
