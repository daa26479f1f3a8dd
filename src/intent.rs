//! Query intent classification.
//!
//! Two independent checks run for every query and their results are kept
//! in a fixed dispatch order:
//!
//! 1. statistic detection on the raw query (`highest`/`lowest`, else
//!    `top N`/`bottom N`);
//! 2. chart detection, first against the model suggestion and then against
//!    the raw query.
//!
//! A query can therefore yield both a statistic and a chart. When neither
//! check fires the result is a single [`IntentKind::Unknown`].

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::keywords::{ChartType, KeywordTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IntentKind {
    BarChart,
    LineChart,
    PieChart,
    ScatterPlot,
    Histogram,
    HighestValue,
    LowestValue,
    TopN,
    BottomN,
    Unknown,
}

impl IntentKind {
    pub fn chart(&self) -> Option<ChartType> {
        match self {
            IntentKind::BarChart => Some(ChartType::BarChart),
            IntentKind::LineChart => Some(ChartType::LineChart),
            IntentKind::PieChart => Some(ChartType::PieChart),
            IntentKind::ScatterPlot => Some(ChartType::ScatterPlot),
            IntentKind::Histogram => Some(ChartType::Histogram),
            _ => None,
        }
    }

    /// Phrase used in user-facing messages about this intent.
    pub fn describe(&self) -> &'static str {
        match self {
            IntentKind::HighestValue | IntentKind::LowestValue => "highest/lowest value",
            IntentKind::TopN | IntentKind::BottomN => "top/bottom",
            IntentKind::Unknown => "unknown",
            other => other.chart().map(|c| c.label()).unwrap_or("chart"),
        }
    }
}

impl From<ChartType> for IntentKind {
    fn from(chart: ChartType) -> Self {
        match chart {
            ChartType::BarChart => IntentKind::BarChart,
            ChartType::LineChart => IntentKind::LineChart,
            ChartType::PieChart => IntentKind::PieChart,
            ChartType::ScatterPlot => IntentKind::ScatterPlot,
            ChartType::Histogram => IntentKind::Histogram,
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryIntent {
    pub kind: IntentKind,
    pub n: Option<usize>,
    pub columns: Vec<String>,
    /// Where the chart type was found; `None` for statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_source: Option<ChartSource>,
}

impl QueryIntent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            n: None,
            columns: Vec::new(),
            chart_source: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(IntentKind::Unknown)
    }

    pub fn with_count(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }
}

/// Where a chart type was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartSource {
    Suggestion,
    Query,
}

fn count_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"top (\d+)|bottom (\d+)").expect("valid count pattern"))
}

/// Finds the first `top N` / `bottom N` phrase in the lowercased text.
/// The matched phrase decides the direction; `N` must be a positive integer.
pub fn extract_count(text: &str) -> Option<QueryIntent> {
    let lowered = text.to_lowercase();
    let captures = count_pattern().captures(&lowered)?;
    let (kind, digits) = match (captures.get(1), captures.get(2)) {
        (Some(top), _) => (IntentKind::TopN, top.as_str()),
        (None, Some(bottom)) => (IntentKind::BottomN, bottom.as_str()),
        (None, None) => return None,
    };
    let n = digits.parse::<usize>().ok().filter(|n| *n > 0)?;
    Some(QueryIntent::new(kind).with_count(n))
}

/// Statistic detection. `highest`/`lowest` take precedence; top/bottom is
/// only considered when neither word is present.
pub fn detect_statistic(query: &str) -> Option<QueryIntent> {
    let lowered = query.to_lowercase();
    if lowered.contains("highest") {
        Some(QueryIntent::new(IntentKind::HighestValue))
    } else if lowered.contains("lowest") {
        Some(QueryIntent::new(IntentKind::LowestValue))
    } else if lowered.contains("top") || lowered.contains("bottom") {
        extract_count(&lowered)
    } else {
        None
    }
}

pub struct IntentResolver<'a> {
    keywords: &'a KeywordTable,
}

impl<'a> IntentResolver<'a> {
    pub fn new(keywords: &'a KeywordTable) -> Self {
        Self { keywords }
    }

    pub fn resolve(&self, text: &str) -> Option<ChartType> {
        self.keywords.resolve(text)
    }

    /// Model-derived text takes priority over the raw query.
    pub fn resolve_chart(
        &self,
        suggestion: Option<&str>,
        query: &str,
    ) -> Option<(ChartType, ChartSource)> {
        suggestion
            .and_then(|text| self.resolve(text))
            .map(|chart| (chart, ChartSource::Suggestion))
            .or_else(|| self.resolve(query).map(|chart| (chart, ChartSource::Query)))
    }

    pub fn classify(&self, query: &str, suggestion: Option<&str>) -> Vec<QueryIntent> {
        let mut intents = Vec::with_capacity(2);
        if let Some(statistic) = detect_statistic(query) {
            intents.push(statistic);
        }
        if let Some((chart, source)) = self.resolve_chart(suggestion, query) {
            let mut intent = QueryIntent::new(chart.into());
            intent.chart_source = Some(source);
            intents.push(intent);
        }
        if intents.is_empty() {
            intents.push(QueryIntent::unknown());
        }
        intents
    }
}
