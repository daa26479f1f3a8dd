//! Chart specifications handed to the renderer.

use std::collections::HashMap;

use serde::Serialize;

use crate::{dataset::Column, keywords::ChartType};

pub const HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    /// Row-aligned x/y series for bar, line and scatter charts.
    Points {
        x: Vec<Option<crate::data::Value>>,
        y: Vec<Option<crate::data::Value>>,
    },
    Bins {
        values: Vec<f64>,
        edges: Vec<f64>,
        counts: Vec<usize>,
    },
    Slices {
        labels: Vec<String>,
        counts: Vec<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartType,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: ChartData,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        match &self.data {
            ChartData::Points { x, .. } => x.len(),
            ChartData::Bins { counts, .. } => counts.len(),
            ChartData::Slices { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Equal-width bins between the minimum and maximum. Every bin is half-open
/// except the last, which also holds the maximum. A single distinct value
/// is centred in a range one unit wide.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect::<Vec<_>>();
    let mut counts = vec![0usize; bins];
    for value in values.iter().copied().filter(|v| v.is_finite()) {
        let slot = (((value - lo) / width).floor() as usize).min(bins - 1);
        counts[slot] += 1;
    }
    Histogram { edges, counts }
}

/// Distinct value -> occurrence count, most frequent first. Ties keep the
/// order in which values first appear; missing cells are skipped.
pub fn value_counts(column: &Column) -> Vec<(String, usize)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for (_, value) in column.present() {
        let label = value.as_display();
        match positions.get(&label) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                positions.insert(label.clone(), counts.len());
                counts.push((label, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
